//! Utility functions for processing data in the YAML file format
use std::io::Write;

use serde::{Deserialize, ser};
use snafu::ResultExt;

use crate::{
    data::Data,
    error::{ParseYamlSnafu, RenderYamlSnafu, Result, WriteDocumentSnafu},
    object::ObjectItem,
};

/// Serializes the given data structure as an explicit YAML document and writes it to a [`Write`].
///
/// Enums are serialized as a YAML map containing one entry in which the key identifies the variant
/// name.
///
/// # Example
///
/// ```
/// use kubragen::{data::Data, yaml};
///
/// let value = Data::from_iter([("kind", "ServiceAccount")]);
///
/// let mut buf = Vec::new();
/// yaml::serialize_to_explicit_document(&mut buf, &value).unwrap();
/// let actual_yaml = std::str::from_utf8(&buf).unwrap();
///
/// assert_eq!("---\nkind: ServiceAccount\n", actual_yaml);
/// ```
pub fn serialize_to_explicit_document<T, W>(mut writer: W, value: &T) -> Result<()>
where
    T: ser::Serialize,
    W: Write,
{
    writer.write_all(b"---\n").context(WriteDocumentSnafu)?;
    let mut serializer = serde_yaml::Serializer::new(writer);
    serde_yaml::with::singleton_map_recursive::serialize(value, &mut serializer)
        .context(RenderYamlSnafu)?;
    Ok(())
}

/// Writes every item as its own explicit document, in order.
pub fn write_objects<W: Write>(mut writer: W, items: &[ObjectItem]) -> Result<()> {
    for item in items {
        serialize_to_explicit_document(&mut writer, item)?;
    }
    Ok(())
}

/// Parses every document of a multi-document YAML stream.
pub fn load_all(input: &str) -> Result<Vec<Data>> {
    serde_yaml::Deserializer::from_str(input)
        .map(|document| Data::deserialize(document).context(ParseYamlSnafu))
        .collect()
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn write_multiple_documents() {
        let items = vec![
            ObjectItem::new(
                Data::from_iter([("kind", "ServiceAccount")]),
                "service-account",
                "kg_traefik2",
                "traefik2",
            ),
            ObjectItem::new(
                Data::from_iter([("kind", "Service")]),
                "service",
                "kg_traefik2",
                "traefik2",
            ),
        ];

        let mut buf = Vec::new();
        write_objects(&mut buf, &items).unwrap();
        assert_eq!(
            std::str::from_utf8(&buf).unwrap(),
            indoc! {"
                ---
                kind: ServiceAccount
                ---
                kind: Service
            "}
        );
    }

    #[test]
    fn load_multiple_documents() {
        let documents = load_all(indoc! {"
            ---
            kind: CustomResourceDefinition
            spec:
              scope: Namespaced
            ---
            kind: CustomResourceDefinition
        "})
        .unwrap();

        assert_eq!(documents.len(), 2);
        assert_eq!(
            documents[0].pointer("/spec/scope"),
            Some(&Data::from("Namespaced"))
        );
    }

    #[test]
    fn load_invalid_document() {
        let err = load_all("a: [1, 2").unwrap_err();
        assert!(matches!(err, crate::Error::ParseYaml { .. }));
    }
}
