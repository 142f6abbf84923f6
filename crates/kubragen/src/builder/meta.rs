use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// A builder to build [`ObjectMeta`] objects.
///
/// Cluster scoped objects (`ClusterRole`, `ClusterRoleBinding`) simply never
/// call [`Self::namespace`].
#[derive(Clone, Debug, Default)]
pub struct ObjectMetaBuilder {
    name: Option<String>,
    namespace: Option<String>,
    labels: Option<BTreeMap<String, String>>,
    annotations: Option<BTreeMap<String, String>>,
}

impl ObjectMetaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// This adds a single annotation to the existing annotations.
    /// It'll override an annotation with the same key.
    pub fn with_annotation(
        &mut self,
        annotation_key: impl Into<String>,
        annotation_value: impl Into<String>,
    ) -> &mut Self {
        self.annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(annotation_key.into(), annotation_value.into());
        self
    }

    /// This adds multiple annotations to the existing annotations.
    /// Any existing annotation with a key that is contained in `annotations` will be overwritten
    pub fn with_annotations(&mut self, annotations: BTreeMap<String, String>) -> &mut Self {
        self.annotations
            .get_or_insert_with(BTreeMap::new)
            .extend(annotations);
        self
    }

    /// This adds a single label to the existing labels.
    /// It'll override a label with the same key.
    pub fn with_label(
        &mut self,
        label_key: impl Into<String>,
        label_value: impl Into<String>,
    ) -> &mut Self {
        self.labels
            .get_or_insert_with(BTreeMap::new)
            .insert(label_key.into(), label_value.into());
        self
    }

    pub fn build(&self) -> ObjectMeta {
        ObjectMeta {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            labels: self.labels.clone(),
            annotations: self.annotations.clone(),
            ..ObjectMeta::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objectmeta_builder() {
        let meta = ObjectMetaBuilder::new()
            .name("traefik2")
            .namespace("myns")
            .with_label("app", "traefik2")
            .with_annotation("foo", "bar")
            .with_annotations(BTreeMap::from([("baz".to_owned(), "qux".to_owned())]))
            .build();

        assert_eq!(meta.name.as_deref(), Some("traefik2"));
        assert_eq!(meta.namespace.as_deref(), Some("myns"));
        assert_eq!(meta.labels.as_ref().unwrap().get("app").unwrap(), "traefik2");
        assert_eq!(meta.annotations.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn empty_collections_stay_unset() {
        let meta = ObjectMetaBuilder::new().name("cluster-scoped").build();
        assert!(meta.namespace.is_none());
        assert!(meta.labels.is_none());
        assert!(meta.annotations.is_none());
    }
}
