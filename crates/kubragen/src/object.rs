use serde::{Serialize, Serializer};
use snafu::ResultExt;

use crate::{
    data::Data,
    error::{Result, SerializeObjectSnafu},
};

/// One generated output unit: a Kubernetes object or a raw document.
///
/// `name` is the build item name, unique within a build group. `source`
/// identifies the builder that produced the item and `instance` the
/// deployment instance (usually the builder's basename), so items of several
/// instances of the same builder can be told apart.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectItem {
    pub name: String,
    pub source: String,
    pub instance: String,
    pub data: Data,
}

impl ObjectItem {
    pub fn new(
        data: impl Into<Data>,
        name: impl Into<String>,
        source: impl Into<String>,
        instance: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            instance: instance.into(),
            data: data.into(),
        }
    }

    /// Creates an item from a typed object, such as a `k8s_openapi` resource.
    pub fn from_resource<T: Serialize>(
        resource: &T,
        name: impl Into<String>,
        source: impl Into<String>,
        instance: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        let data = Data::from_serialize(resource).context(SerializeObjectSnafu { name: &name })?;
        Ok(Self::new(data, name, source, instance))
    }

    pub fn api_version(&self) -> Option<&str> {
        self.data.get("apiVersion").and_then(Data::as_str)
    }

    pub fn kind(&self) -> Option<&str> {
        self.data.get("kind").and_then(Data::as_str)
    }

    /// `metadata.name` of the object, if any.
    pub fn object_name(&self) -> Option<&str> {
        self.data.pointer("/metadata/name").and_then(Data::as_str)
    }

    /// Looks up a value in the object body, see [`Data::pointer`].
    pub fn pointer(&self, pointer: &str) -> Option<&Data> {
        self.data.pointer(pointer)
    }

    /// Returns the object body with every omitted node erased.
    pub fn pruned_data(&self) -> Data {
        self.data.clone().pruned()
    }

    /// Finds the item with the build item name `name`.
    pub fn find<'a>(items: &'a [Self], name: &str) -> Option<&'a Self> {
        items.iter().find(|item| item.name == name)
    }
}

/// Only the object body is serialized.
impl Serialize for ObjectItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}
