use std::collections::BTreeMap;

use k8s_openapi::{api::core::v1::ConfigMap, apimachinery::pkg::apis::meta::v1::ObjectMeta};

/// A builder to build [`ConfigMap`] objects.
#[derive(Clone, Debug, Default)]
pub struct ConfigMapBuilder {
    metadata: ObjectMeta,
    data: Option<BTreeMap<String, String>>,
}

impl ConfigMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metadata(&mut self, metadata: impl Into<ObjectMeta>) -> &mut Self {
        self.metadata = metadata.into();
        self
    }

    pub fn add_data(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.data
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn build(&self) -> ConfigMap {
        ConfigMap {
            metadata: self.metadata.clone(),
            data: self.data.clone(),
            ..ConfigMap::default()
        }
    }
}
