use k8s_openapi::api::core::v1::{ConfigMapVolumeSource, Volume};

/// A builder to build [`Volume`] objects backed by a ConfigMap.
#[derive(Clone, Debug, Default)]
pub struct VolumeBuilder {
    name: String,
    config_map: ConfigMapVolumeSource,
}

impl VolumeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_config_map(&mut self, name: impl Into<String>) -> &mut Self {
        self.config_map = ConfigMapVolumeSource {
            name: name.into(),
            ..ConfigMapVolumeSource::default()
        };
        self
    }

    pub fn build(&self) -> Volume {
        Volume {
            name: self.name.clone(),
            config_map: Some(self.config_map.clone()),
            ..Volume::default()
        }
    }
}
