use k8s_openapi::{
    api::core::v1::{Container, PodSpec, PodTemplateSpec, Volume},
    apimachinery::pkg::apis::meta::v1::ObjectMeta,
};

use crate::builder::meta::ObjectMetaBuilder;

pub mod container;
pub mod volume;

/// A builder to build [`PodTemplateSpec`] objects for workload resources.
#[derive(Clone, Debug, Default)]
pub struct PodBuilder {
    metadata: Option<ObjectMeta>,
    containers: Vec<Container>,
    volumes: Option<Vec<Volume>>,
    service_account_name: Option<String>,
}

impl PodBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metadata(&mut self, metadata: impl Into<ObjectMeta>) -> &mut Self {
        self.metadata = Some(metadata.into());
        self
    }

    pub fn metadata_builder<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut ObjectMetaBuilder) -> &mut ObjectMetaBuilder,
    {
        let mut builder = ObjectMetaBuilder::new();
        let builder = f(&mut builder);
        self.metadata = Some(builder.build());
        self
    }

    pub fn service_account_name(&mut self, value: impl Into<String>) -> &mut Self {
        self.service_account_name = Some(value.into());
        self
    }

    pub fn service_account_name_opt(&mut self, value: Option<impl Into<String>>) -> &mut Self {
        self.service_account_name = value.map(Into::into);
        self
    }

    pub fn add_container(&mut self, container: Container) -> &mut Self {
        self.containers.push(container);
        self
    }

    pub fn add_volume(&mut self, volume: Volume) -> &mut Self {
        self.volumes.get_or_insert_with(Vec::new).push(volume);
        self
    }

    fn build_spec(&self) -> PodSpec {
        PodSpec {
            containers: self.containers.clone(),
            service_account_name: self.service_account_name.clone(),
            volumes: self.volumes.clone(),
            ..PodSpec::default()
        }
    }

    pub fn build_template(&self) -> PodTemplateSpec {
        PodTemplateSpec {
            metadata: self.metadata.clone(),
            spec: Some(self.build_spec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{container::ContainerBuilder, volume::VolumeBuilder, *};

    #[test]
    fn pod_template_builder() {
        let template = PodBuilder::new()
            .metadata_builder(|meta| meta.with_label("app", "traefik2"))
            .service_account_name("traefik2")
            .add_container(ContainerBuilder::new("traefik").image("traefik:v2.2").build())
            .add_volume(
                VolumeBuilder::new("traefik-config")
                    .with_config_map("traefik2-config")
                    .build(),
            )
            .build_template();

        let spec = template.spec.unwrap();
        assert_eq!(spec.service_account_name.as_deref(), Some("traefik2"));
        assert_eq!(spec.containers.len(), 1);
        assert_eq!(spec.volumes.unwrap()[0].name, "traefik-config");
        assert_eq!(
            template.metadata.unwrap().labels.unwrap().get("app").unwrap(),
            "traefik2"
        );
    }

    #[test]
    fn optional_service_account() {
        let template = PodBuilder::new()
            .service_account_name_opt(None::<String>)
            .build_template();
        let spec = template.spec.unwrap();
        assert!(spec.service_account_name.is_none());
        assert!(spec.volumes.is_none());
    }
}
