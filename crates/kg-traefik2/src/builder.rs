use std::{collections::BTreeMap, sync::OnceLock};

use k8s_openapi::{
    api::{
        apps::v1::{Deployment, DeploymentSpec},
        core::v1::{Service, ServicePort, ServiceSpec},
        rbac::v1::PolicyRule,
    },
    apimachinery::pkg::apis::meta::v1::LabelSelector,
};
use kubragen::{
    KubraGen, Result,
    builder::{
        BuildItemName, BuildName, Builder,
        configmap::ConfigMapBuilder,
        meta::ObjectMetaBuilder,
        pod::{PodBuilder, container::ContainerBuilder, volume::VolumeBuilder},
        rbac,
    },
    configfile::{ConfigFormat, MultiFormatRenderer, render_option},
    data::{ConditionalValue, Data},
    error::{InvalidBuildNameSnafu, InvalidParamSnafu, MissingRequiredOptionSnafu},
    naming::NameRegistry,
    object::ObjectItem,
    option::{OptionGetter, OptionResolver, OptionValue},
};
use snafu::OptionExt;
use tracing::{debug, trace};

use crate::{
    crd::TRAEFIK_CRDS,
    option::{Traefik2Options, Traefik2OptionsPort},
};

pub const SOURCE_NAME: &str = "kg_traefik2";

pub const BUILD_CRD: BuildName = "crd";
pub const BUILD_ACCESSCONTROL: BuildName = "accesscontrol";
pub const BUILD_CONFIG: BuildName = "config";
pub const BUILD_SERVICE: BuildName = "service";

pub const BUILDITEM_CLUSTER_ROLE: BuildItemName = "cluster-role";
pub const BUILDITEM_SERVICE_ACCOUNT: BuildItemName = "service-account";
pub const BUILDITEM_CLUSTER_ROLE_BINDING: BuildItemName = "cluster-role-binding";
pub const BUILDITEM_CONFIG: BuildItemName = "config";
pub const BUILDITEM_DEPLOYMENT: BuildItemName = "deployment";
pub const BUILDITEM_SERVICE: BuildItemName = "service";

pub const OBJECT_SERVICE: &str = "service";
pub const OBJECT_SERVICE_ACCOUNT: &str = "service-account";
pub const OBJECT_CLUSTER_ROLE: &str = "cluster-role";
pub const OBJECT_CLUSTER_ROLE_BINDING: &str = "cluster-role-binding";
pub const OBJECT_DEPLOYMENT: &str = "deployment";
pub const OBJECT_CONFIG: &str = "config";
pub const OBJECT_POD_LABEL_APP: &str = "pod-label-app";

pub const CONTAINER_NAME: &str = "traefik";
pub const CONFIG_VOLUME_NAME: &str = "traefik-config";
pub const CONFIG_MOUNT_PATH: &str = "/etc/traefik";

const OPTION_TRAEFIK_CONFIG: &str = "config.traefik_config";
const CONTAINER_POINTER: &str = "/spec/template/spec/containers/0";

/// Generates a Traefik 2 ingress controller: its CRDs, access control,
/// configuration and the Deployment with its Service.
///
/// Object names are decided once, in [`Self::new`]; the build groups only read
/// them from the [`NameRegistry`].
#[derive(Debug)]
pub struct Traefik2Builder {
    kubragen: KubraGen,
    options: Traefik2Options,
    basename: String,
    namespace: String,
    object_names: NameRegistry,
    config_text: OnceLock<String>,
}

impl Traefik2Builder {
    pub fn new(kubragen: &KubraGen, options: Traefik2Options) -> Result<Self> {
        let resolver = OptionResolver::new(kubragen, options.options());

        let basename = required(resolver.option_str("basename")?, "basename")?;
        let namespace = required(resolver.option_str("namespace")?, "namespace")?;

        let serviceaccount_name = if create_service_account(&resolver)? {
            Some(basename.clone())
        } else {
            resolver
                .option_str("config.authorization.serviceaccount_use")?
                .filter(|name| !name.is_empty())
        };

        let role_name = create_roles(&resolver)?.then(|| basename.clone());

        let rolebinding_name = if bool_option(&resolver, "config.authorization.roles_bind")? {
            snafu::ensure!(
                serviceaccount_name.is_some(),
                InvalidParamSnafu {
                    message: "a service account is required to bind roles"
                }
            );
            snafu::ensure!(
                role_name.is_some(),
                InvalidParamSnafu {
                    message: "the role must be created to bind roles"
                }
            );
            Some(basename.clone())
        } else {
            None
        };

        let object_names = NameRegistry::from_iter([
            (OBJECT_SERVICE, Some(basename.clone())),
            (OBJECT_SERVICE_ACCOUNT, serviceaccount_name),
            (OBJECT_CLUSTER_ROLE, role_name),
            (OBJECT_CLUSTER_ROLE_BINDING, rolebinding_name),
            (OBJECT_DEPLOYMENT, Some(basename.clone())),
            (OBJECT_CONFIG, Some(format!("{basename}-config"))),
            (OBJECT_POD_LABEL_APP, Some(basename.clone())),
        ]);
        debug!(?object_names, %namespace, "traefik2 object names");

        Ok(Self {
            kubragen: kubragen.clone(),
            options,
            basename,
            namespace,
            object_names,
            config_text: OnceLock::new(),
        })
    }

    pub fn options(&self) -> &Traefik2Options {
        &self.options
    }

    pub fn config_format(&self) -> Result<ConfigFormat> {
        let format = required(
            self.option_str("config.config_format")?,
            "config.config_format",
        )?;
        ConfigFormat::parse(&format)
    }

    /// The rendered Traefik configuration, [`None`] if `config.traefik_config`
    /// is not supplied.
    ///
    /// The text is rendered on the first call and reused afterwards.
    pub fn config_text(&self) -> Result<Option<&str>> {
        if let Some(text) = self.config_text.get() {
            trace!("using cached traefik config");
            return Ok(Some(text.as_str()));
        }
        let Some(value) = self.option_get(OPTION_TRAEFIK_CONFIG)? else {
            return Ok(None);
        };

        let text = render_option(
            OPTION_TRAEFIK_CONFIG,
            &value,
            self,
            self.config_format()?,
            &MultiFormatRenderer,
        )?;
        Ok(Some(self.config_text.get_or_init(|| text).as_str()))
    }

    pub fn ports(&self) -> Result<Vec<Traefik2OptionsPort>> {
        required(self.option_typed("config.ports")?, "config.ports")
    }

    fn has_config(&self) -> Result<bool> {
        Ok(self.option_get(OPTION_TRAEFIK_CONFIG)?.is_some())
    }

    fn internal_build_crd(&self) -> Vec<ObjectItem> {
        debug!(count = TRAEFIK_CRDS.len(), "loading traefik CRDs");
        TRAEFIK_CRDS
            .iter()
            .map(|crd| ObjectItem::new(crd.to_data(), crd.name, SOURCE_NAME, &self.basename))
            .collect()
    }

    fn internal_build_accesscontrol(&self) -> Result<Vec<ObjectItem>> {
        let mut items = Vec::new();

        if bool_option(self, "config.authorization.serviceaccount_create")? {
            let service_account = rbac::build_service_account(
                self.object_names.require(OBJECT_SERVICE_ACCOUNT)?,
                &self.namespace,
            );
            items.push(self.item(&service_account, BUILDITEM_SERVICE_ACCOUNT)?);
        } else {
            debug!("not creating service account");
        }

        if let Some(role_name) = self.object_name(OBJECT_CLUSTER_ROLE)? {
            let role = rbac::build_cluster_role(role_name, cluster_role_rules());
            items.push(self.item(&role, BUILDITEM_CLUSTER_ROLE)?);
        } else {
            debug!("not creating cluster role");
        }

        if let Some(binding_name) = self.object_name(OBJECT_CLUSTER_ROLE_BINDING)? {
            let binding = rbac::build_cluster_role_binding(
                binding_name,
                self.object_names.require(OBJECT_CLUSTER_ROLE)?,
                self.object_names.require(OBJECT_SERVICE_ACCOUNT)?,
                &self.namespace,
            );
            items.push(self.item(&binding, BUILDITEM_CLUSTER_ROLE_BINDING)?);
        } else {
            debug!("not binding cluster role");
        }

        Ok(items)
    }

    fn internal_build_config(&self) -> Result<Vec<ObjectItem>> {
        let Some(config_text) = self.config_text()? else {
            debug!("no traefik config supplied, skipping config map");
            return Ok(Vec::new());
        };

        let config_map = ConfigMapBuilder::new()
            .metadata(
                ObjectMetaBuilder::new()
                    .name(self.object_names.require(OBJECT_CONFIG)?)
                    .namespace(&self.namespace)
                    .build(),
            )
            .add_data(config_file_name(self.config_format()?), config_text)
            .build();

        Ok(vec![self.item(&config_map, BUILDITEM_CONFIG)?])
    }

    fn internal_build_service(&self) -> Result<Vec<ObjectItem>> {
        let app = self.object_names.require(OBJECT_POD_LABEL_APP)?;
        let app_labels = BTreeMap::from([("app".to_owned(), app.to_owned())]);
        let ports = self.ports()?;

        let mut container = ContainerBuilder::new(CONTAINER_NAME);
        container
            .image(required(
                self.option_str("container.traefik2")?,
                "container.traefik2",
            )?)
            .args(self.option_str_list("config.traefik_args")?.unwrap_or_default());
        for port in &ports {
            container.add_container_port(&port.name, port.port_container);
        }

        let mut pod_metadata = ObjectMetaBuilder::new();
        pod_metadata.with_label("app", app);
        if let Some(annotations) = self.prometheus_annotations()?.into_option() {
            pod_metadata.with_annotations(annotations);
        }

        let mut pod = PodBuilder::new();
        pod.metadata(pod_metadata.build())
            .service_account_name_opt(self.object_name(OBJECT_SERVICE_ACCOUNT)?);

        if self.has_config()? {
            container.add_volume_mount(CONFIG_VOLUME_NAME, CONFIG_MOUNT_PATH);
            pod.add_volume(
                VolumeBuilder::new(CONFIG_VOLUME_NAME)
                    .with_config_map(self.object_names.require(OBJECT_CONFIG)?)
                    .build(),
            );
        }
        pod.add_container(container.build());

        let deployment = Deployment {
            metadata: ObjectMetaBuilder::new()
                .name(self.object_names.require(OBJECT_DEPLOYMENT)?)
                .namespace(&self.namespace)
                .with_label("app", app)
                .build(),
            spec: Some(DeploymentSpec {
                selector: LabelSelector {
                    match_labels: Some(app_labels.clone()),
                    ..LabelSelector::default()
                },
                template: pod.build_template(),
                ..DeploymentSpec::default()
            }),
            ..Deployment::default()
        };

        let service_ports = service_ports(&ports);
        let service = Service {
            metadata: ObjectMetaBuilder::new()
                .name(self.object_names.require(OBJECT_SERVICE)?)
                .namespace(&self.namespace)
                .build(),
            spec: Some(ServiceSpec {
                selector: Some(app_labels),
                ports: (!service_ports.is_empty()).then_some(service_ports),
                ..ServiceSpec::default()
            }),
            ..Service::default()
        };

        // Resources are copied verbatim, quantities included.
        let mut deployment = self.item(&deployment, BUILDITEM_DEPLOYMENT)?;
        if let Some(container) = deployment.data.pointer_mut(CONTAINER_POINTER) {
            container.merge(&Data::from_iter([(
                "resources",
                ConditionalValue::disabled_if_none(
                    self.option_mapping("kubernetes.resources.deployment")?
                        .map(Data::Mapping),
                ),
            )]));
        }

        Ok(vec![deployment, self.item(&service, BUILDITEM_SERVICE)?])
    }

    /// Scrape annotations for the pod template, enabled iff both
    /// `config.enable_prometheus` and `config.prometheus_annotation` are set.
    fn prometheus_annotations(&self) -> Result<ConditionalValue<BTreeMap<String, String>>> {
        let enabled = bool_option(self, "config.enable_prometheus")?
            && bool_option(self, "config.prometheus_annotation")?;
        let port = required(
            self.option_i64("config.prometheus_port")?,
            "config.prometheus_port",
        )?;

        let annotations = BTreeMap::from([
            ("prometheus.io/scrape".to_owned(), "true".to_owned()),
            ("prometheus.io/path".to_owned(), "/metrics".to_owned()),
            ("prometheus.io/port".to_owned(), port.to_string()),
        ]);
        Ok(ConditionalValue::new(annotations, enabled))
    }

    fn item<T: serde::Serialize>(&self, resource: &T, name: BuildItemName) -> Result<ObjectItem> {
        ObjectItem::from_resource(resource, name, SOURCE_NAME, &self.basename)
    }
}

impl OptionGetter for Traefik2Builder {
    fn option_get(&self, path: &str) -> Result<Option<OptionValue>> {
        self.options.options().resolve(&self.kubragen, path)
    }
}

impl Builder for Traefik2Builder {
    fn kubragen(&self) -> &KubraGen {
        &self.kubragen
    }

    fn source_name(&self) -> &str {
        SOURCE_NAME
    }

    fn basename(&self) -> &str {
        &self.basename
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn object_names(&self) -> &NameRegistry {
        &self.object_names
    }

    fn build_names(&self) -> Vec<BuildName> {
        vec![BUILD_CRD, BUILD_ACCESSCONTROL, BUILD_CONFIG, BUILD_SERVICE]
    }

    fn build_names_required(&self) -> Result<Vec<BuildName>> {
        let mut names = vec![BUILD_SERVICE];
        if bool_option(self, "config.create_traefik_crd")? {
            names.push(BUILD_CRD);
        }
        if create_service_account(self)? || create_roles(self)? {
            names.push(BUILD_ACCESSCONTROL);
        }
        if self.has_config()? {
            names.push(BUILD_CONFIG);
        }
        Ok(names)
    }

    fn builditem_names(&self) -> Vec<BuildItemName> {
        let mut names = vec![
            BUILDITEM_CLUSTER_ROLE,
            BUILDITEM_SERVICE_ACCOUNT,
            BUILDITEM_CLUSTER_ROLE_BINDING,
            BUILDITEM_CONFIG,
            BUILDITEM_DEPLOYMENT,
            BUILDITEM_SERVICE,
        ];
        names.extend(TRAEFIK_CRDS.iter().map(|crd| crd.name));
        names
    }

    fn internal_build(&self, buildname: &str) -> Result<Vec<ObjectItem>> {
        match buildname {
            BUILD_CRD => Ok(self.internal_build_crd()),
            BUILD_ACCESSCONTROL => self.internal_build_accesscontrol(),
            BUILD_CONFIG => self.internal_build_config(),
            BUILD_SERVICE => self.internal_build_service(),
            _ => InvalidBuildNameSnafu { name: buildname }.fail(),
        }
    }
}

/// The ClusterRole rules the Traefik Kubernetes providers need.
pub fn cluster_role_rules() -> Vec<PolicyRule> {
    const READ: &[&str] = &["get", "list", "watch"];

    vec![
        rbac::policy_rule(&[""], &["services", "endpoints", "secrets"], READ),
        rbac::policy_rule(
            &["extensions", "networking.k8s.io"],
            &["ingresses", "ingressclasses"],
            READ,
        ),
        rbac::policy_rule(&["extensions"], &["ingresses/status"], &["update"]),
        rbac::policy_rule(
            &["traefik.containo.us"],
            &[
                "middlewares",
                "ingressroutes",
                "traefikservices",
                "ingressroutetcps",
                "ingressrouteudps",
                "tlsoptions",
                "tlsstores",
            ],
            READ,
        ),
    ]
}

/// ConfigMap key the configuration is stored under.
pub fn config_file_name(format: ConfigFormat) -> &'static str {
    match format {
        ConfigFormat::Toml => "prometheus.toml",
        ConfigFormat::Yaml => "prometheus.yml",
    }
}

fn service_ports(ports: &[Traefik2OptionsPort]) -> Vec<ServicePort> {
    ports
        .iter()
        .filter(|port| port.in_service)
        .map(|port| ServicePort {
            name: Some(port.name.clone()),
            protocol: Some(port.protocol.clone()),
            port: port.service_port(),
            ..ServicePort::default()
        })
        .collect()
}

fn required<T>(value: Option<T>, path: &str) -> Result<T> {
    value.context(MissingRequiredOptionSnafu { path })
}

fn bool_option(options: &impl OptionGetter, path: &str) -> Result<bool> {
    required(options.option_bool(path)?, path)
}

fn create_service_account(options: &impl OptionGetter) -> Result<bool> {
    bool_option(options, "config.authorization.serviceaccount_create")
}

fn create_roles(options: &impl OptionGetter) -> Result<bool> {
    bool_option(options, "config.authorization.roles_create")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_names() {
        assert_eq!(config_file_name(ConfigFormat::Toml), "prometheus.toml");
        assert_eq!(config_file_name(ConfigFormat::Yaml), "prometheus.yml");
    }

    #[test]
    fn service_ports_skip_internal_ports() {
        let ports = vec![
            Traefik2OptionsPort::new("web", 8080).port_service(80),
            Traefik2OptionsPort::new("metrics", 9090).in_service(false),
            Traefik2OptionsPort::new("dns", 53).protocol("UDP"),
        ];

        let service_ports = service_ports(&ports);
        assert_eq!(service_ports.len(), 2);
        assert_eq!(service_ports[0].name.as_deref(), Some("web"));
        assert_eq!(service_ports[0].port, 80);
        assert_eq!(service_ports[1].protocol.as_deref(), Some("UDP"));
        assert_eq!(service_ports[1].port, 53);
    }
}
