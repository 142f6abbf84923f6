//! Options of the Traefik 2 builder.
//!
//! | option                                        | allowed types      | default            |
//! |-----------------------------------------------|--------------------|--------------------|
//! | `basename`                                    | str                | `traefik2`         |
//! | `namespace`                                   | str                | `default`          |
//! | `config.traefik_config`                       | str, ConfigFile    |                    |
//! | `config.config_format`                        | str (`toml`/`yaml`)| `toml`             |
//! | `config.traefik_args`                         | sequence           | web + metrics args |
//! | `config.ports`                                | sequence of ports  | `web`, `metrics`   |
//! | `config.create_traefik_crd`                   | bool               | `true`             |
//! | `config.enable_prometheus`                    | bool               | `true`             |
//! | `config.prometheus_port`                      | int                | `9090`             |
//! | `config.prometheus_annotation`                | bool               | `false`            |
//! | `config.authorization.serviceaccount_create`  | bool               | `true`             |
//! | `config.authorization.serviceaccount_use`     | str                |                    |
//! | `config.authorization.roles_create`           | bool               | `true`             |
//! | `config.authorization.roles_bind`             | bool               | `true`             |
//! | `container.traefik2`                          | str                | `traefik:v2.2`     |
//! | `kubernetes.resources.deployment`             | mapping            |                    |
use kubragen::{
    Result,
    configfile::ConfigFormat,
    data::{ConditionalValue, Data},
    option::{OptionDef, OptionKind, OptionSchema, OptionValue, Options},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASENAME: &str = "traefik2";
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_IMAGE: &str = "traefik:v2.2";
pub const DEFAULT_PROMETHEUS_PORT: i32 = 9090;

pub const DEFAULT_TRAEFIK_ARGS: &[&str] = &[
    "--entrypoints.web.Address=:80",
    "--entryPoints.metrics.address=:9090",
    "--metrics.prometheus=true",
    "--metrics.prometheus.entryPoint=metrics",
];

/// A port of the Traefik container, optionally exposed by the Service.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Traefik2OptionsPort {
    pub name: String,
    pub port_container: i32,

    /// IP protocol, `TCP` or `UDP`.
    #[serde(default = "Traefik2OptionsPort::default_protocol")]
    pub protocol: String,

    /// Whether the port is also part of the Service.
    #[serde(default = "Traefik2OptionsPort::default_in_service")]
    pub in_service: bool,

    /// Port number on the Service, defaults to [`Self::port_container`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_service: Option<i32>,
}

impl Traefik2OptionsPort {
    pub fn new(name: impl Into<String>, port_container: i32) -> Self {
        Self {
            name: name.into(),
            port_container,
            protocol: Self::default_protocol(),
            in_service: Self::default_in_service(),
            port_service: None,
        }
    }

    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn in_service(mut self, in_service: bool) -> Self {
        self.in_service = in_service;
        self
    }

    pub fn port_service(mut self, port_service: i32) -> Self {
        self.port_service = Some(port_service);
        self
    }

    /// The port number the Service exposes.
    pub fn service_port(&self) -> i32 {
        self.port_service.unwrap_or(self.port_container)
    }

    fn default_protocol() -> String {
        "TCP".to_owned()
    }

    fn default_in_service() -> bool {
        true
    }
}

impl From<Traefik2OptionsPort> for Data {
    fn from(port: Traefik2OptionsPort) -> Self {
        Self::from_iter([
            ("name", Self::from(port.name)),
            ("port_container", Self::from(port.port_container)),
            ("protocol", Self::from(port.protocol)),
            ("in_service", Self::from(port.in_service)),
            (
                "port_service",
                ConditionalValue::disabled_if_none(port.port_service).into(),
            ),
        ])
    }
}

pub fn default_ports() -> Vec<Traefik2OptionsPort> {
    vec![
        Traefik2OptionsPort::new("web", 80).port_service(80),
        Traefik2OptionsPort::new("metrics", DEFAULT_PROMETHEUS_PORT).in_service(false),
    ]
}

/// Options for the Traefik 2 builder, see the [module documentation](self).
#[derive(Clone, Debug)]
pub struct Traefik2Options(Options);

impl Traefik2Options {
    pub fn new() -> Self {
        Self(Options::new(Self::schema()))
    }

    /// Options from a nested mapping, for example loaded from a YAML file.
    pub fn from_data(data: &Data) -> Result<Self> {
        let mut options = Self::new();
        options.0.merge_data(data)?;
        Ok(options)
    }

    pub fn set(&mut self, path: &str, value: impl Into<OptionValue>) -> Result<()> {
        self.0.set(path, value)
    }

    pub fn with(mut self, path: &str, value: impl Into<OptionValue>) -> Result<Self> {
        self.set(path, value)?;
        Ok(self)
    }

    pub fn merge_data(&mut self, data: &Data) -> Result<()> {
        self.0.merge_data(data)
    }

    pub fn options(&self) -> &Options {
        &self.0
    }

    pub fn schema() -> OptionSchema {
        use OptionKind::{Bool, ConfigFile, Int, Mapping, Sequence, Str};

        OptionSchema::new()
            .leaf(
                "basename",
                OptionDef::new([Str])
                    .required()
                    .default_value(DEFAULT_BASENAME),
            )
            .leaf(
                "namespace",
                OptionDef::new([Str])
                    .required()
                    .default_value(DEFAULT_NAMESPACE),
            )
            .tree(
                "config",
                OptionSchema::new()
                    .leaf("traefik_config", OptionDef::new([Str, ConfigFile]))
                    .leaf(
                        "config_format",
                        OptionDef::new([Str]).default_value(ConfigFormat::Toml.to_string()),
                    )
                    .leaf(
                        "traefik_args",
                        OptionDef::new([Sequence])
                            .required()
                            .default_value(DEFAULT_TRAEFIK_ARGS.to_vec()),
                    )
                    .leaf(
                        "ports",
                        OptionDef::new([Sequence])
                            .required()
                            .default_value(default_ports()),
                    )
                    .leaf(
                        "create_traefik_crd",
                        OptionDef::new([Bool]).required().default_value(true),
                    )
                    .leaf(
                        "enable_prometheus",
                        OptionDef::new([Bool]).required().default_value(true),
                    )
                    .leaf(
                        "prometheus_port",
                        OptionDef::new([Int])
                            .required()
                            .default_value(DEFAULT_PROMETHEUS_PORT),
                    )
                    .leaf(
                        "prometheus_annotation",
                        OptionDef::new([Bool]).required().default_value(false),
                    )
                    .tree(
                        "authorization",
                        OptionSchema::new()
                            .leaf(
                                "serviceaccount_create",
                                OptionDef::new([Bool]).required().default_value(true),
                            )
                            .leaf("serviceaccount_use", OptionDef::new([Str]))
                            .leaf(
                                "roles_create",
                                OptionDef::new([Bool]).required().default_value(true),
                            )
                            .leaf(
                                "roles_bind",
                                OptionDef::new([Bool]).required().default_value(true),
                            ),
                    ),
            )
            .tree(
                "container",
                OptionSchema::new().leaf(
                    "traefik2",
                    OptionDef::new([Str]).required().default_value(DEFAULT_IMAGE),
                ),
            )
            .tree(
                "kubernetes",
                OptionSchema::new().tree(
                    "resources",
                    OptionSchema::new().leaf("deployment", OptionDef::new([Mapping])),
                ),
            )
    }
}

impl Default for Traefik2Options {
    fn default() -> Self {
        Self::new()
    }
}
