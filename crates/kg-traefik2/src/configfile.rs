use std::sync::Arc;

use kubragen::{
    Result,
    builder::Builder,
    configfile::{ConfigFile, ConfigFileExtension, apply_extensions},
    data::Data,
    option::{
        OptionDef, OptionGetter, OptionKind, OptionResolver, OptionSchema, OptionValue, Options,
    },
};
use tracing::debug;

/// Traefik 2 static configuration, rendered as TOML or YAML by the builder.
///
/// Starts from a baseline that disables the version check and anonymous usage
/// reports, lets every extension amend it and finally deep merges the
/// `config.merge_config` option into it.
#[derive(Clone, Debug)]
pub struct Traefik2ConfigFile {
    options: Options,
    extensions: Vec<Arc<dyn ConfigFileExtension>>,
}

impl Traefik2ConfigFile {
    pub fn new() -> Self {
        Self {
            options: Options::new(Self::schema()),
            extensions: Vec::new(),
        }
    }

    pub fn schema() -> OptionSchema {
        OptionSchema::new().tree(
            "config",
            OptionSchema::new().leaf("merge_config", OptionDef::new([OptionKind::Mapping])),
        )
    }

    /// Sets a config file option, e.g. `config.merge_config`.
    pub fn with_option(mut self, path: &str, value: impl Into<OptionValue>) -> Result<Self> {
        self.options.set(path, value)?;
        Ok(self)
    }

    pub fn with_extension(mut self, extension: impl ConfigFileExtension + 'static) -> Self {
        self.extensions.push(Arc::new(extension));
        self
    }

    /// The configuration every file starts from.
    pub fn baseline() -> Data {
        Data::from_iter([(
            "global",
            Data::from_iter([("checkNewVersion", false), ("sendAnonymousUsage", false)]),
        )])
    }
}

impl Default for Traefik2ConfigFile {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigFile for Traefik2ConfigFile {
    fn get_value(&self, builder: &dyn Builder) -> Result<Data> {
        let mut data = Self::baseline();
        apply_extensions(&self.extensions, builder, &mut data)?;

        let resolver = OptionResolver::new(builder.kubragen(), &self.options);
        if let Some(merge_config) = resolver.option_mapping("config.merge_config")? {
            debug!(source = builder.source_name(), "merging user supplied config");
            data.merge(&Data::Mapping(merge_config));
        }
        Ok(data)
    }
}

impl From<Traefik2ConfigFile> for OptionValue {
    fn from(config_file: Traefik2ConfigFile) -> Self {
        Self::ConfigFile(Arc::new(config_file))
    }
}
