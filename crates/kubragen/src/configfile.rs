//! Configuration files generated as part of a build.
//!
//! A builder option may hold either literal configuration text or a
//! [`ConfigFile`] template. Templates produce a [`Data`] mapping at build time
//! (they get the builder as context, so they can use object names and the
//! namespace), which is then rendered by a [`Renderer`] in the selected
//! [`ConfigFormat`].
use std::{fmt, str::FromStr, sync::Arc};

use snafu::ResultExt;
use tracing::debug;

use crate::{
    builder::Builder,
    data::Data,
    error::{
        InvalidOptionValueSnafu, RenderTomlSnafu, RenderYamlSnafu, Result, UnknownFormatSnafu,
    },
    option::OptionValue,
};

/// Serialization format of a rendered configuration file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ConfigFormat {
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Parses a format tag (`toml`, `yaml`), failing with an unknown format
    /// error instead of falling back to a default.
    pub fn parse(format: &str) -> Result<Self> {
        Self::from_str(format)
            .ok()
            .ok_or_else(|| UnknownFormatSnafu { format }.build())
    }
}

/// A configuration file template.
pub trait ConfigFile: fmt::Debug + Send + Sync {
    /// Produces the configuration as a nested mapping.
    fn get_value(&self, builder: &dyn Builder) -> Result<Data>;
}

/// A hook that amends the data of an extensible configuration file.
pub trait ConfigFileExtension: fmt::Debug + Send + Sync {
    fn process(&self, builder: &dyn Builder, data: &mut Data) -> Result<()>;
}

/// Runs every extension over `data`, in order.
pub fn apply_extensions(
    extensions: &[Arc<dyn ConfigFileExtension>],
    builder: &dyn Builder,
    data: &mut Data,
) -> Result<()> {
    for extension in extensions {
        debug!(?extension, "applying config file extension");
        extension.process(builder, data)?;
    }
    Ok(())
}

/// Extension that deep merges a fixed mapping into the configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct MergeExtension(pub Data);

impl ConfigFileExtension for MergeExtension {
    fn process(&self, _builder: &dyn Builder, data: &mut Data) -> Result<()> {
        data.merge(&self.0);
        Ok(())
    }
}

/// Serializes a configuration mapping into text.
pub trait Renderer {
    fn render(&self, format: ConfigFormat, data: &Data) -> Result<String>;
}

/// Renders TOML with the `toml` crate and YAML with `serde_yaml`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MultiFormatRenderer;

impl Renderer for MultiFormatRenderer {
    fn render(&self, format: ConfigFormat, data: &Data) -> Result<String> {
        let data = data.clone().pruned();
        match format {
            ConfigFormat::Toml => {
                let mut data = data;
                data.remove_nulls();
                toml::to_string(&data).context(RenderTomlSnafu)
            }
            ConfigFormat::Yaml => serde_yaml::to_string(&data).context(RenderYamlSnafu),
        }
    }
}

/// Turns the value of a config file option into text.
///
/// Strings are used verbatim, [`ConfigFile`] templates are evaluated with
/// `builder` as context and rendered in `format`.
pub fn render_option(
    path: &str,
    value: &OptionValue,
    builder: &dyn Builder,
    format: ConfigFormat,
    renderer: &dyn Renderer,
) -> Result<String> {
    match value {
        OptionValue::Data(Data::String(text)) => Ok(text.clone()),
        OptionValue::ConfigFile(config_file) => {
            let data = config_file.get_value(builder)?;
            renderer.render(format, &data)
        }
        other => InvalidOptionValueSnafu {
            path,
            reason: format!(
                "expected configuration text or a config file template, got {}",
                other.kind_name()
            ),
        }
        .fail(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::error::{Error, ErrorKind};

    fn config() -> Data {
        Data::from_iter([
            (
                "global",
                Data::from_iter([("checkNewVersion", false), ("sendAnonymousUsage", false)]),
            ),
            (
                "entryPoints",
                Data::from_iter([("web", Data::from_iter([("address", ":80")]))]),
            ),
        ])
    }

    #[rstest]
    #[case("toml", ConfigFormat::Toml)]
    #[case("yaml", ConfigFormat::Yaml)]
    fn parse_format(#[case] tag: &str, #[case] expected: ConfigFormat) {
        assert_eq!(ConfigFormat::parse(tag).unwrap(), expected);
        assert_eq!(expected.to_string(), tag);
    }

    #[rstest]
    #[case("json")]
    #[case("yml")]
    #[case("")]
    fn unknown_format(#[case] tag: &str) {
        let err = ConfigFormat::parse(tag).unwrap_err();
        assert!(matches!(err, Error::UnknownFormat { .. }));
        assert_eq!(err.kind(), ErrorKind::UnknownFormat);
    }

    #[test]
    fn render_toml() {
        let text = MultiFormatRenderer
            .render(ConfigFormat::Toml, &config())
            .unwrap();
        let parsed: toml::Value = toml::from_str(&text).unwrap();
        assert_eq!(
            parsed["global"]["sendAnonymousUsage"],
            toml::Value::Boolean(false)
        );
        assert_eq!(
            parsed["entryPoints"]["web"]["address"],
            toml::Value::String(":80".to_owned())
        );
    }

    #[test]
    fn render_toml_leaves_out_null_keys() {
        let mut data = config();
        data.merge(&Data::from_iter([(
            "log",
            Data::from_iter([("level", Data::Null), ("format", Data::from("json"))]),
        )]));

        let text = MultiFormatRenderer.render(ConfigFormat::Toml, &data).unwrap();
        let parsed: toml::Value = toml::from_str(&text).unwrap();
        assert_eq!(
            parsed["log"]["format"],
            toml::Value::String("json".to_owned())
        );
        assert!(parsed["log"].get("level").is_none());
    }

    #[test]
    fn render_yaml() {
        let text = MultiFormatRenderer
            .render(ConfigFormat::Yaml, &config())
            .unwrap();
        let parsed: Data = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed, config());
    }
}
