use snafu::Snafu;

use crate::option::OptionKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Broad category of an [`Error`].
///
/// Every error aborts the generation run it was raised in; the category only
/// tells callers whether the options, the requested names or a format tag were
/// at fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum ErrorKind {
    Configuration,
    InvalidParameter,
    InvalidName,
    UnknownFormat,
    Render,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("unknown option {path:?}"))]
    UnknownOption { path: String },

    #[snafu(display("option {path:?} has type {found}, expected one of {expected:?}"))]
    InvalidOptionType {
        path: String,
        found: String,
        expected: Vec<OptionKind>,
    },

    #[snafu(display("option {path:?} is required but has no value and no default"))]
    MissingRequiredOption { path: String },

    #[snafu(display("option {path:?} points to option root {root:?}, which is not set"))]
    UnresolvedOptionRoot { path: String, root: String },

    #[snafu(display("option {path:?} has an invalid value: {reason}"))]
    InvalidOptionValue { path: String, reason: String },

    #[snafu(display("failed to convert option {path:?} into {target}"))]
    ConvertOption {
        source: serde_json::Error,
        path: String,
        target: &'static str,
    },

    #[snafu(display("invalid parameter: {message}"))]
    InvalidParam { message: String },

    #[snafu(display("invalid build name {name:?}"))]
    InvalidBuildName { name: String },

    #[snafu(display("builder {source_name:?} produced undeclared build item {name:?}"))]
    InvalidBuildItemName { name: String, source_name: String },

    #[snafu(display("unknown object name {name:?}"))]
    UnknownObjectName { name: String },

    #[snafu(display("unknown config file format {format:?}"))]
    UnknownFormat { format: String },

    #[snafu(display("failed to serialize object {name:?}"))]
    SerializeObject {
        source: serde_json::Error,
        name: String,
    },

    #[snafu(display("failed to render TOML"))]
    RenderToml { source: toml::ser::Error },

    #[snafu(display("failed to render YAML"))]
    RenderYaml { source: serde_yaml::Error },

    #[snafu(display("failed to parse YAML document"))]
    ParseYaml { source: serde_yaml::Error },

    #[snafu(display("failed to write YAML document"))]
    WriteDocument { source: std::io::Error },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownOption { .. }
            | Self::InvalidOptionType { .. }
            | Self::MissingRequiredOption { .. }
            | Self::UnresolvedOptionRoot { .. }
            | Self::InvalidOptionValue { .. }
            | Self::ConvertOption { .. } => ErrorKind::Configuration,
            Self::InvalidParam { .. } => ErrorKind::InvalidParameter,
            Self::InvalidBuildName { .. }
            | Self::InvalidBuildItemName { .. }
            | Self::UnknownObjectName { .. } => ErrorKind::InvalidName,
            Self::UnknownFormat { .. } => ErrorKind::UnknownFormat,
            Self::SerializeObject { .. }
            | Self::RenderToml { .. }
            | Self::RenderYaml { .. }
            | Self::ParseYaml { .. }
            | Self::WriteDocument { .. } => ErrorKind::Render,
        }
    }
}
