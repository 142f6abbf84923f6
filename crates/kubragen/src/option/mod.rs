//! Option schemas, option instances and path based resolution.
//!
//! A builder declares its options as an [`OptionSchema`]: a tree of
//! [`OptionDef`] leaves carrying a default value, a required flag and the
//! allowed [`OptionKind`]s. Callers supply a sparse [`Options`] instance on
//! top of it. Resolving a dotted path (`config.authorization.roles_bind`)
//! yields, in this order:
//!
//! 1. the explicit value, following an [`OptionRoot`] alias into the
//!    project-wide options of the [`KubraGen`] context, validated against the
//!    allowed kinds,
//! 2. a copy of the schema default,
//! 3. an error if the option is required,
//! 4. [`None`], the absent marker.
//!
//! An explicit [`Data::Null`] counts as "not supplied".
use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use snafu::{OptionExt, ResultExt};
use tracing::trace;

use crate::{
    KubraGen,
    configfile::ConfigFile,
    data::{Data, Mapping},
    error::{
        ConvertOptionSnafu, InvalidOptionTypeSnafu, InvalidOptionValueSnafu,
        MissingRequiredOptionSnafu, Result, UnknownOptionSnafu,
    },
};

mod schema;

pub use schema::{OptionDef, OptionKind, OptionSchema, SchemaNode};

/// An alias to a path in the project-wide options of a [`KubraGen`] context.
///
/// Lets several builders share a value (for example a namespace) that is
/// declared once:
///
/// ```
/// use kubragen::{
///     KubraGen,
///     data::Data,
///     option::{
///         OptionDef, OptionGetter, OptionKind, OptionResolver, OptionRoot, OptionSchema, Options,
///     },
/// };
///
/// let kubragen = KubraGen::new(
///     Options::schemaless()
///         .with("namespaces", Data::from_iter([("mon", "app-monitoring")]))
///         .unwrap(),
/// );
/// let options = Options::new(
///     OptionSchema::new().leaf(
///         "namespace",
///         OptionDef::new([OptionKind::Str]).default_value("default"),
///     ),
/// )
/// .with("namespace", OptionRoot::new("namespaces.mon"))
/// .unwrap();
///
/// let resolver = OptionResolver::new(&kubragen, &options);
/// assert_eq!(resolver.option_str("namespace").unwrap().as_deref(), Some("app-monitoring"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionRoot(String);

impl OptionRoot {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &str {
        &self.0
    }
}

/// A value supplied for an option.
#[derive(Clone)]
pub enum OptionValue {
    Data(Data),
    ConfigFile(Arc<dyn ConfigFile>),
    Root(OptionRoot),
}

impl OptionValue {
    pub fn kind(&self) -> Option<OptionKind> {
        match self {
            Self::Data(data) => OptionKind::of(data),
            Self::ConfigFile(_) => Some(OptionKind::ConfigFile),
            Self::Root(_) => None,
        }
    }

    /// Human readable kind, used in error messages.
    pub fn kind_name(&self) -> String {
        match (self, self.kind()) {
            (_, Some(kind)) => kind.to_string(),
            (Self::Root(root), None) => format!("OptionRoot({})", root.path()),
            (_, None) => "Null".to_owned(),
        }
    }

    pub fn as_data(&self) -> Option<&Data> {
        match self {
            Self::Data(data) => Some(data),
            _ => None,
        }
    }

    fn is_unset(&self) -> bool {
        matches!(self, Self::Data(Data::Null | Data::Omitted))
    }
}

impl fmt::Debug for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(data) => f.debug_tuple("Data").field(data).finish(),
            Self::ConfigFile(config_file) => {
                f.debug_tuple("ConfigFile").field(config_file).finish()
            }
            Self::Root(root) => f.debug_tuple("Root").field(root).finish(),
        }
    }
}

macro_rules! option_value_from_data {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for OptionValue {
                fn from(value: $ty) -> Self {
                    Self::Data(value.into())
                }
            }
        )*
    };
}

option_value_from_data!(Data, Mapping, bool, i32, i64, u16, &str, String);

impl<T: Into<Data>> From<Vec<T>> for OptionValue {
    fn from(value: Vec<T>) -> Self {
        Self::Data(value.into())
    }
}

impl From<OptionRoot> for OptionValue {
    fn from(value: OptionRoot) -> Self {
        Self::Root(value)
    }
}

impl From<Arc<dyn ConfigFile>> for OptionValue {
    fn from(value: Arc<dyn ConfigFile>) -> Self {
        Self::ConfigFile(value)
    }
}

/// A sparse set of option values, optionally checked against a schema.
///
/// Project-wide options (the ones [`OptionRoot`] aliases point into) are
/// schemaless: any path may be set, and lookups walk into nested mappings.
#[derive(Clone, Debug, Default)]
pub struct Options {
    schema: Option<OptionSchema>,
    values: IndexMap<String, OptionValue>,
}

impl Options {
    pub fn new(schema: OptionSchema) -> Self {
        Self {
            schema: Some(schema),
            values: IndexMap::new(),
        }
    }

    pub fn schemaless() -> Self {
        Self::default()
    }

    pub fn schema(&self) -> Option<&OptionSchema> {
        self.schema.as_ref()
    }

    /// Sets the value at `path`.
    ///
    /// With a schema, `path` must name a leaf, or an option group together
    /// with a mapping that is then applied entry by entry.
    pub fn set(&mut self, path: &str, value: impl Into<OptionValue>) -> Result<()> {
        let value = value.into();
        let Some(schema) = &self.schema else {
            self.values.insert(path.to_owned(), value);
            return Ok(());
        };

        let is_group = match schema.node(path).context(UnknownOptionSnafu { path })? {
            SchemaNode::Leaf(_) => false,
            SchemaNode::Tree(_) => true,
        };
        if !is_group {
            self.values.insert(path.to_owned(), value);
            return Ok(());
        }

        match value {
            OptionValue::Data(Data::Mapping(entries)) => {
                for (name, entry) in entries {
                    self.set(&format!("{path}.{name}"), entry)?;
                }
                Ok(())
            }
            other => InvalidOptionValueSnafu {
                path,
                reason: format!("option group needs a mapping, got {}", other.kind_name()),
            }
            .fail(),
        }
    }

    /// Builder style version of [`Self::set`].
    pub fn with(mut self, path: &str, value: impl Into<OptionValue>) -> Result<Self> {
        self.set(path, value)?;
        Ok(self)
    }

    /// Overlays a nested mapping (for example loaded from a YAML file) onto
    /// these options.
    pub fn merge_data(&mut self, data: &Data) -> Result<()> {
        let entries = data.as_mapping().context(InvalidOptionValueSnafu {
            path: "",
            reason: "options must be a mapping",
        })?;
        for (name, value) in entries {
            self.set(name, value.clone())?;
        }
        Ok(())
    }

    /// Returns the explicitly supplied value at `path`, without defaults.
    pub fn get(&self, path: &str) -> Option<OptionValue> {
        if let Some(value) = self.values.get(path) {
            return Some(value.clone());
        }
        if self.schema.is_some() {
            return None;
        }

        // Schemaless: walk into a mapping stored at a shorter prefix
        let segments: Vec<&str> = path.split('.').collect();
        (1..segments.len()).rev().find_map(|split| {
            let data = self.values.get(&segments[..split].join("."))?.as_data()?;
            segments[split..]
                .iter()
                .try_fold(data, |data, segment| data.get(segment))
                .map(|data| OptionValue::Data(data.clone()))
        })
    }

    /// Resolves `path` as described in the [module documentation](self).
    pub fn resolve(&self, kubragen: &KubraGen, path: &str) -> Result<Option<OptionValue>> {
        let Some(schema) = &self.schema else {
            return Ok(self.get(path).filter(|value| !value.is_unset()));
        };
        let def = schema.lookup(path).context(UnknownOptionSnafu { path })?;

        let explicit = match self.get(path) {
            Some(OptionValue::Root(root)) => Some(kubragen.resolve_root(path, &root)?),
            other => other,
        };

        match explicit.filter(|value| !value.is_unset()) {
            Some(value) => {
                let accepted = value.kind().is_some_and(|kind| def.accepts(kind));
                if !accepted {
                    return InvalidOptionTypeSnafu {
                        path,
                        found: value.kind_name(),
                        expected: def.allowed_types().to_vec(),
                    }
                    .fail();
                }
                Ok(Some(value))
            }
            None => match def.get_default() {
                Some(default) => {
                    trace!(path, "option not supplied, using default");
                    Ok(Some(OptionValue::Data(default.clone())))
                }
                None if def.is_required() => MissingRequiredOptionSnafu { path }.fail(),
                None => Ok(None),
            },
        }
    }
}

/// Typed access to resolved options.
///
/// Implementors only provide [`Self::option_get`]; the typed accessors fail
/// with a configuration error when the resolved value has a different type.
pub trait OptionGetter {
    fn option_get(&self, path: &str) -> Result<Option<OptionValue>>;

    fn option_data(&self, path: &str) -> Result<Option<Data>> {
        match self.option_get(path)? {
            None => Ok(None),
            Some(OptionValue::Data(data)) => Ok(Some(data)),
            Some(other) => mismatch(path, &other, OptionKind::Mapping),
        }
    }

    fn option_str(&self, path: &str) -> Result<Option<String>> {
        match self.option_data(path)? {
            None => Ok(None),
            Some(Data::String(value)) => Ok(Some(value)),
            Some(other) => mismatch(path, &OptionValue::Data(other), OptionKind::Str),
        }
    }

    fn option_bool(&self, path: &str) -> Result<Option<bool>> {
        match self.option_data(path)? {
            None => Ok(None),
            Some(Data::Bool(value)) => Ok(Some(value)),
            Some(other) => mismatch(path, &OptionValue::Data(other), OptionKind::Bool),
        }
    }

    fn option_i64(&self, path: &str) -> Result<Option<i64>> {
        match self.option_data(path)? {
            None => Ok(None),
            Some(Data::Int(value)) => Ok(Some(value)),
            Some(other) => mismatch(path, &OptionValue::Data(other), OptionKind::Int),
        }
    }

    fn option_sequence(&self, path: &str) -> Result<Option<Vec<Data>>> {
        match self.option_data(path)? {
            None => Ok(None),
            Some(Data::Sequence(items)) => Ok(Some(items)),
            Some(other) => mismatch(path, &OptionValue::Data(other), OptionKind::Sequence),
        }
    }

    fn option_mapping(&self, path: &str) -> Result<Option<Mapping>> {
        match self.option_data(path)? {
            None => Ok(None),
            Some(Data::Mapping(entries)) => Ok(Some(entries)),
            Some(other) => mismatch(path, &OptionValue::Data(other), OptionKind::Mapping),
        }
    }

    /// A sequence of strings, e.g. container arguments.
    fn option_str_list(&self, path: &str) -> Result<Option<Vec<String>>> {
        let Some(items) = self.option_sequence(path)? else {
            return Ok(None);
        };
        items
            .into_iter()
            .map(|item| match item {
                Data::String(value) => Ok(value),
                other => mismatch(path, &OptionValue::Data(other), OptionKind::Str),
            })
            .collect::<Result<_>>()
            .map(Some)
    }

    /// Deserializes the resolved value into a typed structure, e.g. a
    /// `ResourceRequirements`.
    fn option_typed<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Option<T>>
    where
        Self: Sized,
    {
        self.option_data(path)?
            .map(|data| {
                data.deserialize_into().context(ConvertOptionSnafu {
                    path,
                    target: std::any::type_name::<T>(),
                })
            })
            .transpose()
    }
}

fn mismatch<T>(path: &str, value: &OptionValue, expected: OptionKind) -> Result<T> {
    InvalidOptionTypeSnafu {
        path,
        found: value.kind_name(),
        expected: vec![expected],
    }
    .fail()
}

/// Resolves an [`Options`] instance against a [`KubraGen`] context.
#[derive(Clone, Copy, Debug)]
pub struct OptionResolver<'a> {
    kubragen: &'a KubraGen,
    options: &'a Options,
}

impl<'a> OptionResolver<'a> {
    pub fn new(kubragen: &'a KubraGen, options: &'a Options) -> Self {
        Self { kubragen, options }
    }
}

impl OptionGetter for OptionResolver<'_> {
    fn option_get(&self, path: &str) -> Result<Option<OptionValue>> {
        self.options.resolve(self.kubragen, path)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::error::{Error, ErrorKind};

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .leaf(
                "basename",
                OptionDef::new([OptionKind::Str])
                    .required()
                    .default_value("traefik2"),
            )
            .leaf(
                "namespace",
                OptionDef::new([OptionKind::Str])
                    .required()
                    .default_value("default"),
            )
            .leaf("token", OptionDef::new([OptionKind::Str]).required())
            .tree(
                "config",
                OptionSchema::new()
                    .leaf("serviceaccount_use", OptionDef::new([OptionKind::Str]))
                    .leaf(
                        "enabled",
                        OptionDef::new([OptionKind::Bool]).default_value(true),
                    )
                    .leaf("ports", OptionDef::new([OptionKind::Sequence])),
            )
    }

    #[test]
    fn explicit_value_wins() {
        let kubragen = KubraGen::default();
        let options = Options::new(schema())
            .with("basename", "mytraefik2")
            .unwrap();
        let resolver = OptionResolver::new(&kubragen, &options);

        assert_eq!(
            resolver.option_str("basename").unwrap().as_deref(),
            Some("mytraefik2")
        );
        assert_eq!(
            resolver.option_str("namespace").unwrap().as_deref(),
            Some("default")
        );
    }

    #[test]
    fn explicit_falsy_value_is_not_absent() {
        let kubragen = KubraGen::default();
        let options = Options::new(schema())
            .with("config.enabled", false)
            .unwrap();
        let resolver = OptionResolver::new(&kubragen, &options);

        assert_eq!(resolver.option_bool("config.enabled").unwrap(), Some(false));
    }

    #[test]
    fn absent_without_default() {
        let kubragen = KubraGen::default();
        let options = Options::new(schema());
        let resolver = OptionResolver::new(&kubragen, &options);

        assert!(resolver.option_get("config.serviceaccount_use").unwrap().is_none());
        assert!(resolver.option_get("config.ports").unwrap().is_none());
    }

    #[test]
    fn explicit_null_falls_back_to_default() {
        let kubragen = KubraGen::default();
        let options = Options::new(schema()).with("basename", Data::Null).unwrap();
        let resolver = OptionResolver::new(&kubragen, &options);

        assert_eq!(
            resolver.option_str("basename").unwrap().as_deref(),
            Some("traefik2")
        );
    }

    #[rstest]
    #[case("unknown")]
    #[case("config")]
    #[case("config.enabled.deeper")]
    fn unknown_path(#[case] path: &str) {
        let kubragen = KubraGen::default();
        let options = Options::new(schema());
        let err = options.resolve(&kubragen, path).unwrap_err();
        assert!(matches!(err, Error::UnknownOption { .. }), "{err}");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn missing_required() {
        let kubragen = KubraGen::default();
        let err = Options::new(schema())
            .resolve(&kubragen, "token")
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredOption { ref path } if path == "token"));
    }

    #[rstest]
    #[case("basename", Data::from(10))]
    #[case("config.enabled", Data::from("yes"))]
    #[case("config.ports", Data::mapping())]
    fn type_mismatch(#[case] path: &str, #[case] value: Data) {
        let kubragen = KubraGen::default();
        let options = Options::new(schema()).with(path, value).unwrap();
        let err = options.resolve(&kubragen, path).unwrap_err();
        assert!(matches!(err, Error::InvalidOptionType { .. }), "{err}");
    }

    #[test]
    fn set_unknown_path_fails() {
        let err = Options::new(schema()).with("nope", 1).unwrap_err();
        assert!(matches!(err, Error::UnknownOption { .. }));
    }

    #[test]
    fn set_group_with_mapping() {
        let kubragen = KubraGen::default();
        let options = Options::new(schema())
            .with(
                "config",
                Data::from_iter([
                    ("enabled", Data::from(false)),
                    ("serviceaccount_use", Data::from("sa")),
                ]),
            )
            .unwrap();
        let resolver = OptionResolver::new(&kubragen, &options);

        assert_eq!(resolver.option_bool("config.enabled").unwrap(), Some(false));
        assert_eq!(
            resolver.option_str("config.serviceaccount_use").unwrap().as_deref(),
            Some("sa")
        );
    }

    #[test]
    fn option_root_resolves_through_project_options() {
        let kubragen = KubraGen::new(
            Options::schemaless()
                .with("namespaces", Data::from_iter([("mon", "app-monitoring")]))
                .unwrap(),
        );
        let options = Options::new(schema())
            .with("namespace", OptionRoot::new("namespaces.mon"))
            .unwrap();

        assert_eq!(
            OptionResolver::new(&kubragen, &options)
                .option_str("namespace")
                .unwrap()
                .as_deref(),
            Some("app-monitoring")
        );
    }

    #[test]
    fn option_root_missing_target() {
        let options = Options::new(schema())
            .with("namespace", OptionRoot::new("namespaces.mon"))
            .unwrap();
        let err = options
            .resolve(&KubraGen::default(), "namespace")
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedOptionRoot { .. }), "{err}");
    }

    #[test]
    fn option_root_target_is_type_checked() {
        let kubragen = KubraGen::new(Options::schemaless().with("shared.count", 3).unwrap());
        let options = Options::new(schema())
            .with("basename", OptionRoot::new("shared.count"))
            .unwrap();
        let err = options.resolve(&kubragen, "basename").unwrap_err();
        assert!(matches!(err, Error::InvalidOptionType { .. }), "{err}");
    }

    #[test]
    fn typed_conversion() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Port {
            name: String,
        }

        let kubragen = KubraGen::default();
        let options = Options::new(schema())
            .with("config.ports", Data::from(vec![Data::from_iter([("name", "web")])]))
            .unwrap();
        let ports: Option<Vec<Port>> = OptionResolver::new(&kubragen, &options)
            .option_typed("config.ports")
            .unwrap();
        assert_eq!(
            ports,
            Some(vec![Port {
                name: "web".to_owned()
            }])
        );
    }
}
