//! The registry mapping logical object roles to the names they are
//! generated with.
use std::collections::BTreeMap;

use snafu::OptionExt;

use crate::error::{InvalidParamSnafu, Result, UnknownObjectNameSnafu};

/// Logical object name (`service-account`) → concrete name, or [`None`] if the
/// object is not created by this builder.
///
/// The registry is filled once while a builder is constructed and is never
/// changed afterwards, so build groups can rely on the names and on their
/// mutual consistency.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameRegistry {
    names: BTreeMap<String, Option<String>>,
}

impl NameRegistry {
    /// Returns the concrete name for `name`.
    ///
    /// Fails for names the registry does not know about; returns `Ok(None)`
    /// for objects that are not being created.
    pub fn get(&self, name: &str) -> Result<Option<&str>> {
        self.names
            .get(name)
            .map(Option::as_deref)
            .context(UnknownObjectNameSnafu { name })
    }

    /// Returns the concrete name for `name`, failing if the object is not
    /// being created. Use this whenever an object references another one.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name)?.context(InvalidParamSnafu {
            message: format!("object {name:?} is required but is not being created"),
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, Option<V>)> for NameRegistry {
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.map(Into::into)))
                .collect(),
        }
    }
}
