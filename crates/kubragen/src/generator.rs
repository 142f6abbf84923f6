use snafu::OptionExt;

use crate::{
    error::{InvalidOptionValueSnafu, Result, UnresolvedOptionRootSnafu},
    option::{OptionGetter, OptionRoot, OptionValue, Options},
};

/// Project-wide generator context shared by every builder of a run.
///
/// Holds the schemaless project options that [`OptionRoot`] aliases resolve
/// against.
#[derive(Clone, Debug, Default)]
pub struct KubraGen {
    options: Options,
}

impl KubraGen {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Follows the alias `root`, which was found at the option `path`.
    pub(crate) fn resolve_root(&self, path: &str, root: &OptionRoot) -> Result<OptionValue> {
        let value = self
            .options
            .get(root.path())
            .context(UnresolvedOptionRootSnafu {
                path,
                root: root.path(),
            })?;
        if let OptionValue::Root(_) = value {
            return InvalidOptionValueSnafu {
                path,
                reason: format!("option root {:?} points to another option root", root.path()),
            }
            .fail();
        }
        Ok(value)
    }
}

impl OptionGetter for KubraGen {
    fn option_get(&self, path: &str) -> Result<Option<OptionValue>> {
        self.options.resolve(self, path)
    }
}
