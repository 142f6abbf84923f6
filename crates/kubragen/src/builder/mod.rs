//! The [`Builder`] contract, plus builders for the Kubernetes objects
//! generated by concrete builders.
//!
//! The object builders are not _pure_ builders, they fill in defaults where a
//! field is commonly left empty.
use snafu::ensure;
use tracing::debug;

use crate::{
    KubraGen,
    error::{InvalidBuildItemNameSnafu, InvalidBuildNameSnafu, Result},
    naming::NameRegistry,
    object::ObjectItem,
    option::OptionGetter,
};

pub mod configmap;
pub mod meta;
pub mod pod;
pub mod rbac;

/// Name of a build group, a batch of related objects (`accesscontrol`).
pub type BuildName = &'static str;

/// Name of a single object type within a build group (`service-account`).
pub type BuildItemName = &'static str;

/// Generates the objects of one deployable component.
///
/// Implementors resolve their options and fill their [`NameRegistry`] when
/// they are constructed; the build group methods then only read from it.
pub trait Builder: OptionGetter {
    fn kubragen(&self) -> &KubraGen;

    /// Identifier of the builder, stored as [`ObjectItem::source`].
    fn source_name(&self) -> &str;

    /// Common prefix for object names, stored as [`ObjectItem::instance`].
    fn basename(&self) -> &str;

    fn namespace(&self) -> &str;

    fn object_names(&self) -> &NameRegistry;

    /// Concrete name for the logical object `name`, [`None`] if that object
    /// is not created.
    fn object_name(&self, name: &str) -> Result<Option<&str>> {
        self.object_names().get(name)
    }

    /// All build groups this builder can produce.
    fn build_names(&self) -> Vec<BuildName>;

    /// The build groups that produce objects for the current options.
    ///
    /// This is advisory, [`Self::build`] accepts any declared group.
    fn build_names_required(&self) -> Result<Vec<BuildName>>;

    /// All build item names objects can be produced with.
    fn builditem_names(&self) -> Vec<BuildItemName>;

    /// Builds the objects of the (already validated) build group.
    fn internal_build(&self, buildname: &str) -> Result<Vec<ObjectItem>>;

    /// Fails unless every name in `buildnames` is a declared build group.
    fn ensure_build_names(&self, buildnames: &[&str]) -> Result<()> {
        let declared = self.build_names();
        for buildname in buildnames {
            ensure!(
                declared.iter().any(|declared| declared == buildname),
                InvalidBuildNameSnafu { name: *buildname }
            );
        }
        Ok(())
    }

    /// Builds the objects of the build group `buildname`.
    fn build(&self, buildname: &str) -> Result<Vec<ObjectItem>> {
        self.ensure_build_names(&[buildname])?;

        let items = self.internal_build(buildname)?;
        let declared = self.builditem_names();
        for item in &items {
            ensure!(
                declared.iter().any(|declared| *declared == item.name),
                InvalidBuildItemNameSnafu {
                    name: &item.name,
                    source_name: self.source_name(),
                }
            );
        }

        debug!(
            source = self.source_name(),
            instance = self.basename(),
            buildname,
            count = items.len(),
            "built objects"
        );
        Ok(items)
    }
}
