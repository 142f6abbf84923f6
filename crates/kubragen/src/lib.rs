//! Core of the KubraGen Kubernetes manifest generators.
//!
//! A generator run starts from a [`KubraGen`] context holding project-wide
//! options. Each deployable component is a [`builder::Builder`]: it resolves
//! its own [`option::Options`] (which may alias project options through
//! [`option::OptionRoot`]), names its objects once in a
//! [`naming::NameRegistry`] and produces [`object::ObjectItem`]s per build
//! group. Items are written out as a YAML stream with [`yaml::write_objects`].

pub mod builder;
pub mod configfile;
pub mod data;
pub mod error;
pub mod generator;
pub mod logging;
pub mod naming;
pub mod object;
pub mod option;
pub mod yaml;

// External re-exports
pub use k8s_openapi;
// Internal re-exports
pub use error::{Error, ErrorKind, Result};
pub use generator::KubraGen;
