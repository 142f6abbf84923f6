//! KubraGen builder for [Traefik 2](https://doc.traefik.io/traefik/v2.2/).
//!
//! ```
//! use kg_traefik2::{BUILD_SERVICE, Traefik2Builder, Traefik2Options};
//! use kubragen::{KubraGen, builder::Builder};
//!
//! let kubragen = KubraGen::default();
//! let builder = Traefik2Builder::new(
//!     &kubragen,
//!     Traefik2Options::new().with("basename", "mytraefik2").unwrap(),
//! )
//! .unwrap();
//!
//! let items = builder.build(BUILD_SERVICE).unwrap();
//! assert_eq!(items.len(), 2);
//! assert_eq!(builder.object_name("deployment").unwrap(), Some("mytraefik2"));
//! ```

pub mod builder;
pub mod configfile;
pub mod crd;
pub mod option;

pub use builder::{
    BUILD_ACCESSCONTROL, BUILD_CONFIG, BUILD_CRD, BUILD_SERVICE, BUILDITEM_CLUSTER_ROLE,
    BUILDITEM_CLUSTER_ROLE_BINDING, BUILDITEM_CONFIG, BUILDITEM_DEPLOYMENT, BUILDITEM_SERVICE,
    BUILDITEM_SERVICE_ACCOUNT, SOURCE_NAME, Traefik2Builder,
};
pub use configfile::Traefik2ConfigFile;
pub use option::{Traefik2Options, Traefik2OptionsPort};
