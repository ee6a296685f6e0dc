#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

//! Native addon fingerprinting for Node projects.
//!
//! Walks the dependency graph installed under `node_modules`, collects the
//! packages whose manifest sets `"addon": true`, and hashes their
//! `name@version` identities into a stable fingerprint.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod manifest;
pub mod resolver;
pub mod walk;

pub use config::Config;
pub use error::Error;
pub use fingerprint::{
    collect_addons, collect_addons_with, fingerprint, fingerprint_addons, AddonSet,
    FINGERPRINT_SCHEMA_VERSION,
};
pub use manifest::{find_package, Package, PackageId};
pub use resolver::{ManifestLocation, Resolution, ResolveStrategy, Resolver};
pub use walk::{walk, TraversalContext};
