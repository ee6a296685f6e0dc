//! Dependency resolver.
//!
//! Maps a declared dependency name to the directory holding its installed
//! manifest. Resolution runs an ordered list of strategies; each reports a
//! tagged [`Resolution`] and the first hit wins:
//!
//! 1. [`ManifestSubpath`]: resolve `<name>/package.json` directly.
//! 2. [`MainEntry`]: resolve the package's main entry point, for packages
//!    whose `exports` hide their manifest.

mod exports;
mod node_modules;

pub use exports::{resolve_exports, ExportsError};
pub use node_modules::{resolve_package, PackageRequest};

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::config::MANIFEST_FILE;
use crate::error::Error;

/// Outcome of a single resolution strategy.
#[derive(Debug)]
pub enum Resolution {
    /// Resolved to a file on disk.
    Found(PathBuf),
    /// The package exists but its `exports` hide the request.
    NotExported,
    /// No installed package provides the request.
    NotFound,
    /// Any other failure; aborts the walk.
    Failed(Error),
}

#[cfg(test)]
impl Resolution {
    /// The resolved path, if any.
    pub fn found(&self) -> Option<&Path> {
        match self {
            Self::Found(path) => Some(path),
            _ => None,
        }
    }
}

/// Where a dependency's manifest lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLocation {
    /// Directory to search upwards from for the manifest.
    Found(PathBuf),
    /// Every strategy was refused by the package's `exports`.
    NotExported,
    /// The dependency is not installed.
    NotFound,
}

/// One way of locating a dependency on disk.
pub trait ResolveStrategy: fmt::Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Resolve dependency `name` as requested from directory `from`.
    fn resolve(&self, name: &str, from: &Path) -> Resolution;
}

/// Resolve `<name>/package.json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestSubpath;

impl ResolveStrategy for ManifestSubpath {
    fn name(&self) -> &'static str {
        "manifest"
    }

    fn resolve(&self, name: &str, from: &Path) -> Resolution {
        resolve_package(name, PackageRequest::Subpath(MANIFEST_FILE), from)
    }
}

/// Resolve the main entry point of `<name>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MainEntry;

impl ResolveStrategy for MainEntry {
    fn name(&self) -> &'static str {
        "main"
    }

    fn resolve(&self, name: &str, from: &Path) -> Resolution {
        resolve_package(name, PackageRequest::Main, from)
    }
}

/// Ordered chain of resolution strategies.
#[derive(Debug)]
pub struct Resolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::node()
    }
}

impl Resolver {
    /// Create a resolver trying `strategies` in order.
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { strategies }
    }

    /// The `node_modules` chain: manifest subpath, then main entry.
    #[must_use]
    pub fn node() -> Self {
        Self::new(vec![Box::new(ManifestSubpath), Box::new(MainEntry)])
    }

    /// Locate the directory of `name`'s installed manifest.
    ///
    /// Symlinks in the resolved path are followed, so the returned directory
    /// is the real install location. When every strategy fails benignly the
    /// last strategy's outcome is reported.
    pub fn resolve_manifest_dir(&self, name: &str, from: &Path) -> Result<ManifestLocation, Error> {
        let mut outcome = ManifestLocation::NotFound;

        for strategy in &self.strategies {
            match strategy.resolve(name, from) {
                Resolution::Found(path) => {
                    let real = dunce::canonicalize(&path)?;
                    let dir = real.parent().map_or_else(|| real.clone(), Path::to_path_buf);
                    trace!(dependency = name, strategy = strategy.name(), dir = %dir.display(), "Resolved");
                    return Ok(ManifestLocation::Found(dir));
                }
                Resolution::NotExported => {
                    trace!(dependency = name, strategy = strategy.name(), "Not exported");
                    outcome = ManifestLocation::NotExported;
                }
                Resolution::NotFound => {
                    trace!(dependency = name, strategy = strategy.name(), "Not found");
                    outcome = ManifestLocation::NotFound;
                }
                Resolution::Failed(err) => return Err(err),
            }
        }

        Ok(outcome)
    }
}
