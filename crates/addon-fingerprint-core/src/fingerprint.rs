//! Canonical addon fingerprint.
//!
//! The fingerprint depends only on the set of addon identities present:
//! identities are deduplicated, sorted, joined with `;` and hashed with
//! SHA-1.

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use addon_fingerprint_util::hash::sha1_hex;
use tracing::debug;

use crate::error::Error;
use crate::manifest::{find_package, Package};
use crate::resolver::Resolver;
use crate::walk::{walk, TraversalContext};

/// Schema version for the JSON report.
pub const FINGERPRINT_SCHEMA_VERSION: u32 = 1;

/// Separator between identities in the hashed string.
const IDENTITY_SEPARATOR: &str = ";";

/// Addons found under a project, with their fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddonSet {
    /// Directory of the project manifest.
    pub root: PathBuf,
    /// Sorted, deduplicated addon identities.
    pub addons: Vec<String>,
    /// Lowercase hex SHA-1 of the joined identities.
    pub fingerprint: String,
}

/// Deduplicate, sort and render addon identities.
///
/// Duplicates are detected on the manifest's `(name, version)` fields; the
/// first occurrence wins.
#[must_use]
pub fn canonical_identities(addons: &[Package]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut identities: Vec<String> = addons
        .iter()
        .filter(|pkg| seen.insert((pkg.name.as_deref(), pkg.version.as_deref())))
        .map(|pkg| pkg.id().to_string())
        .collect();

    identities.sort();
    identities
}

/// Hash a canonical identity list.
#[must_use]
pub fn hash_identities(identities: &[String]) -> String {
    sha1_hex(identities.join(IDENTITY_SEPARATOR).as_bytes())
}

/// Fingerprint a list of collected addons.
#[must_use]
pub fn fingerprint_addons(addons: &[Package]) -> String {
    hash_identities(&canonical_identities(addons))
}

/// Collect the addons of the project at or above `cwd`.
///
/// Returns `Ok(None)` when no project manifest exists.
pub fn collect_addons(cwd: &Path) -> Result<Option<AddonSet>, Error> {
    collect_addons_with(cwd, &Resolver::node())
}

/// Like [`collect_addons`], with a custom resolver.
pub fn collect_addons_with(cwd: &Path, resolver: &Resolver) -> Result<Option<AddonSet>, Error> {
    let Some(project) = find_package(cwd)? else {
        debug!(cwd = %cwd.display(), "No project manifest found");
        return Ok(None);
    };

    let mut ctx = TraversalContext::new(&project.dir);
    walk(&project, resolver, &mut ctx)?;

    let addons = canonical_identities(ctx.addons());
    let fingerprint = hash_identities(&addons);
    debug!(
        root = %project.dir.display(),
        visited = ctx.visited_count(),
        addons = addons.len(),
        "Walked dependency graph"
    );

    Ok(Some(AddonSet {
        root: project.dir,
        addons,
        fingerprint,
    }))
}

/// Fingerprint the native addons of the project at or above `cwd`.
///
/// Returns an empty string when no project manifest exists.
pub fn fingerprint(cwd: &Path) -> Result<String, Error> {
    Ok(collect_addons(cwd)?
        .map(|set| set.fingerprint)
        .unwrap_or_default())
}
