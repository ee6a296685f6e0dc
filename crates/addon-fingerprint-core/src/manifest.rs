//! Package manifest reading.
//!
//! Locates the nearest `package.json` at or above a directory and extracts
//! the fields the fingerprint walk needs. Fields with an unexpected JSON
//! type are treated as absent.

use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use addon_fingerprint_util::fs::find_up;

use crate::config::{ADDON_FIELD, MANIFEST_FILE};
use crate::error::Error;

/// Dependency name to specifier, in declaration order.
pub type Dependencies = Map<String, Value>;

/// Identity of a package: `name@version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId {
    /// Package name, empty when the manifest has none.
    pub name: String,
    /// Package version, `0.0.0` when the manifest has none.
    pub version: String,
}

impl PackageId {
    /// Create a new package ID.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// A parsed package manifest.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub name: Option<String>,
    pub version: Option<String>,
    /// Raw value of the addon marker; only `true` counts.
    pub addon: Option<Value>,
    pub dependencies: Dependencies,
    pub optional_dependencies: Dependencies,
    /// Parsed but never walked.
    pub dev_dependencies: Dependencies,
    /// Directory containing the manifest.
    pub dir: PathBuf,
}

impl Package {
    /// Build a package record from manifest JSON.
    #[must_use]
    pub fn from_json(json: &Value, dir: &Path) -> Self {
        let string_field = |key: &str| json.get(key).and_then(Value::as_str).map(String::from);
        let map_field = |key: &str| {
            json.get(key)
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default()
        };

        Self {
            name: string_field("name"),
            version: string_field("version"),
            addon: json.get(ADDON_FIELD).cloned(),
            dependencies: map_field("dependencies"),
            optional_dependencies: map_field("optionalDependencies"),
            dev_dependencies: map_field("devDependencies"),
            dir: dir.to_path_buf(),
        }
    }

    /// Identity used for walk dedup and addon dedup.
    #[must_use]
    pub fn id(&self) -> PackageId {
        PackageId::new(
            self.name.as_deref().unwrap_or(""),
            self.version.as_deref().unwrap_or("0.0.0"),
        )
    }

    /// Whether the manifest marks this package as a native addon.
    #[must_use]
    pub fn is_addon(&self) -> bool {
        matches!(self.addon, Some(Value::Bool(true)))
    }
}

/// Find and parse the nearest manifest at or above `directory`.
///
/// Returns `Ok(None)` when no ancestor has a manifest. Unreadable or
/// malformed manifests are errors.
pub fn find_package(directory: &Path) -> Result<Option<Package>, Error> {
    match find_up(directory, MANIFEST_FILE) {
        Some(path) => read_package(&path),
        None => Ok(None),
    }
}

/// Parse the manifest at `path`.
///
/// A manifest whose document is `null` describes no package.
pub fn read_package(path: &Path) -> Result<Option<Package>, Error> {
    let json = read_manifest_json(path)?;
    if json.is_null() {
        return Ok(None);
    }

    let dir = path.parent().unwrap_or(path);
    Ok(Some(Package::from_json(&json, dir)))
}

/// Read a manifest as raw JSON.
pub(crate) fn read_manifest_json(path: &Path) -> Result<Value, Error> {
    let content = fs::read_to_string(path).map_err(|source| Error::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| Error::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}
