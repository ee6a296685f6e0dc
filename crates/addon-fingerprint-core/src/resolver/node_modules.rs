//! `node_modules` lookup for bare package names.
//!
//! Mirrors CommonJS `require.resolve`: candidate package directories are
//! probed from the requesting directory upwards, and the first package
//! that declares `exports` decides the outcome on its own.

use serde_json::Value;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use super::exports::{resolve_exports, ExportsError};
use super::Resolution;
use crate::config::{MANIFEST_FILE, REQUIRE_CONDITIONS, REQUIRE_EXTENSIONS};
use crate::error::Error;
use crate::manifest::read_manifest_json;

/// What to resolve inside a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageRequest<'a> {
    /// The package's main entry point (`require("pkg")`).
    Main,
    /// A file inside the package (`require("pkg/sub")`), without `./`.
    Subpath(&'a str),
}

impl PackageRequest<'_> {
    fn exports_key(&self) -> String {
        match self {
            Self::Main => ".".to_string(),
            Self::Subpath(sub) => format!("./{sub}"),
        }
    }
}

/// Resolve `request` inside package `name`, looking up from `from`.
pub fn resolve_package(name: &str, request: PackageRequest<'_>, from: &Path) -> Resolution {
    if !is_bare_package_name(name) {
        return Resolution::NotFound;
    }

    for pkg_dir in package_dir_candidates(name, from) {
        if !pkg_dir.is_dir() {
            continue;
        }

        let manifest_path = pkg_dir.join(MANIFEST_FILE);
        let manifest = if manifest_path.is_file() {
            match read_manifest_json(&manifest_path) {
                Ok(json) => Some(json),
                Err(err) => return Resolution::Failed(err),
            }
        } else {
            None
        };

        if let Some(exports) = manifest
            .as_ref()
            .and_then(|m| m.get("exports"))
            .filter(|e| !e.is_null())
        {
            return resolve_through_exports(name, &pkg_dir, &manifest_path, exports, request);
        }

        match request {
            PackageRequest::Subpath(sub) => {
                if let Some(path) = probe_file(&pkg_dir.join(sub)) {
                    return Resolution::Found(path);
                }
            }
            PackageRequest::Main => match resolve_main(&pkg_dir, manifest.as_ref()) {
                MainEntry::Found(path) => return Resolution::Found(path),
                MainEntry::Broken => return Resolution::NotFound,
                MainEntry::Missing => {}
            },
        }
    }

    Resolution::NotFound
}

fn resolve_through_exports(
    name: &str,
    pkg_dir: &Path,
    manifest_path: &Path,
    exports: &Value,
    request: PackageRequest<'_>,
) -> Resolution {
    match resolve_exports(exports, &request.exports_key(), REQUIRE_CONDITIONS) {
        Ok(Some(target)) => {
            let path = pkg_dir.join(target.trim_start_matches("./"));
            if path.is_file() {
                Resolution::Found(path)
            } else {
                Resolution::NotFound
            }
        }
        Ok(None) => Resolution::NotExported,
        Err(ExportsError::InvalidConfig(message)) => {
            Resolution::Failed(Error::InvalidPackageConfig {
                path: manifest_path.to_path_buf(),
                message,
            })
        }
        Err(ExportsError::InvalidTarget(target)) => {
            Resolution::Failed(Error::InvalidPackageTarget {
                package: name.to_string(),
                target,
            })
        }
    }
}

/// Outcome of main entry lookup in a package without `exports`.
enum MainEntry {
    Found(PathBuf),
    /// `main` is declared but neither it nor an index file exists.
    Broken,
    /// No `main` and no index file.
    Missing,
}

fn resolve_main(pkg_dir: &Path, manifest: Option<&Value>) -> MainEntry {
    let main = manifest
        .and_then(|m| m.get("main"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty());

    if let Some(main) = main {
        let main_path = pkg_dir.join(main);
        if let Some(path) = probe_file(&main_path).or_else(|| probe_file(&main_path.join("index"))) {
            return MainEntry::Found(path);
        }
    }

    match probe_file(&pkg_dir.join("index")) {
        Some(path) => MainEntry::Found(path),
        None if main.is_some() => MainEntry::Broken,
        None => MainEntry::Missing,
    }
}

/// Try `base` as a file, then with each `require` extension appended.
fn probe_file(base: &Path) -> Option<PathBuf> {
    if base.is_file() {
        return Some(base.to_path_buf());
    }

    REQUIRE_EXTENSIONS.iter().find_map(|ext| {
        let mut with_ext = OsString::from(base.as_os_str());
        with_ext.push(ext);
        let with_ext = PathBuf::from(with_ext);
        with_ext.is_file().then_some(with_ext)
    })
}

/// Candidate install directories for `name`, nearest first.
///
/// Ancestors that are themselves `node_modules` directories are skipped.
fn package_dir_candidates(name: &str, from: &Path) -> Vec<PathBuf> {
    from.ancestors()
        .filter(|dir| dir.file_name() != Some(OsStr::new("node_modules")))
        .map(|dir| {
            name.split('/')
                .fold(dir.join("node_modules"), |path, segment| path.join(segment))
        })
        .collect()
}

/// Whether `name` is a bare package name (`pkg` or `@scope/pkg`).
fn is_bare_package_name(name: &str) -> bool {
    if name.is_empty() || name.starts_with('.') || name.contains('\\') {
        return false;
    }

    let segments: Vec<&str> = name.split('/').collect();
    let expected = if name.starts_with('@') { 2 } else { 1 };

    segments.len() == expected
        && segments
            .iter()
            .all(|s| !s.is_empty() && *s != "." && *s != "..")
}
