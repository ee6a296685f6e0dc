//! Dependency graph walk.
//!
//! Depth-first traversal of the dependency graph as installed on disk,
//! collecting every package marked as a native addon. A package identity is
//! walked at most once per [`TraversalContext`], which both terminates
//! cycles and skips shared subtrees.
//!
//! Every dependency, at any depth, is resolved from the project root. Copies
//! installed only in a nested `node_modules` are not reached.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ALIAS_PREFIX;
use crate::error::Error;
use crate::manifest::{find_package, Dependencies, Package, PackageId};
use crate::resolver::{ManifestLocation, Resolver};

/// State for one fingerprint computation.
#[derive(Debug)]
pub struct TraversalContext {
    root: PathBuf,
    visited: HashSet<PackageId>,
    addons: Vec<Package>,
}

impl TraversalContext {
    /// Create an empty context resolving dependencies from `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            visited: HashSet::new(),
            addons: Vec::new(),
        }
    }

    /// Directory every dependency is resolved from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Mark `id` as visited. Returns `false` if it already was.
    pub fn visit(&mut self, id: PackageId) -> bool {
        self.visited.insert(id)
    }

    /// Number of distinct packages visited.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Addons collected so far, in discovery order.
    #[must_use]
    pub fn addons(&self) -> &[Package] {
        &self.addons
    }
}

/// Walk the dependencies of `entry`, collecting addons into `ctx`.
///
/// Dependencies are resolved from [`TraversalContext::root`]. Those that are
/// not installed there or hide their manifest are skipped. Any other failure
/// aborts the walk.
///
/// A specifier that is not a string is never an alias, so the declared name
/// is resolved.
pub fn walk(entry: &Package, resolver: &Resolver, ctx: &mut TraversalContext) -> Result<(), Error> {
    for (declared, specifier) in merged_dependencies(entry) {
        let name = specifier
            .as_str()
            .and_then(alias_target)
            .unwrap_or(declared.as_str());

        let dir = match resolver.resolve_manifest_dir(name, ctx.root())? {
            ManifestLocation::Found(dir) => dir,
            ManifestLocation::NotExported => {
                debug!(dependency = name, "Skipping dependency that exports neither manifest nor main entry");
                continue;
            }
            ManifestLocation::NotFound => {
                debug!(dependency = name, "Skipping dependency that is not installed");
                continue;
            }
        };

        let Some(pkg) = find_package(&dir)? else {
            debug!(dependency = name, dir = %dir.display(), "Skipping dependency without manifest");
            continue;
        };

        if !ctx.visit(pkg.id()) {
            continue;
        }

        if pkg.is_addon() {
            debug!(addon = %pkg.id(), "Found native addon");
            ctx.addons.push(pkg.clone());
        }

        walk(&pkg, resolver, ctx)?;
    }

    Ok(())
}

/// Merge `dependencies` with `optionalDependencies`.
///
/// Optional entries override the specifier of an existing key but keep its
/// position; new keys are appended.
#[must_use]
pub fn merged_dependencies(pkg: &Package) -> Dependencies {
    let mut merged = pkg.dependencies.clone();
    for (name, specifier) in &pkg.optional_dependencies {
        merged.insert(name.clone(), specifier.clone());
    }
    merged
}

/// Target package name of an alias specifier (`npm:<name>[@<range>]`).
///
/// Returns `None` if `specifier` is not an alias.
#[must_use]
pub fn alias_target(specifier: &str) -> Option<&str> {
    let rest = specifier.strip_prefix(ALIAS_PREFIX)?;

    match rest.rfind('@') {
        Some(at) if at > 0 => Some(&rest[..at]),
        _ => Some(rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_pkg(dir: &Path, manifest: &Value) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("package.json"),
            serde_json::to_string_pretty(manifest).unwrap(),
        )
        .unwrap();
    }

    fn walk_root(root: &Path) -> TraversalContext {
        let project = find_package(root).unwrap().unwrap();
        let mut ctx = TraversalContext::new(root);
        walk(&project, &Resolver::node(), &mut ctx).unwrap();
        ctx
    }

    fn addon_ids(ctx: &TraversalContext) -> Vec<String> {
        ctx.addons().iter().map(|p| p.id().to_string()).collect()
    }

    #[test]
    fn test_alias_target() {
        assert_eq!(alias_target("npm:string-width@^4.2.0"), Some("string-width"));
        assert_eq!(alias_target("npm:string-width"), Some("string-width"));
        assert_eq!(alias_target("npm:@scope/pkg@1.0.0"), Some("@scope/pkg"));
        assert_eq!(alias_target("npm:@scope/pkg"), Some("@scope/pkg"));
        assert_eq!(alias_target("^1.0.0"), None);
        assert_eq!(alias_target("file:../local"), None);
    }

    #[test]
    fn test_merge_is_right_biased_and_keeps_position() {
        let manifest: Value = serde_json::from_str(
            r#"{
                "dependencies": {"a": "1.0.0", "b": "2.0.0"},
                "optionalDependencies": {"c": "3.0.0", "a": "9.9.9"}
            }"#,
        )
        .unwrap();
        let pkg = Package::from_json(&manifest, Path::new("/p"));

        let merged = merged_dependencies(&pkg);
        let entries: Vec<(&str, &str)> = merged
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str().unwrap()))
            .collect();
        assert_eq!(entries, [("a", "9.9.9"), ("b", "2.0.0"), ("c", "3.0.0")]);
    }

    #[test]
    fn test_collects_addons_transitively() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_pkg(root, &json!({"name": "app", "version": "1.0.0", "dependencies": {"a": "^1"}}));
        write_pkg(
            &root.join("node_modules/a"),
            &json!({"name": "a", "version": "1.0.0", "dependencies": {"native": "^2"}}),
        );
        write_pkg(
            &root.join("node_modules/native"),
            &json!({"name": "native", "version": "2.1.0", "addon": true}),
        );

        let ctx = walk_root(root);
        assert_eq!(addon_ids(&ctx), ["native@2.1.0"]);
        assert_eq!(ctx.visited_count(), 2);
    }

    #[test]
    fn test_cycle_terminates() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_pkg(root, &json!({"name": "app", "dependencies": {"a": "1"}}));
        write_pkg(
            &root.join("node_modules/a"),
            &json!({"name": "a", "version": "1.0.0", "addon": true, "dependencies": {"b": "1"}}),
        );
        write_pkg(
            &root.join("node_modules/b"),
            &json!({"name": "b", "version": "1.0.0", "dependencies": {"a": "1"}}),
        );

        let ctx = walk_root(root);
        assert_eq!(addon_ids(&ctx), ["a@1.0.0"]);
        assert_eq!(ctx.visited_count(), 2);
    }

    #[test]
    fn test_diamond_visits_shared_once() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_pkg(root, &json!({"name": "app", "dependencies": {"left": "1", "right": "1"}}));
        write_pkg(
            &root.join("node_modules/left"),
            &json!({"name": "left", "version": "1.0.0", "dependencies": {"shared": "1"}}),
        );
        write_pkg(
            &root.join("node_modules/right"),
            &json!({"name": "right", "version": "1.0.0", "dependencies": {"shared": "1"}}),
        );
        write_pkg(
            &root.join("node_modules/shared"),
            &json!({"name": "shared", "version": "1.0.0", "addon": true}),
        );

        let ctx = walk_root(root);
        assert_eq!(addon_ids(&ctx), ["shared@1.0.0"]);
        assert_eq!(ctx.visited_count(), 3);
    }

    #[test]
    fn test_alias_walks_target_package() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_pkg(
            root,
            &json!({"name": "app", "dependencies": {"native-alias": "npm:real-native@^3.0.0"}}),
        );
        write_pkg(
            &root.join("node_modules/real-native"),
            &json!({"name": "real-native", "version": "3.0.1", "addon": true}),
        );

        let ctx = walk_root(root);
        assert_eq!(addon_ids(&ctx), ["real-native@3.0.1"]);
    }

    #[test]
    fn test_missing_optional_dependency_is_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_pkg(
            root,
            &json!({
                "name": "app",
                "dependencies": {"native": "1"},
                "optionalDependencies": {"fsevents": "^2"}
            }),
        );
        write_pkg(
            &root.join("node_modules/native"),
            &json!({"name": "native", "version": "1.0.0", "addon": true}),
        );

        let ctx = walk_root(root);
        assert_eq!(addon_ids(&ctx), ["native@1.0.0"]);
    }

    #[test]
    fn test_dev_dependencies_are_not_walked() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_pkg(root, &json!({"name": "app", "devDependencies": {"native": "1"}}));
        write_pkg(
            &root.join("node_modules/native"),
            &json!({"name": "native", "version": "1.0.0", "addon": true}),
        );

        let ctx = walk_root(root);
        assert!(ctx.addons().is_empty());
        assert_eq!(ctx.visited_count(), 0);
    }

    #[test]
    fn test_hidden_manifest_uses_main_entry() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_pkg(root, &json!({"name": "app", "dependencies": {"bare-fs": "1"}}));
        let pkg_dir = root.join("node_modules/bare-fs");
        write_pkg(
            &pkg_dir,
            &json!({
                "name": "bare-fs",
                "version": "2.3.0",
                "addon": true,
                "exports": {".": "./lib/index.js"}
            }),
        );
        fs::create_dir_all(pkg_dir.join("lib")).unwrap();
        fs::write(pkg_dir.join("lib/index.js"), "").unwrap();

        let ctx = walk_root(root);
        assert_eq!(addon_ids(&ctx), ["bare-fs@2.3.0"]);
    }

    #[test]
    fn test_nothing_exported_is_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_pkg(root, &json!({"name": "app", "dependencies": {"sealed": "1"}}));
        write_pkg(
            &root.join("node_modules/sealed"),
            &json!({
                "name": "sealed",
                "version": "1.0.0",
                "addon": true,
                "exports": {"./only": "./only.js"}
            }),
        );

        let ctx = walk_root(root);
        assert!(ctx.addons().is_empty());
    }

    #[test]
    fn test_invalid_dependency_manifest_aborts() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_pkg(root, &json!({"name": "app", "dependencies": {"broken": "1"}}));
        fs::create_dir_all(root.join("node_modules/broken")).unwrap();
        fs::write(root.join("node_modules/broken/package.json"), "{ nope").unwrap();

        let project = find_package(root).unwrap().unwrap();
        let mut ctx = TraversalContext::new(root);
        let err = walk(&project, &Resolver::node(), &mut ctx).unwrap_err();
        assert!(matches!(err, Error::ManifestParse { .. }));
    }

    #[test]
    fn test_nested_install_is_not_reached() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_pkg(root, &json!({"name": "app", "dependencies": {"a": "1", "native": "2"}}));
        write_pkg(
            &root.join("node_modules/native"),
            &json!({"name": "native", "version": "2.0.0", "addon": true}),
        );
        write_pkg(
            &root.join("node_modules/a"),
            &json!({"name": "a", "version": "1.0.0", "dependencies": {"native": "1"}}),
        );
        write_pkg(
            &root.join("node_modules/a/node_modules/native"),
            &json!({"name": "native", "version": "1.0.0", "addon": true}),
        );

        let ctx = walk_root(root);
        assert_eq!(addon_ids(&ctx), ["native@2.0.0"]);
    }

    #[test]
    fn test_nested_only_install_is_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_pkg(root, &json!({"name": "app", "dependencies": {"a": "1"}}));
        write_pkg(
            &root.join("node_modules/a"),
            &json!({"name": "a", "version": "1.0.0", "dependencies": {"native": "1"}}),
        );
        write_pkg(
            &root.join("node_modules/a/node_modules/native"),
            &json!({"name": "native", "version": "1.0.0", "addon": true}),
        );

        let ctx = walk_root(root);
        assert!(ctx.addons().is_empty());
        assert_eq!(ctx.visited_count(), 1);
    }

    #[test]
    fn test_missing_export_target_is_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_pkg(root, &json!({"name": "app", "dependencies": {"gone": "1", "native": "1"}}));
        write_pkg(
            &root.join("node_modules/gone"),
            &json!({
                "name": "gone",
                "version": "1.0.0",
                "addon": true,
                "exports": {".": "./gone.js"}
            }),
        );
        write_pkg(
            &root.join("node_modules/native"),
            &json!({"name": "native", "version": "1.0.0", "addon": true}),
        );

        let ctx = walk_root(root);
        assert_eq!(addon_ids(&ctx), ["native@1.0.0"]);
    }

    #[test]
    fn test_non_string_specifier_resolves_declared_name() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_pkg(
            root,
            &json!({"name": "app", "dependencies": {"native": {"version": "1.0.0"}}}),
        );
        write_pkg(
            &root.join("node_modules/native"),
            &json!({"name": "native", "version": "1.0.0", "addon": true}),
        );

        let ctx = walk_root(root);
        assert_eq!(addon_ids(&ctx), ["native@1.0.0"]);
    }
}
