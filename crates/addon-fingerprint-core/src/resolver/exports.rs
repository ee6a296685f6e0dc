//! Package.json `exports` field evaluation.
//!
//! Implements the Node.js exports algorithm for CommonJS lookups:
//! - Root and subpath keys, string sugar, root conditions objects
//! - Pattern keys with a single `*`
//! - Conditions matched in object key order
//! - Fallback arrays and `null` exclusions

use serde_json::{Map, Value};

/// Reasons an `exports` field cannot be evaluated at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportsError {
    /// The `exports` object is malformed.
    InvalidConfig(String),
    /// A matched target is not a valid package-relative path.
    InvalidTarget(String),
}

/// Outcome of evaluating a single export target.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    /// Resolved package-relative path, starting with `./`.
    Path(String),
    /// Explicitly excluded with `null`.
    Excluded,
    /// No condition applied.
    Unmatched,
}

/// Resolve `subpath` (`"."` or `"./..."`) against an `exports` value.
///
/// Returns `Ok(None)` when the subpath is not exported for `conditions`.
pub fn resolve_exports(
    exports: &Value,
    subpath: &str,
    conditions: &[&str],
) -> Result<Option<String>, ExportsError> {
    let subpath_map = match exports.as_object() {
        Some(obj) => is_subpath_map(obj)?,
        None => false,
    };

    let resolved = if subpath == "." {
        let main_export = if subpath_map {
            exports.get(".")
        } else {
            Some(exports)
        };
        match main_export {
            Some(target) => resolve_target(target, None, conditions)?,
            None => Target::Unmatched,
        }
    } else if let (true, Some(obj)) = (subpath_map, exports.as_object()) {
        resolve_subpath(obj, subpath, conditions)?
    } else {
        Target::Unmatched
    };

    match resolved {
        Target::Path(path) => Ok(Some(path)),
        Target::Excluded | Target::Unmatched => Ok(None),
    }
}

/// Whether an exports object maps subpaths (all keys start with `.`)
/// rather than conditions (no key starts with `.`).
fn is_subpath_map(obj: &Map<String, Value>) -> Result<bool, ExportsError> {
    let mut dotted = 0;
    for key in obj.keys() {
        if key.starts_with('.') {
            dotted += 1;
        }
    }

    if dotted == 0 {
        Ok(false)
    } else if dotted == obj.len() {
        Ok(true)
    } else {
        Err(ExportsError::InvalidConfig(
            "\"exports\" cannot contain some keys starting with '.' and some not".to_string(),
        ))
    }
}

/// Match a subpath against exact keys, then pattern keys.
fn resolve_subpath(
    obj: &Map<String, Value>,
    subpath: &str,
    conditions: &[&str],
) -> Result<Target, ExportsError> {
    if !subpath.contains('*') {
        if let Some(target) = obj.get(subpath) {
            return resolve_target(target, None, conditions);
        }
    }

    let mut best: Option<(&str, &Value, &str)> = None;

    for (key, value) in obj {
        let Some(star) = key.find('*') else {
            continue;
        };
        if key[star + 1..].contains('*') {
            continue;
        }

        let base = &key[..star];
        let trailer = &key[star + 1..];
        if !subpath.starts_with(base) || subpath == base {
            continue;
        }
        if !trailer.is_empty() && !(subpath.ends_with(trailer) && subpath.len() >= key.len()) {
            continue;
        }

        let better = match best {
            Some((best_key, _, _)) => pattern_key_cmp(key, best_key).is_lt(),
            None => true,
        };
        if better {
            let star_match = &subpath[base.len()..subpath.len() - trailer.len()];
            best = Some((key.as_str(), value, star_match));
        }
    }

    match best {
        Some((_, target, star_match)) => resolve_target(target, Some(star_match), conditions),
        None => Ok(Target::Unmatched),
    }
}

/// Order pattern keys by specificity: longer prefix before `*` first,
/// then longer key first.
fn pattern_key_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    let base_a = a.find('*').map_or(a.len(), |i| i + 1);
    let base_b = b.find('*').map_or(b.len(), |i| i + 1);

    base_b.cmp(&base_a).then_with(|| b.len().cmp(&a.len()))
}

/// Resolve an export target: a path string, conditions object,
/// fallback array, or `null`.
fn resolve_target(
    target: &Value,
    star_match: Option<&str>,
    conditions: &[&str],
) -> Result<Target, ExportsError> {
    match target {
        Value::String(path) => resolve_target_string(path, star_match).map(Target::Path),
        Value::Array(items) => {
            if items.is_empty() {
                return Ok(Target::Excluded);
            }

            let mut last = Ok(Target::Unmatched);
            for item in items {
                match resolve_target(item, star_match, conditions) {
                    Err(err @ ExportsError::InvalidTarget(_)) => last = Err(err),
                    Err(err) => return Err(err),
                    Ok(Target::Unmatched) => {}
                    Ok(Target::Excluded) => last = Ok(Target::Excluded),
                    Ok(path) => return Ok(path),
                }
            }
            last
        }
        Value::Object(obj) => {
            for (key, value) in obj {
                if is_array_index(key) {
                    return Err(ExportsError::InvalidConfig(
                        "\"exports\" cannot contain numeric property keys".to_string(),
                    ));
                }
                if key == "default" || conditions.contains(&key.as_str()) {
                    match resolve_target(value, star_match, conditions)? {
                        Target::Unmatched => continue,
                        resolved => return Ok(resolved),
                    }
                }
            }
            Ok(Target::Unmatched)
        }
        Value::Null => Ok(Target::Excluded),
        other => Err(ExportsError::InvalidTarget(other.to_string())),
    }
}

/// Validate a target string and substitute the pattern match.
fn resolve_target_string(target: &str, star_match: Option<&str>) -> Result<String, ExportsError> {
    let invalid = || ExportsError::InvalidTarget(target.to_string());

    let Some(rest) = target.strip_prefix("./") else {
        return Err(invalid());
    };
    if has_invalid_segment(rest) {
        return Err(invalid());
    }

    match star_match {
        Some(star) => {
            if has_invalid_segment(star) {
                return Err(ExportsError::InvalidTarget(target.replace('*', star)));
            }
            Ok(target.replace('*', star))
        }
        None => Ok(target.to_string()),
    }
}

/// Reject empty, `.`, `..` and `node_modules` segments.
fn has_invalid_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| {
        segment.is_empty()
            || segment == "."
            || segment == ".."
            || segment.eq_ignore_ascii_case("node_modules")
    })
}

fn is_array_index(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}
