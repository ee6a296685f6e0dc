use std::path::{Path, PathBuf};

/// Find `file_name` in `start` or the closest ancestor directory that contains it.
///
/// Only regular files match; a directory with the same name is skipped.
/// Returns `None` once the filesystem root has been searched.
#[must_use]
pub fn find_up(start: &Path, file_name: &str) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let candidate = dir.join(file_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = dir.parent();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_find_up_in_start_dir() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();

        let found = find_up(dir.path(), "package.json").unwrap();
        assert_eq!(found, dir.path().join("package.json"));
    }

    #[test]
    fn test_find_up_in_ancestor() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        let nested = dir.path().join("lib/deep/er");
        fs::create_dir_all(&nested).unwrap();

        let found = find_up(&nested, "package.json").unwrap();
        assert_eq!(found, dir.path().join("package.json"));
    }

    #[test]
    fn test_find_up_prefers_nearest() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        let inner = dir.path().join("inner");
        fs::create_dir_all(&inner).unwrap();
        fs::write(inner.join("package.json"), "{}").unwrap();

        let found = find_up(&inner, "package.json").unwrap();
        assert_eq!(found, inner.join("package.json"));
    }

    #[test]
    fn test_find_up_skips_directories() {
        let dir = tempdir().unwrap();
        let inner = dir.path().join("inner");
        fs::create_dir_all(inner.join("marker.txt")).unwrap();
        fs::write(dir.path().join("marker.txt"), "").unwrap();

        let found = find_up(&inner, "marker.txt").unwrap();
        assert_eq!(found, dir.path().join("marker.txt"));
    }

    #[test]
    fn test_find_up_not_found() {
        let dir = tempdir().unwrap();
        let name = "definitely-not-a-real-marker-file.addon-fingerprint";
        assert!(find_up(dir.path(), name).is_none());
    }
}
