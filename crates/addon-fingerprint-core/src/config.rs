use std::path::PathBuf;

/// File name of a package manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Manifest field marking a package as a native addon.
pub const ADDON_FIELD: &str = "addon";

/// Specifier prefix redirecting a dependency to another package name.
pub const ALIAS_PREFIX: &str = "npm:";

/// Conditions active when matching `exports`, as for a CommonJS `require`.
pub const REQUIRE_CONDITIONS: &[&str] = &["require", "node", "node-addons", "default"];

/// Extensions probed when resolving a main entry point, as `require` does.
pub const REQUIRE_EXTENSIONS: &[&str] = &[".js", ".json", ".node"];

/// Runtime configuration for the addon-fingerprint CLI.
#[derive(Debug, Clone)]
pub struct Config {
    /// Project directory to fingerprint.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = WARN, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = Config::new(PathBuf::from("/project"))
            .with_verbosity(2)
            .with_json_logs(true);
        assert_eq!(config.cwd, PathBuf::from("/project"));
        assert_eq!(config.verbosity, 2);
        assert!(config.json_logs);
    }

    #[test]
    fn test_require_conditions_end_with_default() {
        assert_eq!(REQUIRE_CONDITIONS.last(), Some(&"default"));
    }
}
