//! Platform-specific directory management
//!
//! Provides the kiln configuration directory. Follows the XDG Base
//! Directory Specification on Linux and standard locations on macOS.
//!
//! `KILN_CONFIG_DIR` overrides the default directory.

use std::env;
use std::path::PathBuf;

/// Environment variable overriding the config directory
pub const ENV_CONFIG_DIR: &str = "KILN_CONFIG_DIR";

/// Environment variable naming a kiln installation (reported by diagnostics)
pub const ENV_HOME: &str = "KILN_HOME";

/// Application name used in directory paths
const APP_NAME: &str = "kiln";

/// Global config file name
const CONFIG_FILE: &str = "config.toml";

/// Platform-specific directory provider for kiln
#[derive(Debug, Clone)]
pub struct KilnDirs {
    config_dir: PathBuf,
}

impl KilnDirs {
    /// Checks the environment first, then falls back to platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Directory provider rooted at an explicit config directory
    #[must_use]
    pub fn with_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Get the config directory path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/kiln` or `~/.config/kiln`
    /// - macOS: `~/Library/Application Support/kiln`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Path to `config.toml` in the config directory
    #[must_use]
    pub fn global_config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// The user's home directory, if known
    #[must_use]
    pub fn home_dir() -> Option<PathBuf> {
        dirs::home_dir()
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        Self::platform_config_dir()
    }

    fn platform_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                // Fallback to home directory
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for KilnDirs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_new_creates_instance() {
        let dirs = KilnDirs::new();
        assert!(!dirs.config_dir().as_os_str().is_empty());
    }

    #[test]
    fn test_global_config_path_is_under_config_dir() {
        let dirs = KilnDirs::with_config_dir("/tmp/kiln-test");
        assert_eq!(
            dirs.global_config_path(),
            PathBuf::from("/tmp/kiln-test/config.toml")
        );
    }
}
