//! Repository configuration file support.
//!
//! The mock server optionally reads a `repository.toml`:
//!
//! ```toml
//! [repository]
//! seed_demo_data = true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::repository::RepositoryError;

/// Repository configuration from file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub repository: RepositorySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    /// Load the demo accounts and curriculum at startup.
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            seed_demo_data: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load `repository.toml` from the current directory or `edu_client/`.
    ///
    /// Falls back to the defaults when neither file exists.
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = [
            PathBuf::from("repository.toml"),
            PathBuf::from("edu_client/repository.toml"),
        ];

        match search_paths.iter().find(|p| p.exists()) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[repository]
seed_demo_data = false
"#;
        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert!(!config.repository.seed_demo_data);
    }

    #[test]
    fn test_missing_table_uses_defaults() {
        let config: RepositoryConfig = toml::from_str("").unwrap();
        assert!(config.repository.seed_demo_data);
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repository.toml");
        fs::write(&path, "[repository]\nseed_demo_data = \"yes\"\n").unwrap();
        let err = RepositoryConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
    }
}
