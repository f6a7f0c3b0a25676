//! Playground configuration.
//!
//! Read from `config.toml` in the user's config directory. A missing file
//! means defaults; command-line flags override whatever the file says.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("no engine configured: set `command` under `[engine]` in the config file or pass --engine")]
    NoEngine,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Program that prints the JSON lint report. There is no built-in default.
    pub command: Option<String>,
    /// Extra arguments placed before the generated ones.
    pub args: Vec<String>,
}

impl EngineConfig {
    /// Command and arguments to run, with command-line values taking over.
    pub fn resolve(
        &self,
        command: Option<&str>,
        args: &[String],
    ) -> Result<(String, Vec<String>), ConfigError> {
        let program = command
            .or(self.command.as_deref())
            .filter(|program| !program.trim().is_empty())
            .ok_or(ConfigError::NoEngine)?;
        let args = if args.is_empty() {
            self.args.clone()
        } else {
            args.to_vec()
        };
        Ok((program.to_string(), args))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Settings file; defaults to the platform data directory.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    pub engine: EngineConfig,
    pub storage: StorageConfig,
}

impl PlaygroundConfig {
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("org", "peg", "peg-playground")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Load from `path`. Only a missing file falls back to defaults; a file
    /// that exists but does not parse is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let td = tempdir().expect("tempdir");
        let cfg = PlaygroundConfig::load_from(&td.path().join("config.toml")).unwrap();
        assert_eq!(cfg, PlaygroundConfig::default());
        assert_eq!(cfg.engine.command, None);
    }

    #[test]
    fn unconfigured_engine_is_an_error() {
        let cfg = PlaygroundConfig::default();
        assert!(matches!(
            cfg.engine.resolve(None, &[]),
            Err(ConfigError::NoEngine)
        ));
        assert!(matches!(
            cfg.engine.resolve(Some("  "), &[]),
            Err(ConfigError::NoEngine)
        ));
    }

    #[test]
    fn command_line_engine_overrides_file() {
        let engine = EngineConfig {
            command: Some("/opt/peg/lint".to_string()),
            args: vec!["--report".to_string()],
        };
        assert_eq!(
            engine.resolve(None, &[]).unwrap(),
            ("/opt/peg/lint".to_string(), vec!["--report".to_string()])
        );
        assert_eq!(
            engine.resolve(Some("./lint"), &["-x".to_string()]).unwrap(),
            ("./lint".to_string(), vec!["-x".to_string()])
        );
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let td = tempdir().expect("tempdir");
        let path = td.path().join("config.toml");
        std::fs::write(&path, "[engine]\ncommand = \"/opt/peg/lint\"\n").unwrap();

        let cfg = PlaygroundConfig::load_from(&path).unwrap();
        assert_eq!(cfg.engine.command.as_deref(), Some("/opt/peg/lint"));
        assert!(cfg.engine.args.is_empty());
        assert_eq!(cfg.storage.path, None);
    }

    #[test]
    fn broken_file_is_an_error() {
        let td = tempdir().expect("tempdir");
        let path = td.path().join("config.toml");
        std::fs::write(&path, "[engine\ncommand = 1").unwrap();
        assert!(matches!(
            PlaygroundConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
