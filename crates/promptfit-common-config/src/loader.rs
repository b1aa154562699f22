//! Configuration file loading and parsing.

use crate::types::PromptfitConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file location relative to the project directory.
pub const CONFIG_FILE: &str = ".promptfit/config.yaml";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error("invalid variable pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Project directory; relative template paths resolve against it.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the project config file.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(CONFIG_FILE)
    }

    /// Load configuration from `.promptfit/config.yaml`, or defaults if absent.
    pub fn load(&self) -> Result<PromptfitConfig, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            return Ok(PromptfitConfig::default());
        }

        Self::load_file(&config_path)
    }

    /// Load configuration from an explicit file, which must exist.
    pub fn load_file(path: &Path) -> Result<PromptfitConfig, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, |var| std::env::var(var).ok())
    }

    /// Parse YAML after expanding variables through `lookup`.
    pub fn parse(
        contents: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<PromptfitConfig, ConfigError> {
        let expanded = expand_vars(contents, lookup)?;

        let config: PromptfitConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        validate(&config)?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

/// Expand variables in the form `${VAR}` or `${VAR:-default}`.
pub fn expand_vars(
    content: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}")?;
    let mut result = String::with_capacity(content.len());
    let mut last = 0;

    for cap in re.captures_iter(content) {
        let Some(full) = cap.get(0) else { continue };
        let var_name = &cap[1];

        let value = match lookup(var_name) {
            Some(v) => v,
            None => match cap.get(2) {
                Some(default) => default.as_str().to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result.push_str(&content[last..full.start()]);
        result.push_str(&value);
        last = full.end();
    }

    result.push_str(&content[last..]);
    Ok(result)
}

/// Validate configuration values.
fn validate(config: &PromptfitConfig) -> Result<(), ConfigError> {
    let template = &config.template;

    if template.path.is_some() && template.source.is_some() {
        return Err(ConfigError::ValidationError {
            message: "template.path and template.source are mutually exclusive".to_string(),
        });
    }

    if template.source.as_deref().is_some_and(|s| s.trim().is_empty()) {
        return Err(ConfigError::ValidationError {
            message: "template.source must not be empty".to_string(),
        });
    }

    Ok(())
}
