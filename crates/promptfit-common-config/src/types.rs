//! Configuration types.

use std::path::{Path, PathBuf};

use promptfit_template::ParseOptions;
use serde::{Deserialize, Serialize};

use crate::loader::ConfigError;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptfitConfig {
    /// Chat template configuration.
    pub template: TemplateConfig,
}

/// Where the chat template comes from and the tokens it is rendered with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Template file, relative paths resolved against the config's base directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Inline template source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Begin-of-sequence token.
    pub bos_token: String,
    /// End-of-sequence token.
    pub eos_token: String,
    /// Whitespace handling.
    pub options: ParseOptions,
}

impl TemplateConfig {
    /// Whether a template location has been configured at all.
    pub fn is_configured(&self) -> bool {
        self.path.is_some() || self.source.is_some()
    }

    /// Load the template text.
    pub fn resolve_source(&self, base_dir: &Path) -> Result<String, ConfigError> {
        match (&self.source, &self.path) {
            (Some(source), None) => Ok(source.clone()),
            (None, Some(path)) => {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    base_dir.join(path)
                };
                if !path.is_file() {
                    return Err(ConfigError::NotFound { path });
                }
                Ok(std::fs::read_to_string(&path)?)
            }
            (Some(_), Some(_)) => Err(ConfigError::ValidationError {
                message: "template.path and template.source are mutually exclusive".to_string(),
            }),
            (None, None) => Err(ConfigError::ValidationError {
                message: "template.path or template.source is required".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptfit_test_utils::temp_file;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: PromptfitConfig = serde_yaml::from_str("template:\n  bos_token: '<s>'\n").unwrap();
        assert_eq!(config.template.bos_token, "<s>");
        assert_eq!(config.template.eos_token, "");
        assert_eq!(config.template.options, ParseOptions::default());
        assert!(!config.template.is_configured());
    }

    #[test]
    fn test_options_override() {
        let yaml = "template:\n  source: hi\n  options:\n    trim_blocks: false\n";
        let config: PromptfitConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.template.options.trim_blocks);
        assert!(config.template.options.lstrip_blocks);
    }

    #[test]
    fn test_resolve_inline_source() {
        let config = TemplateConfig {
            source: Some("{{ messages }}".into()),
            ..Default::default()
        };
        assert_eq!(config.resolve_source(Path::new("/nowhere")).unwrap(), "{{ messages }}");
    }

    #[test]
    fn test_resolve_relative_path() {
        let (dir, _path) = temp_file("chat.jinja", "{{ bos_token }}");
        let config = TemplateConfig {
            path: Some(PathBuf::from("chat.jinja")),
            ..Default::default()
        };
        assert_eq!(config.resolve_source(dir.path()).unwrap(), "{{ bos_token }}");
    }

    #[test]
    fn test_resolve_absolute_path_ignores_base() {
        let (_dir, path) = temp_file("chat.jinja", "abs");
        let config = TemplateConfig {
            path: Some(path),
            ..Default::default()
        };
        assert_eq!(config.resolve_source(Path::new("/nowhere")).unwrap(), "abs");
    }

    #[test]
    fn test_resolve_missing_file() {
        let config = TemplateConfig {
            path: Some(PathBuf::from("missing.jinja")),
            ..Default::default()
        };
        let err = config.resolve_source(Path::new("/nowhere")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_resolve_requires_exactly_one() {
        let err = TemplateConfig::default().resolve_source(Path::new(".")).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));

        let both = TemplateConfig {
            path: Some("a".into()),
            source: Some("b".into()),
            ..Default::default()
        };
        assert!(matches!(
            both.resolve_source(Path::new(".")),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}
