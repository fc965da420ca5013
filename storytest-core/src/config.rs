//! JSON configuration for transform options.
//!
//! A config file describes everything [`TransformOptions`] holds, with hooks
//! expressed as templates:
//!
//! ```json
//! {
//!   "clearBody": true,
//!   "titlePrefix": "Components",
//!   "testPrefixer": { "body": "async () => { await testStory({{id}}); }" },
//!   "beforeEachPrefixer": "async () => { await resetPage(); }"
//! }
//! ```

use crate::emit::EntryGuard;
use crate::options::TransformOptions;
use crate::template::{TemplateBeforeEach, TemplateError, TemplatePrefixer};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Errors from loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
}

/// Template pair for the test prefixer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPrefixerConfig {
    /// Scaffolding statement; never part of the generated test.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<String>,
    /// Expression used as each test's body.
    pub body: String,
}

/// Serializable form of [`TransformOptions`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformConfig {
    pub clear_body: bool,
    pub insert_test_if_empty: bool,
    /// Prepended to every declared title as `<prefix>/<title>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_guard: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_prefixer: Option<TestPrefixerConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_each_prefixer: Option<String>,
}

impl TransformConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a config file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_json(&json)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded transform config");
        Ok(config)
    }

    /// Save a config file.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?).await?;
        Ok(())
    }

    /// Compile templates and build the options.
    pub fn into_options(self) -> Result<TransformOptions, ConfigError> {
        let mut options = TransformOptions::new()
            .with_clear_body(self.clear_body)
            .with_insert_test_if_empty(self.insert_test_if_empty);

        if let Some(prefix) = self.title_prefix.filter(|p| !p.is_empty()) {
            let prefix = prefix.trim_end_matches('/').to_string();
            options = options.with_make_title(move |title| format!("{prefix}/{title}"));
        }
        if let Some(guard) = self.entry_guard {
            options = options.with_entry_guard(EntryGuard::new(guard));
        }
        if let Some(prefixer) = self.test_prefixer {
            let mut template = TemplatePrefixer::new(&prefixer.body)?;
            if let Some(setup) = &prefixer.setup {
                template = template.with_setup(setup)?;
            }
            options = options.with_test_prefixer(template);
        }
        if let Some(expression) = self.before_each_prefixer {
            options = options.with_before_each_prefixer(TemplateBeforeEach::new(&expression)?);
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let config = TransformConfig::from_json(
            r#"{
                "clearBody": true,
                "titlePrefix": "Components",
                "testPrefixer": { "body": "run({{id}})" }
            }"#,
        )
        .unwrap();
        assert!(config.clear_body);
        assert!(!config.insert_test_if_empty);
        assert_eq!(config.title_prefix.as_deref(), Some("Components"));
        assert_eq!(config.test_prefixer.unwrap().body, "run({{id}})");
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(TransformConfig::from_json("{}").unwrap(), TransformConfig::default());
    }

    #[test]
    fn test_into_options() {
        let config = TransformConfig {
            title_prefix: Some("Components/".to_string()),
            entry_guard: Some("import.meta.vitest".to_string()),
            before_each_prefixer: Some("reset".to_string()),
            ..Default::default()
        };
        let options = config.into_options().unwrap();
        assert_eq!(options.make_title("Button"), "Components/Button");
        assert_eq!(options.entry_guard.condition(), "import.meta.vitest");
        assert!(options.before_each_prefixer.is_some());
        assert!(options.test_prefixer.is_none());
    }

    #[test]
    fn test_into_options_rejects_bad_template() {
        let config = TransformConfig {
            test_prefixer: Some(TestPrefixerConfig {
                setup: None,
                body: "run({{storyId}})".to_string(),
            }),
            ..Default::default()
        };
        assert!(matches!(
            config.into_options(),
            Err(ConfigError::Template(TemplateError::UnknownPlaceholder(_)))
        ));
    }

    #[test]
    fn test_wrong_field_type_is_json_error() {
        assert!(matches!(
            TransformConfig::from_json(r#"{ "clearBody": "yes" }"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storytest.json");

        let config = TransformConfig {
            insert_test_if_empty: true,
            before_each_prefixer: Some("reset".to_string()),
            ..Default::default()
        };
        config.save(&path).await.unwrap();

        let loaded = TransformConfig::load(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = TransformConfig::load(dir.path().join("missing.json")).await;
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
