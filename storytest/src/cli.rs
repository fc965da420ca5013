//! Command-line arguments.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use storytest_core::TransformConfig;

/// Generate test suites from story files.
#[derive(Parser, Debug, Clone)]
#[command(name = "storytest", version, about)]
pub struct Cli {
    /// Story files to transform
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Directory for generated files, named `<stem>.test.<ext>`
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// JSON config file with transform options and hook templates
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Drop the original module body from the output
    #[arg(long)]
    pub clear_body: bool,

    /// Emit a placeholder suite when a file yields no tests
    #[arg(long)]
    pub insert_test_if_empty: bool,

    /// Prefix every story title as `<prefix>/<title>`
    #[arg(long)]
    pub title_prefix: Option<String>,

    /// Condition guarding the generated suite (default: `!require.main`)
    #[arg(long)]
    pub entry_guard: Option<String>,

    /// Print the parsed story model as JSON instead of transforming
    #[arg(long)]
    pub dump_model: bool,
}

impl Cli {
    /// The config file (if any) with command-line flags applied on top.
    pub async fn transform_config(&self) -> Result<TransformConfig> {
        let mut config = match &self.config {
            Some(path) => TransformConfig::load(path)
                .await
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => TransformConfig::default(),
        };

        config.clear_body |= self.clear_body;
        config.insert_test_if_empty |= self.insert_test_if_empty;
        if let Some(prefix) = &self.title_prefix {
            config.title_prefix = Some(prefix.clone());
        }
        if let Some(guard) = &self.entry_guard {
            config.entry_guard = Some(guard.clone());
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "storytest",
            "--clear-body",
            "--title-prefix",
            "Lib",
            "--out-dir",
            "generated",
            "Button.stories.js",
            "Input.stories.tsx",
        ])
        .unwrap();

        assert!(cli.clear_body);
        assert!(!cli.insert_test_if_empty);
        assert_eq!(cli.title_prefix.as_deref(), Some("Lib"));
        assert_eq!(cli.out_dir, Some(PathBuf::from("generated")));
        assert_eq!(cli.files.len(), 2);
    }

    #[test]
    fn test_files_are_required() {
        assert!(Cli::try_parse_from(["storytest"]).is_err());
    }

    #[tokio::test]
    async fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storytest.json");
        std::fs::write(&path, r#"{ "titlePrefix": "FromFile", "entryGuard": "x" }"#).unwrap();

        let cli = Cli::try_parse_from([
            "storytest",
            "--config",
            path.to_str().unwrap(),
            "--title-prefix",
            "FromFlag",
            "--insert-test-if-empty",
            "a.stories.js",
        ])
        .unwrap();
        let config = cli.transform_config().await.unwrap();

        assert_eq!(config.title_prefix.as_deref(), Some("FromFlag"));
        assert_eq!(config.entry_guard.as_deref(), Some("x"));
        assert!(config.insert_test_if_empty);
    }

    #[tokio::test]
    async fn test_missing_config_names_path() {
        let cli = Cli::try_parse_from(["storytest", "--config", "/nonexistent/cfg.json", "a.js"])
            .unwrap();
        let error = cli.transform_config().await.unwrap_err();
        assert!(error.to_string().contains("/nonexistent/cfg.json"));
    }
}
