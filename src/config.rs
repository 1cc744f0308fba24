//! Configuration loading and management.
//!
//! Loads dealdeck configuration from `./dealdeck.toml` (or
//! `$DEALDECK_CONFIG_PATH`). Environment variables override file values;
//! file values override defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level dealdeck configuration loaded from TOML.
///
/// Path: `./dealdeck.toml` or `$DEALDECK_CONFIG_PATH`.
/// Env vars override file values; file values override defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Diagram rendering settings (`[render]`).
    pub render: RenderConfig,
    /// Artifact output settings (`[output]`).
    pub output: OutputConfig,
    /// Validation settings (`[validate]`).
    pub validate: ValidateConfig,
}

impl DeckConfig {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// Config file path: `$DEALDECK_CONFIG_PATH` or `./dealdeck.toml`.
    /// If the file does not exist, returns defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from TOML file only, no env overrides.
    fn load_from_file() -> Result<Self> {
        let path = Self::config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                let config: DeckConfig =
                    toml::from_str(&contents).context("failed to parse config TOML")?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no config file found, using defaults");
                Ok(DeckConfig::default())
            }
            Err(e) => Err(anyhow::anyhow!("failed to read config file: {e}")),
        }
    }

    /// Resolve the config file path.
    ///
    /// Checks `$DEALDECK_CONFIG_PATH` first, then `./dealdeck.toml` in the
    /// working directory.
    fn config_path() -> PathBuf {
        match std::env::var("DEALDECK_CONFIG_PATH") {
            Ok(p) => PathBuf::from(p),
            Err(_) => PathBuf::from("dealdeck.toml"),
        }
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function for testability (avoids unsafe `set_var` in tests).
    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("DEALDECK_OUTPUT_DIR") {
            self.output.dir = Some(v);
        }
        if let Some(v) = env("DEALDECK_COMPACT_MODE") {
            match v.parse() {
                Ok(b) => self.render.compact_mode = b,
                Err(_) => tracing::warn!(
                    var = "DEALDECK_COMPACT_MODE",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("DEALDECK_STRICT") {
            match v.parse() {
                Ok(b) => self.validate.strict = b,
                Err(_) => tracing::warn!(
                    var = "DEALDECK_STRICT",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
    }

    /// Parse a TOML string into config (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML cannot be parsed.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: DeckConfig = toml::from_str(toml_str).context("failed to parse config TOML")?;
        Ok(config)
    }
}

/// Diagram rendering settings (`[render]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Embed AI module names inline in the inference node instead of a
    /// separate subgraph.
    pub compact_mode: bool,
    /// List AI modules in the diagram at all (a subgraph is only emitted
    /// when `compact_mode` is off).
    pub list_modules: bool,
    /// Maximum characters for a module label before truncation.
    pub max_module_label_chars: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            compact_mode: true,
            list_modules: true,
            max_module_label_chars: 50,
        }
    }
}

/// Artifact output settings (`[output]`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory for generated artifacts. Defaults to a directory
    /// named `output` next to the input document.
    pub dir: Option<String>,
}

/// Validation settings (`[validate]`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ValidateConfig {
    /// Treat warnings as failures.
    pub strict: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DeckConfig::default();
        assert!(config.render.compact_mode);
        assert!(config.render.list_modules);
        assert_eq!(config.render.max_module_label_chars, 50);
        assert!(config.output.dir.is_none());
        assert!(!config.validate.strict);
    }

    #[test]
    fn test_from_toml() {
        let config = DeckConfig::from_toml(
            r#"
[render]
compact_mode = false
max_module_label_chars = 40

[output]
dir = "decks"

[validate]
strict = true
"#,
        )
        .expect("parse config");
        assert!(!config.render.compact_mode);
        assert!(config.render.list_modules, "unset field keeps its default");
        assert_eq!(config.render.max_module_label_chars, 40);
        assert_eq!(config.output.dir.as_deref(), Some("decks"));
        assert!(config.validate.strict);
    }

    #[test]
    fn test_env_overrides_win() {
        let mut config = DeckConfig::from_toml("[output]\ndir = \"from-file\"")
            .expect("parse config");
        config.apply_overrides(|key| match key {
            "DEALDECK_OUTPUT_DIR" => Some("from-env".to_owned()),
            "DEALDECK_STRICT" => Some("true".to_owned()),
            _ => None,
        });
        assert_eq!(config.output.dir.as_deref(), Some("from-env"));
        assert!(config.validate.strict);
    }

    #[test]
    fn test_invalid_env_override_ignored() {
        let mut config = DeckConfig::default();
        config.apply_overrides(|key| match key {
            "DEALDECK_COMPACT_MODE" => Some("not-a-bool".to_owned()),
            _ => None,
        });
        assert!(config.render.compact_mode, "invalid override keeps default");
    }
}
