//! Configuration management for clientgen code generation.
//!
//! This module defines the `Config` struct and related functionality for managing
//! code generation settings. The configuration can be loaded from a YAML or TOML
//! file, created programmatically, or assembled from command-line arguments.
//!
//! # Examples
//!
//! ```no_run
//! use clientgen_core::config::{CollisionPolicy, Config};
//!
//! // Create a new config programmatically
//! let mut config = Config::new("openapi.yaml", "src/api");
//! config.base_url_expr = "import.meta.env.VITE_API_URL".to_string();
//! config.collision_policy = CollisionPolicy::Error;
//!
//! // Or load from a config file
//! # async fn load() -> clientgen_core::Result<()> {
//! let config = Config::from_file("clientgen.yaml").await?;
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::Error;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;
use url::Url;

/// What to do when two operations derive the same output identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// The later operation silently replaces the earlier one
    Overwrite,
    /// The later operation replaces the earlier one and a warning is logged
    #[default]
    Warn,
    /// Generation stops before anything is written
    Error,
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overwrite" => Ok(CollisionPolicy::Overwrite),
            "warn" => Ok(CollisionPolicy::Warn),
            "error" => Ok(CollisionPolicy::Error),
            other => Err(format!(
                "unknown collision policy '{other}' (expected overwrite, warn or error)"
            )),
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CollisionPolicy::Overwrite => "overwrite",
            CollisionPolicy::Warn => "warn",
            CollisionPolicy::Error => "error",
        };
        f.write_str(s)
    }
}

/// Configuration for client generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path or URL of the OpenAPI description
    pub openapi_schema_path: String,

    /// Output directory for generated code
    pub output_dir: String,

    /// TypeScript expression evaluated by generated code to obtain the base address
    #[serde(default = "default_base_url_expr")]
    pub base_url_expr: String,

    /// Fixed base address; takes precedence over `base_url_expr` when set
    #[serde(default)]
    pub base_url: Option<Url>,

    /// Extension of every generated file, without the leading dot
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Handling of operations that derive the same identifier
    #[serde(default)]
    pub collision_policy: CollisionPolicy,

    /// Also write an `index` module re-exporting every generated function
    #[serde(default)]
    pub emit_index: bool,

    /// Optional directory holding a custom `operation.ts.tera`
    #[serde(default)]
    pub template_dir: Option<String>,
}

impl Config {
    /// Create a new Config with default values
    pub fn new(openapi_schema_path: impl Into<String>, output_dir: impl Into<String>) -> Self {
        Self {
            openapi_schema_path: openapi_schema_path.into(),
            output_dir: output_dir.into(),
            base_url_expr: default_base_url_expr(),
            base_url: None,
            file_extension: default_file_extension(),
            collision_policy: CollisionPolicy::default(),
            emit_index: false,
            template_dir: None,
        }
    }

    /// Load configuration from a file.
    ///
    /// Files ending in `.toml` are read as TOML, everything else as YAML.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let config: Self = if path.extension().and_then(|e| e.to_str()) == Some("toml") {
            toml::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would produce unusable output
    pub fn validate(&self) -> crate::Result<()> {
        if self.file_extension.trim().is_empty() {
            return Err(Error::config("file_extension must not be empty"));
        }
        if self.file_extension.contains(['/', '\\', '.']) {
            return Err(Error::config(format!(
                "file_extension '{}' must be a bare extension such as 'ts'",
                self.file_extension
            )));
        }
        if self.base_url.is_none() && self.base_url_expr.trim().is_empty() {
            return Err(Error::config(
                "base_url_expr must not be empty when no base_url is set",
            ));
        }
        Ok(())
    }

    /// Save configuration to a file as YAML
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// The expression interpolated at the front of every generated URL
    pub fn base_url_expression(&self) -> String {
        match &self.base_url {
            Some(url) => {
                // Literal URLs are emitted as a quoted string; no trailing slash
                // since path templates start with '/'.
                let literal = url.as_str().trim_end_matches('/');
                serde_json::Value::String(literal.to_string()).to_string()
            }
            None => self.base_url_expr.clone(),
        }
    }
}

fn default_base_url_expr() -> String {
    "process.env.API_BASE_URL".to_string()
}

fn default_file_extension() -> String {
    "ts".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_config_roundtrip() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("config.yaml");

        let config = Config::new("openapi.json", "output");
        config.save(&file_path).await?;

        let loaded = Config::from_file(&file_path).await?;
        assert_eq!(loaded.openapi_schema_path, "openapi.json");
        assert_eq!(loaded.output_dir, "output");
        assert_eq!(loaded.base_url_expr, default_base_url_expr());
        assert_eq!(loaded.file_extension, "ts");
        assert_eq!(loaded.collision_policy, CollisionPolicy::Warn);
        assert!(!loaded.emit_index);
        assert_eq!(loaded.base_url, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_config_from_toml() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("clientgen.toml");
        tokio::fs::write(
            &file_path,
            r#"
openapi_schema_path = "api.yaml"
output_dir = "gen"
collision_policy = "error"
emit_index = true
"#,
        )
        .await?;

        let loaded = Config::from_file(&file_path).await?;
        assert_eq!(loaded.openapi_schema_path, "api.yaml");
        assert_eq!(loaded.collision_policy, CollisionPolicy::Error);
        assert!(loaded.emit_index);
        assert_eq!(loaded.base_url_expr, "process.env.API_BASE_URL");
        Ok(())
    }

    #[tokio::test]
    async fn test_from_file_rejects_empty_extension() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("clientgen.yaml");
        tokio::fs::write(
            &file_path,
            "openapi_schema_path: api.yaml\noutput_dir: gen\nfile_extension: \"\"\n",
        )
        .await?;

        let err = Config::from_file(&file_path).await.unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("file_extension")));
        Ok(())
    }

    #[test]
    fn test_validate() {
        let mut config = Config::new("a.yaml", "out");
        assert!(config.validate().is_ok());

        config.file_extension = ".ts".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.file_extension = "ts".to_string();
        config.base_url_expr = "  ".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        // A literal base URL makes the expression irrelevant
        config.base_url = Some(Url::parse("https://api.example.com").unwrap());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_url_expression() {
        let mut config = Config::new("a.yaml", "out");
        assert_eq!(config.base_url_expression(), "process.env.API_BASE_URL");

        config.base_url = Some(Url::parse("https://api.example.com/v1/").unwrap());
        assert_eq!(
            config.base_url_expression(),
            "\"https://api.example.com/v1\""
        );
    }

    #[test]
    fn test_collision_policy_from_str() {
        assert_eq!("WARN".parse::<CollisionPolicy>(), Ok(CollisionPolicy::Warn));
        assert_eq!(
            "overwrite".parse::<CollisionPolicy>(),
            Ok(CollisionPolicy::Overwrite)
        );
        assert!("skip".parse::<CollisionPolicy>().is_err());
        assert_eq!(CollisionPolicy::Error.to_string(), "error");
    }
}
