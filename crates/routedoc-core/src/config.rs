//! Runtime configuration.
//!
//! Settings are layered with the `config` crate:
//!
//! 1. built-in defaults,
//! 2. an optional TOML file,
//! 3. `ROUTEDOC__<SECTION>__<KEY>` environment variables.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [docs]
//! enabled = true
//! path = "/api-docs"
//! dialect = "legacy"
//!
//! [body]
//! limit_bytes = 102400
//! ```

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::document::Dialect;
use crate::error::{Result, RoutedocError};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "ROUTEDOC";

/// Default JSON body limit (100 KiB).
pub const DEFAULT_BODY_LIMIT: usize = 100 * 1024;

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub docs: DocsSettings,
    pub body: BodySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Where (and whether) the API document and its UI are served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsSettings {
    pub enabled: bool,
    /// Base path; the UI lives at `<path>/`, the raw document next to it.
    pub path: String,
    /// Dialect of the generated document.
    pub dialect: Dialect,
}

impl Default for DocsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/api-docs".to_string(),
            dialect: Dialect::Legacy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodySettings {
    /// Maximum accepted JSON body size in bytes.
    pub limit_bytes: usize,
}

impl Default for BodySettings {
    fn default() -> Self {
        Self {
            limit_bytes: DEFAULT_BODY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    /// JSON file logging instead of pretty stdout output.
    pub production: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            production: false,
        }
    }
}

impl Settings {
    /// Loads settings from an optional TOML file plus environment overrides.
    ///
    /// A missing file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result fails
    /// [`Settings::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses settings from a TOML string, without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or fails validation.
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Self = Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks values that deserialize fine but cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`RoutedocError::ConfigValidation`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(RoutedocError::ConfigValidation(
                "server.port must be non-zero".into(),
            ));
        }
        if self.body.limit_bytes == 0 {
            return Err(RoutedocError::ConfigValidation(
                "body.limit_bytes must be positive".into(),
            ));
        }
        if self.docs.enabled && !self.docs.path.starts_with('/') {
            return Err(RoutedocError::ConfigValidation(format!(
                "docs.path must start with '/', got '{}'",
                self.docs.path
            )));
        }
        Ok(())
    }

    /// Socket address string for binding.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.body.limit_bytes, DEFAULT_BODY_LIMIT);
        assert_eq!(settings.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml("[docs]\npath = \"/swagger\"\n").unwrap();
        assert_eq!(settings.docs.path, "/swagger");
        assert!(settings.docs.enabled);
        assert_eq!(settings.server.port, 8080);
    }

    #[test]
    fn test_dialect_parses_lowercase() {
        let settings = Settings::from_toml("[docs]\ndialect = \"modern\"\n").unwrap();
        assert_eq!(settings.docs.dialect, Dialect::Modern);
    }

    #[test]
    fn test_rejects_relative_docs_path() {
        let err = Settings::from_toml("[docs]\npath = \"docs\"\n").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_rejects_zero_body_limit() {
        assert!(Settings::from_toml("[body]\nlimit_bytes = 0\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nport = 3000\n[logging]\nproduction = true").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.server.port, 3000);
        assert!(settings.logging.production);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(Some(dir.path().join("absent.toml").as_path())).unwrap();
        assert_eq!(settings.docs.path, "/api-docs");
    }
}
