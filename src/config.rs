//! Application configuration.
//!
//! Loaded once at startup from an optional YAML file, then overridden from the
//! environment:
//!
//! ```yaml
//! http:
//!   addr: "0.0.0.0:8080"
//!   max_body_bytes: 52428800
//! multipart:
//!   max_file_size: 10485760
//!   max_total_size: 52428800
//!   max_fields: 100
//! ```
//!
//! | Variable | Overrides |
//! |---|---|
//! | `BRRTB_ADDR` | `http.addr` |
//! | `BRRTB_MAX_BODY_BYTES` | `http.max_body_bytes` |
//!
//! Every key is optional; missing keys keep their defaults.

use crate::binder::MultipartConfig;
use crate::server::DEFAULT_MAX_BODY_BYTES;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::info;

/// Listen address used when neither the file nor the environment sets one
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub addr: String,
    /// Larger bodies are answered with 413
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub multipart: MultipartConfig,
}

impl AppConfig {
    /// Load from `path` (if any), then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed, an override is not a
    /// valid number, or a limit is zero.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        info!(
            addr = %config.http.addr,
            max_body_bytes = config.http.max_body_bytes,
            max_file_size = config.multipart.max_file_size,
            max_fields = config.multipart.max_fields,
            source = %path.map_or("defaults".to_string(), |p| p.display().to_string()),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse a YAML file without overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(addr) = get("BRRTB_ADDR").filter(|s| !s.trim().is_empty()) {
            self.http.addr = addr.trim().to_string();
        }
        if let Some(raw) = get("BRRTB_MAX_BODY_BYTES") {
            self.http.max_body_bytes = raw
                .trim()
                .parse()
                .with_context(|| format!("BRRTB_MAX_BODY_BYTES is not a byte count: {raw}"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.http.max_body_bytes == 0 {
            bail!("http.max_body_bytes must be greater than zero");
        }
        let m = &self.multipart;
        if m.max_file_size == 0 || m.max_total_size == 0 || m.max_fields == 0 {
            bail!("multipart limits must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.http.addr, DEFAULT_ADDR);
        assert_eq!(config.multipart, MultipartConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml("http:\n  addr: 127.0.0.1:9000\nmultipart:\n  max_fields: 5\n")
            .unwrap();
        assert_eq!(config.http.addr, "127.0.0.1:9000");
        assert_eq!(config.http.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.multipart.max_fields, 5);
        assert_eq!(
            config.multipart.max_file_size,
            MultipartConfig::default().max_file_size
        );
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(AppConfig::from_yaml("database:\n  url: x\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "http:\n  max_body_bytes: 1024").unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.http.max_body_bytes, 1024);
        assert!(AppConfig::from_file(Path::new("/nonexistent/brrtbind.yaml")).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [("BRRTB_ADDR", "127.0.0.1:1"), ("BRRTB_MAX_BODY_BYTES", "64")]
            .into_iter()
            .collect();
        let mut config = AppConfig::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.http.addr, "127.0.0.1:1");
        assert_eq!(config.http.max_body_bytes, 64);

        let mut config = AppConfig::default();
        assert!(config
            .apply_overrides(|k| (k == "BRRTB_MAX_BODY_BYTES").then(|| "lots".to_string()))
            .is_err());
    }

    #[test]
    fn test_zero_limit_invalid() {
        let mut config = AppConfig::default();
        config.http.max_body_bytes = 0;
        assert!(config.validate().is_err());
    }
}
