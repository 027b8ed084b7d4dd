//! `grabar.yaml` configuration.
//!
//! ```yaml
//! locator:
//!   test_attributes: [data-testid, data-test, data-cy, data-qa]
//!   use_class: true
//! emit:
//!   target: python
//!   explicit_wait: true
//!   wait_timeout_secs: 10
//!   action_delay_ms: 500
//!   browser: chrome
//!   header: true
//! api:
//!   base_url: https://api.grabar.dev
//! ```
//!
//! Every key is optional; a missing file means all defaults.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::locator::LocatorConfig;
use crate::result::{GrabarError, GrabarResult};
use crate::script::EmitOptions;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "grabar.yaml";

/// Backend connection settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabarConfig {
    /// Locator synthesis
    pub locator: LocatorConfig,
    /// Script emission defaults
    pub emit: EmitOptions,
    /// Backend
    pub api: ApiConfig,
}

impl GrabarConfig {
    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> GrabarResult<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; a missing file yields defaults
    pub fn load(path: &Path) -> GrabarResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml).map_err(|err| {
            GrabarError::config(format!("{}: {err}", path.display()))
        })
    }

    /// Serialize as YAML
    pub fn to_yaml(&self) -> GrabarResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Write as YAML
    pub fn save(&self, path: &Path) -> GrabarResult<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Reject values that would produce unusable locators or requests
    pub fn validate(&self) -> GrabarResult<()> {
        let attr_name = Regex::new(r"^[a-z][a-z0-9_.:-]*$")
            .map_err(|err| GrabarError::config(err.to_string()))?;
        for attr in &self.locator.test_attributes {
            if !attr_name.is_match(attr) {
                return Err(GrabarError::config(format!(
                    "invalid test attribute name '{attr}'"
                )));
            }
        }

        let http_url = Regex::new(r"^https?://[^\s/]+")
            .map_err(|err| GrabarError::config(err.to_string()))?;
        let urls = [
            ("api.base_url", self.api.base_url.as_deref()),
            ("emit.base_url", self.emit.base_url.as_deref()),
        ];
        for (key, url) in urls {
            if let Some(url) = url.filter(|u| !http_url.is_match(u)) {
                return Err(GrabarError::config(format!("{key} '{url}' is not an http(s) URL")));
            }
        }

        if self.emit.explicit_wait && self.emit.wait_timeout_secs == 0 {
            return Err(GrabarError::config("emit.wait_timeout_secs must be positive"));
        }
        Ok(())
    }
}
