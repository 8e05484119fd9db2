//! Connection configuration and identifier case-folding policy

use crate::{ColscopeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// How column and table identifiers are case-folded in describe results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseFolding {
    /// Keep identifiers as the engine reports them
    #[default]
    Natural,
    /// Fold to upper case
    Upper,
    /// Fold to lower case
    Lower,
}

impl CaseFolding {
    pub fn fold(&self, identifier: &str) -> String {
        match self {
            CaseFolding::Natural => identifier.to_string(),
            CaseFolding::Upper => identifier.to_uppercase(),
            CaseFolding::Lower => identifier.to_lowercase(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306
}

/// Connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number
    #[serde(default = "default_port")]
    pub port: u16,
    /// Database (schema) name
    #[serde(default)]
    pub database: Option<String>,
    /// Username
    #[serde(default)]
    pub username: Option<String>,
    /// Password
    #[serde(default)]
    pub password: Option<String>,
    /// Identifier case folding applied to describe results
    #[serde(default)]
    pub case_folding: CaseFolding,
    /// Additional connection parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: None,
            username: None,
            password: None,
            case_folding: CaseFolding::default(),
            params: HashMap::new(),
        }
    }
}

impl ConnectionConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading connection config");
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Set a connection parameter
    pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Get a string parameter
    pub fn get_string(&self, key: &str) -> Option<String> {
        if let Some(val) = self.params.get(key) {
            return Some(val.clone());
        }
        match key {
            "host" => Some(self.host.clone()),
            "database" => self.database.clone(),
            "username" | "user" => self.username.clone(),
            "password" => self.password.clone(),
            _ => None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ColscopeError::Configuration("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(ColscopeError::Configuration("port must be non-zero".into()));
        }
        Ok(())
    }
}
