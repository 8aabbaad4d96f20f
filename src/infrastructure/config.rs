// src/infrastructure/config.rs
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{FetchSettings, FieldNames};
use crate::constants::{
    ANKI_CONNECT_VERSION, APP_DIR_NAME, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_QUERY,
};
use crate::domain::DomainError;

/// TOML configuration for ankirubi
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub anki_connect: AnkiConnectConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub fields: FieldsConfig,
    #[serde(default = "default_tags")]
    pub tags: BTreeMap<String, TagStyle>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AnkiConnectConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_version")]
    pub version: u8,
    /// No timeout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct QueryConfig {
    #[serde(default = "default_query")]
    pub query: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FieldsConfig {
    #[serde(default = "default_word_field")]
    pub word: String,
    #[serde(default = "default_rubi_field")]
    pub rubi: String,
    #[serde(default = "default_def_field")]
    pub def: String,
}

/// How a grammar tag from a definition is shown.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TagStyle {
    pub label: String,
    #[serde(default = "default_tag_color")]
    pub color: String,
}

// Default value functions
fn default_host() -> String { DEFAULT_HOST.to_string() }
fn default_port() -> u16 { DEFAULT_PORT }
fn default_version() -> u8 { ANKI_CONNECT_VERSION }
fn default_query() -> String { DEFAULT_QUERY.to_string() }
fn default_word_field() -> String { "word".to_string() }
fn default_rubi_field() -> String { "rubi".to_string() }
fn default_def_field() -> String { "def".to_string() }
fn default_tag_color() -> String { "gray".to_string() }

fn default_tags() -> BTreeMap<String, TagStyle> {
    let godan = [
        "v5aru", "v5b", "v5g", "v5k", "v5k-s", "v5m", "v5n", "v5r", "v5r-i", "v5s", "v5t",
        "v5u", "v5u-s",
    ];
    let mut tags: BTreeMap<String, TagStyle> = godan
        .iter()
        .map(|code| (code.to_string(), tag("godan verb", "cyan")))
        .collect();

    tags.insert("v1".to_string(), tag("ichidan verb", "green"));
    tags.insert("v1-s".to_string(), tag("ichidan verb", "green"));
    tags.insert("vs".to_string(), tag("suru verb", "lightgreen"));
    tags.insert("vk".to_string(), tag("kuru verb", "lightgreen"));
    tags.insert("vt".to_string(), tag("transitive", "yellow"));
    tags.insert("vi".to_string(), tag("intransitive", "yellow"));
    tags.insert("n".to_string(), tag("noun", "magenta"));
    tags.insert("adj-i".to_string(), tag("i-adjective", "blue"));
    tags.insert("adj-na".to_string(), tag("na-adjective", "blue"));
    tags.insert("adv".to_string(), tag("adverb", "lightblue"));
    tags.insert("exp".to_string(), tag("expression", "gray"));
    tags
}

fn tag(label: &str, color: &str) -> TagStyle {
    TagStyle {
        label: label.to_string(),
        color: color.to_string(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anki_connect: AnkiConnectConfig::default(),
            query: QueryConfig::default(),
            fields: FieldsConfig::default(),
            tags: default_tags(),
        }
    }
}

impl Default for AnkiConnectConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            version: default_version(),
            timeout_secs: None,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            query: default_query(),
        }
    }
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self {
            word: default_word_field(),
            rubi: default_rubi_field(),
            def: default_def_field(),
        }
    }
}

impl AnkiConnectConfig {
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Create default configuration file at path
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// `<config_dir>/ankirubi/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.toml"))
    }

    /// Load an explicitly given file, else the default file if it exists, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(?path, "Loading config from explicit path");
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => {
                debug!(?path, "Loading config from default location");
                Self::load(path)
            }
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Apply command-line overrides on top of file values.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        query: Option<String>,
    ) -> Self {
        if let Some(host) = host {
            self.anki_connect.host = host;
        }
        if let Some(port) = port {
            self.anki_connect.port = port;
        }
        if let Some(query) = query {
            self.query.query = query;
        }
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.anki_connect.host.trim().is_empty() {
            return Err(DomainError::Config("host must not be empty".to_string()));
        }
        if self.anki_connect.port == 0 {
            return Err(DomainError::Config("port must not be 0".to_string()));
        }
        if self.query.query.trim().is_empty() {
            return Err(DomainError::Config("query must not be empty".to_string()));
        }
        let fields = [&self.fields.word, &self.fields.rubi, &self.fields.def];
        if fields.iter().any(|name| name.trim().is_empty()) {
            return Err(DomainError::Config(
                "field names must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            query: self.query.query.clone(),
            version: self.anki_connect.version,
            fields: FieldNames {
                word: self.fields.word.clone(),
                rubi: self.fields.rubi.clone(),
                def: self.fields.def.clone(),
            },
        }
    }
}
