//! Configuration loading for the track server.
//! Reads igvmb.toml from the current directory or the path given by
//! `--config` / the IGVMB_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;


#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub reference: ReferenceConfig,
    pub annotation: Option<AnnotationConfig>,
    #[serde(default)]
    pub bigwigs: Vec<GroupConfig>,
    #[serde(default)]
    pub bam: Vec<GroupConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_igv_js_url")]
    pub igv_js_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            igv_js_url: default_igv_js_url(),
        }
    }
}

fn default_host()       -> String  { "127.0.0.1".to_string() }
fn default_port()       -> u16     { 8080 }
fn default_static_dir() -> PathBuf { PathBuf::from("static") }
fn default_igv_js_url() -> String  { "https://cdn.jsdelivr.net/npm/igv@2.15.11/dist/igv.min.js".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    pub id: String,
    /// Display name; falls back to `id`.
    pub name: Option<String>,
    pub fasta_url: String,
    pub index_url: String,
    pub locus: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationConfig {
    #[serde(default = "default_annotation_name")]
    pub name: String,
    pub url: String,
    #[serde(default = "default_annotation_format")]
    pub format: String,
}

fn default_annotation_name()   -> String { "Annotation".to_string() }
fn default_annotation_format() -> String { "gff3".to_string() }

/// A group of files loaded together (one sample, one strand pair, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub objects: Vec<ObjectConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectConfig {
    /// Falls back to the filename.
    pub id: Option<String>,
    pub filename: String,
    pub url: String,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host must be set".into()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be set".into()));
        }
        if self.reference.id.trim().is_empty() {
            return Err(ConfigError::Invalid("reference.id must be set".into()));
        }
        if self.reference.fasta_url.trim().is_empty() || self.reference.index_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "reference.fasta_url and reference.index_url must be set".into(),
            ));
        }

        let mut seen = HashSet::new();
        for group in self.bigwigs.iter().chain(self.bam.iter()) {
            if group.id.trim().is_empty() {
                return Err(ConfigError::Invalid("group id must not be empty".into()));
            }
            if !seen.insert(group.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate group id {}", group.id)));
            }
        }
        Ok(())
    }
}
