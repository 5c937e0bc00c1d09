//! Configuration loading and management

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Where the HTTP server binds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host (e.g., "127.0.0.1")
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// The `host:port` string [`ServerBuilder::serve`](crate::server::ServerBuilder::serve) binds
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Defaults applied to list endpoints when the client sends no paging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub default_size: u32,

    /// Requested sizes above this are clamped
    #[serde(default = "default_max_size")]
    pub max_size: u32,
}

impl PaginationConfig {
    /// Clamp a requested page size against the configured maximum
    pub fn clamp(&self, requested: u32) -> u32 {
        requested.min(self.max_size)
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_size: default_page_size(),
            max_size: default_max_size(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Whether the audit layer is installed at startup
    #[serde(default = "default_true")]
    pub audit_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            pagination: PaginationConfig::default(),
            audit_enabled: default_true(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Clamp a requested page size against the configured maximum
    pub fn clamp_size(&self, requested: u32) -> u32 {
        self.pagination.clamp(requested)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_page_size() -> u32 {
    10
}

fn default_max_size() -> u32 {
    500
}

fn default_true() -> bool {
    true
}
