use anyhow::{Context, Result};
use routemcp::ServerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Demo host configuration, read from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub mcp: McpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    #[serde(default = "default_mount_path")]
    pub mount_path: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub description: String,

    /// Where tool calls are sent; defaults to this server's own address
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub include_operations: Vec<String>,

    #[serde(default = "default_exclude_operations")]
    pub exclude_operations: Vec<String>,

    #[serde(default)]
    pub include_tags: Vec<String>,

    #[serde(default)]
    pub exclude_tags: Vec<String>,

    #[serde(default = "default_enable_docs")]
    pub enable_docs: bool,

    /// Swagger JSON replacing the built-in API documentation
    #[serde(default)]
    pub docs_file: Option<PathBuf>,
}

fn default_mount_path() -> String {
    "/mcp".to_string()
}

fn default_exclude_operations() -> Vec<String> {
    vec!["/api/health".to_string()]
}

fn default_enable_docs() -> bool {
    true
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            mount_path: default_mount_path(),
            name: String::new(),
            version: String::new(),
            description: String::new(),
            base_url: None,
            include_operations: Vec::new(),
            exclude_operations: default_exclude_operations(),
            include_tags: Vec::new(),
            exclude_tags: Vec::new(),
            enable_docs: default_enable_docs(),
            docs_file: None,
        }
    }
}

impl HostConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        // Load config file if it exists, otherwise use defaults
        if !config_path.exists() {
            tracing::info!("Configuration file not found, using defaults");
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(config_path).context("Failed to read configuration file")?;
        toml::from_str(&content).context("Failed to parse configuration file")
    }
}

impl McpConfig {
    /// Bridge configuration for a host listening on `listen_addr`
    pub fn server_config(&self, listen_addr: &str) -> ServerConfig {
        ServerConfig {
            name: self.name.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| format!("http://{}", listen_addr)),
            include_operations: self.include_operations.clone(),
            exclude_operations: self.exclude_operations.clone(),
            include_tags: self.include_tags.clone(),
            exclude_tags: self.exclude_tags.clone(),
            enable_docs: self.enable_docs,
        }
    }
}
