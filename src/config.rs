use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub controller: ControllerConfig,
    pub catalog: CatalogConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Base URL of the cloud controller API.
    pub api_url: String,
    /// Client-credentials token used by the privileged client.
    pub privileged_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the catalog registration API.
    pub api_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the instance-metadata sidecar file. In-memory only
    /// when unset.
    pub metadata_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3002,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:9022".to_string(),
            privileged_token: None,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:9023".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            metadata_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("config").required(false));

        // Add environment variables with prefix "CATALOG_"
        config = config.add_source(
            config::Environment::with_prefix("CATALOG")
                .separator("_")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
