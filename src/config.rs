use serde::Deserialize;

use crate::history_store::RETENTION_CEILING;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
    /// How many summaries are kept (at most RETENTION_CEILING); older uploads are evicted on insert.
    #[serde(default = "default_retention_limit")]
    pub retention_limit: u32,
}

fn default_retention_limit() -> u32 {
    RETENTION_CEILING
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Request body cap for POST /api/upload/.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            (1..=RETENTION_CEILING).contains(&self.database.retention_limit),
            "database.retention_limit must be between 1 and {}, got {}",
            RETENTION_CEILING,
            self.database.retention_limit
        );
        anyhow::ensure!(
            self.upload.max_upload_bytes > 0,
            "upload.max_upload_bytes must be > 0, got {}",
            self.upload.max_upload_bytes
        );
        Ok(())
    }
}
