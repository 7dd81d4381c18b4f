use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum accepted request body in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    pub key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Listing JSON file loaded into the catalog at startup
    #[serde(default)]
    pub preload_path: Option<String>,
    #[serde(default = "default_max_templates")]
    pub max_templates: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_body_limit() -> usize {
    1024 * 1024 // 1 MiB
}

fn default_max_templates() -> usize {
    crate::template::DEFAULT_MAX_TEMPLATES
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("server.body_limit", default_body_limit() as i64)?
            .set_default("catalog.max_templates", default_max_templates() as i64)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // SERVER_HOST, SERVER_PORT, API_KEY, SERVER_CORS_ORIGINS
            .add_source(
                Environment::default()
                    .separator("_")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            )
            // Keys containing underscores cannot come through the separator above
            .set_override_option("server.body_limit", env::var("SERVER_BODY_LIMIT").ok())?
            .set_override_option("catalog.preload_path", env::var("CATALOG_PRELOAD_PATH").ok())?
            .set_override_option(
                "catalog.max_templates",
                env::var("CATALOG_MAX_TEMPLATES").ok(),
            )?;

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            api: ApiConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            body_limit: default_body_limit(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            preload_path: None,
            max_templates: default_max_templates(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8082);
        assert_eq!(settings.server.body_limit, 1024 * 1024);
        assert!(settings.api.key.is_none());
        assert!(settings.catalog.preload_path.is_none());
        assert_eq!(settings.server_addr(), "0.0.0.0:8082");
    }
}
