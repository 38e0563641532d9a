use serde::{Deserialize, Serialize};

use crate::model::TagName;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub tags: TagsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub connection_string: Option<String>,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagsConfig {
    /// Tags registered in the catalog at startup
    #[serde(default)]
    pub seed_catalog: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            max_connections: Some(20),
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

        // Environment variables, e.g. CATALOG_SERVER__PORT=8080 or
        // CATALOG_TAGS__SEED_CATALOG=pii,finance
        config = config.add_source(
            config::Environment::with_prefix("CATALOG")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("tags.seed_catalog"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    /// Database URL from config or `DATABASE_URL`; `None` selects the in-memory store
    pub fn database_url(&self) -> Option<String> {
        self.database
            .connection_string
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok())
    }

    pub fn max_connections(&self) -> u32 {
        self.database.max_connections.unwrap_or(20)
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Seed tags that pass validation; malformed entries are reported back
    pub fn seed_tags(&self) -> (Vec<TagName>, Vec<String>) {
        let mut valid = Vec::new();
        let mut rejected = Vec::new();
        for name in &self.tags.seed_catalog {
            match TagName::parse(name.trim()) {
                Ok(tag_name) => valid.push(tag_name),
                Err(_) => rejected.push(name.clone()),
            }
        }
        (valid, rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server_address(), "127.0.0.1:5000");
        assert_eq!(config.max_connections(), 20);
        assert!(config.tags.seed_catalog.is_empty());
    }

    #[test]
    fn test_seed_tags_split_valid_and_rejected() {
        let mut config = AppConfig::default();
        config.tags.seed_catalog = vec![
            "pii".to_string(),
            " finance ".to_string(),
            "Bad Tag".to_string(),
        ];

        let (valid, rejected) = config.seed_tags();
        assert_eq!(
            valid,
            vec![TagName::from_catalog("pii"), TagName::from_catalog("finance")]
        );
        assert_eq!(rejected, vec!["Bad Tag".to_string()]);
    }
}
