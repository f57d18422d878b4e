use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Application configuration.
///
/// Built-in defaults, then an optional `backoffice.toml`, then `APP__*`
/// environment variables (e.g. `APP__SERVER__PORT=9000`). `DATABASE_URL`
/// overrides `database.url` when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub items: ItemsConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

/// Line item handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsConfig {
    /// Reject item ids that belong to another record instead of dropping them.
    pub reject_foreign_ids: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/backoffice".to_string(),
                max_connections: 10,
                run_migrations: true,
            },
            items: ItemsConfig {
                reject_foreign_ids: false,
            },
            mail: MailConfig {
                smtp_host: "localhost".to_string(),
                smtp_port: None,
                username: None,
                password: None,
                from: "backoffice@example.com".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from `backoffice.toml` and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_sources(
            Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
            std::env::var("DATABASE_URL").ok(),
        )
    }

    fn from_sources(env: Environment, database_url: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("backoffice").required(false))
            .add_source(env);

        if let Some(url) = database_url {
            builder = builder.set_override("database.url", url)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("APP")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(Some(map))
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let config = AppConfig::from_sources(env_from(&[]), None).unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
        assert!(!config.items.reject_foreign_ids);
        assert!(config.database.run_migrations);
        assert!(config.mail.username.is_none());
    }

    #[test]
    fn environment_overrides_nested_keys() {
        let config = AppConfig::from_sources(
            env_from(&[
                ("APP__SERVER__PORT", "9000"),
                ("APP__ITEMS__REJECT_FOREIGN_IDS", "true"),
                ("APP__MAIL__SMTP_HOST", "smtp.example.com"),
            ]),
            None,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(config.items.reject_foreign_ids);
        assert_eq!(config.mail.smtp_host, "smtp.example.com");
    }

    #[test]
    fn database_url_wins_over_everything() {
        let config = AppConfig::from_sources(
            env_from(&[("APP__DATABASE__URL", "postgres://env/db")]),
            Some("postgres://override/db".to_string()),
        )
        .unwrap();
        assert_eq!(config.database.url, "postgres://override/db");
    }
}
