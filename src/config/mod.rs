use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub docs: DocsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size_bytes: usize,
}

/// Which [`ProductRepository`](crate::database::ProductRepository) backs the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection before giving up
    pub connection_timeout: u64,
    pub sync_schema: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// The only origin the CORS policy lets through. `None` allows no origin.
    pub cors_origin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    pub enabled: bool,
    pub site_title: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = Self::environment_from(env::var("APP_ENV").ok().as_deref());

        // Set defaults based on environment, then override with specific env vars
        Self::for_environment(environment).with_overrides(|key| env::var(key).ok())
    }

    fn environment_from(value: Option<&str>) -> Environment {
        match value {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }

    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    /// Apply overrides from `lookup`. Values that fail to parse keep the profile default.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("PRODUCT_API_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PRODUCT_API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Some(v) = lookup("API_MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }

        // Database overrides
        if let Some(v) = lookup("STORE_BACKEND") {
            self.database.backend = match v.to_ascii_lowercase().as_str() {
                "memory" => StoreBackend::Memory,
                "postgres" | "postgresql" => StoreBackend::Postgres,
                _ => self.database.backend,
            };
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Some(v) = lookup("DATABASE_SYNC_SCHEMA") {
            self.database.sync_schema = v.parse().unwrap_or(self.database.sync_schema);
        }

        // Security overrides
        if let Some(v) = lookup("FRONTEND_URL") {
            self.security.cors_origin = Some(v.trim().to_string()).filter(|s| !s.is_empty());
        }

        // Docs overrides
        if let Some(v) = lookup("DOCS_ENABLED") {
            self.docs.enabled = v.parse().unwrap_or(self.docs.enabled);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4000,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 5,
                connection_timeout: 30,
                sync_schema: true,
            },
            security: SecurityConfig {
                cors_origin: Some("http://localhost:5173".to_string()),
            },
            docs: DocsConfig {
                enabled: true,
                site_title: "Products REST API documentation".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4000,
                max_request_size_bytes: 512 * 1024,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 10,
                connection_timeout: 10,
                sync_schema: true,
            },
            security: SecurityConfig { cors_origin: None },
            docs: DocsConfig {
                enabled: true,
                site_title: "Products REST API documentation (staging)".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4000,
                max_request_size_bytes: 256 * 1024,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 5,
                sync_schema: false,
            },
            security: SecurityConfig { cors_origin: None },
            docs: DocsConfig {
                enabled: false,
                site_title: "Products REST API documentation".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 4000);
        assert!(config.database.sync_schema);
        assert!(config.docs.enabled);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.database.sync_schema);
        assert!(!config.docs.enabled);
        assert_eq!(config.security.cors_origin, None);
    }

    #[test]
    fn environment_aliases() {
        assert_eq!(AppConfig::environment_from(Some("prod")), Environment::Production);
        assert_eq!(AppConfig::environment_from(Some("stage")), Environment::Staging);
        assert_eq!(AppConfig::environment_from(Some("whatever")), Environment::Development);
        assert_eq!(AppConfig::environment_from(None), Environment::Development);
    }

    #[test]
    fn overrides_replace_profile_values() {
        let config = AppConfig::development().with_overrides(lookup_from(&[
            ("PRODUCT_API_PORT", "8080"),
            ("STORE_BACKEND", "memory"),
            ("DATABASE_URL", "postgres://u:p@localhost/products"),
            ("FRONTEND_URL", " http://shop.example.com "),
            ("DOCS_ENABLED", "false"),
        ]));

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert_eq!(config.database.url.as_deref(), Some("postgres://u:p@localhost/products"));
        assert_eq!(config.security.cors_origin.as_deref(), Some("http://shop.example.com"));
        assert!(!config.docs.enabled);
    }

    #[test]
    fn port_falls_back_to_plain_port_var() {
        let config = AppConfig::development().with_overrides(lookup_from(&[("PORT", "9001")]));
        assert_eq!(config.server.port, 9001);
    }

    #[test]
    fn unparseable_overrides_keep_defaults() {
        let config = AppConfig::staging().with_overrides(lookup_from(&[
            ("PRODUCT_API_PORT", "not-a-port"),
            ("DATABASE_MAX_CONNECTIONS", "-3"),
            ("STORE_BACKEND", "mongo"),
            ("DATABASE_URL", "   "),
        ]));

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.backend, StoreBackend::Postgres);
        assert_eq!(config.database.url, None);
    }
}
