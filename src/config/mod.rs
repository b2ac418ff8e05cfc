use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    /// Account provisioned at startup on the in-memory store
    pub seed: Option<SeedUser>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Test,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub fullname: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set outside development")]
    MissingJwtSecret,

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Upper bound on token lifetime (one year)
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 366;

/// Secret used when nothing is configured in development; rejected elsewhere.
const DEVELOPMENT_JWT_SECRET: &str = "noteful-development-secret";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from any variable source. Tests pass a map here instead of mutating the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("test") => Environment::Test,
            _ => Environment::Development,
        };

        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Test => Self::test(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup)?;

        if config.security.jwt_secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if environment != Environment::Development
            && config.security.jwt_secret == DEVELOPMENT_JWT_SECRET
        {
            return Err(ConfigError::MissingJwtSecret);
        }

        Ok(config)
    }

    fn with_overrides(mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = parse("PORT", &v)?;
        }

        // The test environment talks to its own database
        let url_var = match self.environment {
            Environment::Test => "TEST_DATABASE_URL",
            _ => "DATABASE_URL",
        };
        if let Some(v) = lookup(url_var) {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("STORE_BACKEND") {
            self.database.backend = match v.as_str() {
                "postgres" => StoreBackend::Postgres,
                "memory" => StoreBackend::Memory,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "STORE_BACKEND",
                        value: v,
                    })
                }
            };
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = parse("DATABASE_RUN_MIGRATIONS", &v)?;
        }

        if let Some(v) = lookup("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("JWT_EXPIRY_HOURS") {
            let hours: u64 = parse("JWT_EXPIRY_HOURS", &v)?;
            if hours == 0 || hours > MAX_JWT_EXPIRY_HOURS {
                return Err(ConfigError::InvalidValue {
                    name: "JWT_EXPIRY_HOURS",
                    value: v,
                });
            }
            self.security.jwt_expiry_hours = hours;
        }
        match (lookup("SEED_USERNAME"), lookup("SEED_PASSWORD")) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                let fullname = lookup("SEED_FULLNAME").unwrap_or_else(|| username.clone());
                self.seed = Some(SeedUser {
                    username,
                    password,
                    fullname,
                });
            }
            (None, None) => {}
            (username, _) => {
                return Err(ConfigError::InvalidValue {
                    name: "SEED_USERNAME/SEED_PASSWORD",
                    value: username.unwrap_or_default(),
                })
            }
        }

        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(self)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 5,
                connection_timeout: 30,
                run_migrations: true,
            },
            security: SecurityConfig {
                jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
            seed: None,
        }
    }

    fn test() -> Self {
        Self {
            environment: Environment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 2,
                connection_timeout: 5,
                run_migrations: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 1,
                cors_origins: vec![],
            },
            seed: None,
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 5,
                run_migrations: false,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
                cors_origins: vec![],
            },
            seed: None,
        }
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.port, 8080);
        assert!(config.database.run_migrations);
        assert_eq!(config.security.jwt_secret, DEVELOPMENT_JWT_SECRET);
    }

    #[test]
    fn test_production_requires_secret() {
        let err = AppConfig::from_lookup(lookup(&[("APP_ENV", "production")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingJwtSecret));

        let config = AppConfig::from_lookup(lookup(&[
            ("APP_ENV", "production"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();
        assert!(!config.database.run_migrations);
    }

    #[test]
    fn test_environment_uses_test_database_url() {
        let config = AppConfig::from_lookup(lookup(&[
            ("APP_ENV", "test"),
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://localhost/noteful"),
            ("TEST_DATABASE_URL", "postgres://localhost/noteful_test"),
        ]))
        .unwrap();
        assert_eq!(config.database.url.as_deref(), Some("postgres://localhost/noteful_test"));
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "9090"),
            ("JWT_EXPIRY_HOURS", "2"),
            ("SECURITY_CORS_ORIGINS", "http://a.test, http://b.test,"),
        ]))
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.security.jwt_expiry_hours, 2);
        assert_eq!(config.security.cors_origins, vec!["http://a.test", "http://b.test"]);

        let err = AppConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for PORT: eighty");
    }

    #[test]
    fn test_jwt_expiry_is_bounded() {
        for value in ["0", "8785", "18446744073709551615"] {
            let err = AppConfig::from_lookup(lookup(&[("JWT_EXPIRY_HOURS", value)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { name: "JWT_EXPIRY_HOURS", .. }));
        }

        let config = AppConfig::from_lookup(lookup(&[("JWT_EXPIRY_HOURS", "8784")])).unwrap();
        assert_eq!(config.security.jwt_expiry_hours, MAX_JWT_EXPIRY_HOURS);
    }

    #[test]
    fn test_seed_user_needs_name_and_password() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SEED_USERNAME", "bobuser"),
            ("SEED_PASSWORD", "baseball"),
        ]))
        .unwrap();
        let seed = config.seed.unwrap();
        assert_eq!(seed.username, "bobuser");
        assert_eq!(seed.fullname, "bobuser");

        let err = AppConfig::from_lookup(lookup(&[("SEED_USERNAME", "bobuser")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        assert!(AppConfig::from_lookup(lookup(&[])).unwrap().seed.is_none());
    }

    #[test]
    fn test_store_backend_selection() {
        let backend = |pairs: &[(&str, &str)]| AppConfig::from_lookup(lookup(pairs)).map(|c| c.database.backend);
        assert_eq!(backend(&[]).unwrap(), StoreBackend::Postgres);
        assert_eq!(backend(&[("STORE_BACKEND", "memory")]).unwrap(), StoreBackend::Memory);
        assert!(backend(&[("STORE_BACKEND", "mongo")]).is_err());
    }
}
