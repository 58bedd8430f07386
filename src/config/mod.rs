use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite:./data/goaltrack.db?mode=rwc`
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite:./data/goaltrack.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// How long a login session stays valid
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    /// Mark session cookies `Secure` (enable when served over HTTPS)
    #[serde(default)]
    pub secure_cookies: bool,
    #[serde(default)]
    pub password: PasswordConfig,
}

impl AuthConfig {
    /// Session lifetime, or `None` when `session_ttl_hours` is not positive
    /// or too large to represent.
    pub fn session_ttl(&self) -> Option<chrono::Duration> {
        if self.session_ttl_hours <= 0 {
            return None;
        }
        chrono::Duration::try_hours(self.session_ttl_hours)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl_hours(),
            secure_cookies: false,
            password: PasswordConfig::default(),
        }
    }
}

fn default_session_ttl_hours() -> i64 {
    24 * 7
}

/// Argon2id work factor used when hashing new passwords.
///
/// Existing hashes carry their own parameters, so changing these only
/// affects passwords hashed afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).with_context(|| "Failed to parse configuration file")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.auth.session_ttl().is_none() {
            anyhow::bail!(
                "auth.session_ttl_hours must be a positive number of hours, got {}",
                self.auth.session_ttl_hours
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.auth.session_ttl_hours, 168);
        assert_eq!(config.auth.password.iterations, 2);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8081

            [auth]
            session_ttl_hours = 1

            [auth.password]
            memory_kib = 4096
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.session_ttl(), Some(chrono::Duration::hours(1)));
        assert_eq!(config.auth.password.memory_kib, 4096);
        assert_eq!(config.auth.password.parallelism, 1);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_toml("[server\nport = ").is_err());
    }

    #[test]
    fn test_out_of_range_session_ttl_is_an_error() {
        let huge = format!("[auth]\nsession_ttl_hours = {}", i64::MAX);
        let err = Config::from_toml(&huge).unwrap_err();
        assert!(err.to_string().contains("session_ttl_hours"));

        assert!(Config::from_toml("[auth]\nsession_ttl_hours = 0").is_err());
        assert!(Config::from_toml("[auth]\nsession_ttl_hours = -3").is_err());
    }

    #[test]
    fn test_session_ttl_does_not_panic_on_overflow() {
        let auth = AuthConfig {
            session_ttl_hours: i64::MAX,
            ..AuthConfig::default()
        };
        assert_eq!(auth.session_ttl(), None);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load(Path::new("/nonexistent/goaltrack.toml")).unwrap();
        assert_eq!(config.database.url, "sqlite:./data/goaltrack.db?mode=rwc");
    }
}
