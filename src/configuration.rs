use config::ConfigError;
use std::fmt;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub polka: PolkaSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// "dev" enables the admin reset endpoint
    #[serde(default)]
    pub platform: String,
    #[serde(default = "default_static_root")]
    pub static_root: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationSettings {
    pub fn is_dev(&self) -> bool {
        self.platform == "dev"
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: SecretString,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    /// Run against the in-process store instead of Postgres
    #[serde(default)]
    pub in_memory: bool,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username,
            self.password.expose(),
            self.host,
            self.port,
            self.database_name
        )
    }
}

/// JWT and refresh token settings
#[derive(serde::Deserialize, Clone, Debug)]
pub struct JwtSettings {
    pub secret: SecretString,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// seconds
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
    /// days
    #[serde(default = "default_refresh_token_expiry_days")]
    pub refresh_token_expiry_days: i64,
    /// seconds of clock skew tolerated on `nbf`
    #[serde(default = "default_leeway")]
    pub leeway: u64,
}

#[derive(serde::Deserialize, Clone, Debug, Default)]
pub struct PolkaSettings {
    #[serde(default)]
    pub api_key: SecretString,
}

/// A configuration string that must never reach a log line.
#[derive(serde::Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_static_root() -> String {
    ".".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_issuer() -> String {
    "chirpy".to_string()
}

fn default_access_token_expiry() -> i64 {
    3600
}

fn default_refresh_token_expiry_days() -> i64 {
    60
}

fn default_leeway() -> u64 {
    5
}

/// Load settings from an optional `configuration.*` file, then environment
/// variables such as `APP_JWT__SECRET` or `APP_APPLICATION__PORT`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.port", 8080)?
        .set_default("database.username", "postgres")?
        .set_default("database.password", "")?
        .set_default("database.port", 5432)?
        .set_default("database.host", "localhost")?
        .set_default("database.database_name", "chirpy")?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;

    if settings.jwt.secret.is_empty() {
        return Err(ConfigError::Message("jwt.secret must be set".to_string()));
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let secret = SecretString::new("super-secret-signing-key");
        assert_eq!(format!("{:?}", secret), "[REDACTED]");
        assert_eq!(secret.expose(), "super-secret-signing-key");
    }

    #[test]
    fn test_jwt_defaults() {
        let jwt: JwtSettings = serde_json::from_value(serde_json::json!({
            "secret": "abc"
        }))
        .unwrap();

        assert_eq!(jwt.issuer, "chirpy");
        assert_eq!(jwt.access_token_expiry, 3600);
        assert_eq!(jwt.refresh_token_expiry_days, 60);
        assert_eq!(jwt.leeway, 5);
        assert!(!format!("{:?}", jwt).contains("abc"));
    }

    #[test]
    fn test_platform_dev() {
        let app: ApplicationSettings = serde_json::from_value(serde_json::json!({
            "port": 8080,
            "platform": "dev"
        }))
        .unwrap();

        assert!(app.is_dev());
        assert_eq!(app.host, "127.0.0.1");
    }
}
