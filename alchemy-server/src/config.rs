use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

pub const DEFAULT_WORD_GENERATOR_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set")]
    MissingJwtSecret,
    #[error("invalid {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
    #[error("CLIENT must be an origin like http://localhost:5173, got {0:?}")]
    InvalidClientOrigin(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub client_origin: String,
    pub icons_dir: PathBuf,
    pub seed_dir: PathBuf,
    pub openai_api_key: String,
    pub word_generator_url: String,
    pub word_generator_model: String,
    pub token_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::MissingJwtSecret)?;

        Ok(Self {
            host: parse("HOST", var("HOST", "127.0.0.1"))?,
            port: parse("PORT", var("PORT", "8080"))?,
            database_url: var("DATABASE_URL", "sqlite://alchemy.db?mode=rwc"),
            jwt_secret,
            client_origin: parse_origin(&var("CLIENT", "http://localhost:5173"))?,
            icons_dir: PathBuf::from(var("ICONS", "./icons")),
            seed_dir: PathBuf::from(var("SEED_DIR", "./seed")),
            openai_api_key: lookup("OPENAI_API_KEY").unwrap_or_default(),
            word_generator_url: var("WORD_GENERATOR_URL", DEFAULT_WORD_GENERATOR_URL),
            word_generator_model: var("WORD_GENERATOR_MODEL", "gpt-4o-mini"),
            token_ttl_hours: parse("TOKEN_TTL_HOURS", var("TOKEN_TTL_HOURS", "4"))?,
        })
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { name, value })
}

// warp's CORS filter only accepts a bare `scheme://host[:port]` origin.
fn parse_origin(value: &str) -> Result<String, ConfigError> {
    let origin = value.trim().trim_end_matches('/');
    match origin.split_once("://") {
        Some((scheme, authority))
            if (scheme == "http" || scheme == "https")
                && !authority.is_empty()
                && !authority.contains('/') =>
        {
            Ok(origin.to_string())
        }
        _ => Err(ConfigError::InvalidClientOrigin(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.host.to_string(), "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "sqlite://alchemy.db?mode=rwc");
        assert_eq!(config.client_origin, "http://localhost:5173");
        assert_eq!(config.icons_dir, PathBuf::from("./icons"));
        assert_eq!(config.word_generator_model, "gpt-4o-mini");
        assert_eq!(config.token_ttl_hours, 4);
        assert!(config.openai_api_key.is_empty());
    }

    #[test]
    fn test_secret_is_required() {
        assert_eq!(config_from(&[]).unwrap_err(), ConfigError::MissingJwtSecret);
        assert_eq!(
            config_from(&[("JWT_SECRET", "")]).unwrap_err(),
            ConfigError::MissingJwtSecret
        );
    }

    #[test]
    fn test_invalid_values() {
        let err = config_from(&[("JWT_SECRET", "x"), ("PORT", "eighty")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                name: "PORT",
                value: "eighty".to_string()
            }
        );
        assert!(config_from(&[("JWT_SECRET", "x"), ("HOST", "localhost")]).is_err());
    }

    #[test]
    fn test_client_origin() {
        let config = config_from(&[("JWT_SECRET", "x"), ("CLIENT", "https://play.example.com/")])
            .unwrap();
        assert_eq!(config.client_origin, "https://play.example.com");

        assert!(config_from(&[("JWT_SECRET", "x"), ("CLIENT", "play.example.com")]).is_err());
        assert!(config_from(&[("JWT_SECRET", "x"), ("CLIENT", "http://a.com/app")]).is_err());
    }
}
