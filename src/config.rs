use anyhow::{bail, Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PI_API_BASE_URL: &str = "https://api.minepi.com/v2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testnet,
    Production,
}

/// Which Pi network the backend settles payments on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
}

#[derive(Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Upstream payment platform
    pub pi_api_key: Option<String>,
    pub pi_api_base_url: String,
    pub network: Network,
    pub upstream_timeout: Duration,

    // Domain validation
    pub validation_key: Option<String>,
    pub validation_key_file: PathBuf,

    // Static assets
    pub static_dir: PathBuf,
    pub locales_dir: PathBuf,

    // Metadata
    pub app_name: String,
    pub app_description: String,
    pub app_url: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("pi_api_key", &self.pi_api_key.as_ref().map(|_| "<redacted>"))
            .field("pi_api_base_url", &self.pi_api_base_url)
            .field("network", &self.network)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("validation_key", &self.validation_key.as_ref().map(|_| "<redacted>"))
            .field("validation_key_file", &self.validation_key_file)
            .field("static_dir", &self.static_dir)
            .field("locales_dir", &self.locales_dir)
            .field("app_name", &self.app_name)
            .field("app_description", &self.app_description)
            .field("app_url", &self.app_url)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = Self::parse_environment(var("ENVIRONMENT"))?;
        let network = match var("PI_NETWORK") {
            Some(raw) => Self::parse_network(&raw)?,
            None if environment == Environment::Production => Network::Mainnet,
            None => Network::Testnet,
        };

        let static_dir = PathBuf::from(var("STATIC_DIR").unwrap_or_else(|| "public".to_string()));
        let locales_dir = var("LOCALES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| static_dir.join("i18n"));

        let config = Self {
            environment,
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "10000".to_string())
                .parse()
                .context("Invalid PORT")?,

            pi_api_key: var("PI_API_KEY"),
            pi_api_base_url: var("PI_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PI_API_BASE_URL.to_string()),
            network,
            upstream_timeout: Duration::from_secs(
                var("UPSTREAM_TIMEOUT_SECS")
                    .unwrap_or_else(|| "10".to_string())
                    .parse()
                    .context("Invalid UPSTREAM_TIMEOUT_SECS")?,
            ),

            validation_key: var("PI_VALIDATION_KEY").map(|v| v.trim().to_string()),
            validation_key_file: PathBuf::from(
                var("VALIDATION_KEY_FILE").unwrap_or_else(|| "validation-key.txt".to_string()),
            ),

            static_dir,
            locales_dir,

            app_name: var("APP_NAME").unwrap_or_else(|| "Pi Gateway".to_string()),
            app_description: var("APP_DESCRIPTION")
                .unwrap_or_else(|| "Payment gateway backend".to_string()),
            app_url: var("APP_URL").unwrap_or_else(|| "http://localhost".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment(raw: Option<String>) -> Result<Environment> {
        let env = raw.unwrap_or_else(|| "development".to_string());

        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testnet" | "test" => Ok(Environment::Testnet),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn parse_network(raw: &str) -> Result<Network> {
        match raw.to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            _ => bail!("Unknown PI_NETWORK: {}", raw),
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.pi_api_base_url.starts_with("http") {
            bail!("PI_API_BASE_URL must be HTTP(S) URL");
        }

        if self.upstream_timeout.is_zero() {
            bail!("UPSTREAM_TIMEOUT_SECS must be greater than zero");
        }

        if self.pi_api_key.is_none() {
            if self.environment == Environment::Production {
                bail!("PI_API_KEY required in production");
            }
            tracing::warn!("PI_API_KEY not set, upstream calls will be unauthenticated");
        }

        tracing::info!(
            "Configuration validated for {:?} environment ({:?})",
            self.environment,
            self.network
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_for_development() {
        let config = load(&[]).unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.port, 10000);
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.pi_api_base_url, DEFAULT_PI_API_BASE_URL);
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert_eq!(config.locales_dir, PathBuf::from("public/i18n"));
        assert!(config.pi_api_key.is_none());
    }

    #[test]
    fn production_requires_api_key() {
        let err = load(&[("ENVIRONMENT", "production")]).unwrap_err();
        assert!(err.to_string().contains("PI_API_KEY"));

        let config = load(&[("ENVIRONMENT", "prod"), ("PI_API_KEY", "secret")]).unwrap();
        assert_eq!(config.network, Network::Mainnet);
    }

    #[test]
    fn explicit_network_overrides_environment_default() {
        let config = load(&[
            ("ENVIRONMENT", "production"),
            ("PI_API_KEY", "secret"),
            ("PI_NETWORK", "testnet"),
        ])
        .unwrap();
        assert_eq!(config.network, Network::Testnet);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(load(&[("PORT", "not-a-port")]).is_err());
        assert!(load(&[("ENVIRONMENT", "staging")]).is_err());
        assert!(load(&[("PI_NETWORK", "devnet")]).is_err());
        assert!(load(&[("PI_API_BASE_URL", "ftp://example.com")]).is_err());
        assert!(load(&[("UPSTREAM_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = load(&[("PI_API_KEY", "  "), ("PORT", "")]).unwrap();
        assert!(config.pi_api_key.is_none());
        assert_eq!(config.port, 10000);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config =
            load(&[("PI_API_KEY", "super-secret"), ("PI_VALIDATION_KEY", "token")]).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("\"token\""));
        assert!(rendered.contains("<redacted>"));
    }
}
