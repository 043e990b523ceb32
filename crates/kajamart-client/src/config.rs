//! # Client Configuration
//!
//! Where the REST API lives and how money is shown.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     KAJAMART_API_URL=https://api.kajamart.co                           │
//! │     KAJAMART_API_TIMEOUT_SECS=15                                       │
//! │     KAJAMART_CURRENCY_SYMBOL=COP$                                      │
//! │     KAJAMART_CURRENCY_DECIMALS=0                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/kajamart/client.toml (Linux)                             │
//! │     ~/Library/Application Support/com.kajamart.kajamart/client.toml    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:3000, 30 s timeout, Colombian peso format         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "https://api.kajamart.co"
//! timeout_secs = 30
//!
//! [currency]
//! code = "COP"
//! symbol = "$"
//! decimals = 0
//! thousands_separator = "."
//! decimal_separator = ","
//! ```

use std::path::PathBuf;

use kajamart_core::{CurrencyFormat, MAX_DECIMALS};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// API Settings
// =============================================================================

/// REST API connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the Kajamart API; endpoints are joined under it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ApiSettings {
    /// Parses and checks the base URL.
    pub fn parsed_base_url(&self) -> ClientResult<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("Invalid API URL '{}': {}", self.base_url, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::Config(format!(
                "API URL must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        Ok(url)
    }
}

// =============================================================================
// Currency Settings
// =============================================================================

/// How amounts are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySettings {
    /// ISO 4217 code, informational.
    #[serde(default = "default_currency_code")]
    pub code: String,

    #[serde(default = "default_currency_symbol")]
    pub symbol: String,

    #[serde(default)]
    pub decimals: u8,

    #[serde(default = "default_thousands_separator")]
    pub thousands_separator: char,

    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,
}

fn default_currency_code() -> String {
    "COP".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_thousands_separator() -> char {
    '.'
}

fn default_decimal_separator() -> char {
    ','
}

impl Default for CurrencySettings {
    fn default() -> Self {
        CurrencySettings {
            code: default_currency_code(),
            symbol: default_currency_symbol(),
            decimals: 0,
            thousands_separator: default_thousands_separator(),
            decimal_separator: default_decimal_separator(),
        }
    }
}

// =============================================================================
// Client Config
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub currency: CurrencySettings,
}

impl ClientConfig {
    /// Loads configuration: file (if present), then environment, then validation.
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        self.api.parsed_base_url()?;

        if self.api.timeout_secs == 0 {
            return Err(ClientError::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.currency.decimals > MAX_DECIMALS {
            return Err(ClientError::Config(format!(
                "currency decimals must be at most {}, got {}",
                MAX_DECIMALS, self.currency.decimals
            )));
        }

        if self.currency.thousands_separator == self.currency.decimal_separator {
            return Err(ClientError::Config(
                "thousands and decimal separators must differ".into(),
            ));
        }

        Ok(())
    }

    /// Formatter for the configured currency.
    pub fn currency_format(&self) -> CurrencyFormat {
        CurrencyFormat {
            symbol: self.currency.symbol.clone(),
            decimals: self.currency.decimals,
            thousands_separator: self.currency.thousands_separator,
            decimal_separator: self.currency.decimal_separator,
        }
    }

    /// Default config file location for the platform.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "kajamart", "kajamart")
            .map(|dirs| dirs.config_dir().join("client.toml"))
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `KAJAMART_*` overrides from a lookup function.
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("KAJAMART_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(timeout) = lookup("KAJAMART_API_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring invalid KAJAMART_API_TIMEOUT_SECS"),
            }
        }

        if let Some(symbol) = lookup("KAJAMART_CURRENCY_SYMBOL") {
            self.currency.symbol = symbol;
        }

        if let Some(decimals) = lookup("KAJAMART_CURRENCY_DECIMALS") {
            match decimals.parse::<u8>() {
                Ok(d) => self.currency.decimals = d,
                Err(_) => warn!(value = %decimals, "Ignoring invalid KAJAMART_CURRENCY_DECIMALS"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kajamart_core::Money;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.currency_format().format(Money::from_minor(35500)),
            "$ 35.500"
        );
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://api.kajamart.co"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://api.kajamart.co");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.currency, CurrencySettings::default());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ClientConfig::default();
        config.api.base_url = "ftp://files.kajamart.co".to_string();
        assert!(matches!(config.validate(), Err(ClientError::Config(_))));

        let mut config = ClientConfig::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.currency.decimals = 9;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.currency.decimal_separator = '.';
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("KAJAMART_API_URL", "https://staging.kajamart.co"),
            ("KAJAMART_API_TIMEOUT_SECS", "abc"),
            ("KAJAMART_CURRENCY_DECIMALS", "2"),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "https://staging.kajamart.co");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.currency.decimals, 2);
        assert_eq!(config.currency.symbol, "$");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("client.toml");

        let mut config = ClientConfig::default();
        config.api.base_url = "https://api.kajamart.co".to_string();
        config.api.timeout_secs = 12;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: ClientConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(&path, "[api\nbase_url = ").unwrap();

        assert!(matches!(
            ClientConfig::load(Some(path.clone())),
            Err(ClientError::Config(_))
        ));
        assert_eq!(ClientConfig::load_or_default(Some(path)).api.timeout_secs, 30);
    }
}
