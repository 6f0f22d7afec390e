use std::{env::var, time::Duration};

use price::{ALPACA_DATA_URL, AlpacaConfig, COINGECKO_API_URL, Symbol};
use thiserror::Error;

pub const DEFAULT_FREQUENCY: Duration = Duration::from_secs(60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{key} has invalid value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Presentation options fixed when a tracker is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    pub show_nickname: bool,
    pub show_color: bool,
    pub flash_on_change: bool,
    pub frequency: Duration,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_nickname: false,
            show_color: false,
            flash_on_change: false,
            frequency: DEFAULT_FREQUENCY,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub ticker: String,
    pub crypto_name: Option<String>,
    pub stock_name: Option<String>,
    pub display: DisplayConfig,
    pub coingecko_api: String,
    pub alpaca: Option<AlpacaConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| var(key).ok())
    }

    /// Build and validate the config from any key/value source. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token =
            get("DISCORD_BOT_TOKEN").ok_or(ConfigError::Missing("DISCORD_BOT_TOKEN"))?;
        let ticker = get("TICKER").ok_or(ConfigError::Missing("TICKER"))?;

        let display = DisplayConfig {
            show_nickname: parse_bool("SET_NICKNAME", get("SET_NICKNAME"))?,
            show_color: parse_bool("SET_COLOR", get("SET_COLOR"))?,
            flash_on_change: parse_bool("FLASH_CHANGE", get("FLASH_CHANGE"))?,
            frequency: parse_frequency(get("FREQUENCY"))?,
        };

        let crypto_name = get("CRYPTO_NAME");

        let alpaca = match (get("APCA_API_KEY_ID"), get("APCA_API_SECRET_KEY")) {
            (Some(key_id), Some(secret)) => Some(
                AlpacaConfig::new(key_id, secret).with_base_api(
                    get("APCA_API_BASE_URL").unwrap_or_else(|| ALPACA_DATA_URL.to_string()),
                ),
            ),
            _ => None,
        };

        if crypto_name.is_none() && alpaca.is_none() {
            let key = if get("APCA_API_KEY_ID").is_none() {
                "APCA_API_KEY_ID"
            } else {
                "APCA_API_SECRET_KEY"
            };
            return Err(ConfigError::Missing(key));
        }

        Ok(Self {
            discord_token,
            ticker,
            crypto_name,
            stock_name: get("STOCK_NAME"),
            display,
            coingecko_api: get("COINGECKO_API_URL")
                .unwrap_or_else(|| COINGECKO_API_URL.to_string()),
            alpaca,
        })
    }

    /// Crypto when a CoinGecko name is configured, stock otherwise.
    pub fn symbol(&self) -> Symbol {
        match &self.crypto_name {
            Some(slug) => Symbol::crypto(&self.ticker, slug),
            None => Symbol::stock(&self.ticker),
        }
    }

    pub fn display_name(&self) -> String {
        match (&self.crypto_name, &self.stock_name) {
            (None, Some(name)) => name.clone(),
            _ => self.ticker.trim().to_uppercase(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("ticker", &self.ticker)
            .field("crypto_name", &self.crypto_name)
            .field("stock_name", &self.stock_name)
            .field("display", &self.display)
            .field("coingecko_api", &self.coingecko_api)
            .field("alpaca", &self.alpaca.as_ref().map(|a| &a.base_api))
            .finish_non_exhaustive()
    }
}

fn parse_bool(key: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(false);
    };

    match value.trim().to_lowercase().as_str() {
        "1" | "t" | "true" => Ok(true),
        "0" | "f" | "false" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value,
            reason: "expected true or false",
        }),
    }
}

fn parse_frequency(value: Option<String>) -> Result<Duration, ConfigError> {
    let Some(value) = value else {
        return Ok(DEFAULT_FREQUENCY);
    };

    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            key: "FREQUENCY",
            value,
            reason: "must be at least one second",
        }),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(_) => Err(ConfigError::Invalid {
            key: "FREQUENCY",
            value,
            reason: "expected whole seconds",
        }),
    }
}
