//! Configuration management for NFT Upload Server

use std::env;
use std::time::Duration;

use crate::arweave::{ArweaveError, Wallet, Winston};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub arweave: ArweaveConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Gateway the storage client talks to
#[derive(Debug, Clone)]
pub struct ArweaveConfig {
    pub host: String,
    pub port: u16,
    pub protocol: String,
    pub timeout_secs: u64,
}

impl ArweaveConfig {
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Content-Type tag attached to every transaction
    pub content_type: String,
    /// Reject uploads when the wallet holds less than this many winston
    pub min_balance: Option<Winston>,
    /// Number of status reads after posting (at least one)
    pub status_attempts: u32,
    pub status_interval: Duration,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing wallet key: set ARWEAVE_KEY or ARWEAVE_KEY_FILE")]
    MissingWalletKey,

    #[error("Failed to read wallet key file {path}: {source}")]
    KeyFile {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    InvalidWalletKey(#[from] ArweaveError),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            arweave: ArweaveConfig {
                host: "arweave.net".to_string(),
                port: 443,
                protocol: "https".to_string(),
                timeout_secs: 60,
            },
            upload: UploadConfig {
                content_type: "image/png".to_string(),
                min_balance: None,
                status_attempts: 1,
                status_interval: Duration::from_millis(2000),
            },
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let min_balance = match env::var("ARWEAVE_MIN_BALANCE") {
            Ok(value) => Some(value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "ARWEAVE_MIN_BALANCE",
                value,
            })?),
            Err(_) => None,
        };

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port)?,
            },
            arweave: ArweaveConfig {
                host: env::var("ARWEAVE_HOST").unwrap_or(defaults.arweave.host),
                port: parse_var("ARWEAVE_PORT", defaults.arweave.port)?,
                protocol: env::var("ARWEAVE_PROTOCOL").unwrap_or(defaults.arweave.protocol),
                timeout_secs: parse_var("ARWEAVE_TIMEOUT_SECS", defaults.arweave.timeout_secs)?,
            },
            upload: UploadConfig {
                content_type: defaults.upload.content_type,
                min_balance,
                status_attempts: parse_var(
                    "ARWEAVE_STATUS_ATTEMPTS",
                    defaults.upload.status_attempts,
                )?
                .max(1),
                status_interval: Duration::from_millis(parse_var(
                    "ARWEAVE_STATUS_INTERVAL_MS",
                    defaults.upload.status_interval.as_millis() as u64,
                )?),
            },
        })
    }
}

/// Load the wallet from `ARWEAVE_KEY` (JWK JSON) or `ARWEAVE_KEY_FILE`
///
/// Blank values count as unset, so an empty `ARWEAVE_KEY` falls through to
/// the key file.
pub fn load_wallet() -> Result<Wallet, ConfigError> {
    load_wallet_from(non_blank_var("ARWEAVE_KEY"), non_blank_var("ARWEAVE_KEY_FILE"))
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn load_wallet_from(key: Option<String>, key_file: Option<String>) -> Result<Wallet, ConfigError> {
    if let Some(json) = key {
        return Ok(Wallet::from_json(&json)?);
    }

    let path = key_file.ok_or(ConfigError::MissingWalletKey)?;
    let json = std::fs::read_to_string(&path).map_err(|source| ConfigError::KeyFile {
        path: path.clone(),
        source,
    })?;
    Ok(Wallet::from_json(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arweave::{test_wallet, Jwk};

    #[test]
    fn test_default_gateway_url() {
        let config = Config::default();
        assert_eq!(config.arweave.base_url(), "https://arweave.net:443");
        assert_eq!(config.upload.content_type, "image/png");
        assert_eq!(config.upload.status_attempts, 1);
        assert!(config.upload.min_balance.is_none());
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("NFT_UPLOAD_TEST_PORT", "not-a-port");
        let result: Result<u16, _> = parse_var("NFT_UPLOAD_TEST_PORT", 3000);
        env::remove_var("NFT_UPLOAD_TEST_PORT");

        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    fn keyfile_json() -> String {
        let wallet = test_wallet();
        serde_json::to_string(&Jwk::from_private_key(wallet.private_key())).unwrap()
    }

    #[test]
    fn test_load_wallet_from_inline_key() {
        let json = keyfile_json();
        let expected = Wallet::from_json(&json).unwrap();

        let wallet = load_wallet_from(Some(json), None).unwrap();
        assert_eq!(wallet.address(), expected.address());
    }

    #[test]
    fn test_load_wallet_from_key_file() {
        let json = keyfile_json();
        let expected = Wallet::from_json(&json).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        std::fs::write(&path, &json).unwrap();

        let wallet = load_wallet_from(None, Some(path.display().to_string())).unwrap();
        assert_eq!(wallet.address(), expected.address());
    }

    #[test]
    fn test_blank_key_falls_through_to_key_file() {
        let json = keyfile_json();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        std::fs::write(&path, &json).unwrap();

        env::set_var("NFT_UPLOAD_TEST_BLANK_KEY", "  ");
        let key = non_blank_var("NFT_UPLOAD_TEST_BLANK_KEY");
        env::remove_var("NFT_UPLOAD_TEST_BLANK_KEY");
        assert!(key.is_none());

        assert!(load_wallet_from(key, Some(path.display().to_string())).is_ok());
    }

    #[test]
    fn test_missing_wallet_key() {
        assert!(matches!(
            load_wallet_from(None, None),
            Err(ConfigError::MissingWalletKey)
        ));
    }

    #[test]
    fn test_unreadable_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json").display().to_string();

        assert!(matches!(
            load_wallet_from(None, Some(path)),
            Err(ConfigError::KeyFile { .. })
        ));
    }

    #[test]
    fn test_invalid_key_message_not_repeated() {
        let err = load_wallet_from(Some("{}".to_string()), None).unwrap_err();
        let message = err.to_string();

        assert!(matches!(err, ConfigError::InvalidWalletKey(_)));
        assert_eq!(message.matches("Invalid wallet key").count(), 1);
    }

    #[test]
    fn test_parse_var_falls_back_to_default() {
        let result: u16 = parse_var("NFT_UPLOAD_TEST_UNSET", 3000).unwrap();
        assert_eq!(result, 3000);
    }
}
