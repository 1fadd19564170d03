//! Engine configuration loaded from TOML.
//!
//! ```toml
//! exchange = "0x00000000000000000000000000000000000000e1"
//! num_ticks = 100
//! accepted_schemes = ["eip712", "eth_sign"]
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use std::path::Path;

use alloy_primitives::Address;
use serde::Deserialize;

use crate::codec::OrderCodec;
use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use crate::signature::{SignatureScheme, SignatureVerifier};
use crate::types::amount::DEFAULT_NUM_TICKS;

/// Environment variable naming the config file for the binary
pub const CONFIG_ENV: &str = "EXIT_SETTLEMENT_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Address orders must be bound to
    pub exchange: Address,
    /// Ticks per whole unit of collateral; prices range over `1..num_ticks`
    pub num_ticks: u64,
    pub accepted_schemes: Vec<SignatureScheme>,
    pub logging: LoggingConfig,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            exchange: Address::ZERO,
            num_ticks: DEFAULT_NUM_TICKS,
            accepted_schemes: SignatureScheme::ALL.to_vec(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SettlementConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::from_toml_str(&content)
    }

    /// Defaults when `EXIT_SETTLEMENT_CONFIG` is unset
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::load(path),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_ticks < 2 {
            return Err(ConfigError::InvalidValue {
                field: "num_ticks",
                reason: format!("must be at least 2, got {}", self.num_ticks),
            });
        }
        if self.accepted_schemes.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "accepted_schemes",
                reason: "at least one scheme is required".into(),
            });
        }
        Ok(())
    }

    pub fn with_exchange(mut self, exchange: Address) -> Self {
        self.exchange = exchange;
        self
    }

    pub fn codec(&self) -> OrderCodec {
        OrderCodec::new(self.num_ticks)
    }

    pub fn verifier(&self) -> SignatureVerifier {
        SignatureVerifier::new(self.accepted_schemes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SettlementConfig::from_toml_str("").unwrap();
        assert_eq!(config.exchange, Address::ZERO);
        assert_eq!(config.num_ticks, 100);
        assert_eq!(config.accepted_schemes, SignatureScheme::ALL.to_vec());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_full_document() {
        let config = SettlementConfig::from_toml_str(
            r#"
            exchange = "0x00000000000000000000000000000000000000e1"
            num_ticks = 1000
            accepted_schemes = ["eip712"]

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.exchange, Address::with_last_byte(0xe1));
        assert_eq!(config.codec().num_ticks(), 1000);
        assert!(config.verifier().accepts(SignatureScheme::Eip712));
        assert!(!config.verifier().accepts(SignatureScheme::EthSign));
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_validation() {
        let err = SettlementConfig::from_toml_str("num_ticks = 1").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "num_ticks", .. }));

        let err = SettlementConfig::from_toml_str("accepted_schemes = []").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "accepted_schemes", .. }));

        let err = SettlementConfig::from_toml_str("accepted_schemes = [\"ecdsa\"]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SettlementConfig::load("/nonexistent/exit-settlement.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile(_)));
    }
}
