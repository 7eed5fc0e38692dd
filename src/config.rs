use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{LedgerError, Result};
use crate::types::{CorruptStatePolicy, OverpaymentPolicy};

/// default store key, the one the repayment screen has always written to
pub const DEFAULT_STORAGE_KEY: &str = "loans";

/// ledger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub storage_key: String,
    pub payment: PaymentConfig,
    pub overpayment_policy: OverpaymentPolicy,
    pub corrupt_state_policy: CorruptStatePolicy,
}

/// settings for building payment-intent descriptors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub scheme: String,
    pub payee_address: String,
    pub payee_name: String,
    pub currency: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            payment: PaymentConfig::default(),
            overpayment_policy: OverpaymentPolicy::Accept,
            corrupt_state_policy: CorruptStatePolicy::Surface,
        }
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            scheme: "upi".to_string(),
            payee_address: "8977799007@ybl".to_string(),
            payee_name: "Loan Repayment".to_string(),
            currency: "INR".to_string(),
        }
    }
}

impl LedgerConfig {
    /// read configuration from a json file; missing fields take defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| LedgerError::InvalidConfiguration {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: LedgerConfig =
            serde_json::from_str(raw).map_err(|e| LedgerError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(LedgerError::InvalidConfiguration {
                message: "storage_key must not be empty".to_string(),
            });
        }
        if self.payment.scheme.is_empty()
            || !self.payment.scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("invalid payment scheme: {:?}", self.payment.scheme),
            });
        }
        if self.payment.payee_address.is_empty() {
            return Err(LedgerError::InvalidConfiguration {
                message: "payee_address must not be empty".to_string(),
            });
        }
        if self.payment.currency.len() != 3 || !self.payment.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("currency must be a 3-letter code, got {:?}", self.payment.currency),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LedgerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage_key, "loans");
        assert_eq!(config.payment.currency, "INR");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = LedgerConfig::from_json(
            r#"{ "storage_key": "household", "overpayment_policy": "Reject" }"#,
        )
        .unwrap();

        assert_eq!(config.storage_key, "household");
        assert_eq!(config.overpayment_policy, OverpaymentPolicy::Reject);
        assert_eq!(config.corrupt_state_policy, CorruptStatePolicy::Surface);
        assert_eq!(config.payment, PaymentConfig::default());
    }

    #[test]
    fn test_rejects_bad_currency() {
        let result = LedgerConfig::from_json(r#"{ "payment": { "currency": "rupees" } }"#);
        assert!(matches!(result, Err(LedgerError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = LedgerConfig::from_json("{ not json");
        assert!(matches!(result, Err(LedgerError::InvalidConfiguration { .. })));
    }
}
