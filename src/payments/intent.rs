use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::PaymentConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::payments::validate_amount;

/// descriptor of a requested payment, handed to whatever renders the
/// scannable code; nothing reads a response to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub scheme: String,
    pub payee_address: String,
    pub payee_name: String,
    pub amount: Money,
    pub currency: String,
}

impl PaymentIntent {
    pub fn new(config: &PaymentConfig, amount: Money) -> Result<Self> {
        validate_amount(amount)?;
        Ok(Self {
            scheme: config.scheme.clone(),
            payee_address: config.payee_address.clone(),
            payee_name: config.payee_name.clone(),
            amount,
            currency: config.currency.clone(),
        })
    }

    /// `<scheme>://pay?pa=<payee>&pn=<name>&am=<amount>&cu=<currency>`
    pub fn to_uri(&self) -> String {
        format!(
            "{}://pay?pa={}&pn={}&am={}&cu={}",
            self.scheme,
            urlencoding::encode(&self.payee_address),
            urlencoding::encode(&self.payee_name),
            self.amount,
            urlencoding::encode(&self.currency),
        )
    }
}

impl fmt::Display for PaymentIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}
