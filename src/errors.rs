use thiserror::Error;

use crate::decimal::Money;
use crate::types::LoanId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("invalid payment amount: {input:?}")]
    InvalidAmount {
        input: String,
    },

    #[error("unknown loan: {id}")]
    UnknownLoan {
        id: LoanId,
    },

    #[error("corrupt persisted state: {message}")]
    CorruptState {
        message: String,
    },

    #[error("invalid loan terms: {message}")]
    InvalidLoanTerms {
        message: String,
    },

    #[error("payment exceeds outstanding balance: outstanding {outstanding}, requested {requested}")]
    PaymentExceedsOutstanding {
        outstanding: Money,
        requested: Money,
    },

    #[error("storage error: {message}")]
    Storage {
        message: String,
    },

    #[error("serialization error: {message}")]
    Serialization {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

impl LedgerError {
    pub(crate) fn invalid_amount(input: impl Into<String>) -> Self {
        LedgerError::InvalidAmount {
            input: input.into(),
        }
    }

    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        LedgerError::CorruptState {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
