use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::loan::{checked_total_payable, Loan, LoanTerms};
use crate::payments::amortization::MAX_TENURE_MONTHS;
use crate::types::LoanId;

/// persisted shape of one loan
///
/// Field names match what the browser repayment screen stored, so its
/// data loads unchanged. Decimals are written as strings; plain JSON
/// numbers (and the screen's string-typed `installments`) are accepted
/// on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    pub id: LoanId,
    pub loan_type: String,
    pub amount: Decimal,
    /// annual rate in percent
    pub interest: Decimal,
    pub tenure: u32,
    pub installments: Decimal,
    pub paid: Decimal,
}

impl From<&Loan> for LoanRecord {
    fn from(loan: &Loan) -> Self {
        Self {
            id: loan.id(),
            loan_type: loan.loan_type().to_string(),
            amount: loan.amount().as_decimal(),
            interest: loan.interest_rate().as_percentage(),
            tenure: loan.tenure_months(),
            installments: loan.installment().as_decimal(),
            paid: loan.paid().as_decimal(),
        }
    }
}

impl TryFrom<LoanRecord> for Loan {
    type Error = LedgerError;

    fn try_from(record: LoanRecord) -> Result<Self> {
        let id = record.id;
        if record.amount <= Decimal::ZERO {
            return Err(LedgerError::corrupt(format!("loan {}: amount must be positive, got {}", id, record.amount)));
        }
        if record.interest < Decimal::ZERO {
            return Err(LedgerError::corrupt(format!("loan {}: negative interest {}", id, record.interest)));
        }
        if record.tenure == 0 {
            return Err(LedgerError::corrupt(format!("loan {}: tenure must be positive", id)));
        }
        if record.tenure > MAX_TENURE_MONTHS {
            return Err(LedgerError::corrupt(format!(
                "loan {}: tenure {} exceeds {} months",
                id, record.tenure, MAX_TENURE_MONTHS
            )));
        }
        if record.installments < Decimal::ZERO {
            return Err(LedgerError::corrupt(format!("loan {}: negative installment {}", id, record.installments)));
        }
        if record.paid < Decimal::ZERO {
            return Err(LedgerError::corrupt(format!("loan {}: negative paid amount {}", id, record.paid)));
        }

        let installment = Money::from_decimal(record.installments);
        if checked_total_payable(installment, record.tenure).is_none() {
            return Err(LedgerError::corrupt(format!(
                "loan {}: installment {} over {} months is out of range",
                id, record.installments, record.tenure
            )));
        }

        let terms = LoanTerms::new(
            id,
            record.loan_type,
            Money::from_decimal(record.amount),
            Rate::from_percent_decimal(record.interest),
            record.tenure,
        );
        Ok(Loan::restore(terms, installment, Money::from_decimal(record.paid)))
    }
}

/// serialize loans to the stored string form
pub fn encode_loans(loans: &[Loan]) -> Result<String> {
    let records: Vec<LoanRecord> = loans.iter().map(LoanRecord::from).collect();
    serde_json::to_string(&records).map_err(|e| LedgerError::Serialization {
        message: e.to_string(),
    })
}

/// parse and validate the stored string form
pub fn decode_loans(raw: &str) -> Result<Vec<Loan>> {
    let records: Vec<LoanRecord> =
        serde_json::from_str(raw).map_err(|e| LedgerError::corrupt(e.to_string()))?;

    let mut seen = HashSet::new();
    let mut loans = Vec::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id) {
            return Err(LedgerError::corrupt(format!("duplicate loan id {}", record.id)));
        }
        loans.push(Loan::try_from(record)?);
    }
    Ok(loans)
}
