use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::payments::amortization::{calculate_installment, AmortizationSchedule};
use crate::types::{LoanId, LoanStatus};

/// the immutable terms a loan is approved with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub id: LoanId,
    pub loan_type: String,
    pub amount: Money,
    pub interest_rate: Rate,
    pub tenure_months: u32,
}

impl LoanTerms {
    pub fn new(
        id: LoanId,
        loan_type: impl Into<String>,
        amount: Money,
        interest_rate: Rate,
        tenure_months: u32,
    ) -> Self {
        Self {
            id,
            loan_type: loan_type.into(),
            amount,
            interest_rate,
            tenure_months,
        }
    }
}

/// an approved loan and what has been paid against it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub(crate) terms: LoanTerms,
    pub(crate) installment: Money,
    pub(crate) paid: Money,
}

impl Loan {
    /// originate a loan: the installment is computed here, once
    pub fn originate(terms: LoanTerms) -> Result<Self> {
        let installment = calculate_installment(terms.amount, terms.interest_rate, terms.tenure_months)?;
        if checked_total_payable(installment, terms.tenure_months).is_none() {
            return Err(LedgerError::InvalidLoanTerms {
                message: format!(
                    "total payable of {} over {} months is out of range",
                    installment, terms.tenure_months
                ),
            });
        }
        Ok(Self {
            terms,
            installment,
            paid: Money::ZERO,
        })
    }

    /// rebuild a loan from already-validated persisted fields
    ///
    /// Callers check `checked_total_payable` first.
    pub(crate) fn restore(terms: LoanTerms, installment: Money, paid: Money) -> Self {
        Self {
            terms,
            installment,
            paid,
        }
    }

    pub fn id(&self) -> LoanId {
        self.terms.id
    }

    pub fn loan_type(&self) -> &str {
        &self.terms.loan_type
    }

    pub fn amount(&self) -> Money {
        self.terms.amount
    }

    pub fn interest_rate(&self) -> Rate {
        self.terms.interest_rate
    }

    pub fn tenure_months(&self) -> u32 {
        self.terms.tenure_months
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    /// cached monthly installment
    pub fn installment(&self) -> Money {
        self.installment
    }

    /// cumulative amount posted against this loan
    pub fn paid(&self) -> Money {
        self.paid
    }

    /// installment times tenure
    pub fn total_payable(&self) -> Money {
        // fits by construction, see `checked_total_payable`
        self.installment.saturating_mul(Decimal::from(self.terms.tenure_months))
    }

    /// what is left to pay; zero once settled, never negative
    pub fn outstanding(&self) -> Money {
        self.total_payable().saturating_sub(self.paid)
    }

    /// amount paid beyond the total payable
    pub fn excess(&self) -> Money {
        self.paid.saturating_sub(self.total_payable())
    }

    pub fn status(&self) -> LoanStatus {
        if self.paid.is_zero() {
            LoanStatus::Unpaid
        } else if self.paid < self.total_payable() {
            LoanStatus::PartiallyPaid
        } else {
            LoanStatus::Settled
        }
    }

    /// number of whole installments the paid amount covers
    pub fn installments_covered(&self) -> u32 {
        if self.installment.is_zero() {
            return 0;
        }
        let covered = self
            .paid
            .as_decimal()
            .checked_div(self.installment.as_decimal())
            .and_then(|ratio| ratio.floor().to_u32())
            .unwrap_or(u32::MAX);
        covered.min(self.terms.tenure_months)
    }

    pub fn schedule(&self) -> Result<AmortizationSchedule> {
        AmortizationSchedule::generate(self.terms.amount, self.terms.interest_rate, self.terms.tenure_months)
    }

    /// copy of this loan with `amount` added to `paid`
    pub(crate) fn with_payment(&self, amount: Money) -> Result<Self> {
        let paid = self
            .paid
            .checked_add(amount)
            .ok_or_else(|| LedgerError::invalid_amount(amount.to_string()))?;
        Ok(Self {
            terms: self.terms.clone(),
            installment: self.installment,
            paid,
        })
    }
}

/// `installment * tenure_months`, `None` when it leaves the decimal range
pub(crate) fn checked_total_payable(installment: Money, tenure_months: u32) -> Option<Money> {
    installment.checked_mul(Decimal::from(tenure_months))
}
