use log::{debug, info, warn};
use serde::Serialize;

use crate::catalog::seed_loans;
use crate::config::LedgerConfig;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::loan::Loan;
use crate::payments::{parse_amount, validate_amount};
use crate::state::{decode_loans, encode_loans};
use crate::store::KeyValueStore;
use crate::types::{CorruptStatePolicy, LedgerOrigin, LoanId, OverpaymentPolicy};

/// the borrower's loans for one session
///
/// Mutations never touch `self`; they hand back the next ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ledger {
    loans: Vec<Loan>,
}

/// a loaded ledger and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub ledger: Ledger,
    pub origin: LedgerOrigin,
    /// why the stored entry was discarded, when it was
    pub discarded: Option<LedgerError>,
}

impl Ledger {
    /// build from loans, rejecting duplicate ids
    pub fn from_loans(loans: Vec<Loan>) -> Result<Self> {
        for (i, loan) in loans.iter().enumerate() {
            if loans[..i].iter().any(|other| other.id() == loan.id()) {
                return Err(LedgerError::InvalidLoanTerms {
                    message: format!("duplicate loan id {}", loan.id()),
                });
            }
        }
        Ok(Self { loans })
    }

    /// fresh ledger from the approved-loan catalog
    pub fn seed() -> Result<Self> {
        Self::from_loans(seed_loans()?)
    }

    /// restore from the store, or seed when nothing is stored
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, config: &LedgerConfig) -> Result<Self> {
        Self::load_with_origin(store, config).map(|outcome| outcome.ledger)
    }

    pub fn load_with_origin<S: KeyValueStore + ?Sized>(store: &S, config: &LedgerConfig) -> Result<LoadOutcome> {
        let raw = match store.get(&config.storage_key)? {
            Some(raw) => raw,
            None => {
                let ledger = Self::seed()?;
                info!("no stored ledger under {:?}, seeded {} loans", config.storage_key, ledger.len());
                return Ok(LoadOutcome {
                    ledger,
                    origin: LedgerOrigin::Seeded,
                    discarded: None,
                });
            }
        };

        match decode_loans(&raw) {
            Ok(loans) => {
                let ledger = Self { loans };
                info!("restored {} loans from {:?}", ledger.len(), config.storage_key);
                Ok(LoadOutcome {
                    ledger,
                    origin: LedgerOrigin::Restored,
                    discarded: None,
                })
            }
            Err(err) => match config.corrupt_state_policy {
                CorruptStatePolicy::Surface => Err(err),
                CorruptStatePolicy::Reseed => {
                    warn!("discarding stored ledger under {:?}: {}", config.storage_key, err);
                    Ok(LoadOutcome {
                        ledger: Self::seed()?,
                        origin: LedgerOrigin::Reseeded,
                        discarded: Some(err),
                    })
                }
            },
        }
    }

    /// write the full ledger under the configured key, replacing what was there
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S, config: &LedgerConfig) -> Result<()> {
        let raw = encode_loans(&self.loans)?;
        store.set(&config.storage_key, raw)?;
        debug!("saved {} loans under {:?}", self.len(), config.storage_key);
        Ok(())
    }

    /// post a payment, accepting amounts beyond the outstanding balance
    pub fn post_payment(&self, loan_id: LoanId, amount: Money) -> Result<Self> {
        self.post_payment_with(loan_id, amount, OverpaymentPolicy::Accept)
    }

    /// post a payment typed into a form field
    pub fn post_payment_str(&self, loan_id: LoanId, input: &str) -> Result<Self> {
        let amount = parse_amount(input)?;
        self.post_payment(loan_id, amount)
    }

    pub fn post_payment_with(&self, loan_id: LoanId, amount: Money, policy: OverpaymentPolicy) -> Result<Self> {
        validate_amount(amount)?;
        let target = self.get(loan_id).ok_or(LedgerError::UnknownLoan { id: loan_id })?;

        if policy == OverpaymentPolicy::Reject && amount > target.outstanding() {
            return Err(LedgerError::PaymentExceedsOutstanding {
                outstanding: target.outstanding(),
                requested: amount,
            });
        }

        let loans = self
            .loans
            .iter()
            .map(|loan| {
                if loan.id() == loan_id {
                    loan.with_payment(amount)
                } else {
                    Ok(loan.clone())
                }
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("posted {} against loan {}", amount, loan_id);
        Ok(Self { loans })
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn get(&self, loan_id: LoanId) -> Option<&Loan> {
        self.loans.iter().find(|loan| loan.id() == loan_id)
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    pub fn total_paid(&self) -> Money {
        self.loans.iter().map(Loan::paid).sum()
    }

    pub fn total_outstanding(&self) -> Money {
        self.loans.iter().map(Loan::outstanding).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::loan::LoanTerms;
    use crate::store::MemoryStore;
    use crate::types::LoanStatus;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn config() -> LedgerConfig {
        LedgerConfig::default()
    }

    #[test]
    fn test_empty_store_seeds_catalog() {
        let store = MemoryStore::new();
        let outcome = Ledger::load_with_origin(&store, &config()).unwrap();

        assert_eq!(outcome.origin, LedgerOrigin::Seeded);
        let ledger = outcome.ledger;
        assert_eq!(ledger.len(), 3);

        let expected = [
            (1, "Personal Loan", 50_000, 5, 12),
            (2, "Car Loan", 200_000, 7, 24),
            (3, "Home Loan", 1_000_000, 8, 120),
        ];
        for (loan, (id, label, amount, rate, tenure)) in ledger.loans().iter().zip(expected) {
            assert_eq!(loan.id(), id);
            assert_eq!(loan.loan_type(), label);
            assert_eq!(loan.amount(), Money::from_major(amount));
            assert_eq!(loan.interest_rate(), Rate::from_percentage(rate));
            assert_eq!(loan.tenure_months(), tenure);
            assert_eq!(loan.paid(), Money::ZERO);
            assert!(loan.installment().is_positive());
        }

        // loading does not write
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_is_idempotent() {
        let store = MemoryStore::new();
        let first = Ledger::load(&store, &config()).unwrap();
        let second = Ledger::load(&store, &config()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let mut store = MemoryStore::new();
        let ledger = Ledger::load(&store, &config())
            .unwrap()
            .post_payment(2, Money::from_decimal(dec!(1234.56)))
            .unwrap();

        ledger.save(&mut store, &config()).unwrap();
        let outcome = Ledger::load_with_origin(&store, &config()).unwrap();

        assert_eq!(outcome.origin, LedgerOrigin::Restored);
        assert_eq!(outcome.ledger, ledger);
    }

    #[test]
    fn test_payments_accumulate() {
        let ledger = Ledger::seed().unwrap();
        let after = ledger
            .post_payment(1, Money::from_major(100))
            .unwrap()
            .post_payment(1, Money::from_major(250))
            .unwrap();

        assert_eq!(after.get(1).unwrap().paid(), Money::from_major(350));
        assert_eq!(after.get(2), ledger.get(2));
        assert_eq!(after.get(3), ledger.get(3));
        // the starting ledger is untouched
        assert_eq!(ledger.get(1).unwrap().paid(), Money::ZERO);
        assert_eq!(after.total_paid(), Money::from_major(350));
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let ledger = Ledger::seed().unwrap();

        let err = ledger.post_payment(1, Money::from_major(-5)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { .. }));

        let err = ledger.post_payment(1, Money::ZERO).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { .. }));
    }

    #[test]
    fn test_rejects_unknown_loan() {
        let ledger = Ledger::seed().unwrap();
        let err = ledger.post_payment(9999, Money::from_major(10)).unwrap_err();
        assert_eq!(err, LedgerError::UnknownLoan { id: 9999 });
    }

    #[test]
    fn test_amount_checked_before_loan() {
        let ledger = Ledger::seed().unwrap();
        let err = ledger.post_payment(9999, Money::from_major(-1)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { .. }));
    }

    #[test]
    fn test_payment_past_decimal_range_is_rejected() {
        let ledger = Ledger::seed().unwrap();
        let full = ledger.post_payment_str(1, "79228162514264337593543950335").unwrap();

        let err = full.post_payment_str(1, "1").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { .. }));
        assert_eq!(full.get(1).unwrap().paid(), Money::from_decimal(Decimal::MAX));

        // other loans still accept payments and totals stay finite
        let after = full.post_payment(2, Money::from_major(10)).unwrap();
        assert_eq!(after.total_paid(), Money::from_decimal(Decimal::MAX));
        assert!(after.total_outstanding().is_positive());
    }

    #[test]
    fn test_post_payment_str() {
        let ledger = Ledger::seed().unwrap();

        let paid = ledger.post_payment_str(3, "12132.76").unwrap();
        assert_eq!(paid.get(3).unwrap().paid(), Money::from_decimal(dec!(12132.76)));
        assert_eq!(paid.get(3).unwrap().installments_covered(), 1);

        for input in ["", "abc", "-5", "0"] {
            assert!(matches!(
                ledger.post_payment_str(3, input),
                Err(LedgerError::InvalidAmount { .. })
            ));
        }
    }

    #[test]
    fn test_overpayment_accepted_by_default() {
        let ledger = Ledger::seed().unwrap();
        let owed = ledger.get(1).unwrap().outstanding();
        let over = ledger.post_payment(1, owed + Money::from_major(1)).unwrap();

        let loan = over.get(1).unwrap();
        assert_eq!(loan.status(), LoanStatus::Settled);
        assert_eq!(loan.excess(), Money::from_major(1));
    }

    #[test]
    fn test_overpayment_rejected_under_policy() {
        let ledger = Ledger::seed().unwrap();
        let owed = ledger.get(1).unwrap().outstanding();

        let err = ledger
            .post_payment_with(1, owed + Money::from_minor(1), OverpaymentPolicy::Reject)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::PaymentExceedsOutstanding {
                outstanding: owed,
                requested: owed + Money::from_minor(1),
            }
        );

        let exact = ledger.post_payment_with(1, owed, OverpaymentPolicy::Reject).unwrap();
        assert_eq!(exact.get(1).unwrap().status(), LoanStatus::Settled);
    }

    #[test]
    fn test_corrupt_state_surfaces() {
        let store = MemoryStore::with_entry("loans", "{{{");
        let err = Ledger::load(&store, &config()).unwrap_err();
        assert!(matches!(err, LedgerError::CorruptState { .. }));
    }

    #[test]
    fn test_corrupt_state_reseeds_under_policy() {
        let store = MemoryStore::with_entry("loans", r#"[{"id":1,"paid":"lots"}]"#);
        let config = LedgerConfig {
            corrupt_state_policy: CorruptStatePolicy::Reseed,
            ..LedgerConfig::default()
        };

        let outcome = Ledger::load_with_origin(&store, &config).unwrap();
        assert_eq!(outcome.origin, LedgerOrigin::Reseeded);
        assert!(matches!(outcome.discarded, Some(LedgerError::CorruptState { .. })));
        assert_eq!(outcome.ledger, Ledger::seed().unwrap());
    }

    #[test]
    fn test_storage_key_is_respected() {
        let mut store = MemoryStore::new();
        let config = LedgerConfig {
            storage_key: "household".to_string(),
            ..LedgerConfig::default()
        };

        Ledger::seed()
            .unwrap()
            .post_payment(1, Money::from_major(5))
            .unwrap()
            .save(&mut store, &config)
            .unwrap();

        assert!(store.get("household").unwrap().is_some());
        assert!(store.get("loans").unwrap().is_none());
    }

    #[test]
    fn test_from_loans_rejects_duplicates() {
        let terms = LoanTerms::new(7, "Gold Loan", Money::from_major(1_000), Rate::ZERO, 10);
        let loan = Loan::originate(terms).unwrap();
        let result = Ledger::from_loans(vec![loan.clone(), loan]);
        assert!(matches!(result, Err(LedgerError::InvalidLoanTerms { .. })));
    }

    #[test]
    fn test_total_outstanding() {
        let ledger = Ledger::seed().unwrap();
        let expected: Money = ledger.loans().iter().map(Loan::total_payable).sum();
        assert_eq!(ledger.total_outstanding(), expected);

        let after = ledger.post_payment(2, Money::from_major(1_000)).unwrap();
        assert_eq!(after.total_outstanding(), expected - Money::from_major(1_000));
    }
}
