use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::loan::{Loan, LoanTerms};

/// the loans approved for this borrower; used only when nothing is stored yet
pub fn approved_loans() -> Vec<LoanTerms> {
    vec![
        LoanTerms::new(1, "Personal Loan", Money::from_major(50_000), Rate::from_percentage(5), 12),
        LoanTerms::new(2, "Car Loan", Money::from_major(200_000), Rate::from_percentage(7), 24),
        LoanTerms::new(3, "Home Loan", Money::from_major(1_000_000), Rate::from_percentage(8), 120),
    ]
}

/// originate every catalog entry with `paid = 0`
pub fn seed_loans() -> Result<Vec<Loan>> {
    approved_loans().into_iter().map(Loan::originate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_are_unique() {
        let catalog = approved_loans();
        let ids: HashSet<_> = catalog.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), catalog.len());
        assert_eq!(ids, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn test_seed_installments() {
        let loans = seed_loans().unwrap();
        let installments: Vec<_> = loans.iter().map(|l| l.installment()).collect();
        assert_eq!(
            installments,
            vec![
                Money::from_decimal(dec!(4280.37)),
                Money::from_decimal(dec!(8954.52)),
                Money::from_decimal(dec!(12132.76)),
            ]
        );
        assert!(loans.iter().all(|l| l.paid().is_zero()));
    }
}
