pub mod amortization;
pub mod intent;

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::decimal::{Money, MONEY_SCALE};
use crate::errors::{LedgerError, Result};

pub use amortization::{calculate_installment, AmortizationSchedule, ScheduledPayment, MAX_TENURE_MONTHS};
pub use intent::PaymentIntent;

/// parse a payment amount typed into a form field
///
/// Accepts a plain decimal such as `"250"` or `"1250.50"`. Rejects blanks,
/// anything that is not a number, values that are zero or negative, and
/// values finer than one paisa.
pub fn parse_amount(input: &str) -> Result<Money> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::invalid_amount(input));
    }

    let value = Decimal::from_str(trimmed).map_err(|_| LedgerError::invalid_amount(input))?;

    if value.normalize().scale() > MONEY_SCALE {
        return Err(LedgerError::invalid_amount(input));
    }

    let amount = Money::from_decimal(value);
    validate_amount(amount)?;
    Ok(amount)
}

/// a posted amount must be strictly positive
pub fn validate_amount(amount: Money) -> Result<()> {
    if !amount.is_positive() {
        return Err(LedgerError::invalid_amount(amount.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parses_plain_amounts() {
        assert_eq!(parse_amount("250").unwrap(), Money::from_major(250));
        assert_eq!(parse_amount(" 1250.50 ").unwrap(), Money::from_decimal(dec!(1250.5)));
        assert_eq!(parse_amount("0.01").unwrap(), Money::from_minor(1));
        assert_eq!(parse_amount("10.500").unwrap(), Money::from_decimal(dec!(10.5)));
    }

    #[test]
    fn test_rejects_non_positive() {
        for input in ["0", "0.00", "-5", "-0.01"] {
            assert!(
                matches!(parse_amount(input), Err(LedgerError::InvalidAmount { .. })),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_malformed() {
        for input in ["", "   ", "abc", "12abc", "1,000", "NaN", "0.001"] {
            assert!(
                matches!(parse_amount(input), Err(LedgerError::InvalidAmount { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_error_carries_raw_input() {
        let err = parse_amount("twelve").unwrap_err();
        assert_eq!(err, LedgerError::InvalidAmount { input: "twelve".to_string() });
    }
}
