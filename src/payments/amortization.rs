use log::debug;
use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};

/// longest tenure the calculator accepts: one hundred years
pub const MAX_TENURE_MONTHS: u32 = 1_200;

/// calculate the fixed monthly installment (EMI) that retires `principal`
/// over `tenure_months` at the nominal `annual_rate`
///
/// EMI = P * r * (1 + r)^n / ((1 + r)^n - 1), with r the monthly rate.
/// A zero rate degenerates to straight division. The result is rounded to
/// two fractional digits, half away from zero. Terms whose installment does
/// not fit in a `Decimal` are rejected with `InvalidLoanTerms`.
pub fn calculate_installment(principal: Money, annual_rate: Rate, tenure_months: u32) -> Result<Money> {
    validate_terms(principal, annual_rate, tenure_months)?;

    let r = annual_rate.monthly_rate().as_decimal();

    let installment = if r.is_zero() {
        principal / Decimal::from(tenure_months)
    } else {
        let compound = compound_factor(r, tenure_months).ok_or_else(|| overflow(principal, annual_rate, tenure_months))?;
        let installment = principal
            .as_decimal()
            .checked_mul(r)
            .and_then(|d| d.checked_mul(compound))
            .and_then(|numerator| numerator.checked_div(compound - Decimal::ONE))
            .ok_or_else(|| overflow(principal, annual_rate, tenure_months))?;
        Money::from_decimal(installment)
    };

    debug!(
        "installment for {} at {} over {} months: {}",
        principal, annual_rate, tenure_months, installment
    );

    Ok(installment)
}

/// check the calculator's input constraints
pub fn validate_terms(principal: Money, annual_rate: Rate, tenure_months: u32) -> Result<()> {
    if !principal.is_positive() {
        return Err(LedgerError::InvalidLoanTerms {
            message: format!("principal must be positive, got {}", principal),
        });
    }
    if annual_rate.is_negative() {
        return Err(LedgerError::InvalidLoanTerms {
            message: format!("interest rate must not be negative, got {}", annual_rate),
        });
    }
    if tenure_months == 0 {
        return Err(LedgerError::InvalidLoanTerms {
            message: "tenure must be at least one month".to_string(),
        });
    }
    if tenure_months > MAX_TENURE_MONTHS {
        return Err(LedgerError::InvalidLoanTerms {
            message: format!("tenure must not exceed {} months, got {}", MAX_TENURE_MONTHS, tenure_months),
        });
    }
    Ok(())
}

/// (1 + r)^n by repeated multiplication, `None` once it leaves the decimal range
fn compound_factor(r: Decimal, n: u32) -> Option<Decimal> {
    let base = Decimal::ONE.checked_add(r)?;
    let mut compound = Decimal::ONE;
    for _ in 0..n {
        compound = compound.checked_mul(base)?;
    }
    Some(compound)
}

fn overflow(principal: Money, annual_rate: Rate, tenure_months: u32) -> LedgerError {
    LedgerError::InvalidLoanTerms {
        message: format!(
            "installment for {} at {} over {} months is out of range",
            principal, annual_rate, tenure_months
        ),
    }
}

/// one period of an equal-installment plan
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledPayment {
    pub period: u32,
    pub opening_balance: Money,
    pub payment_amount: Money,
    pub interest_portion: Money,
    pub principal_portion: Money,
    pub closing_balance: Money,
}

/// amortization schedule for a fixed-installment loan
#[derive(Debug, Clone)]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub interest_rate: Rate,
    pub tenure_months: u32,
    pub installment: Money,
    pub payments: Vec<ScheduledPayment>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl AmortizationSchedule {
    /// generate the period-by-period plan
    pub fn generate(principal: Money, interest_rate: Rate, tenure_months: u32) -> Result<Self> {
        let installment = calculate_installment(principal, interest_rate, tenure_months)?;
        let monthly_rate = interest_rate.monthly_rate().as_decimal();

        let mut payments = Vec::with_capacity(tenure_months as usize);
        let mut balance = principal;

        for period in 1..=tenure_months {
            let interest_portion = Money::from_decimal(balance.as_decimal() * monthly_rate);

            // the last period clears whatever rounding left behind
            let (payment_amount, principal_portion) = if period == tenure_months {
                (balance + interest_portion, balance)
            } else {
                let principal_portion = (installment - interest_portion).min(balance);
                (principal_portion + interest_portion, principal_portion)
            };

            let closing_balance = balance.saturating_sub(principal_portion);

            payments.push(ScheduledPayment {
                period,
                opening_balance: balance,
                payment_amount,
                interest_portion,
                principal_portion,
                closing_balance,
            });

            balance = closing_balance;
        }

        let total_interest = payments.iter().map(|p| p.interest_portion).sum();
        let total_payment = payments.iter().map(|p| p.payment_amount).sum();

        Ok(Self {
            principal,
            interest_rate,
            tenure_months,
            installment,
            payments,
            total_interest,
            total_payment,
        })
    }

    /// get payment for specific period (1-based)
    pub fn get_payment(&self, period: u32) -> Option<&ScheduledPayment> {
        period
            .checked_sub(1)
            .and_then(|index| self.payments.get(index as usize))
    }

    /// remaining principal after the given number of periods
    pub fn balance_after(&self, periods: u32) -> Money {
        if periods == 0 {
            return self.principal;
        }
        self.get_payment(periods.min(self.tenure_months))
            .map(|p| p.closing_balance)
            .unwrap_or(self.principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_known_installments() {
        let personal = calculate_installment(Money::from_major(50_000), Rate::from_percentage(5), 12).unwrap();
        assert_eq!(personal, Money::from_decimal(dec!(4280.37)));

        let car = calculate_installment(Money::from_major(200_000), Rate::from_percentage(7), 24).unwrap();
        assert_eq!(car, Money::from_decimal(dec!(8954.52)));

        let home = calculate_installment(Money::from_major(1_000_000), Rate::from_percentage(8), 120).unwrap();
        assert_eq!(home, Money::from_decimal(dec!(12132.76)));
    }

    #[test]
    fn test_zero_rate_is_linear() {
        let installment = calculate_installment(Money::from_major(1_200), Rate::ZERO, 12).unwrap();
        assert_eq!(installment, Money::from_major(100));

        let installment = calculate_installment(Money::from_major(100), Rate::ZERO, 3).unwrap();
        assert_eq!(installment, Money::from_decimal(dec!(33.33)));
    }

    #[test]
    fn test_fractional_rate() {
        let installment = calculate_installment(
            Money::from_major(10_000),
            Rate::from_percent_decimal(dec!(12)),
            1,
        )
        .unwrap();
        // one period: principal plus one month of interest
        assert_eq!(installment, Money::from_major(10_100));
    }

    #[test]
    fn test_rejects_invalid_terms() {
        assert!(matches!(
            calculate_installment(Money::ZERO, Rate::from_percentage(5), 12),
            Err(LedgerError::InvalidLoanTerms { .. })
        ));
        assert!(matches!(
            calculate_installment(Money::from_major(-10), Rate::from_percentage(5), 12),
            Err(LedgerError::InvalidLoanTerms { .. })
        ));
        assert!(matches!(
            calculate_installment(Money::from_major(1_000), Rate::from_decimal(dec!(-0.01)), 12),
            Err(LedgerError::InvalidLoanTerms { .. })
        ));
        assert!(matches!(
            calculate_installment(Money::from_major(1_000), Rate::from_percentage(5), 0),
            Err(LedgerError::InvalidLoanTerms { .. })
        ));
    }

    #[test]
    fn test_rejects_tenure_beyond_ceiling() {
        let err = calculate_installment(Money::from_major(1_000), Rate::from_percentage(12), 10_000).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidLoanTerms { .. }));

        let err = AmortizationSchedule::generate(Money::from_major(1_000), Rate::ZERO, u32::MAX).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidLoanTerms { .. }));

        let longest = calculate_installment(Money::from_major(1_000), Rate::from_percentage(12), MAX_TENURE_MONTHS).unwrap();
        assert!(longest.is_positive());
    }

    #[test]
    fn test_overflowing_terms_are_rejected() {
        // (1 + 10/12)^120 is beyond the decimal range
        let err = calculate_installment(Money::from_major(1_000), Rate::from_percentage(1_000), 120).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidLoanTerms { .. }));

        let err = calculate_installment(Money::from_major(1_000), Rate::from_percentage(120), MAX_TENURE_MONTHS).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidLoanTerms { .. }));

        // principal at the top of the range cannot carry any interest
        let err = calculate_installment(Money::from_decimal(Decimal::MAX), Rate::from_percentage(5), 1).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidLoanTerms { .. }));
    }

    #[test]
    fn test_schedule_retires_principal() {
        let schedule = AmortizationSchedule::generate(
            Money::from_major(50_000),
            Rate::from_percentage(5),
            12,
        )
        .unwrap();

        assert_eq!(schedule.payments.len(), 12);
        assert_eq!(schedule.installment, Money::from_decimal(dec!(4280.37)));

        let first = schedule.get_payment(1).unwrap();
        assert_eq!(first.opening_balance, Money::from_major(50_000));
        assert_eq!(first.interest_portion, Money::from_decimal(dec!(208.33)));
        assert_eq!(first.principal_portion, Money::from_decimal(dec!(4072.04)));

        let last = schedule.get_payment(12).unwrap();
        assert_eq!(last.closing_balance, Money::ZERO);
        // rounding residue stays within a few paise
        assert!((last.payment_amount - schedule.installment).abs() < Money::ONE);

        let principal_total: Money = schedule.payments.iter().map(|p| p.principal_portion).sum();
        assert_eq!(principal_total, Money::from_major(50_000));
        assert_eq!(schedule.total_payment, principal_total + schedule.total_interest);
    }

    #[test]
    fn test_schedule_interest_declines() {
        let schedule = AmortizationSchedule::generate(
            Money::from_major(200_000),
            Rate::from_percentage(7),
            24,
        )
        .unwrap();

        for pair in schedule.payments.windows(2) {
            assert!(pair[1].interest_portion <= pair[0].interest_portion);
        }
        assert_eq!(schedule.balance_after(0), Money::from_major(200_000));
        assert_eq!(schedule.balance_after(24), Money::ZERO);
        assert!(schedule.get_payment(0).is_none());
        assert!(schedule.get_payment(25).is_none());
    }
}
