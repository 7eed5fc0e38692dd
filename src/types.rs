use serde::{Deserialize, Serialize};

/// unique identifier for a loan, assigned by the seed catalog
pub type LoanId = u32;

/// repayment progress of a loan, derived from `paid` against the total payable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// nothing posted yet
    Unpaid,
    /// some amount posted, balance remains
    PartiallyPaid,
    /// paid at least the total payable
    Settled,
}

/// what to do with a payment larger than the outstanding balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverpaymentPolicy {
    /// accept silently; `paid` may exceed the total payable
    #[default]
    Accept,
    /// reject with `PaymentExceedsOutstanding`
    Reject,
}

/// what `Ledger::load` does when the stored entry cannot be read back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CorruptStatePolicy {
    /// return `CorruptState` to the caller
    #[default]
    Surface,
    /// log a warning and rebuild from the seed catalog
    Reseed,
}

/// how the ledger came into existence for this session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerOrigin {
    Seeded,
    Restored,
    Reseeded,
}
