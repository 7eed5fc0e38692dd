pub mod catalog;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod loan;
pub mod payments;
pub mod session;
pub mod state;
pub mod store;
pub mod types;

// re-export key types
pub use config::{LedgerConfig, PaymentConfig};
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use ledger::{Ledger, LoadOutcome};
pub use loan::{Loan, LoanTerms};
pub use payments::{
    calculate_installment, parse_amount, AmortizationSchedule, PaymentIntent, ScheduledPayment, MAX_TENURE_MONTHS,
};
pub use session::{LedgerSession, PaymentReceipt};
pub use state::LoanRecord;
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use types::{CorruptStatePolicy, LedgerOrigin, LoanId, LoanStatus, OverpaymentPolicy};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
