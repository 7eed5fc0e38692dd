use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::LoanId;

/// things that happen to a ledger during a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    LedgerSeeded {
        loan_count: usize,
        timestamp: DateTime<Utc>,
    },
    LedgerRestored {
        loan_count: usize,
        timestamp: DateTime<Utc>,
    },
    LedgerReseeded {
        reason: String,
        timestamp: DateTime<Utc>,
    },
    LedgerSaved {
        storage_key: String,
        loan_count: usize,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentPosted {
        receipt_id: Uuid,
        loan_id: LoanId,
        amount: Money,
        total_paid: Money,
        timestamp: DateTime<Utc>,
    },
    LoanSettled {
        loan_id: LoanId,
        total_paid: Money,
        timestamp: DateTime<Utc>,
    },
    PaymentIntentIssued {
        amount: Money,
        uri: String,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
