use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use log::info;
use serde::Serialize;
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::ledger::Ledger;
use crate::payments::{parse_amount, PaymentIntent};
use crate::store::KeyValueStore;
use crate::types::{LedgerOrigin, LoanId, LoanStatus};

/// proof of a posted payment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentReceipt {
    pub receipt_id: Uuid,
    pub loan_id: LoanId,
    pub amount: Money,
    pub total_paid: Money,
    pub outstanding: Money,
    pub status: LoanStatus,
    pub posted_at: DateTime<Utc>,
}

/// a repayment session: owns the store and the current ledger, and saves
/// after every accepted payment
pub struct LedgerSession<'t, S: KeyValueStore> {
    store: S,
    config: LedgerConfig,
    ledger: Ledger,
    origin: LedgerOrigin,
    events: EventStore,
    time: &'t SafeTimeProvider,
}

impl<'t, S: KeyValueStore> LedgerSession<'t, S> {
    /// load-or-seed the ledger from `store`
    pub fn open(store: S, config: LedgerConfig, time: &'t SafeTimeProvider) -> Result<Self> {
        config.validate()?;
        let outcome = Ledger::load_with_origin(&store, &config)?;

        let mut events = EventStore::new();
        let now = time.now();
        let loan_count = outcome.ledger.len();
        events.emit(match (outcome.origin, outcome.discarded) {
            (LedgerOrigin::Seeded, _) => Event::LedgerSeeded { loan_count, timestamp: now },
            (LedgerOrigin::Restored, _) => Event::LedgerRestored { loan_count, timestamp: now },
            (LedgerOrigin::Reseeded, discarded) => Event::LedgerReseeded {
                reason: discarded.map(|e| e.to_string()).unwrap_or_default(),
                timestamp: now,
            },
        });

        Ok(Self {
            store,
            config,
            ledger: outcome.ledger,
            origin: outcome.origin,
            events,
            time,
        })
    }

    /// parse, post and persist a payment typed by the borrower
    ///
    /// The in-memory ledger only advances once the store accepted the write.
    pub fn pay(&mut self, loan_id: LoanId, input: &str) -> Result<PaymentReceipt> {
        let amount = parse_amount(input)?;
        self.pay_amount(loan_id, amount)
    }

    pub fn pay_amount(&mut self, loan_id: LoanId, amount: Money) -> Result<PaymentReceipt> {
        let was_settled = self
            .ledger
            .get(loan_id)
            .map(|loan| loan.status() == LoanStatus::Settled)
            .unwrap_or(false);

        let next = self
            .ledger
            .post_payment_with(loan_id, amount, self.config.overpayment_policy)?;
        next.save(&mut self.store, &self.config)?;

        let now = self.time.now();
        self.events.emit(Event::LedgerSaved {
            storage_key: self.config.storage_key.clone(),
            loan_count: next.len(),
            timestamp: now,
        });
        self.ledger = next;

        let loan = self.ledger.get(loan_id).ok_or(LedgerError::UnknownLoan { id: loan_id })?;
        let receipt = PaymentReceipt {
            receipt_id: Uuid::new_v4(),
            loan_id,
            amount,
            total_paid: loan.paid(),
            outstanding: loan.outstanding(),
            status: loan.status(),
            posted_at: now,
        };

        self.events.emit(Event::PaymentPosted {
            receipt_id: receipt.receipt_id,
            loan_id,
            amount,
            total_paid: receipt.total_paid,
            timestamp: now,
        });
        if receipt.status == LoanStatus::Settled && !was_settled {
            self.events.emit(Event::LoanSettled {
                loan_id,
                total_paid: receipt.total_paid,
                timestamp: now,
            });
        }

        info!(
            "payment {} of {} posted to loan {}, paid {} outstanding {}",
            receipt.receipt_id, amount, loan_id, receipt.total_paid, receipt.outstanding
        );
        Ok(receipt)
    }

    /// payment-intent descriptor for an amount typed by the borrower
    pub fn payment_intent(&mut self, input: &str) -> Result<PaymentIntent> {
        let amount = parse_amount(input)?;
        let intent = PaymentIntent::new(&self.config.payment, amount)?;
        self.events.emit(Event::PaymentIntentIssued {
            amount,
            uri: intent.to_uri(),
            timestamp: self.time.now(),
        });
        Ok(intent)
    }

    /// write the current ledger again, e.g. to materialise a seeded ledger
    pub fn save(&mut self) -> Result<()> {
        self.ledger.save(&mut self.store, &self.config)?;
        self.events.emit(Event::LedgerSaved {
            storage_key: self.config.storage_key.clone(),
            loan_count: self.ledger.len(),
            timestamp: self.time.now(),
        });
        Ok(())
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn origin(&self) -> LedgerOrigin {
        self.origin
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
