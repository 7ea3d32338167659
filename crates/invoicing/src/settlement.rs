//! Settlement ledger: the payment sub-ledger behind every invoice, bill and
//! broker commission.
//!
//! The ledger owns `total` and the ordered list of payments; `amount_paid`,
//! `remaining` and status are always derived from them, never stored.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use textileflow_core::money::MONEY_SCALE;
use textileflow_core::{
    Aggregate, AggregateRoot, BillId, DomainError, DomainResult, InvoiceId,
};
use textileflow_events::Event;

use crate::payment::{NewPayment, PaymentMethod, PaymentRecord};
use crate::status::SettlementStatus;

/// What a ledger settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerRef {
    Invoice(InvoiceId),
    Bill(BillId),
    /// Broker commission owed on an invoice.
    Commission(InvoiceId),
}

impl core::fmt::Display for LedgerRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LedgerRef::Invoice(id) => write!(f, "invoice #{id}"),
            LedgerRef::Bill(id) => write!(f, "bill #{id}"),
            LedgerRef::Commission(id) => write!(f, "commission on invoice #{id}"),
        }
    }
}

/// Why a payment was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("payment amount must be greater than zero")]
    NonPositiveAmount,

    #[error("payment amount cannot have more than two decimal places")]
    TooPrecise,

    #[error("payment exceeds outstanding balance")]
    ExceedsOutstanding { amount: Decimal, remaining: Decimal },

    #[error("bank payments require a transaction reference")]
    MissingTransactionReference,

    #[error("invoice has no broker assigned")]
    NoBroker,

    #[error("commission already fully settled")]
    CommissionSettled,
}

/// Derived view of a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub remaining: Decimal,
    pub status: SettlementStatus,
}

impl SettlementSummary {
    /// Compute the summary for `total` and a set of payments.
    pub fn compute<'a>(total: Decimal, payments: impl IntoIterator<Item = &'a PaymentRecord>) -> Self {
        let amount_paid: Decimal = payments.into_iter().map(|p| p.amount).sum();
        Self::from_paid(total, amount_paid)
    }

    pub fn from_paid(total: Decimal, amount_paid: Decimal) -> Self {
        Self {
            total,
            amount_paid,
            remaining: total - amount_paid,
            status: status_for(total, amount_paid),
        }
    }
}

/// Status rule: Paid once the paid amount reaches the total.
pub fn status_for(total: Decimal, amount_paid: Decimal) -> SettlementStatus {
    if amount_paid >= total {
        SettlementStatus::Paid
    } else if amount_paid > Decimal::ZERO {
        SettlementStatus::PartiallyPaid
    } else {
        SettlementStatus::Open
    }
}

/// Aggregate root: one document's payment ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementLedger {
    reference: LedgerRef,
    total: Decimal,
    /// Paid before the itemised payments, e.g. legacy records with no
    /// payment rows behind them.
    brought_forward: Decimal,
    payments: Vec<PaymentRecord>,
    version: u64,
}

impl SettlementLedger {
    /// Fresh ledger with no payments.
    pub fn new(reference: LedgerRef, total: Decimal) -> DomainResult<Self> {
        if total < Decimal::ZERO {
            return Err(DomainError::invariant(format!(
                "{reference}: total cannot be negative"
            )));
        }
        Ok(Self {
            reference,
            total,
            brought_forward: Decimal::ZERO,
            payments: Vec::new(),
            version: 0,
        })
    }

    /// Rebuild a ledger from payments already stored by the backend.
    ///
    /// Rejects records that break the ledger invariants instead of repairing
    /// them.
    pub fn restore(
        reference: LedgerRef,
        total: Decimal,
        payments: Vec<PaymentRecord>,
    ) -> DomainResult<Self> {
        let mut ledger = Self::new(reference, total)?;
        let mut paid = Decimal::ZERO;
        for p in &payments {
            if p.amount <= Decimal::ZERO {
                return Err(DomainError::malformed(format!(
                    "{reference}: payment amount {} is not positive",
                    p.amount
                )));
            }
            paid += p.amount;
        }
        if paid > total {
            return Err(DomainError::malformed(format!(
                "{reference}: payments {paid} exceed total {total}"
            )));
        }
        ledger.version = payments.len() as u64;
        ledger.payments = payments;
        Ok(ledger)
    }

    /// Like [`SettlementLedger::restore`], but reconciles against a stored
    /// `amount_paid`. Any excess over the itemised payments is carried as
    /// brought forward; a shortfall is malformed.
    pub fn restore_with_paid(
        reference: LedgerRef,
        total: Decimal,
        amount_paid: Decimal,
        payments: Vec<PaymentRecord>,
    ) -> DomainResult<Self> {
        let mut ledger = Self::restore(reference, total, payments)?;
        let itemised = ledger.amount_paid();
        if amount_paid < itemised {
            return Err(DomainError::malformed(format!(
                "{reference}: amount paid {amount_paid} is less than its payments {itemised}"
            )));
        }
        if amount_paid > total {
            return Err(DomainError::malformed(format!(
                "{reference}: amount paid {amount_paid} exceeds total {total}"
            )));
        }
        ledger.brought_forward = amount_paid - itemised;
        Ok(ledger)
    }

    pub fn reference(&self) -> LedgerRef {
        self.reference
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn payments(&self) -> &[PaymentRecord] {
        &self.payments
    }

    pub fn brought_forward(&self) -> Decimal {
        self.brought_forward
    }

    pub fn amount_paid(&self) -> Decimal {
        self.brought_forward + self.payments.iter().map(|p| p.amount).sum::<Decimal>()
    }

    pub fn remaining(&self) -> Decimal {
        self.total - self.amount_paid()
    }

    pub fn status(&self) -> SettlementStatus {
        status_for(self.total, self.amount_paid())
    }

    pub fn summary(&self) -> SettlementSummary {
        SettlementSummary::from_paid(self.total, self.amount_paid())
    }

    /// Validate a payment against the current balance without recording it.
    pub fn check(&self, payment: &NewPayment) -> Result<(), SettlementError> {
        check_payment(self.remaining(), payment)
    }

    /// Record a payment through [`Aggregate::execute`], returning the
    /// applied events.
    pub fn record(
        &mut self,
        payment: NewPayment,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<SettlementEvent>, SettlementError> {
        self.execute(&SettlementCommand::RecordPayment(RecordPayment {
            payment,
            occurred_at,
        }))
    }

    fn decide(&self, cmd: &RecordPayment) -> Result<PaymentRecorded, SettlementError> {
        let payment = cmd.payment.clone().normalized();
        check_payment(self.remaining(), &payment)?;

        let after = SettlementSummary::from_paid(self.total, self.amount_paid() + payment.amount);
        Ok(PaymentRecorded {
            ledger: self.reference,
            payment: payment.into_record(),
            amount_paid: after.amount_paid,
            remaining: after.remaining,
            status: after.status,
            occurred_at: cmd.occurred_at,
        })
    }
}

/// Payment rules shared by every ledger and by pre-submit validation.
pub fn check_payment(remaining: Decimal, payment: &NewPayment) -> Result<(), SettlementError> {
    if payment.amount <= Decimal::ZERO {
        return Err(SettlementError::NonPositiveAmount);
    }
    if payment.amount.normalize().scale() > MONEY_SCALE {
        return Err(SettlementError::TooPrecise);
    }
    if payment.method == PaymentMethod::Bank && !payment.has_transaction_reference() {
        return Err(SettlementError::MissingTransactionReference);
    }
    if payment.amount > remaining {
        return Err(SettlementError::ExceedsOutstanding {
            amount: payment.amount,
            remaining,
        });
    }
    Ok(())
}

impl AggregateRoot for SettlementLedger {
    type Id = LedgerRef;

    fn id(&self) -> &Self::Id {
        &self.reference
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RecordPayment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayment {
    pub payment: NewPayment,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementCommand {
    RecordPayment(RecordPayment),
}

/// Event: PaymentRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecorded {
    pub ledger: LedgerRef,
    pub payment: PaymentRecord,
    pub amount_paid: Decimal,
    pub remaining: Decimal,
    pub status: SettlementStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementEvent {
    PaymentRecorded(PaymentRecorded),
}

impl Event for SettlementEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SettlementEvent::PaymentRecorded(_) => "invoicing.settlement.payment_recorded",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SettlementEvent::PaymentRecorded(e) => e.occurred_at,
        }
    }
}

impl Aggregate for SettlementLedger {
    type Command = SettlementCommand;
    type Event = SettlementEvent;
    type Error = SettlementError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SettlementEvent::PaymentRecorded(e) => {
                self.payments.push(e.payment.clone());
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SettlementCommand::RecordPayment(cmd) => {
                Ok(vec![SettlementEvent::PaymentRecorded(self.decide(cmd)?)])
            }
        }
    }
}
