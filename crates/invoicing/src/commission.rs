use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use textileflow_core::money::{MONEY_SCALE, percent_of};
use textileflow_core::{BrokerId, DomainError, DomainResult, InvoiceId};

use crate::payment::{NewPayment, PaymentRecord};
use crate::settlement::{LedgerRef, SettlementError, SettlementEvent, SettlementLedger};
use crate::status::SettlementStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommissionType {
    Percentage,
    Fixed,
}

impl CommissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionType::Percentage => "Percentage",
            CommissionType::Fixed => "Fixed",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "percentage" | "percent" | "%" => Some(CommissionType::Percentage),
            "fixed" => Some(CommissionType::Fixed),
            _ => None,
        }
    }
}

/// Commission owed on `total`. Percentages are clamped to `[0, 100]`; a
/// fixed value is owed as entered.
pub fn commission_amount(total: Decimal, kind: CommissionType, value: Decimal) -> Decimal {
    match kind {
        CommissionType::Percentage => {
            let pct = value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
            percent_of(total, pct)
        }
        CommissionType::Fixed => value,
    }
}

/// Broker terms attached to an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionTerms {
    pub broker_id: BrokerId,
    pub kind: CommissionType,
    pub value: Decimal,
}

impl CommissionTerms {
    pub fn new(broker_id: BrokerId, kind: CommissionType, value: Decimal) -> Self {
        Self {
            broker_id,
            kind,
            value,
        }
    }

    /// Form-level rules. Computation clamps; entry does not.
    pub fn validate(&self) -> DomainResult<()> {
        if self.value < Decimal::ZERO {
            return Err(DomainError::validation("commission value cannot be negative"));
        }
        if self.kind == CommissionType::Percentage && self.value > Decimal::ONE_HUNDRED {
            return Err(DomainError::validation(
                "Commission percentage cannot exceed 100%",
            ));
        }
        if self.kind == CommissionType::Fixed && self.value.normalize().scale() > MONEY_SCALE {
            return Err(DomainError::validation(
                "Fixed commission cannot have more than two decimal places",
            ));
        }
        Ok(())
    }

    pub fn amount_on(&self, total: Decimal) -> Decimal {
        commission_amount(total, self.kind, self.value)
    }
}

/// A broker's commission on one invoice, with its own payment ledger.
///
/// Independent of the invoice's customer payments: a fully paid invoice can
/// still owe commission and vice versa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerCommission {
    terms: CommissionTerms,
    broker_name: Option<String>,
    ledger: SettlementLedger,
}

impl BrokerCommission {
    /// Commission on a new invoice, nothing paid yet.
    pub fn new(invoice_id: InvoiceId, invoice_total: Decimal, terms: CommissionTerms) -> DomainResult<Self> {
        let amount = terms.amount_on(invoice_total);
        Ok(Self {
            ledger: SettlementLedger::new(LedgerRef::Commission(invoice_id), amount)?,
            terms,
            broker_name: None,
        })
    }

    /// Commission restored from the stored amount, amount paid and payments.
    pub fn restore(
        invoice_id: InvoiceId,
        terms: CommissionTerms,
        amount: Decimal,
        amount_paid: Decimal,
        payments: Vec<PaymentRecord>,
    ) -> DomainResult<Self> {
        let reference = LedgerRef::Commission(invoice_id);
        Ok(Self {
            ledger: SettlementLedger::restore_with_paid(reference, amount, amount_paid, payments)?,
            terms,
            broker_name: None,
        })
    }

    pub fn with_broker_name(mut self, name: impl Into<String>) -> Self {
        self.broker_name = Some(name.into());
        self
    }

    pub fn terms(&self) -> &CommissionTerms {
        &self.terms
    }

    pub fn broker_id(&self) -> BrokerId {
        self.terms.broker_id
    }

    pub fn broker_name(&self) -> Option<&str> {
        self.broker_name.as_deref()
    }

    pub fn amount(&self) -> Decimal {
        self.ledger.total()
    }

    pub fn paid(&self) -> Decimal {
        self.ledger.amount_paid()
    }

    pub fn outstanding(&self) -> Decimal {
        self.ledger.remaining()
    }

    pub fn status(&self) -> SettlementStatus {
        self.ledger.status()
    }

    pub fn ledger(&self) -> &SettlementLedger {
        &self.ledger
    }

    pub fn check(&self, payment: &NewPayment) -> Result<(), SettlementError> {
        if self.outstanding() <= Decimal::ZERO {
            return Err(SettlementError::CommissionSettled);
        }
        self.ledger.check(payment)
    }

    pub fn settle(
        &mut self,
        payment: NewPayment,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<SettlementEvent>, SettlementError> {
        if self.outstanding() <= Decimal::ZERO {
            return Err(SettlementError::CommissionSettled);
        }
        self.ledger.record(payment, occurred_at)
    }
}
