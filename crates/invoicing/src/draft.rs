//! Invoice and bill creation forms, validated before anything is submitted.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use textileflow_core::{BrokerId, CustomerId, DomainError, DomainResult, VendorId};

use crate::commission::{CommissionTerms, CommissionType};
use crate::line::{LineItem, lines_total};
use crate::payment::{NewPayment, PaymentMethod};
use crate::settlement::{SettlementError, check_payment};

/// Payment terms applied when no due date is given.
pub const DEFAULT_DUE_DAYS: u64 = 30;

/// Validated figures for a document about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDocument {
    pub total: Decimal,
    pub due_date: NaiveDate,
    /// Payment to record right after creation. `None` for credit sales.
    pub initial_payment: Option<NewPayment>,
    pub commission: Option<CommissionTerms>,
    pub commission_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub invoice_number: String,
    pub customer_id: Option<CustomerId>,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub lines: Vec<LineItem>,
    pub broker_id: Option<BrokerId>,
    pub commission_type: Option<CommissionType>,
    pub commission_value: Decimal,
    pub initial_payment: Option<NewPayment>,
}

impl InvoiceDraft {
    pub fn new(invoice_number: impl Into<String>, customer_id: CustomerId, date: NaiveDate) -> Self {
        Self {
            invoice_number: invoice_number.into(),
            customer_id: Some(customer_id),
            date,
            due_date: None,
            notes: None,
            lines: Vec::new(),
            broker_id: None,
            commission_type: None,
            commission_value: Decimal::ZERO,
            initial_payment: None,
        }
    }

    pub fn with_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    pub fn with_broker(mut self, broker_id: BrokerId, kind: CommissionType, value: Decimal) -> Self {
        self.broker_id = Some(broker_id);
        self.commission_type = Some(kind);
        self.commission_value = value;
        self
    }

    pub fn with_initial_payment(mut self, payment: NewPayment) -> Self {
        self.initial_payment = Some(payment);
        self
    }

    pub fn customer(&self) -> DomainResult<CustomerId> {
        self.customer_id
            .ok_or_else(|| DomainError::validation("select a customer"))
    }

    pub fn prepare(&self) -> DomainResult<PreparedDocument> {
        self.customer()?;
        let commission = match (self.broker_id, self.commission_type) {
            (Some(broker_id), Some(kind)) => {
                let terms = CommissionTerms::new(broker_id, kind, self.commission_value);
                terms.validate()?;
                Some(terms)
            }
            (Some(_), None) => {
                return Err(DomainError::validation(
                    "commission type is required when a broker is selected",
                ));
            }
            (None, Some(_)) => {
                return Err(DomainError::validation(
                    "broker is required when commission is provided",
                ));
            }
            (None, None) => None,
        };

        let mut prepared = prepare_common(
            &self.invoice_number,
            self.date,
            self.due_date,
            &self.lines,
            self.initial_payment.as_ref(),
        )?;
        prepared.commission_amount = commission
            .as_ref()
            .map(|t| t.amount_on(prepared.total))
            .unwrap_or(Decimal::ZERO);
        prepared.commission = commission;
        Ok(prepared)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillDraft {
    pub bill_number: String,
    pub vendor_id: Option<VendorId>,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub lines: Vec<LineItem>,
    pub initial_payment: Option<NewPayment>,
}

impl BillDraft {
    pub fn new(bill_number: impl Into<String>, vendor_id: VendorId, date: NaiveDate) -> Self {
        Self {
            bill_number: bill_number.into(),
            vendor_id: Some(vendor_id),
            date,
            due_date: None,
            notes: None,
            lines: Vec::new(),
            initial_payment: None,
        }
    }

    pub fn with_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    pub fn with_initial_payment(mut self, payment: NewPayment) -> Self {
        self.initial_payment = Some(payment);
        self
    }

    pub fn vendor(&self) -> DomainResult<VendorId> {
        self.vendor_id
            .ok_or_else(|| DomainError::validation("select a vendor"))
    }

    pub fn prepare(&self) -> DomainResult<PreparedDocument> {
        self.vendor()?;
        prepare_common(
            &self.bill_number,
            self.date,
            self.due_date,
            &self.lines,
            self.initial_payment.as_ref(),
        )
    }
}

fn prepare_common(
    number: &str,
    date: NaiveDate,
    due_date: Option<NaiveDate>,
    lines: &[LineItem],
    initial_payment: Option<&NewPayment>,
) -> DomainResult<PreparedDocument> {
    if number.trim().is_empty() {
        return Err(DomainError::validation("document number cannot be empty"));
    }
    if number.chars().count() > 50 {
        return Err(DomainError::validation(
            "document number cannot exceed 50 characters",
        ));
    }
    if lines.is_empty() {
        return Err(DomainError::validation("add at least one line item"));
    }
    for line in lines {
        if line.meters < Decimal::new(1, 2) {
            return Err(DomainError::validation(format!(
                "line for item #{} must be at least 0.01 meters",
                line.item_id
            )));
        }
        if line.price < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "line for item #{} has a negative price",
                line.item_id
            )));
        }
    }

    let due_date = match due_date {
        Some(due) if due < date => {
            return Err(DomainError::validation("due date cannot be before the document date"));
        }
        Some(due) => due,
        None => date
            .checked_add_days(Days::new(DEFAULT_DUE_DAYS))
            .ok_or_else(|| DomainError::validation("document date out of range"))?,
    };

    let total = lines_total(lines);
    let initial_payment = match initial_payment {
        // Credit means the whole amount stays open.
        Some(p) if p.method == PaymentMethod::Credit => None,
        Some(p) if p.amount.is_zero() => None,
        Some(p) => {
            let p = p.clone().normalized();
            check_payment(total, &p).map_err(|e| match e {
                SettlementError::ExceedsOutstanding { .. } => {
                    DomainError::validation("Initial payment cannot exceed document total")
                }
                other => DomainError::validation(other.to_string()),
            })?;
            Some(p)
        }
        None => None,
    };

    Ok(PreparedDocument {
        total,
        due_date,
        initial_payment,
        commission: None,
        commission_amount: Decimal::ZERO,
    })
}
