//! Invoice and bill documents.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use textileflow_core::{BillId, CustomerId, InvoiceId, VendorId};

use crate::commission::BrokerCommission;
use crate::line::LineItem;
use crate::payment::{NewPayment, PaymentRecord};
use crate::settlement::{SettlementError, SettlementEvent, SettlementLedger, SettlementSummary};
use crate::status::{DocumentKind, SettlementStatus};

/// Anything carrying a settlement ledger: invoices and bills.
///
/// Every derived figure comes from the ledger so views cannot drift apart.
pub trait Settleable {
    const KIND: DocumentKind;

    fn number(&self) -> &str;
    fn date(&self) -> NaiveDate;
    fn due_date(&self) -> NaiveDate;
    fn party_name(&self) -> Option<&str>;
    fn ledger(&self) -> &SettlementLedger;
    fn ledger_mut(&mut self) -> &mut SettlementLedger;

    fn total(&self) -> Decimal {
        self.ledger().total()
    }

    fn amount_paid(&self) -> Decimal {
        self.ledger().amount_paid()
    }

    fn remaining(&self) -> Decimal {
        self.ledger().remaining()
    }

    fn status(&self) -> SettlementStatus {
        self.ledger().status()
    }

    fn status_label(&self) -> &'static str {
        self.status().label(Self::KIND)
    }

    fn payments(&self) -> &[PaymentRecord] {
        self.ledger().payments()
    }

    fn summary(&self) -> SettlementSummary {
        self.ledger().summary()
    }

    /// Unpaid past its due date.
    fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status().is_open() && self.due_date() < today
    }

    fn check_payment(&self, payment: &NewPayment) -> Result<(), SettlementError> {
        self.ledger().check(payment)
    }

    fn record_payment(
        &mut self,
        payment: NewPayment,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<SettlementEvent>, SettlementError> {
        self.ledger_mut().record(payment, occurred_at)
    }
}

/// Sales invoice issued to a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub customer_id: CustomerId,
    pub customer_name: Option<String>,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
    pub lines: Vec<LineItem>,
    pub ledger: SettlementLedger,
    pub commission: Option<BrokerCommission>,
}

impl Invoice {
    pub fn commission(&self) -> Option<&BrokerCommission> {
        self.commission.as_ref()
    }

    /// Pay the broker. Fails when the invoice has no broker.
    pub fn settle_commission(
        &mut self,
        payment: NewPayment,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<SettlementEvent>, SettlementError> {
        match self.commission.as_mut() {
            Some(c) => c.settle(payment, occurred_at),
            None => Err(SettlementError::NoBroker),
        }
    }

    pub fn check_commission_payment(&self, payment: &NewPayment) -> Result<(), SettlementError> {
        match self.commission.as_ref() {
            Some(c) => c.check(payment),
            None => Err(SettlementError::NoBroker),
        }
    }
}

impl Settleable for Invoice {
    const KIND: DocumentKind = DocumentKind::Invoice;

    fn number(&self) -> &str {
        &self.invoice_number
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    fn party_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    fn ledger(&self) -> &SettlementLedger {
        &self.ledger
    }

    fn ledger_mut(&mut self) -> &mut SettlementLedger {
        &mut self.ledger
    }
}

/// Purchase bill received from a vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bill {
    pub id: BillId,
    pub bill_number: String,
    pub vendor_id: VendorId,
    pub vendor_name: Option<String>,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
    pub lines: Vec<LineItem>,
    pub ledger: SettlementLedger,
}

impl Settleable for Bill {
    const KIND: DocumentKind = DocumentKind::Bill;

    fn number(&self) -> &str {
        &self.bill_number
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    fn party_name(&self) -> Option<&str> {
        self.vendor_name.as_deref()
    }

    fn ledger(&self) -> &SettlementLedger {
        &self.ledger
    }

    fn ledger_mut(&mut self) -> &mut SettlementLedger {
        &mut self.ledger
    }
}

/// Flat row for listings and exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRow {
    pub kind: DocumentKind,
    pub number: String,
    pub party: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub remaining: Decimal,
    pub status: &'static str,
    pub overdue: bool,
}

impl DocumentRow {
    pub fn of<D: Settleable>(doc: &D, today: NaiveDate) -> Self {
        Self {
            kind: D::KIND,
            number: doc.number().to_string(),
            party: doc.party_name().unwrap_or("-").to_string(),
            date: doc.date(),
            due_date: doc.due_date(),
            total: doc.total(),
            amount_paid: doc.amount_paid(),
            remaining: doc.remaining(),
            status: doc.status_label(),
            overdue: doc.is_overdue(today),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commission::{CommissionTerms, CommissionType};
    use crate::settlement::LedgerRef;
    use rust_decimal_macros::dec;
    use textileflow_core::BrokerId;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn invoice(total: Decimal) -> Invoice {
        let id = InvoiceId::new(7);
        Invoice {
            id,
            invoice_number: "INV-007".into(),
            customer_id: CustomerId::new(2),
            customer_name: Some("Noor Fabrics".into()),
            date: d(2024, 1, 1),
            due_date: d(2024, 1, 31),
            notes: None,
            lines: Vec::new(),
            ledger: SettlementLedger::new(LedgerRef::Invoice(id), total).unwrap(),
            commission: None,
        }
    }

    fn bill(total: Decimal) -> Bill {
        let id = BillId::new(3);
        Bill {
            id,
            bill_number: "BILL-003".into(),
            vendor_id: VendorId::new(1),
            vendor_name: None,
            date: d(2024, 1, 1),
            due_date: d(2024, 1, 31),
            notes: None,
            lines: Vec::new(),
            ledger: SettlementLedger::new(LedgerRef::Bill(id), total).unwrap(),
        }
    }

    #[test]
    fn invoice_lifecycle_example() {
        let mut inv = invoice(dec!(1000));
        assert_eq!(inv.status_label(), "Pending");

        inv.record_payment(NewPayment::cash(d(2024, 1, 5), dec!(400)), Utc::now())
            .unwrap();
        assert_eq!(inv.status_label(), "Partially Paid");
        assert_eq!(inv.remaining(), dec!(600));

        inv.record_payment(NewPayment::cash(d(2024, 1, 9), dec!(600)), Utc::now())
            .unwrap();
        assert_eq!(inv.status_label(), "Paid");
        assert_eq!(inv.remaining(), Decimal::ZERO);

        assert!(
            inv.record_payment(NewPayment::cash(d(2024, 1, 9), dec!(0.01)), Utc::now())
                .is_err()
        );
    }

    #[test]
    fn bill_uses_unpaid_label() {
        assert_eq!(bill(dec!(50)).status_label(), "Unpaid");
    }

    #[test]
    fn overdue_only_while_open() {
        let mut b = bill(dec!(50));
        assert!(!b.is_overdue(d(2024, 1, 31)));
        assert!(b.is_overdue(d(2024, 2, 1)));
        b.record_payment(NewPayment::cash(d(2024, 2, 1), dec!(50)), Utc::now())
            .unwrap();
        assert!(!b.is_overdue(d(2024, 2, 1)));
    }

    #[test]
    fn commission_needs_broker_and_is_independent() {
        let mut inv = invoice(dec!(2000));
        assert_eq!(
            inv.settle_commission(NewPayment::cash(d(2024, 1, 2), dec!(10)), Utc::now()),
            Err(SettlementError::NoBroker)
        );

        let terms = CommissionTerms::new(BrokerId::new(1), CommissionType::Percentage, dec!(5));
        inv.commission = Some(BrokerCommission::new(inv.id, inv.total(), terms).unwrap());
        inv.settle_commission(NewPayment::cash(d(2024, 1, 2), dec!(100)), Utc::now())
            .unwrap();

        assert_eq!(inv.commission().map(BrokerCommission::outstanding), Some(Decimal::ZERO));
        assert_eq!(inv.status(), SettlementStatus::Open);
        assert_eq!(inv.amount_paid(), Decimal::ZERO);
    }

    #[test]
    fn row_flattens_document() {
        let inv = invoice(dec!(10));
        let row = DocumentRow::of(&inv, d(2024, 3, 1));
        assert_eq!(row.kind, DocumentKind::Invoice);
        assert_eq!(row.party, "Noor Fabrics");
        assert!(row.overdue);
    }
}
