//! Wire records ⇄ domain types.
//!
//! Inbound conversions reject malformed values (blank names, unknown labels,
//! payments that overrun their document) instead of coalescing them to
//! defaults. Stored figures that merely disagree with what the domain derives
//! (status, line totals) are logged and the derived value wins.

use rust_decimal::Decimal;

use textileflow_accounting::{Expense, ExpenseCategory, NewExpense, Transaction, TransactionType};
use textileflow_core::money::round_money;
use textileflow_core::{
    BillId, BrokerId, CustomerId, DomainError, DomainResult, ExpenseId, InventoryItemId, InvoiceId,
    ItemMasterId, PaymentId, TransactionId, VendorId,
};
use textileflow_inventory::{
    InventoryItem, InventorySummary, ItemMaster, NewInventoryItem, NewItemMaster, VendorStock,
};
use textileflow_invoicing::{
    Bill, BillDraft, BrokerCommission, CommissionTerms, CommissionType, Invoice, InvoiceDraft,
    LedgerRef, LineItem, NewPayment, PaymentMethod, PaymentRecord, PreparedDocument,
    SettlementLedger, SettlementStatus, lines_total,
};
use textileflow_parties::{Broker, Customer, PartyDetails, PartyKind, PartyRef, Vendor};

use crate::dto::{
    BillRecord, BrokerRecord, CustomerRecord, DocumentLineRecord, ExpensePayload, ExpenseRecord,
    InventoryPayload, InventoryRecord, InventorySummaryRecord, InvoiceRecord, ItemMasterPayload,
    ItemMasterRecord, LinePayload, NewBillPayload, NewInvoicePayload, PartyPayload, PaymentPayload,
    PaymentRecordDto, TransactionRecord, VendorRecord, VendorStockRecord,
};
use crate::error::{ApiError, ApiResult};

fn malformed(entity: &str, id: i64, msg: impl core::fmt::Display) -> DomainError {
    DomainError::malformed(format!("{entity} {id}: {msg}"))
}

fn required_name(entity: &str, id: i64, name: String) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(malformed(entity, id, "name is blank"));
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_negative(entity: &str, id: i64, field: &str, value: Decimal) -> DomainResult<Decimal> {
    if value < Decimal::ZERO {
        return Err(malformed(entity, id, format!("{field} {value} is negative")));
    }
    Ok(value)
}

impl TryFrom<VendorRecord> for Vendor {
    type Error = DomainError;

    fn try_from(r: VendorRecord) -> DomainResult<Self> {
        Ok(Vendor {
            id: VendorId::new(r.id),
            name: required_name("vendor", r.id, r.name)?,
            contact: r.contact.unwrap_or_default(),
            address: non_blank(r.address),
            bank_details: non_blank(r.bank_details),
            // The backend stores what we owe as positive.
            balance: PartyKind::Vendor.signed(r.balance),
        })
    }
}

impl TryFrom<CustomerRecord> for Customer {
    type Error = DomainError;

    fn try_from(r: CustomerRecord) -> DomainResult<Self> {
        Ok(Customer {
            id: CustomerId::new(r.id),
            name: required_name("customer", r.id, r.name)?,
            contact: r.contact.unwrap_or_default(),
            address: non_blank(r.address),
            short_description: non_blank(r.short_description),
            balance: r.balance,
        })
    }
}

impl TryFrom<BrokerRecord> for Broker {
    type Error = DomainError;

    fn try_from(r: BrokerRecord) -> DomainResult<Self> {
        Ok(Broker {
            id: BrokerId::new(r.id),
            name: required_name("broker", r.id, r.name)?,
            contact: non_blank(r.contact),
            address: non_blank(r.address),
        })
    }
}

impl TryFrom<InventoryRecord> for InventoryItem {
    type Error = DomainError;

    fn try_from(r: InventoryRecord) -> DomainResult<Self> {
        if r.lot_number.trim().is_empty() {
            return Err(malformed("inventory item", r.id, "lot number is blank"));
        }
        let item = InventoryItem {
            id: InventoryItemId::new(r.id),
            lot_number: r.lot_number.trim().to_string(),
            fabric_type: r.fabric_type.trim().to_string(),
            meters: non_negative("inventory item", r.id, "meters", r.meters)?,
            unit_price: non_negative("inventory item", r.id, "unit price", r.unit_price)?,
            vendor_id: VendorId::new(r.vendor),
            received_date: r.received_date,
            is_billed: r.is_billed,
        };
        if let Some(stored) = r.total_value {
            if stored != item.total_value() {
                tracing::warn!(
                    item = r.id,
                    %stored,
                    derived = %item.total_value(),
                    "inventory total value disagrees with meters x unit price"
                );
            }
        }
        Ok(item)
    }
}

impl TryFrom<ItemMasterRecord> for ItemMaster {
    type Error = DomainError;

    fn try_from(r: ItemMasterRecord) -> DomainResult<Self> {
        if r.code.trim().is_empty() {
            return Err(malformed("item master", r.id, "code is blank"));
        }
        Ok(ItemMaster {
            id: ItemMasterId::new(r.id),
            code: r.code.trim().to_string(),
            name: required_name("item master", r.id, r.name)?,
            category: r.category.trim().to_string(),
            description: non_blank(r.description),
            unit_of_measure: non_blank(r.unit_of_measure).unwrap_or_else(|| "Meters".to_string()),
            standard_price: r.standard_price,
            is_active: r.is_active,
        })
    }
}

impl TryFrom<PaymentRecordDto> for PaymentRecord {
    type Error = DomainError;

    fn try_from(r: PaymentRecordDto) -> DomainResult<Self> {
        let id = r.id.unwrap_or_default();
        let method = PaymentMethod::parse(&r.method)
            .ok_or_else(|| malformed("payment", id, format!("unknown method {:?}", r.method)))?;
        let (bank_name, tid) = match method {
            PaymentMethod::Bank => (non_blank(r.bank_name), non_blank(r.tid)),
            _ => (None, None),
        };
        Ok(PaymentRecord {
            id: r.id.map(PaymentId::new),
            date: r.date,
            amount: r.amount,
            method,
            bank_name,
            tid,
        })
    }
}

fn line_from(entity: &str, doc: i64, r: DocumentLineRecord) -> DomainResult<LineItem> {
    let line = LineItem::new(
        InventoryItemId::new(r.inventory_item),
        non_negative(entity, doc, "line meters", r.meters)?,
        non_negative(entity, doc, "line price", r.price)?,
    );
    if let Some(stored) = r.subtotal {
        if stored != line.extension() {
            tracing::warn!(
                document = doc,
                %stored,
                derived = %line.extension(),
                "line subtotal disagrees with meters x price"
            );
        }
    }
    Ok(line)
}

fn payments_from(records: Vec<PaymentRecordDto>) -> DomainResult<Vec<PaymentRecord>> {
    records.into_iter().map(PaymentRecord::try_from).collect()
}

fn check_status(entity: &str, id: i64, stored: &str, derived: SettlementStatus) -> DomainResult<()> {
    let parsed = SettlementStatus::parse(stored)
        .ok_or_else(|| malformed(entity, id, format!("unknown status {stored:?}")))?;
    if parsed != derived {
        tracing::warn!(
            document = id,
            stored,
            ?derived,
            "stored status disagrees with payments; using derived status"
        );
    }
    Ok(())
}

fn check_lines_total(id: i64, lines: &[LineItem], total: Decimal) {
    if lines.is_empty() {
        return;
    }
    let derived = lines_total(lines);
    if derived != total {
        tracing::warn!(document = id, %total, %derived, "document total disagrees with its lines");
    }
}

fn commission_from(r: &mut InvoiceRecord, invoice_id: InvoiceId) -> DomainResult<Option<BrokerCommission>> {
    let Some(broker) = r.broker else {
        return Ok(None);
    };
    let label = r.commission_type.as_deref().map(str::trim).unwrap_or_default();
    let kind = CommissionType::parse(label)
        .ok_or_else(|| malformed("invoice", r.id, format!("unknown commission type {label:?}")))?;
    let terms = CommissionTerms::new(
        BrokerId::new(broker),
        kind,
        r.commission_value.unwrap_or_default(),
    );
    let amount = r
        .commission_amount
        .unwrap_or_else(|| terms.amount_on(r.total));
    let payments = payments_from(std::mem::take(&mut r.commission_payments))?;
    let itemised: Decimal = payments.iter().map(|p| p.amount).sum();
    let paid = r.commission_paid.unwrap_or(itemised);

    let mut commission = BrokerCommission::restore(invoice_id, terms, amount, paid, payments)?;
    if let Some(name) = non_blank(r.broker_name.take()) {
        commission = commission.with_broker_name(name);
    }
    Ok(Some(commission))
}

impl TryFrom<InvoiceRecord> for Invoice {
    type Error = DomainError;

    fn try_from(mut r: InvoiceRecord) -> DomainResult<Self> {
        if r.invoice_number.trim().is_empty() {
            return Err(malformed("invoice", r.id, "invoice number is blank"));
        }
        let id = InvoiceId::new(r.id);
        let lines = std::mem::take(&mut r.items)
            .into_iter()
            .map(|l| line_from("invoice", r.id, l))
            .collect::<DomainResult<Vec<_>>>()?;
        check_lines_total(r.id, &lines, r.total);

        let payments = payments_from(std::mem::take(&mut r.payment_records))?;
        let ledger = SettlementLedger::restore_with_paid(
            LedgerRef::Invoice(id),
            r.total,
            r.amount_paid,
            payments,
        )?;
        check_status("invoice", r.id, &r.status, ledger.status())?;
        let commission = commission_from(&mut r, id)?;

        Ok(Invoice {
            id,
            invoice_number: r.invoice_number.trim().to_string(),
            customer_id: CustomerId::new(r.customer),
            customer_name: non_blank(r.customer_name),
            date: r.date,
            due_date: r.due_date,
            notes: non_blank(r.notes),
            lines,
            ledger,
            commission,
        })
    }
}

impl TryFrom<BillRecord> for Bill {
    type Error = DomainError;

    fn try_from(r: BillRecord) -> DomainResult<Self> {
        if r.bill_number.trim().is_empty() {
            return Err(malformed("bill", r.id, "bill number is blank"));
        }
        let id = BillId::new(r.id);
        let lines = r
            .items
            .into_iter()
            .map(|l| line_from("bill", r.id, l))
            .collect::<DomainResult<Vec<_>>>()?;
        check_lines_total(r.id, &lines, r.total);

        let ledger = SettlementLedger::restore_with_paid(
            LedgerRef::Bill(id),
            r.total,
            r.amount_paid,
            payments_from(r.payment_records)?,
        )?;
        check_status("bill", r.id, &r.status, ledger.status())?;

        Ok(Bill {
            id,
            bill_number: r.bill_number.trim().to_string(),
            vendor_id: VendorId::new(r.vendor),
            vendor_name: non_blank(r.vendor_name),
            date: r.date,
            due_date: r.due_date,
            notes: non_blank(r.notes),
            lines,
            ledger,
        })
    }
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = DomainError;

    fn try_from(r: TransactionRecord) -> DomainResult<Self> {
        let kind = TransactionType::parse(&r.transaction_type).ok_or_else(|| {
            malformed("transaction", r.id, format!("unknown type {:?}", r.transaction_type))
        })?;
        let party = match (r.vendor, r.customer) {
            (Some(v), None) => PartyRef::Vendor(VendorId::new(v)),
            (None, Some(c)) => PartyRef::Customer(CustomerId::new(c)),
            (Some(_), Some(_)) => {
                return Err(malformed("transaction", r.id, "has both a vendor and a customer"));
            }
            (None, None) => return Err(malformed("transaction", r.id, "has no party")),
        };
        Ok(Transaction {
            id: TransactionId::new(r.id),
            kind,
            date: r.date,
            amount: non_negative("transaction", r.id, "amount", r.amount)?,
            description: r.description,
            reference_id: r.reference_id.unwrap_or_default(),
            party,
        })
    }
}

impl TryFrom<ExpenseRecord> for Expense {
    type Error = DomainError;

    fn try_from(r: ExpenseRecord) -> DomainResult<Self> {
        let category = ExpenseCategory::parse(&r.category)
            .ok_or_else(|| malformed("expense", r.id, format!("unknown category {:?}", r.category)))?;
        let payment_method = PaymentMethod::parse(&r.payment_method).ok_or_else(|| {
            malformed("expense", r.id, format!("unknown payment method {:?}", r.payment_method))
        })?;
        Ok(Expense {
            id: ExpenseId::new(r.id),
            date: r.date,
            category,
            description: r.description,
            amount: non_negative("expense", r.id, "amount", r.amount)?,
            payment_method,
            notes: non_blank(r.notes),
        })
    }
}

impl From<InventorySummaryRecord> for InventorySummary {
    fn from(r: InventorySummaryRecord) -> Self {
        InventorySummary {
            total_items: r.total_items,
            total_meters: r.total_meters,
            unbilled_items: r.unbilled_items,
        }
    }
}

impl From<VendorStockRecord> for VendorStock {
    fn from(r: VendorStockRecord) -> Self {
        VendorStock {
            vendor_id: VendorId::new(r.vendor_id),
            item_count: r.item_count,
            total_meters: r.total_meters,
        }
    }
}

/// Map one record from a successful response.
pub fn decode<R, T>(record: R) -> ApiResult<T>
where
    T: TryFrom<R, Error = DomainError>,
{
    T::try_from(record).map_err(ApiError::Malformed)
}

/// Map a list, setting malformed records aside instead of failing the rest.
pub fn split_valid<R, T>(records: Vec<R>) -> (Vec<T>, Vec<DomainError>)
where
    T: TryFrom<R, Error = DomainError>,
{
    let mut valid = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for record in records {
        match T::try_from(record) {
            Ok(item) => valid.push(item),
            Err(e) => rejected.push(e),
        }
    }
    (valid, rejected)
}

// Outbound.

impl From<&PartyDetails> for PartyPayload {
    fn from(d: &PartyDetails) -> Self {
        PartyPayload {
            name: d.name.trim().to_string(),
            contact: d.contact.trim().to_string(),
            address: d.address.clone(),
            bank_details: d.bank_details.clone(),
            short_description: d.short_description.clone(),
        }
    }
}

impl From<&NewPayment> for PaymentPayload {
    fn from(p: &NewPayment) -> Self {
        let p = p.clone().normalized();
        PaymentPayload {
            date: p.date,
            amount: round_money(p.amount),
            method: p.method.as_str().to_string(),
            bank_name: p.bank_name,
            tid: p.tid,
        }
    }
}

impl From<&LineItem> for LinePayload {
    fn from(l: &LineItem) -> Self {
        LinePayload {
            inventory_item: l.item_id.get(),
            meters: l.meters,
            price: l.price,
        }
    }
}

impl From<&NewInventoryItem> for InventoryPayload {
    fn from(i: &NewInventoryItem) -> Self {
        InventoryPayload {
            lot_number: i.lot_number.trim().to_string(),
            fabric_type: i.fabric_type.trim().to_string(),
            meters: i.meters,
            unit_price: i.unit_price,
            vendor: i.vendor_id.get(),
            received_date: i.received_date,
        }
    }
}

impl From<&NewItemMaster> for ItemMasterPayload {
    fn from(i: &NewItemMaster) -> Self {
        ItemMasterPayload {
            code: i.code.trim().to_string(),
            name: i.name.trim().to_string(),
            category: i.category.trim().to_string(),
            description: i.description.clone(),
            unit_of_measure: i.unit_of_measure.clone(),
            standard_price: i.standard_price,
        }
    }
}

impl From<&NewExpense> for ExpensePayload {
    fn from(e: &NewExpense) -> Self {
        ExpensePayload {
            date: e.date,
            category: e.category.label().to_string(),
            description: e.description.trim().to_string(),
            amount: round_money(e.amount),
            payment_method: e.payment_method.as_str().to_string(),
            notes: e.notes.clone(),
        }
    }
}

/// Create body for a validated invoice draft.
pub fn invoice_payload(draft: &InvoiceDraft, prepared: &PreparedDocument) -> DomainResult<NewInvoicePayload> {
    let customer = draft.customer()?;
    Ok(NewInvoicePayload {
        invoice_number: draft.invoice_number.trim().to_string(),
        customer: customer.get(),
        date: draft.date,
        due_date: prepared.due_date,
        broker: prepared.commission.as_ref().map(|t| t.broker_id.get()),
        commission_type: prepared
            .commission
            .as_ref()
            .map(|t| t.kind.as_str().to_string()),
        commission_value: prepared.commission.as_ref().map(|t| t.value),
        notes: non_blank(draft.notes.clone()),
        items: draft.lines.iter().map(LinePayload::from).collect(),
    })
}

/// Create body for a validated bill draft.
pub fn bill_payload(draft: &BillDraft, prepared: &PreparedDocument) -> DomainResult<NewBillPayload> {
    let vendor = draft.vendor()?;
    Ok(NewBillPayload {
        bill_number: draft.bill_number.trim().to_string(),
        vendor: vendor.get(),
        date: draft.date,
        due_date: prepared.due_date,
        notes: non_blank(draft.notes.clone()),
        items: draft.lines.iter().map(LinePayload::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use textileflow_invoicing::Settleable;

    fn invoice_json(extra: &str) -> String {
        format!(
            r#"{{
                "id": 7, "invoice_number": "INV-7", "customer": 3, "customer_name": "Shah Fabrics",
                "date": "2024-05-01", "due_date": "2024-05-31", "status": "Partially Paid",
                "total": "1000.00", "amount_paid": 400, "balance_due": "600.00", "notes": "",
                "items": [{{"id": 1, "inventory_item": 11, "meters": "100.00", "price": "10.00", "subtotal": "1000.00"}}],
                "payment_records": [{{"id": 9, "date": "2024-05-02", "amount": "400.00", "method": "Bank",
                                     "bank_name": "HBL", "tid": "TX9", "invoice": 7, "bill": null}}]
                {extra}
            }}"#
        )
    }

    #[test]
    fn invoice_record_maps_with_string_and_number_amounts() {
        let record: InvoiceRecord = serde_json::from_str(&invoice_json("")).unwrap();
        let invoice = Invoice::try_from(record).unwrap();
        assert_eq!(invoice.total(), dec!(1000));
        assert_eq!(invoice.amount_paid(), dec!(400));
        assert_eq!(invoice.remaining(), dec!(600));
        assert_eq!(invoice.status(), SettlementStatus::PartiallyPaid);
        assert_eq!(invoice.payments()[0].tid.as_deref(), Some("TX9"));
        assert_eq!(invoice.notes, None);
        assert!(invoice.commission().is_none());
    }

    #[test]
    fn invoice_with_broker_restores_commission() {
        let extra = r#", "broker": 2, "broker_name": "Akram", "commission_type": "Percentage",
                        "commission_value": "5.00", "commission_amount": "50.00", "commission_paid": "20.00""#;
        let record: InvoiceRecord = serde_json::from_str(&invoice_json(extra)).unwrap();
        let invoice = Invoice::try_from(record).unwrap();
        let c = invoice.commission().unwrap();
        assert_eq!(c.amount(), dec!(50));
        assert_eq!(c.paid(), dec!(20));
        assert_eq!(c.outstanding(), dec!(30));
        assert_eq!(c.broker_name(), Some("Akram"));
    }

    #[test]
    fn rejects_unknown_status_and_overpaid_records() {
        let mut record: InvoiceRecord = serde_json::from_str(&invoice_json("")).unwrap();
        record.status = "Cancelled".into();
        assert!(matches!(Invoice::try_from(record), Err(DomainError::MalformedRecord(_))));

        let mut record: InvoiceRecord = serde_json::from_str(&invoice_json("")).unwrap();
        record.amount_paid = dec!(1500);
        assert!(Invoice::try_from(record).is_err());
    }

    #[test]
    fn unknown_commission_type_is_malformed() {
        let extra = r#", "broker": 2, "commission_type": "Weekly""#;
        let record: InvoiceRecord = serde_json::from_str(&invoice_json(extra)).unwrap();
        assert!(Invoice::try_from(record).is_err());
    }

    #[test]
    fn one_overpaid_invoice_does_not_sink_the_list() {
        let healthy: InvoiceRecord = serde_json::from_str(&invoice_json("")).unwrap();
        let mut overpaid: InvoiceRecord = serde_json::from_str(&invoice_json("")).unwrap();
        overpaid.id = 8;
        overpaid.invoice_number = "INV-8".into();
        overpaid.total = dec!(500);
        overpaid.amount_paid = dec!(600);
        overpaid.payment_records.clear();

        let (valid, rejected) = split_valid::<_, Invoice>(vec![healthy, overpaid]);
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].invoice_number, "INV-7");
        assert_eq!(rejected.len(), 1);
        assert!(matches!(rejected[0], DomainError::MalformedRecord(_)));
    }

    #[test]
    fn single_record_failures_are_reported_as_malformed() {
        let mut record: InvoiceRecord = serde_json::from_str(&invoice_json("")).unwrap();
        record.status = "Cancelled".into();
        let err = decode::<_, Invoice>(record).unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
        assert!(!err.is_local());
    }

    #[test]
    fn vendor_balance_is_flipped_to_owed_negative() {
        let record: VendorRecord = serde_json::from_str(
            r#"{"id": 1, "name": " ABC Textiles ", "contact": "0300", "balance": "7660.00"}"#,
        )
        .unwrap();
        let vendor = Vendor::try_from(record).unwrap();
        assert_eq!(vendor.name, "ABC Textiles");
        assert_eq!(vendor.balance, dec!(-7660));
        assert_eq!(vendor.payable(), dec!(7660));
    }

    #[test]
    fn blank_names_are_rejected() {
        let record: CustomerRecord =
            serde_json::from_str(r#"{"id": 4, "name": "  ", "balance": 0}"#).unwrap();
        assert!(Customer::try_from(record).is_err());
    }

    #[test]
    fn transaction_needs_exactly_one_party() {
        let base = r#"{"id": 1, "transaction_type": "Payment", "date": "2024-01-02", "amount": "50"}"#;
        let record: TransactionRecord = serde_json::from_str(base).unwrap();
        assert!(Transaction::try_from(record).is_err());

        let record: TransactionRecord = serde_json::from_str(
            r#"{"id": 1, "transaction_type": "Payment", "date": "2024-01-02", "amount": 50, "customer": 3}"#,
        )
        .unwrap();
        let tx = Transaction::try_from(record).unwrap();
        assert_eq!(tx.party, PartyRef::Customer(CustomerId::new(3)));
        assert_eq!(tx.outstanding_delta(), dec!(-50));
    }

    #[test]
    fn expense_labels_must_be_known() {
        let ok: ExpenseRecord = serde_json::from_str(
            r#"{"id": 1, "date": "2024-01-02", "category": "Builty (Transport)", "description": "truck",
                "amount": "1200.00", "payment_method": "Cash"}"#,
        )
        .unwrap();
        assert_eq!(Expense::try_from(ok).unwrap().category, ExpenseCategory::Transport);

        let bad: ExpenseRecord = serde_json::from_str(
            r#"{"id": 1, "date": "2024-01-02", "category": "Travel", "description": "x",
                "amount": 1, "payment_method": "Cash"}"#,
        )
        .unwrap();
        assert!(Expense::try_from(bad).is_err());
    }

    #[test]
    fn invoice_payload_carries_commission_terms_and_due_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let draft = InvoiceDraft::new("INV-9", CustomerId::new(3), date)
            .with_line(LineItem::new(InventoryItemId::new(11), dec!(10), dec!(200)))
            .with_broker(BrokerId::new(2), CommissionType::Fixed, dec!(75));
        let prepared = draft.prepare().unwrap();
        let payload = invoice_payload(&draft, &prepared).unwrap();

        assert_eq!(payload.due_date, NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
        assert_eq!(payload.broker, Some(2));
        assert_eq!(payload.commission_type.as_deref(), Some("Fixed"));
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["items"][0]["inventory_item"], 11);
        assert_eq!(json["items"][0]["price"], "200");
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn payment_payload_drops_bank_fields_for_cash() {
        let mut p = NewPayment::bank(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), dec!(10), "HBL", "T1");
        p.method = PaymentMethod::Cash;
        let payload = PaymentPayload::from(&p);
        assert_eq!(payload.method, "Cash");
        assert_eq!(payload.tid, None);
        assert_eq!(payload.bank_name, None);
    }
}
