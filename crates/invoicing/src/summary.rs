use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::document::Settleable;
use crate::status::SettlementStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBucket {
    pub status: SettlementStatus,
    pub label: String,
    pub count: usize,
    pub amount: Decimal,
}

/// Totals across a set of invoices or bills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub count: usize,
    pub total_amount: Decimal,
    pub total_paid: Decimal,
    pub outstanding: Decimal,
    /// One bucket per status, in lifecycle order.
    pub by_status: Vec<StatusBucket>,
}

pub fn summarize<D: Settleable>(docs: &[D]) -> DocumentSummary {
    let by_status = SettlementStatus::ALL
        .iter()
        .map(|status| {
            let matching = docs.iter().filter(|d| d.status() == *status);
            StatusBucket {
                status: *status,
                label: status.label(D::KIND).to_string(),
                count: matching.clone().count(),
                amount: matching.map(Settleable::total).sum(),
            }
        })
        .collect();

    let total_amount: Decimal = docs.iter().map(Settleable::total).sum();
    let total_paid: Decimal = docs.iter().map(Settleable::amount_paid).sum();
    DocumentSummary {
        count: docs.len(),
        total_amount,
        total_paid,
        outstanding: total_amount - total_paid,
        by_status,
    }
}

/// Documents still open past their due date, oldest due date first.
pub fn overdue<D: Settleable>(docs: &[D], today: NaiveDate) -> Vec<&D> {
    let mut late: Vec<&D> = docs.iter().filter(|d| d.is_overdue(today)).collect();
    late.sort_by_key(|d| d.due_date());
    late
}

/// Listing order: overdue first, then newest document date first.
pub fn sort_for_listing<D: Settleable>(docs: &mut [D], today: NaiveDate) {
    docs.sort_by(|a, b| {
        b.is_overdue(today)
            .cmp(&a.is_overdue(today))
            .then_with(|| b.date().cmp(&a.date()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Bill;
    use crate::payment::NewPayment;
    use crate::settlement::{LedgerRef, SettlementLedger};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use textileflow_core::{BillId, VendorId};

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn bill(id: i64, date: NaiveDate, due: NaiveDate, total: Decimal, paid: Decimal) -> Bill {
        let bill_id = BillId::new(id);
        let mut ledger = SettlementLedger::new(LedgerRef::Bill(bill_id), total).unwrap();
        if paid > Decimal::ZERO {
            ledger.record(NewPayment::cash(date, paid), Utc::now()).unwrap();
        }
        Bill {
            id: bill_id,
            bill_number: format!("B-{id}"),
            vendor_id: VendorId::new(1),
            vendor_name: None,
            date,
            due_date: due,
            notes: None,
            lines: Vec::new(),
            ledger,
        }
    }

    fn sample() -> Vec<Bill> {
        vec![
            bill(1, d(1, 1), d(1, 31), dec!(1000), dec!(1000)),
            bill(2, d(2, 1), d(3, 2), dec!(500), dec!(200)),
            bill(3, d(3, 1), d(3, 31), dec!(300), Decimal::ZERO),
            bill(4, d(1, 15), d(2, 14), dec!(80), Decimal::ZERO),
        ]
    }

    #[test]
    fn summary_buckets_by_status() {
        let s = summarize(&sample());
        assert_eq!(s.count, 4);
        assert_eq!(s.total_amount, dec!(1880));
        assert_eq!(s.total_paid, dec!(1200));
        assert_eq!(s.outstanding, dec!(680));

        assert_eq!(s.by_status[0].label, "Unpaid");
        assert_eq!(s.by_status[0].count, 2);
        assert_eq!(s.by_status[0].amount, dec!(380));
        assert_eq!(s.by_status[1].count, 1);
        assert_eq!(s.by_status[2].amount, dec!(1000));
    }

    #[test]
    fn overdue_excludes_paid_and_future() {
        let docs = sample();
        let late: Vec<i64> = overdue(&docs, d(3, 10)).iter().map(|b| b.id.get()).collect();
        assert_eq!(late, vec![4, 2]);
    }

    #[test]
    fn listing_puts_overdue_first_then_newest() {
        let mut docs = sample();
        sort_for_listing(&mut docs, d(3, 10));
        let order: Vec<i64> = docs.iter().map(|b| b.id.get()).collect();
        assert_eq!(order, vec![2, 4, 3, 1]);
    }

    #[test]
    fn empty_summary_is_zero() {
        let s = summarize::<Bill>(&[]);
        assert_eq!(s.count, 0);
        assert_eq!(s.outstanding, Decimal::ZERO);
        assert!(s.by_status.iter().all(|b| b.count == 0));
    }
}
