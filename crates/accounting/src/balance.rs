//! Party balances derived from open documents.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use textileflow_invoicing::{Bill, Invoice, Settleable};
use textileflow_parties::PartyRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyBalance {
    pub party: PartyRef,
    /// Σ(total − amount paid) over the party's documents.
    pub outstanding: Decimal,
    pub open_documents: usize,
}

impl PartyBalance {
    /// Outstanding signed per the party's convention.
    pub fn signed(&self) -> Decimal {
        self.party.kind().signed(self.outstanding)
    }
}

/// Balance of every party that has at least one document.
///
/// Vendors come before customers; each side is ordered by id.
pub fn party_balances(invoices: &[Invoice], bills: &[Bill]) -> Vec<PartyBalance> {
    let mut acc: BTreeMap<PartyRef, PartyBalance> = BTreeMap::new();
    let mut add = |party: PartyRef, remaining: Decimal| {
        let entry = acc.entry(party).or_insert(PartyBalance {
            party,
            outstanding: Decimal::ZERO,
            open_documents: 0,
        });
        entry.outstanding += remaining;
        if remaining > Decimal::ZERO {
            entry.open_documents += 1;
        }
    };
    for inv in invoices {
        add(PartyRef::Customer(inv.customer_id), inv.remaining());
    }
    for bill in bills {
        add(PartyRef::Vendor(bill.vendor_id), bill.remaining());
    }
    acc.into_values().collect()
}

/// Balance of one party.
pub fn balance_of(party: PartyRef, invoices: &[Invoice], bills: &[Bill]) -> PartyBalance {
    party_balances(invoices, bills)
        .into_iter()
        .find(|b| b.party == party)
        .unwrap_or(PartyBalance {
            party,
            outstanding: Decimal::ZERO,
            open_documents: 0,
        })
}

/// Total owed to the business by customers.
pub fn receivables(invoices: &[Invoice]) -> Decimal {
    invoices.iter().map(Settleable::remaining).sum()
}

/// Total the business owes vendors (unsigned).
pub fn payables(bills: &[Bill]) -> Decimal {
    bills.iter().map(Settleable::remaining).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use textileflow_core::{BillId, CustomerId, InvoiceId, VendorId};
    use textileflow_invoicing::{LedgerRef, NewPayment, SettlementLedger};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    fn invoice(id: i64, customer: i64, total: Decimal, paid: Decimal) -> Invoice {
        let inv_id = InvoiceId::new(id);
        let mut ledger = SettlementLedger::new(LedgerRef::Invoice(inv_id), total).unwrap();
        if paid > Decimal::ZERO {
            ledger.record(NewPayment::cash(day(), paid), Utc::now()).unwrap();
        }
        Invoice {
            id: inv_id,
            invoice_number: format!("INV-{id}"),
            customer_id: CustomerId::new(customer),
            customer_name: None,
            date: day(),
            due_date: day(),
            notes: None,
            lines: Vec::new(),
            ledger,
            commission: None,
        }
    }

    fn bill(id: i64, vendor: i64, total: Decimal, paid: Decimal) -> Bill {
        let bill_id = BillId::new(id);
        let mut ledger = SettlementLedger::new(LedgerRef::Bill(bill_id), total).unwrap();
        if paid > Decimal::ZERO {
            ledger.record(NewPayment::cash(day(), paid), Utc::now()).unwrap();
        }
        Bill {
            id: bill_id,
            bill_number: format!("B-{id}"),
            vendor_id: VendorId::new(vendor),
            vendor_name: None,
            date: day(),
            due_date: day(),
            notes: None,
            lines: Vec::new(),
            ledger,
        }
    }

    #[test]
    fn balances_follow_sign_convention() {
        let invoices = vec![
            invoice(1, 1, dec!(1000), dec!(400)),
            invoice(2, 1, dec!(500), Decimal::ZERO),
            invoice(3, 2, dec!(300), dec!(300)),
        ];
        let bills = vec![bill(1, 9, dec!(10000), dec!(2340))];

        let balances = party_balances(&invoices, &bills);
        assert_eq!(balances.len(), 3);

        let c1 = balance_of(PartyRef::Customer(CustomerId::new(1)), &invoices, &bills);
        assert_eq!(c1.outstanding, dec!(1100));
        assert_eq!(c1.signed(), dec!(1100));
        assert_eq!(c1.open_documents, 2);

        let v = balance_of(PartyRef::Vendor(VendorId::new(9)), &invoices, &bills);
        assert_eq!(v.signed(), dec!(-7660));

        let c2 = balance_of(PartyRef::Customer(CustomerId::new(2)), &invoices, &bills);
        assert_eq!(c2.outstanding, Decimal::ZERO);
        assert_eq!(c2.open_documents, 0);

        assert_eq!(receivables(&invoices), dec!(1100));
        assert_eq!(payables(&bills), dec!(7660));
    }

    #[test]
    fn unknown_party_has_zero_balance() {
        let b = balance_of(PartyRef::Vendor(VendorId::new(77)), &[], &[]);
        assert_eq!(b.outstanding, Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn party_balances_sum_to_receivables(
            docs in proptest::collection::vec((1i64..4, 1i64..100_000, 0u8..=100), 0..25)
        ) {
            let invoices: Vec<Invoice> = docs
                .iter()
                .enumerate()
                .map(|(i, (customer, total, pct))| {
                    let total = Decimal::new(*total, 2);
                    let paid = textileflow_core::money::percent_of(total, Decimal::from(*pct));
                    invoice(i as i64 + 1, *customer, total, paid)
                })
                .collect();
            let sum: Decimal = party_balances(&invoices, &[]).iter().map(|b| b.outstanding).sum();
            prop_assert_eq!(sum, receivables(&invoices));
        }
    }
}
