//! Feature services: every user-facing operation, bound to the API client
//! and kept consistent with a shared [`Snapshot`].

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tokio::task::JoinSet;

use textileflow_accounting::{Expense, NewExpense, PartyLog};
use textileflow_client::{
    ApiClient, ApiError, ApiResult, CreatedWithPayment, ImportError, ImportKind, ImportReport,
    Importer,
};
use textileflow_core::{BillId, BrokerId, CustomerId, DomainError, ExpenseId, InvoiceId, VendorId};
use textileflow_events::{AppEvent, Notifier};
use textileflow_inventory::{InventoryItem, ItemMaster, NewInventoryItem, NewItemMaster};
use textileflow_invoicing::{
    Bill, BillDraft, Invoice, InvoiceDraft, NewPayment, SettlementError, Settleable,
};
use textileflow_parties::{Broker, Customer, PartyDetails, PartyRef, Vendor};

use crate::snapshot::Snapshot;

/// Collections that can be re-fetched after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Vendors,
    Customers,
    Inventory,
    Invoices,
    Bills,
}

/// Application state shared by every command.
#[derive(Clone)]
pub struct Workspace {
    client: ApiClient,
    snapshot: Arc<RwLock<Snapshot>>,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("base_url", &self.client.base_url())
            .finish_non_exhaustive()
    }
}

impl Workspace {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            snapshot: Arc::new(RwLock::new(Snapshot::default())),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn notifier(&self) -> &Notifier {
        self.client.notifier()
    }

    pub async fn snapshot(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.snapshot.read().await
    }

    /// Fetch every collection and the per-party transaction logs.
    pub async fn load(&self) -> ApiResult<()> {
        let c = &self.client;
        let (vendors, customers, brokers, inventory, item_master, invoices, bills, expenses) = tokio::try_join!(
            c.list_vendors(),
            c.list_customers(),
            c.list_brokers(),
            c.list_inventory(),
            c.list_item_master(),
            c.list_invoices(),
            c.list_bills(),
            c.list_expenses(),
        )?;
        let logs = self.fetch_logs(&vendors, &customers).await;

        tracing::info!(
            vendors = vendors.len(),
            customers = customers.len(),
            inventory = inventory.len(),
            invoices = invoices.len(),
            bills = bills.len(),
            "workspace loaded"
        );
        *self.snapshot.write().await = Snapshot {
            vendors,
            customers,
            brokers,
            inventory,
            item_master,
            invoices,
            bills,
            expenses,
            logs,
        };
        Ok(())
    }

    /// Reload everything without signing out.
    pub async fn refresh(&self) -> ApiResult<()> {
        let notifier = self.notifier();
        notifier.publish(AppEvent::RefreshRequested);
        notifier.info("Refreshing data...");
        match self.load().await {
            Ok(()) => {
                notifier.success("Data refreshed");
                notifier.publish(AppEvent::DataRefreshed);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "soft refresh failed");
                notifier.error("Failed to refresh data");
                Err(e)
            }
        }
    }

    // Parties

    pub async fn add_vendor(&self, details: &PartyDetails) -> ApiResult<Vendor> {
        details.validate().map_err(|e| self.reject(e))?;
        let vendor = self.client.create_vendor(details).await?;
        self.snapshot.write().await.vendors.push(vendor.clone());
        Ok(vendor)
    }

    pub async fn update_vendor(&self, id: VendorId, details: &PartyDetails) -> ApiResult<Vendor> {
        details.validate().map_err(|e| self.reject(e))?;
        let vendor = self.client.update_vendor(id, details).await?;
        let mut snap = self.snapshot.write().await;
        if let Some(slot) = snap.vendors.iter_mut().find(|v| v.id == id) {
            *slot = vendor.clone();
        }
        Ok(vendor)
    }

    pub async fn add_customer(&self, details: &PartyDetails) -> ApiResult<Customer> {
        details.validate().map_err(|e| self.reject(e))?;
        let customer = self.client.create_customer(details).await?;
        self.snapshot.write().await.customers.push(customer.clone());
        Ok(customer)
    }

    pub async fn update_customer(&self, id: CustomerId, details: &PartyDetails) -> ApiResult<Customer> {
        details.validate().map_err(|e| self.reject(e))?;
        let customer = self.client.update_customer(id, details).await?;
        let mut snap = self.snapshot.write().await;
        if let Some(slot) = snap.customers.iter_mut().find(|c| c.id == id) {
            *slot = customer.clone();
        }
        Ok(customer)
    }

    pub async fn add_broker(&self, details: &PartyDetails) -> ApiResult<Broker> {
        details.validate_broker().map_err(|e| self.reject(e))?;
        let broker = self.client.create_broker(details).await?;
        self.snapshot.write().await.brokers.push(broker.clone());
        Ok(broker)
    }

    pub async fn update_broker(&self, id: BrokerId, details: &PartyDetails) -> ApiResult<Broker> {
        details.validate_broker().map_err(|e| self.reject(e))?;
        let broker = self.client.update_broker(id, details).await?;
        let mut snap = self.snapshot.write().await;
        if let Some(slot) = snap.brokers.iter_mut().find(|b| b.id == id) {
            *slot = broker.clone();
        }
        Ok(broker)
    }

    /// Ask the backend to recompute a party balance from its transaction log.
    pub async fn recalculate_balance(&self, party: PartyRef) -> ApiResult<()> {
        match party {
            PartyRef::Vendor(id) => {
                let vendor = self.client.update_vendor_balance(id).await?;
                let mut snap = self.snapshot.write().await;
                if let Some(slot) = snap.vendors.iter_mut().find(|v| v.id == id) {
                    *slot = vendor;
                }
            }
            PartyRef::Customer(id) => {
                let customer = self.client.update_customer_balance(id).await?;
                let mut snap = self.snapshot.write().await;
                if let Some(slot) = snap.customers.iter_mut().find(|c| c.id == id) {
                    *slot = customer;
                }
            }
        }
        Ok(())
    }

    // Stock

    /// Record a received lot. Every line is checked before anything is sent.
    pub async fn receive_stock(&self, items: &[NewInventoryItem]) -> ApiResult<Vec<InventoryItem>> {
        if items.is_empty() {
            return Err(self.reject(DomainError::validation(
                "Please provide a Lot Number and at least one fabric item",
            )));
        }
        for item in items {
            item.validate().map_err(|e| self.reject(e))?;
        }

        let mut created = Vec::with_capacity(items.len());
        for item in items {
            match self.client.create_inventory_item(item).await {
                Ok(saved) => created.push(saved),
                Err(e) => {
                    tracing::warn!(lot = %item.lot_number, received = created.len(), "stock receipt stopped");
                    self.reload(&[Part::Inventory]).await;
                    return Err(e);
                }
            }
        }
        tracing::info!(lines = created.len(), "stock received");
        self.reload(&[Part::Inventory]).await;
        Ok(created)
    }

    pub async fn add_item_master(&self, item: &NewItemMaster) -> ApiResult<ItemMaster> {
        item.validate().map_err(|e| self.reject(e))?;
        let saved = self.client.create_item_master(item).await?;
        self.snapshot.write().await.item_master.push(saved.clone());
        Ok(saved)
    }

    // Documents

    pub async fn create_invoice(&self, draft: &InvoiceDraft) -> ApiResult<CreatedWithPayment<Invoice>> {
        draft.prepare().map_err(|e| self.reject(e))?;
        let stock = self.snapshot.read().await.check_stock(&draft.lines);
        stock.map_err(|e| self.reject(e))?;

        let created = self.client.create_invoice(draft).await?;
        self.snapshot.write().await.upsert_invoice(created.document.clone());
        self.reload(&[Part::Inventory, Part::Customers]).await;
        Ok(created)
    }

    pub async fn create_bill(&self, draft: &BillDraft) -> ApiResult<CreatedWithPayment<Bill>> {
        draft.prepare().map_err(|e| self.reject(e))?;
        let vendor = draft.vendor().map_err(|e| self.reject(e))?;
        let billable = self.snapshot.read().await.check_billable(vendor, &draft.lines);
        billable.map_err(|e| self.reject(e))?;

        let created = self.client.create_bill(draft).await?;
        self.snapshot.write().await.upsert_bill(created.document.clone());
        self.reload(&[Part::Inventory, Part::Vendors]).await;
        Ok(created)
    }

    /// Record a customer payment against an invoice.
    pub async fn receive_payment(&self, id: InvoiceId, payment: NewPayment) -> ApiResult<Invoice> {
        let payment = payment.normalized();
        let invoice = self.find_invoice(id).await?;
        self.guard_payment(invoice.check_payment(&payment))?;

        let updated = self.client.add_invoice_payment(id, &payment).await?;
        self.snapshot.write().await.upsert_invoice(updated.clone());
        self.reload(&[Part::Customers]).await;
        Ok(updated)
    }

    /// Record a payment to a supplier against a bill.
    pub async fn pay_bill(&self, id: BillId, payment: NewPayment) -> ApiResult<Bill> {
        let payment = payment.normalized();
        let bill = self.find_bill(id).await?;
        self.guard_payment(bill.check_payment(&payment))?;

        let updated = self.client.add_bill_payment(id, &payment).await?;
        self.snapshot.write().await.upsert_bill(updated.clone());
        self.reload(&[Part::Vendors]).await;
        Ok(updated)
    }

    /// Pay the broker on an invoice.
    pub async fn settle_commission(&self, id: InvoiceId, payment: NewPayment) -> ApiResult<Invoice> {
        let payment = payment.normalized();
        let invoice = self.find_invoice(id).await?;
        self.guard_payment(invoice.check_commission_payment(&payment))?;

        let updated = self.client.settle_commission(id, &payment).await?;
        self.snapshot.write().await.upsert_invoice(updated.clone());
        Ok(updated)
    }

    // Expenses

    pub async fn add_expense(&self, expense: &NewExpense) -> ApiResult<Expense> {
        expense.validate().map_err(|e| self.reject(e))?;
        let saved = self.client.create_expense(expense).await?;
        self.snapshot.write().await.expenses.push(saved.clone());
        Ok(saved)
    }

    pub async fn delete_expense(&self, id: ExpenseId) -> ApiResult<()> {
        self.client.delete_expense(id).await?;
        self.snapshot.write().await.expenses.retain(|e| e.id != id);
        Ok(())
    }

    // Imports

    pub async fn import(&self, kind: ImportKind, path: &Path) -> Result<ImportReport, ImportError> {
        let report = Importer::new(&self.client).import_path(kind, path).await?;
        self.reload(parts_touched_by(kind)).await;
        Ok(report)
    }

    /// Re-submit the rows that failed in `report`.
    pub async fn retry_import(&self, report: &ImportReport) -> Result<ImportReport, ImportError> {
        let retried = Importer::new(&self.client).retry(report).await?;
        self.reload(parts_touched_by(report.kind)).await;
        Ok(retried)
    }

    async fn find_invoice(&self, id: InvoiceId) -> ApiResult<Invoice> {
        let cached = self.snapshot.read().await.invoice(id).cloned();
        match cached {
            Some(invoice) => Ok(invoice),
            None => self.client.get_invoice(id).await,
        }
    }

    async fn find_bill(&self, id: BillId) -> ApiResult<Bill> {
        let cached = self.snapshot.read().await.bill(id).cloned();
        match cached {
            Some(bill) => Ok(bill),
            None => self.client.get_bill(id).await,
        }
    }

    /// Toast a locally rejected payment in the words the desk expects.
    fn guard_payment(&self, check: Result<(), SettlementError>) -> ApiResult<()> {
        check.map_err(|e| {
            let message = match &e {
                SettlementError::NonPositiveAmount => "Payment amount must be greater than zero".to_string(),
                SettlementError::ExceedsOutstanding { .. } => "Payment cannot exceed open balance".to_string(),
                SettlementError::MissingTransactionReference => {
                    "Please enter Transaction ID for bank payment".to_string()
                }
                other => other.to_string(),
            };
            tracing::info!(error = %e, "payment rejected before sending");
            self.notifier().error(message);
            ApiError::Settlement(e)
        })
    }

    fn reject(&self, err: impl Into<ApiError>) -> ApiError {
        let err = err.into();
        tracing::info!(error = %err, "request rejected before sending");
        self.notifier().error(err.user_message());
        err
    }

    /// Re-fetch collections after a write. The write already succeeded, so
    /// failures here are only logged.
    async fn reload(&self, parts: &[Part]) {
        for part in parts {
            if let Err(e) = self.reload_part(*part).await {
                tracing::warn!(part = ?part, error = %e, "reload after write failed");
            }
        }
    }

    async fn reload_part(&self, part: Part) -> ApiResult<()> {
        match part {
            Part::Vendors => {
                let vendors = self.client.list_vendors().await?;
                let logs = self.fetch_logs(&vendors, &[]).await;
                let mut snap = self.snapshot.write().await;
                snap.logs.retain(|p, _| !matches!(p, PartyRef::Vendor(_)));
                snap.logs.extend(logs);
                snap.vendors = vendors;
            }
            Part::Customers => {
                let customers = self.client.list_customers().await?;
                let logs = self.fetch_logs(&[], &customers).await;
                let mut snap = self.snapshot.write().await;
                snap.logs.retain(|p, _| !matches!(p, PartyRef::Customer(_)));
                snap.logs.extend(logs);
                snap.customers = customers;
            }
            Part::Inventory => {
                let inventory = self.client.list_inventory().await?;
                self.snapshot.write().await.inventory = inventory;
            }
            Part::Invoices => {
                let invoices = self.client.list_invoices().await?;
                self.snapshot.write().await.invoices = invoices;
            }
            Part::Bills => {
                let bills = self.client.list_bills().await?;
                self.snapshot.write().await.bills = bills;
            }
        }
        Ok(())
    }

    /// Fetch transaction logs concurrently. A party whose log fails to load
    /// is left out.
    async fn fetch_logs(&self, vendors: &[Vendor], customers: &[Customer]) -> BTreeMap<PartyRef, PartyLog> {
        let mut tasks = JoinSet::new();
        for vendor in vendors {
            let client = self.client.clone();
            let id = vendor.id;
            tasks.spawn(async move { (PartyRef::Vendor(id), client.vendor_transactions(id).await) });
        }
        for customer in customers {
            let client = self.client.clone();
            let id = customer.id;
            tasks.spawn(async move { (PartyRef::Customer(id), client.customer_transactions(id).await) });
        }

        let mut logs = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((party, Ok(entries))) => {
                    logs.insert(party, PartyLog::new(party, entries));
                }
                Ok((party, Err(e))) => {
                    tracing::warn!(party = ?party, error = %e, "transaction log unavailable");
                }
                Err(e) => tracing::warn!(error = %e, "transaction log task failed"),
            }
        }
        logs
    }
}

fn parts_touched_by(kind: ImportKind) -> &'static [Part] {
    match kind {
        ImportKind::Suppliers => &[Part::Vendors],
        ImportKind::Customers => &[Part::Customers],
        ImportKind::Inventory => &[Part::Inventory],
        ImportKind::Bills => &[Part::Bills, Part::Inventory, Part::Vendors],
        ImportKind::Invoices => &[Part::Invoices, Part::Inventory, Part::Customers],
    }
}
