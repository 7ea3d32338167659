//! Bulk CSV import.
//!
//! Rows are keyed by header name (several spellings accepted per column)
//! and each row becomes one create call. A failing row does not stop the
//! rest; the report lists every row's outcome so failed rows can be fixed
//! and retried.
//!
//! Invoice and bill rows carry their lines in one `items` cell formatted as
//! `inventory_id|meters|price;inventory_id|meters|price`.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use textileflow_core::money::parse_amount;
use textileflow_core::{CustomerId, InventoryItemId, VendorId};
use textileflow_inventory::NewInventoryItem;
use textileflow_invoicing::{BillDraft, InvoiceDraft, LineItem};
use textileflow_parties::PartyDetails;

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("No rows to import")]
    Empty,

    #[error("No failed rows to retry")]
    NothingToRetry,

    #[error("could not read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not open {path}: {message}")]
    Io { path: String, message: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Problem with a single row, reported but not fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RowError(pub String);

impl RowError {
    fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    Suppliers,
    Customers,
    Inventory,
    Bills,
    Invoices,
}

impl ImportKind {
    pub fn noun(&self) -> &'static str {
        match self {
            ImportKind::Suppliers => "suppliers",
            ImportKind::Customers => "customers",
            ImportKind::Inventory => "inventory items",
            ImportKind::Bills => "bills",
            ImportKind::Invoices => "invoices",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "suppliers" | "supplier" | "vendors" | "vendor" => Some(ImportKind::Suppliers),
            "customers" | "customer" => Some(ImportKind::Customers),
            "inventory" => Some(ImportKind::Inventory),
            "bills" | "bill" => Some(ImportKind::Bills),
            "invoices" | "invoice" => Some(ImportKind::Invoices),
            _ => None,
        }
    }
}

/// One data row, keyed by trimmed header. `line` is 1-based and counts the
/// header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub line: usize,
    fields: HashMap<String, String>,
}

impl CsvRow {
    pub fn new(line: usize, fields: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            line,
            fields: fields.into_iter().collect(),
        }
    }

    /// First non-blank value among `keys`.
    pub fn field(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.fields.get(*k))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }

    fn required(&self, keys: &[&str]) -> Result<&str, RowError> {
        self.field(keys)
            .ok_or_else(|| RowError::new(format!("missing {}", keys[0])))
    }
}

/// Read all non-blank rows. Headers are trimmed; short rows pad with blanks.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<CsvRow>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record?;
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), record.get(i).unwrap_or_default().to_string()));
        rows.push(CsvRow::new(idx + 2, fields));
    }
    Ok(rows)
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, RowError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| RowError::new(format!("{field} {raw:?} is not a YYYY-MM-DD date")))
}

fn parse_number(raw: &str, field: &str) -> Result<Decimal, RowError> {
    parse_amount(raw).map_err(|_| RowError::new(format!("{field} {raw:?} is not a number")))
}

/// Parse an `id|meters|price;...` cell.
pub fn parse_items(cell: &str) -> Result<Vec<LineItem>, RowError> {
    cell.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let cols: Vec<&str> = part.split('|').map(str::trim).collect();
            let [id, meters, price] = cols.as_slice() else {
                return Err(RowError::new(format!(
                    "line {part:?} must be inventory_id|meters|price"
                )));
            };
            let id: InventoryItemId = id
                .parse()
                .map_err(|_| RowError::new(format!("inventory id {id:?} is not valid")))?;
            Ok(LineItem::new(
                id,
                parse_number(meters, "meters")?,
                parse_number(price, "price")?,
            ))
        })
        .collect()
}

/// Lowercased name → id, for resolving party columns.
#[derive(Debug, Clone)]
pub struct NameIndex<Id> {
    by_name: HashMap<String, Id>,
}

impl<Id> Default for NameIndex<Id> {
    fn default() -> Self {
        Self {
            by_name: HashMap::new(),
        }
    }
}

impl<Id: Copy + core::str::FromStr> NameIndex<Id> {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, Id)>) -> Self {
        Self {
            by_name: entries
                .into_iter()
                .map(|(name, id)| (name.trim().to_lowercase(), id))
                .collect(),
        }
    }

    /// Resolve by name first, then by an explicit id column.
    fn resolve(&self, name: Option<&str>, id: Option<&str>) -> Option<Id> {
        name.and_then(|n| self.by_name.get(&n.to_lowercase()).copied())
            .or_else(|| id.and_then(|raw| raw.parse().ok()))
    }
}

pub fn supplier_from_row(row: &CsvRow) -> Result<PartyDetails, RowError> {
    let mut details = PartyDetails::new(
        row.field(&["name", "Name", "supplier", "Supplier"]).unwrap_or_default(),
        row.field(&["contact", "Contact", "phone", "Phone"]).unwrap_or_default(),
    );
    if let Some(address) = row.field(&["address", "Address", "addr"]) {
        details = details.with_address(address);
    }
    if let Some(bank) = row.field(&["bank_details", "bank", "Bank"]) {
        details = details.with_bank_details(bank);
    }
    details.validate().map_err(|e| RowError::new(e.to_string()))?;
    Ok(details)
}

pub fn customer_from_row(row: &CsvRow) -> Result<PartyDetails, RowError> {
    let mut details = PartyDetails::new(
        row.field(&["name", "Name", "customer", "Customer"]).unwrap_or_default(),
        row.field(&["contact", "Contact", "phone", "Phone"]).unwrap_or_default(),
    );
    if let Some(address) = row.field(&["address", "Address"]) {
        details = details.with_address(address);
    }
    details.validate().map_err(|e| RowError::new(e.to_string()))?;
    Ok(details)
}

pub fn inventory_from_row(row: &CsvRow, vendors: &NameIndex<VendorId>) -> Result<NewInventoryItem, RowError> {
    let vendor_id = vendors
        .resolve(row.field(&["vendor", "Vendor"]), row.field(&["vendor_id"]))
        .ok_or_else(|| RowError::new("unknown vendor"))?;
    let item = NewInventoryItem {
        lot_number: row.required(&["lot_number", "lot", "Lot"])?.to_string(),
        fabric_type: row.required(&["fabric_type", "type", "FabricType"])?.to_string(),
        meters: parse_number(row.required(&["meters", "quantity"])?, "meters")?,
        unit_price: parse_number(row.field(&["unit_price", "price"]).unwrap_or("0"), "unit_price")?,
        vendor_id,
        received_date: parse_date(row.required(&["received_date", "date"])?, "received_date")?,
    };
    item.validate().map_err(|e| RowError::new(e.to_string()))?;
    Ok(item)
}

pub fn bill_from_row(row: &CsvRow, vendors: &NameIndex<VendorId>) -> Result<BillDraft, RowError> {
    let vendor_id = vendors
        .resolve(
            row.field(&["vendor", "Vendor", "vendor_name"]),
            row.field(&["vendor_id"]),
        )
        .ok_or_else(|| RowError::new("unknown vendor"))?;
    let number = row.required(&["bill_number", "BillNumber", "id"])?;
    let date = parse_date(row.required(&["date"])?, "date")?;
    let mut draft = BillDraft::new(number, vendor_id, date);
    draft.due_date = row
        .field(&["due_date", "dueDate"])
        .map(|d| parse_date(d, "due_date"))
        .transpose()?;
    draft.notes = row.field(&["notes"]).map(str::to_string);
    draft.lines = parse_items(row.field(&["items", "Items"]).unwrap_or_default())?;
    draft.prepare().map_err(|e| RowError::new(e.to_string()))?;
    Ok(draft)
}

pub fn invoice_from_row(row: &CsvRow, customers: &NameIndex<CustomerId>) -> Result<InvoiceDraft, RowError> {
    let customer_id = customers
        .resolve(
            row.field(&["customer", "Customer", "customer_name", "CustomerName"]),
            row.field(&["customer_id"]),
        )
        .ok_or_else(|| RowError::new("unknown customer"))?;
    let number = row.required(&["invoice_number", "InvoiceNumber", "id"])?;
    let date = parse_date(row.required(&["date"])?, "date")?;
    let mut draft = InvoiceDraft::new(number, customer_id, date);
    draft.due_date = row
        .field(&["due_date", "dueDate"])
        .map(|d| parse_date(d, "due_date"))
        .transpose()?;
    draft.notes = row.field(&["notes"]).map(str::to_string);
    draft.lines = parse_items(row.field(&["items", "Items", "line_items"]).unwrap_or_default())?;
    draft.prepare().map_err(|e| RowError::new(e.to_string()))?;
    Ok(draft)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowStatus {
    /// Created; holds the new record's display label.
    Imported(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOutcome {
    pub row: CsvRow,
    pub status: RowStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub kind: ImportKind,
    pub outcomes: Vec<RowOutcome>,
}

impl ImportReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RowStatus::Imported(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Rows to fix and feed back into [`Importer::import_rows`].
    pub fn failed_rows(&self) -> Vec<CsvRow> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RowStatus::Failed(_)))
            .map(|o| o.row.clone())
            .collect()
    }

    pub fn message(&self) -> String {
        format!(
            "Imported {} {}, {} failed",
            self.succeeded(),
            self.kind.noun(),
            self.failed()
        )
    }
}

pub struct Importer<'a> {
    client: &'a ApiClient,
}

impl<'a> Importer<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn import_path(&self, kind: ImportKind, path: &Path) -> Result<ImportReport, ImportError> {
        let file = std::fs::File::open(path).map_err(|e| ImportError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.import_reader(kind, file).await
    }

    pub async fn import_reader<R: Read>(&self, kind: ImportKind, reader: R) -> Result<ImportReport, ImportError> {
        let rows = read_rows(reader)?;
        self.import_rows(kind, rows).await
    }

    /// Re-run only the rows that failed last time, after the user fixed them.
    pub async fn retry(&self, report: &ImportReport) -> Result<ImportReport, ImportError> {
        let rows = report.failed_rows();
        if rows.is_empty() {
            self.client.notifier().error(ImportError::NothingToRetry.to_string());
            return Err(ImportError::NothingToRetry);
        }
        self.import_rows(report.kind, rows).await
    }

    pub async fn import_rows(&self, kind: ImportKind, rows: Vec<CsvRow>) -> Result<ImportReport, ImportError> {
        let notifier = self.client.notifier();
        if rows.is_empty() {
            notifier.error(ImportError::Empty.to_string());
            return Err(ImportError::Empty);
        }

        let vendors = match kind {
            ImportKind::Inventory | ImportKind::Bills => {
                let list = self.client.list_vendors().await?;
                NameIndex::new(list.iter().map(|v| (v.name.as_str(), v.id)))
            }
            _ => NameIndex::default(),
        };
        let customers = match kind {
            ImportKind::Invoices => {
                let list = self.client.list_customers().await?;
                NameIndex::new(list.iter().map(|c| (c.name.as_str(), c.id)))
            }
            _ => NameIndex::default(),
        };

        let mut outcomes = Vec::with_capacity(rows.len());
        for row in rows {
            let status = match self.import_row(kind, &row, &vendors, &customers).await {
                Ok(label) => RowStatus::Imported(label),
                Err(msg) => {
                    tracing::warn!(kind = kind.noun(), line = row.line, error = %msg, "import row failed");
                    RowStatus::Failed(msg)
                }
            };
            outcomes.push(RowOutcome { row, status });
        }

        let report = ImportReport { kind, outcomes };
        tracing::info!(
            kind = kind.noun(),
            imported = report.succeeded(),
            failed = report.failed(),
            "import finished"
        );
        if report.failed() > 0 {
            notifier.error(report.message());
        } else {
            notifier.success(report.message());
        }
        Ok(report)
    }

    async fn import_row(
        &self,
        kind: ImportKind,
        row: &CsvRow,
        vendors: &NameIndex<VendorId>,
        customers: &NameIndex<CustomerId>,
    ) -> Result<String, String> {
        let client = self.client;
        match kind {
            ImportKind::Suppliers => {
                let details = supplier_from_row(row).map_err(|e| e.to_string())?;
                let v = client.create_vendor(&details).await.map_err(|e| e.user_message())?;
                Ok(v.name)
            }
            ImportKind::Customers => {
                let details = customer_from_row(row).map_err(|e| e.to_string())?;
                let c = client.create_customer(&details).await.map_err(|e| e.user_message())?;
                Ok(c.name)
            }
            ImportKind::Inventory => {
                let item = inventory_from_row(row, vendors).map_err(|e| e.to_string())?;
                let created = client
                    .create_inventory_item(&item)
                    .await
                    .map_err(|e| e.user_message())?;
                Ok(created.lot_number)
            }
            ImportKind::Bills => {
                let draft = bill_from_row(row, vendors).map_err(|e| e.to_string())?;
                let created = client.create_bill(&draft).await.map_err(|e| e.user_message())?;
                Ok(created.document.bill_number)
            }
            ImportKind::Invoices => {
                let draft = invoice_from_row(row, customers).map_err(|e| e.to_string())?;
                let created = client.create_invoice(&draft).await.map_err(|e| e.user_message())?;
                Ok(created.document.invoice_number)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn reads_rows_keyed_by_header_and_skips_blank_lines() {
        let csv = "name, contact ,address\nABC Textiles,0300-1,Lahore\n,,\nShah,0301-2\n";
        let rows = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].field(&["contact"]), Some("0300-1"));
        assert_eq!(rows[1].line, 4);
        assert_eq!(rows[1].field(&["address"]), None);
    }

    #[test]
    fn field_falls_back_through_aliases() {
        let row = CsvRow::new(
            2,
            [("Supplier".to_string(), "Noor".to_string()), ("name".to_string(), " ".to_string())],
        );
        assert_eq!(row.field(&["name", "Name", "supplier", "Supplier"]), Some("Noor"));
    }

    #[test]
    fn parses_item_cells() {
        let items = parse_items("11|100|10.5; 12 | 2,000 | 3").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item_id, InventoryItemId::new(11));
        assert_eq!(items[0].extension(), dec!(1050));
        assert_eq!(items[1].meters, dec!(2000));

        assert!(parse_items("11|100").is_err());
        assert!(parse_items("x|1|1").is_err());
        assert!(parse_items("").unwrap().is_empty());
    }

    #[test]
    fn supplier_rows_need_name_and_contact() {
        let ok = CsvRow::new(
            2,
            [
                ("name".to_string(), "ABC".to_string()),
                ("phone".to_string(), "0300".to_string()),
                ("bank".to_string(), "HBL 123".to_string()),
            ],
        );
        let details = supplier_from_row(&ok).unwrap();
        assert_eq!(details.bank_details.as_deref(), Some("HBL 123"));

        let missing = CsvRow::new(3, [("name".to_string(), "ABC".to_string())]);
        assert!(supplier_from_row(&missing).is_err());
    }

    #[test]
    fn bill_rows_resolve_vendor_by_name_or_id() {
        let vendors = NameIndex::new([("ABC Textiles", VendorId::new(4))]);
        let row = CsvRow::new(
            2,
            [
                ("vendor".to_string(), "abc textiles".to_string()),
                ("bill_number".to_string(), "B-1".to_string()),
                ("date".to_string(), "2024-03-01".to_string()),
                ("items".to_string(), "5|10|100".to_string()),
            ],
        );
        let draft = bill_from_row(&row, &vendors).unwrap();
        assert_eq!(draft.vendor_id, Some(VendorId::new(4)));
        assert_eq!(draft.due_date, None);

        let by_id = CsvRow::new(
            3,
            [
                ("vendor_id".to_string(), "9".to_string()),
                ("bill_number".to_string(), "B-2".to_string()),
                ("date".to_string(), "2024-03-01".to_string()),
                ("items".to_string(), "5|10|100".to_string()),
            ],
        );
        assert_eq!(bill_from_row(&by_id, &vendors).unwrap().vendor_id, Some(VendorId::new(9)));

        let no_lines = CsvRow::new(
            4,
            [
                ("vendor_id".to_string(), "9".to_string()),
                ("bill_number".to_string(), "B-3".to_string()),
                ("date".to_string(), "2024-03-01".to_string()),
            ],
        );
        assert!(bill_from_row(&no_lines, &vendors).is_err());
    }

    #[test]
    fn inventory_rows_validate_dates_and_meters() {
        let vendors = NameIndex::new([("ABC", VendorId::new(1))]);
        let mut fields = vec![
            ("vendor".to_string(), "ABC".to_string()),
            ("lot".to_string(), "L-7".to_string()),
            ("type".to_string(), "Lawn".to_string()),
            ("meters".to_string(), "1,200".to_string()),
            ("price".to_string(), "85".to_string()),
            ("date".to_string(), "2024-02-10".to_string()),
        ];
        let item = inventory_from_row(&CsvRow::new(2, fields.clone()), &vendors).unwrap();
        assert_eq!(item.meters, dec!(1200));

        fields[5].1 = "10/02/2024".to_string();
        assert!(inventory_from_row(&CsvRow::new(2, fields), &vendors).is_err());
    }

    #[test]
    fn report_message_counts_outcomes() {
        let row = CsvRow::new(2, Vec::<(String, String)>::new());
        let report = ImportReport {
            kind: ImportKind::Customers,
            outcomes: vec![
                RowOutcome {
                    row: row.clone(),
                    status: RowStatus::Imported("A".into()),
                },
                RowOutcome {
                    row,
                    status: RowStatus::Failed("contact cannot be empty".into()),
                },
            ],
        };
        assert_eq!(report.message(), "Imported 1 customers, 1 failed");
        assert_eq!(report.failed_rows().len(), 1);
    }
}
