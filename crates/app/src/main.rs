use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use textileflow_accounting::{ExpenseCategory, NewExpense};
use textileflow_app::{Workspace, render};
use textileflow_client::import::parse_items;
use textileflow_client::{
    ApiClient, ClientConfig, FileTokenStore, ImportKind, RowStatus, TokenStore,
};
use textileflow_core::money::{format_rupees, parse_amount};
use textileflow_core::{BillId, BrokerId, CustomerId, InvoiceId, VendorId};
use textileflow_events::{AppEvent, Notifier, ToastLevel};
use textileflow_inventory::NewInventoryItem;
use textileflow_invoicing::{BillDraft, CommissionType, InvoiceDraft, NewPayment, PaymentMethod, Settleable};
use textileflow_parties::{PartyDetails, PartyRef};

#[derive(Parser)]
#[command(name = "textileflow", version, about = "Ledgers, stock, invoices and bills for a textile trading desk")]
struct Cli {
    /// Config file. `textileflow.toml` in the working directory is used when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API root, e.g. http://127.0.0.1:8000/api
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the token pair
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "TEXTILEFLOW_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored tokens
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Reload everything and report counts
    Refresh,
    /// List suppliers with what is owed to them
    Vendors,
    /// List customers with what they owe
    Customers,
    /// List brokers with unpaid commission
    Brokers,
    /// Transaction history of a supplier or customer
    Log {
        #[arg(value_enum)]
        party: PartyArg,
        id: i64,
    },
    /// Ask the backend to recompute a party balance
    RecalculateBalance {
        #[arg(value_enum)]
        party: PartyArg,
        id: i64,
    },
    AddVendor(PartyArgs),
    AddCustomer(PartyArgs),
    AddBroker(PartyArgs),
    /// Stock on hand
    Inventory {
        /// Only unbilled lines from this supplier
        #[arg(long)]
        billable_for: Option<i64>,
    },
    /// Record received fabric
    ReceiveStock(StockArgs),
    Invoices {
        #[arg(long)]
        overdue: bool,
    },
    Bills {
        #[arg(long)]
        overdue: bool,
    },
    /// One invoice with payments and commission
    Invoice { id: i64 },
    /// One bill with payments
    Bill { id: i64 },
    NewInvoice(NewInvoiceArgs),
    NewBill(NewBillArgs),
    /// Record a customer payment
    ReceivePayment {
        invoice: i64,
        #[command(flatten)]
        payment: PaymentArgs,
    },
    /// Pay a supplier bill
    PayBill {
        bill: i64,
        #[command(flatten)]
        payment: PaymentArgs,
    },
    /// Pay the broker on an invoice
    SettleCommission {
        invoice: i64,
        #[command(flatten)]
        payment: PaymentArgs,
    },
    Expenses,
    AddExpense(ExpenseArgs),
    /// Sales, purchases, expenses, commissions and net profit
    Summary,
    /// Combined cash ledger with running balance
    Ledger {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Payments split by bank and cash
    Deposits,
    /// Outstanding balance per party
    Balances,
    /// Bulk import from a CSV file
    Import {
        /// suppliers, customers, inventory, bills or invoices
        kind: String,
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PartyArg {
    Vendor,
    Customer,
}

impl PartyArg {
    fn with_id(self, id: i64) -> PartyRef {
        match self {
            PartyArg::Vendor => PartyRef::Vendor(VendorId::new(id)),
            PartyArg::Customer => PartyRef::Customer(CustomerId::new(id)),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Cash,
    Bank,
    Credit,
}

impl From<MethodArg> for PaymentMethod {
    fn from(m: MethodArg) -> Self {
        match m {
            MethodArg::Cash => PaymentMethod::Cash,
            MethodArg::Bank => PaymentMethod::Bank,
            MethodArg::Credit => PaymentMethod::Credit,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CommissionArg {
    Percentage,
    Fixed,
}

#[derive(Args)]
struct PartyArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    contact: String,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    bank_details: Option<String>,
}

impl PartyArgs {
    fn details(self) -> PartyDetails {
        let mut d = PartyDetails::new(self.name, self.contact);
        if let Some(address) = self.address {
            d = d.with_address(address);
        }
        if let Some(bank) = self.bank_details {
            d = d.with_bank_details(bank);
        }
        d
    }
}

#[derive(Args)]
struct PaymentArgs {
    #[arg(long)]
    amount: String,
    #[arg(long, value_enum, default_value = "cash")]
    method: MethodArg,
    #[arg(long)]
    bank: Option<String>,
    /// Bank transaction reference
    #[arg(long)]
    tid: Option<String>,
    /// Defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl PaymentArgs {
    fn payment(self) -> Result<NewPayment> {
        Ok(NewPayment {
            date: self.date.unwrap_or_else(today),
            amount: parse_amount(&self.amount)?,
            method: self.method.into(),
            bank_name: self.bank,
            tid: self.tid,
        })
    }
}

#[derive(Args)]
struct StockArgs {
    #[arg(long)]
    vendor: i64,
    #[arg(long)]
    lot: String,
    #[arg(long)]
    fabric_type: String,
    /// One or more `meters@unit_price` lines, e.g. 120@350
    #[arg(long = "line", required = true)]
    lines: Vec<String>,
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[derive(Args)]
struct NewInvoiceArgs {
    #[arg(long)]
    number: String,
    #[arg(long)]
    customer: i64,
    /// `item_id|meters|price;...`
    #[arg(long)]
    items: String,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    due_date: Option<NaiveDate>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    broker: Option<i64>,
    #[arg(long, value_enum, requires = "broker")]
    commission_type: Option<CommissionArg>,
    #[arg(long, default_value = "0")]
    commission_value: String,
    /// Initial payment received with the sale
    #[arg(long)]
    paid: Option<String>,
    #[arg(long, value_enum, default_value = "cash")]
    method: MethodArg,
    #[arg(long)]
    bank: Option<String>,
    #[arg(long)]
    tid: Option<String>,
}

#[derive(Args)]
struct NewBillArgs {
    #[arg(long)]
    number: String,
    #[arg(long)]
    vendor: i64,
    /// `item_id|meters|price;...`
    #[arg(long)]
    items: String,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    due_date: Option<NaiveDate>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    paid: Option<String>,
    #[arg(long, value_enum, default_value = "cash")]
    method: MethodArg,
    #[arg(long)]
    bank: Option<String>,
    #[arg(long)]
    tid: Option<String>,
}

#[derive(Args)]
struct ExpenseArgs {
    /// e.g. "Office Rent", "Packing", "Builty (Transport)"
    #[arg(long)]
    category: String,
    #[arg(long)]
    amount: String,
    #[arg(long)]
    description: String,
    #[arg(long, value_enum, default_value = "cash")]
    method: MethodArg,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    notes: Option<String>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn initial_payment(
    paid: Option<String>,
    method: MethodArg,
    bank: Option<String>,
    tid: Option<String>,
    date: NaiveDate,
) -> Result<Option<NewPayment>> {
    let Some(raw) = paid else {
        return Ok(None);
    };
    Ok(Some(NewPayment {
        date,
        amount: parse_amount(&raw)?,
        method: method.into(),
        bank_name: bank,
        tid,
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ClientConfig::load_from(cli.config.as_deref())?;
    if let Some(url) = cli.base_url {
        config = config.with_base_url(url)?;
    }
    textileflow_observability::init(config.log_format);

    let token_path = config
        .token_path()
        .context("no data directory found; set TEXTILEFLOW_TOKEN_PATH")?;
    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(token_path));
    let notifier = Notifier::new();
    let events = notifier.subscribe();
    let workspace = Workspace::new(ApiClient::new(&config, tokens, notifier)?);

    let outcome = run(&workspace, cli.command).await;

    for envelope in events.drain() {
        match envelope.into_payload() {
            AppEvent::Toast { level, message } => {
                let tag = match level {
                    ToastLevel::Info => "info",
                    ToastLevel::Success => "ok",
                    ToastLevel::Error => "error",
                };
                eprintln!("[{tag}] {message}");
            }
            AppEvent::SessionExpired => eprintln!("Run `textileflow login` to sign in again."),
            AppEvent::PaymentRecorded { reference, status } => eprintln!("{reference}: {status}"),
            AppEvent::RefreshRequested | AppEvent::DataRefreshed => {}
        }
    }
    outcome
}

async fn run(ws: &Workspace, command: Command) -> Result<()> {
    let client = ws.client();
    match command {
        Command::Login { username, password } => {
            client.login(&username, &password).await?;
            let me = client.me().await?;
            println!("Signed in as {}", me.display_name());
        }
        Command::Logout => {
            client.logout().await?;
            println!("Signed out");
        }
        Command::Whoami => {
            let me = client.me().await?;
            println!(
                "{} ({})",
                me.display_name(),
                me.role.as_deref().unwrap_or("no role")
            );
        }
        Command::Refresh => {
            ws.refresh().await?;
            let snap = ws.snapshot().await;
            println!(
                "{} suppliers, {} customers, {} stock lines, {} invoices, {} bills",
                snap.vendors.len(),
                snap.customers.len(),
                snap.inventory.len(),
                snap.invoices.len(),
                snap.bills.len()
            );
        }
        Command::Vendors => {
            ws.load().await?;
            println!("{}", render::vendors(&*ws.snapshot().await));
        }
        Command::Customers => {
            ws.load().await?;
            println!("{}", render::customers(&*ws.snapshot().await));
        }
        Command::Brokers => {
            ws.load().await?;
            println!("{}", render::brokers(&*ws.snapshot().await));
        }
        Command::Log { party, id } => {
            ws.load().await?;
            let party = party.with_id(id);
            let snap = ws.snapshot().await;
            let log = snap
                .log(party)
                .ok_or_else(|| anyhow!("no transaction log for {}", snap.party_name(party)))?;
            println!("{}", render::party_log(&snap, log));
            println!("Balance: {}", format_rupees(log.balance()));
        }
        Command::RecalculateBalance { party, id } => {
            ws.recalculate_balance(party.with_id(id)).await?;
            println!("Balance recalculated");
        }
        Command::AddVendor(args) => {
            let v = ws.add_vendor(&args.details()).await?;
            println!("Added supplier #{} {}", v.id, v.name);
        }
        Command::AddCustomer(args) => {
            let c = ws.add_customer(&args.details()).await?;
            println!("Added customer #{} {}", c.id, c.name);
        }
        Command::AddBroker(args) => {
            let b = ws.add_broker(&args.details()).await?;
            println!("Added broker #{} {}", b.id, b.name);
        }
        Command::Inventory { billable_for } => {
            ws.load().await?;
            let snap = ws.snapshot().await;
            let table = match billable_for {
                Some(vendor) => render::inventory(&snap, snap.billable_items(VendorId::new(vendor))),
                None => render::inventory(&snap, &snap.inventory),
            };
            println!("{table}");
            let summary = snap.inventory_summary();
            println!(
                "{} lines, {} m, {} unbilled",
                summary.total_items, summary.total_meters, summary.unbilled_items
            );
        }
        Command::ReceiveStock(args) => {
            let received_date = args.date.unwrap_or_else(today);
            let mut items = Vec::with_capacity(args.lines.len());
            for line in &args.lines {
                let (meters, price) = line
                    .split_once('@')
                    .ok_or_else(|| anyhow!("stock line {line:?} must look like meters@unit_price"))?;
                items.push(NewInventoryItem {
                    lot_number: args.lot.clone(),
                    fabric_type: args.fabric_type.clone(),
                    meters: parse_amount(meters)?,
                    unit_price: parse_amount(price)?,
                    vendor_id: VendorId::new(args.vendor),
                    received_date,
                });
            }
            let created = ws.receive_stock(&items).await?;
            println!("Received {} lines into lot {}", created.len(), args.lot);
        }
        Command::Invoices { overdue } => {
            ws.load().await?;
            let snap = ws.snapshot().await;
            let mut rows = snap.invoice_rows(today());
            if overdue {
                rows.retain(|r| r.overdue);
            }
            println!("{}", render::documents(&rows));
            println!("{}", render::document_summary(&snap.invoice_summary()));
        }
        Command::Bills { overdue } => {
            ws.load().await?;
            let snap = ws.snapshot().await;
            let mut rows = snap.bill_rows(today());
            if overdue {
                rows.retain(|r| r.overdue);
            }
            println!("{}", render::documents(&rows));
            println!("{}", render::document_summary(&snap.bill_summary()));
        }
        Command::Invoice { id } => {
            let invoice = client.get_invoice(InvoiceId::new(id)).await?;
            println!("{}", render::document_detail(&invoice, Some(&invoice)));
        }
        Command::Bill { id } => {
            let bill = client.get_bill(BillId::new(id)).await?;
            println!("{}", render::document_detail(&bill, None));
        }
        Command::NewInvoice(args) => {
            ws.load().await?;
            let date = args.date.unwrap_or_else(today);
            let mut draft = InvoiceDraft::new(args.number, CustomerId::new(args.customer), date);
            draft.due_date = args.due_date;
            draft.notes = args.notes;
            for line in parse_items(&args.items)? {
                draft = draft.with_line(line);
            }
            if let Some(broker) = args.broker {
                let kind = match args.commission_type {
                    Some(CommissionArg::Fixed) => CommissionType::Fixed,
                    _ => CommissionType::Percentage,
                };
                draft = draft.with_broker(BrokerId::new(broker), kind, parse_amount(&args.commission_value)?);
            }
            if let Some(p) = initial_payment(args.paid, args.method, args.bank, args.tid, date)? {
                draft = draft.with_initial_payment(p);
            }
            let created = ws.create_invoice(&draft).await?;
            let inv = &created.document;
            println!(
                "Invoice {} created: total {}, {}",
                inv.invoice_number,
                format_rupees(inv.total()),
                inv.status_label()
            );
            if let Some(e) = created.payment_error {
                eprintln!("Initial payment was not recorded: {}", e.user_message());
            }
        }
        Command::NewBill(args) => {
            ws.load().await?;
            let date = args.date.unwrap_or_else(today);
            let mut draft = BillDraft::new(args.number, VendorId::new(args.vendor), date);
            draft.due_date = args.due_date;
            draft.notes = args.notes;
            for line in parse_items(&args.items)? {
                draft = draft.with_line(line);
            }
            if let Some(p) = initial_payment(args.paid, args.method, args.bank, args.tid, date)? {
                draft = draft.with_initial_payment(p);
            }
            let created = ws.create_bill(&draft).await?;
            let bill = &created.document;
            println!(
                "Bill {} created: total {}, {}",
                bill.bill_number,
                format_rupees(bill.total()),
                bill.status_label()
            );
            if let Some(e) = created.payment_error {
                eprintln!("Initial payment was not recorded: {}", e.user_message());
            }
        }
        Command::ReceivePayment { invoice, payment } => {
            let inv = ws.receive_payment(InvoiceId::new(invoice), payment.payment()?).await?;
            println!("{}", render::document_detail(&inv, None));
        }
        Command::PayBill { bill, payment } => {
            let bill = ws.pay_bill(BillId::new(bill), payment.payment()?).await?;
            println!("{}", render::document_detail(&bill, None));
        }
        Command::SettleCommission { invoice, payment } => {
            let inv = ws.settle_commission(InvoiceId::new(invoice), payment.payment()?).await?;
            println!("{}", render::document_detail(&inv, Some(&inv)));
        }
        Command::Expenses => {
            ws.load().await?;
            let snap = ws.snapshot().await;
            println!("{}", render::expenses(&snap.expenses));
            let summary = snap.expense_summary();
            println!(
                "{} expenses, total {}",
                summary.count,
                format_rupees(summary.total)
            );
        }
        Command::AddExpense(args) => {
            let category = ExpenseCategory::parse(&args.category)
                .ok_or_else(|| anyhow!("unknown expense category {:?}", args.category))?;
            let expense = NewExpense {
                date: args.date.unwrap_or_else(today),
                category,
                description: args.description,
                amount: parse_amount(&args.amount)?,
                payment_method: args.method.into(),
                notes: args.notes,
            };
            let saved = ws.add_expense(&expense).await?;
            println!("Added expense #{} ({})", saved.id, saved.category);
        }
        Command::Summary => {
            ws.load().await?;
            println!("{}", render::financial_summary(&ws.snapshot().await.financial_summary()));
        }
        Command::Ledger { from, to } => {
            ws.load().await?;
            let ledger = ws.snapshot().await.cash_ledger();
            println!("{}", render::cash_ledger(&ledger));
            if let (Some(from), Some(to)) = (from, to) {
                let moved: Decimal = ledger.between(from, to).map(|l| l.entry.delta()).sum();
                println!("Net movement {from} to {to}: {}", format_rupees(moved));
            }
            println!(
                "In {}  Out {}  Closing {}",
                format_rupees(ledger.cash_in()),
                format_rupees(ledger.cash_out()),
                format_rupees(ledger.closing())
            );
        }
        Command::Deposits => {
            ws.load().await?;
            println!("{}", render::deposits(&ws.snapshot().await.deposits()));
        }
        Command::Balances => {
            ws.load().await?;
            println!("{}", render::balances(&*ws.snapshot().await));
        }
        Command::Import { kind, path } => {
            let kind = ImportKind::parse(&kind).ok_or_else(|| anyhow!("unknown import kind {kind:?}"))?;
            let report = ws.import(kind, &path).await?;
            println!("{}", report.message());
            for outcome in &report.outcomes {
                if let RowStatus::Failed(reason) = &outcome.status {
                    println!("  line {}: {reason}", outcome.row.line);
                }
            }
        }
    }
    Ok(())
}
