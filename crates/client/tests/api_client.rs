use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

use textileflow_client::{
    ApiClient, ApiError, ClientConfig, ImportError, ImportKind, Importer, InMemoryTokenStore,
    RowStatus, SESSION_EXPIRED_MESSAGE, TokenPair, TokenStore,
};
use textileflow_core::InvoiceId;
use textileflow_events::{AppEvent, Envelope, Notifier, ToastLevel};
use textileflow_invoicing::{NewPayment, SettlementError, SettlementStatus, Settleable};

#[derive(Default)]
struct Fake {
    base_url: String,
    access: String,
    refresh_ok: bool,
    refresh_calls: usize,
    requests: usize,
    payments: Vec<Value>,
    next_page: Option<String>,
}

type Shared = Arc<Mutex<Fake>>;

struct TestServer {
    base_url: String,
    state: Shared,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}/api", addr);

        let state: Shared = Arc::new(Mutex::new(Fake {
            base_url: base_url.clone(),
            access: "acc-1".into(),
            refresh_ok: true,
            ..Fake::default()
        }));
        let app = Router::new()
            .route("/api/auth/login/", post(login))
            .route("/api/auth/refresh/", post(refresh))
            .route("/api/vendors/", get(vendors).post(create_vendor))
            .route("/api/customers/", get(customers))
            .route("/api/invoices/:id/", get(get_invoice))
            .route("/api/invoices/:id/add_payment/", post(add_payment))
            .route("/api/invoices/:id/settle_commission/", post(settle_commission))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            state,
            handle,
        }
    }

    fn client(&self, store: Arc<InMemoryTokenStore>, notifier: Notifier) -> ApiClient {
        let config = ClientConfig::default()
            .with_base_url(self.base_url.clone())
            .unwrap();
        ApiClient::new(&config, store, notifier).unwrap()
    }

    fn requests(&self) -> usize {
        self.state.lock().unwrap().requests
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn authorized(state: &Shared, headers: &HeaderMap) -> bool {
    let mut s = state.lock().unwrap();
    s.requests += 1;
    let expected = format!("Bearer {}", s.access);
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Given token not valid for any token type"})),
    )
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "admin" && body["password"] == "secret" {
        Json(json!({"access": "acc-1", "refresh": "ref-1"})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response()
    }
}

async fn refresh(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut s = state.lock().unwrap();
    s.refresh_calls += 1;
    if s.refresh_ok && body["refresh"] == "ref-1" {
        s.access = "acc-2".into();
        Json(json!({"access": "acc-2"})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Token is invalid or expired"})),
        )
            .into_response()
    }
}

fn vendor(id: i64, name: &str, balance: &str) -> Value {
    json!({"id": id, "name": name, "contact": "0300", "address": "", "bank_details": null, "balance": balance})
}

async fn vendors(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let next = {
        let s = state.lock().unwrap();
        s.next_page
            .clone()
            .unwrap_or_else(|| format!("{}/vendors/?page=2", s.base_url))
    };
    if q.get("page").map(String::as_str) == Some("2") {
        Json(json!({"count": 3, "next": null, "results": [vendor(3, "Noor Mills", "0.00")]}))
            .into_response()
    } else {
        Json(json!({
            "count": 3,
            "next": next,
            "results": [vendor(1, "ABC Textiles", "7660.00"), vendor(2, "Karim Cloth", "0")]
        }))
        .into_response()
    }
}

async fn create_vendor(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let name = body["name"].as_str().unwrap_or_default();
    (StatusCode::CREATED, Json(vendor(9, name, "0"))).into_response()
}

async fn customers(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    Json(json!([{"id": 5, "name": "Shah Fabrics", "contact": "0301", "balance": 1200}])).into_response()
}

fn invoice_json(id: i64, payments: &[Value]) -> Value {
    let paid: Decimal = payments
        .iter()
        .filter_map(|p| p["amount"].as_str())
        .filter_map(|a| a.parse::<Decimal>().ok())
        .sum();
    let status = if paid >= dec!(1000) {
        "Paid"
    } else if paid > Decimal::ZERO {
        "Partially Paid"
    } else {
        "Pending"
    };
    json!({
        "id": id, "invoice_number": "INV-1", "customer": 5, "customer_name": "Shah Fabrics",
        "broker": 2, "broker_name": "Akram", "commission_type": "Percentage",
        "commission_value": "5.00", "commission_amount": "50.00", "commission_paid": "50.00",
        "date": "2024-05-01", "due_date": "2024-05-31", "status": status,
        "total": "1000.00", "amount_paid": paid.to_string(), "balance_due": (dec!(1000) - paid).to_string(),
        "notes": "", "items": [{"id": 1, "inventory_item": 11, "meters": "100.00", "price": "10.00", "subtotal": "1000.00"}],
        "payment_records": payments,
    })
}

async fn get_invoice(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let payments = state.lock().unwrap().payments.clone();
    Json(invoice_json(id, &payments)).into_response()
}

async fn add_payment(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let mut s = state.lock().unwrap();
    let mut payment = body.clone();
    payment["id"] = json!(s.payments.len() as i64 + 1);
    payment["invoice"] = json!(id);
    s.payments.push(payment);
    Json(invoice_json(id, &s.payments)).into_response()
}

async fn settle_commission(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"detail": "Commission already fully settled."})),
    )
        .into_response()
}

fn signed_in() -> Arc<InMemoryTokenStore> {
    Arc::new(InMemoryTokenStore::with_tokens(TokenPair {
        access: "acc-1".into(),
        refresh: "ref-1".into(),
    }))
}

fn events(sub: &textileflow_events::Subscription<Envelope<AppEvent>>) -> Vec<AppEvent> {
    sub.drain().into_iter().map(Envelope::into_payload).collect()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
}

#[tokio::test]
async fn login_persists_tokens_and_lists_follow_pagination() {
    let srv = TestServer::spawn().await;
    let store = Arc::new(InMemoryTokenStore::new());
    let client = srv.client(store.clone(), Notifier::new());

    assert!(!client.is_authenticated().await);
    client.login("admin", "secret").await.unwrap();
    assert_eq!(store.load().await.unwrap().unwrap().refresh, "ref-1");

    let vendors = client.list_vendors().await.unwrap();
    let names: Vec<&str> = vendors.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["ABC Textiles", "Karim Cloth", "Noor Mills"]);
    assert_eq!(vendors[0].balance, dec!(-7660));
}

type SeenAuth = Arc<Mutex<Vec<Option<String>>>>;

/// A second host that records the Authorization header of every request.
async fn spawn_other_host() -> (String, SeenAuth, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen: SeenAuth = Arc::default();
    let app = Router::new()
        .route(
            "/elsewhere/vendors/",
            get(|State(seen): State<SeenAuth>, headers: HeaderMap| async move {
                let auth = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                seen.lock().unwrap().push(auth);
                Json(json!({"next": null, "results": [vendor(4, "Far Mills", "0")]}))
            }),
        )
        .with_state(seen.clone());
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/elsewhere/vendors/"), seen, handle)
}

#[tokio::test]
async fn bearer_token_stays_on_the_api_host() {
    let srv = TestServer::spawn().await;
    let (other, seen, other_handle) = spawn_other_host().await;
    srv.state.lock().unwrap().next_page = Some(other);
    let client = srv.client(Arc::new(InMemoryTokenStore::new()), Notifier::new());
    client.login("admin", "secret").await.unwrap();

    let vendors = client.list_vendors().await.unwrap();
    other_handle.abort();

    let names: Vec<&str> = vendors.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["ABC Textiles", "Karim Cloth", "Far Mills"]);
    assert_eq!(*seen.lock().unwrap(), vec![None]);
}

#[tokio::test]
async fn bad_credentials_surface_the_detail_without_refreshing() {
    let srv = TestServer::spawn().await;
    let notifier = Notifier::new();
    let sub = notifier.subscribe();
    let client = srv.client(Arc::new(InMemoryTokenStore::new()), notifier);

    let err = client.login("admin", "wrong").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(srv.state.lock().unwrap().refresh_calls, 0);
    assert!(events(&sub).contains(&AppEvent::Toast {
        level: ToastLevel::Error,
        message: "No active account found with the given credentials".into(),
    }));
}

#[tokio::test]
async fn bare_array_lists_are_accepted() {
    let srv = TestServer::spawn().await;
    let client = srv.client(signed_in(), Notifier::new());

    let customers = client.list_customers().await.unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].receivable(), dec!(1200));
}

#[tokio::test]
async fn rejected_access_token_is_refreshed_once_and_retried() {
    let srv = TestServer::spawn().await;
    let store = Arc::new(InMemoryTokenStore::with_tokens(TokenPair {
        access: "stale".into(),
        refresh: "ref-1".into(),
    }));
    let client = srv.client(store.clone(), Notifier::new());

    let customers = client.list_customers().await.unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(srv.state.lock().unwrap().refresh_calls, 1);

    let tokens = store.load().await.unwrap().unwrap();
    assert_eq!(tokens.access, "acc-2");
    assert_eq!(tokens.refresh, "ref-1");
}

#[tokio::test]
async fn failed_refresh_clears_tokens_and_expires_the_session() {
    let srv = TestServer::spawn().await;
    srv.state.lock().unwrap().refresh_ok = false;
    let store = Arc::new(InMemoryTokenStore::with_tokens(TokenPair {
        access: "stale".into(),
        refresh: "ref-1".into(),
    }));
    let notifier = Notifier::new();
    let sub = notifier.subscribe();
    let client = srv.client(store.clone(), notifier);

    let err = client.list_vendors().await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));
    assert_eq!(store.load().await.unwrap(), None);

    let got = events(&sub);
    assert!(got.contains(&AppEvent::SessionExpired));
    assert!(got.contains(&AppEvent::Toast {
        level: ToastLevel::Error,
        message: SESSION_EXPIRED_MESSAGE.into(),
    }));
}

#[tokio::test]
async fn payments_update_the_invoice_and_publish_an_event() {
    let srv = TestServer::spawn().await;
    let notifier = Notifier::new();
    let sub = notifier.subscribe();
    let client = srv.client(signed_in(), notifier);
    let id = InvoiceId::new(1);

    let invoice = client
        .add_invoice_payment(id, &NewPayment::bank(day(), dec!(400), "HBL", "TX-400"))
        .await
        .unwrap();
    assert_eq!(invoice.status(), SettlementStatus::PartiallyPaid);
    assert_eq!(invoice.remaining(), dec!(600));
    assert_eq!(invoice.payments()[0].tid.as_deref(), Some("TX-400"));

    let invoice = client
        .add_invoice_payment(id, &NewPayment::cash(day(), dec!(600)))
        .await
        .unwrap();
    assert_eq!(invoice.status(), SettlementStatus::Paid);
    assert_eq!(invoice.remaining(), Decimal::ZERO);
    assert!(invoice.check_payment(&NewPayment::cash(day(), dec!(1))).is_err());

    let got = events(&sub);
    assert!(got.contains(&AppEvent::PaymentRecorded {
        reference: "Invoice INV-1".into(),
        status: "Partially Paid".into(),
    }));
    assert!(got.contains(&AppEvent::PaymentRecorded {
        reference: "Invoice INV-1".into(),
        status: "Paid".into(),
    }));
}

#[tokio::test]
async fn backend_rejections_are_returned_and_toasted() {
    let srv = TestServer::spawn().await;
    let notifier = Notifier::new();
    let sub = notifier.subscribe();
    let client = srv.client(signed_in(), notifier);

    let err = client
        .settle_commission(InvoiceId::new(1), &NewPayment::cash(day(), dec!(10)))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Commission already fully settled.");
    assert!(events(&sub).contains(&AppEvent::Toast {
        level: ToastLevel::Error,
        message: "Commission already fully settled.".into(),
    }));
}

#[tokio::test]
async fn invalid_payments_never_reach_the_network() {
    let srv = TestServer::spawn().await;
    let client = srv.client(signed_in(), Notifier::new());

    let err = client
        .add_invoice_payment(InvoiceId::new(1), &NewPayment::cash(day(), Decimal::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Settlement(SettlementError::NonPositiveAmount)));
    assert!(err.is_local());
    assert_eq!(srv.requests(), 0);
}

#[tokio::test]
async fn supplier_import_keeps_going_past_bad_rows() {
    let srv = TestServer::spawn().await;
    let notifier = Notifier::new();
    let sub = notifier.subscribe();
    let client = srv.client(signed_in(), notifier);

    let csv = "Name,Phone,Address\nABC Textiles,0300,Faisalabad\n,0301,Lahore\nNoor Mills,0302,\n";
    let report = Importer::new(&client)
        .import_reader(ImportKind::Suppliers, csv.as_bytes())
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failed_rows()[0].line, 3);
    assert!(matches!(report.outcomes[1].status, RowStatus::Failed(_)));
    assert_eq!(srv.requests(), 2);
    assert!(events(&sub).contains(&AppEvent::Toast {
        level: ToastLevel::Error,
        message: "Imported 2 suppliers, 1 failed".into(),
    }));

    let retried = Importer::new(&client).retry(&report).await.unwrap();
    assert_eq!(retried.succeeded(), 0);
    assert_eq!(retried.failed(), 1);

    let clean = Importer::new(&client)
        .import_reader(ImportKind::Suppliers, "name,contact\nSaeed Sons,0303\n".as_bytes())
        .await
        .unwrap();
    let err = Importer::new(&client).retry(&clean).await.unwrap_err();
    assert!(matches!(err, ImportError::NothingToRetry));
}

#[tokio::test]
async fn empty_import_is_rejected_with_a_toast() {
    let srv = TestServer::spawn().await;
    let notifier = Notifier::new();
    let sub = notifier.subscribe();
    let client = srv.client(signed_in(), notifier);

    let err = Importer::new(&client)
        .import_reader(ImportKind::Bills, "vendor,bill_number\n".as_bytes())
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::Empty));
    assert_eq!(srv.requests(), 0);
    assert!(events(&sub).contains(&AppEvent::Toast {
        level: ToastLevel::Error,
        message: "No rows to import".into(),
    }));
}
