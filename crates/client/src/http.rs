//! Authenticated JSON client for the ERP REST API.
//!
//! Every request carries the stored access token. A 401 triggers one refresh
//! through `/auth/refresh/` and a single retry; if the refresh fails the
//! stored tokens are cleared and [`AppEvent::SessionExpired`] is published.
//! Failures are returned to the caller and also surfaced as error toasts.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use textileflow_core::DomainError;
use textileflow_events::{AppEvent, Notifier};

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::mapping::split_valid;
use crate::tokens::{TokenPair, TokenStore};

pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please sign in again.";
const REQUEST_ID_HEADER: &str = "X-Request-Id";
/// Upper bound on `next` links followed for one list call.
const MAX_PAGES: usize = 500;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    notifier: Notifier,
}

impl core::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

/// List responses come either bare or in a paginated envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Bare(Vec<T>),
    Page {
        results: Vec<T>,
        #[serde(default)]
        next: Option<String>,
    },
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        tokens: Arc<dyn TokenStore>,
        notifier: Notifier,
    ) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
            notifier,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(self.tokens.load().await, Ok(Some(_)))
    }

    /// Exchange credentials for a token pair and persist it.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<TokenPair> {
        let body = serde_json::to_value(LoginRequest { username, password })?;
        let resp = self
            .send(Method::POST, "/auth/login/", Some(&body), None)
            .await
            .inspect_err(|e| self.report(e))?;
        let text = self.finish(resp).await?;
        let tokens: TokenPair = decode(&text)?;
        self.tokens.save(&tokens).await?;
        tracing::info!(username, "signed in");
        Ok(tokens)
    }

    pub async fn logout(&self) -> ApiResult<()> {
        self.tokens.clear().await
    }

    /// Swap the refresh token for a new access token, keeping the refresh token.
    pub async fn refresh(&self) -> ApiResult<String> {
        let tokens = self.tokens.load().await?.ok_or(ApiError::NotAuthenticated)?;
        self.refresh_with(&tokens).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let text = self.execute(Method::GET, path, None).await?;
        decode(&text)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let text = self.execute(Method::POST, path, Some(body)).await?;
        decode(&text)
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let text = self.execute(Method::PUT, path, Some(body)).await?;
        decode(&text)
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.execute(Method::DELETE, path, None).await.map(|_| ())
    }

    /// GET a list endpoint, following pagination `next` links.
    pub async fn list<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Vec<T>> {
        let mut out = Vec::new();
        let mut next = Some(path.to_string());
        let mut pages = 0usize;
        while let Some(target) = next.take() {
            pages += 1;
            if pages > MAX_PAGES {
                tracing::warn!(path, pages, "stopped following pagination links");
                break;
            }
            let text = self.execute(Method::GET, &target, None).await?;
            match decode::<ListBody<T>>(&text)? {
                ListBody::Bare(items) => out.extend(items),
                ListBody::Page { results, next: link } => {
                    out.extend(results);
                    next = link;
                }
            }
        }
        Ok(out)
    }

    async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<String> {
        let tokens = self.tokens.load().await?;
        let access = tokens.as_ref().map(|t| t.access.as_str());
        let resp = self
            .send(method.clone(), path, body.as_ref(), access)
            .await
            .inspect_err(|e| self.report(e))?;

        if resp.status() != StatusCode::UNAUTHORIZED {
            return self.finish(resp).await;
        }
        let Some(tokens) = tokens else {
            return self.finish(resp).await;
        };

        tracing::info!(path, "access token rejected, refreshing");
        let access = match self.refresh_with(&tokens).await {
            Ok(access) => access,
            Err(e) => return Err(self.expire_session(e).await),
        };
        let retry = self
            .send(method, path, body.as_ref(), Some(&access))
            .await
            .inspect_err(|e| self.report(e))?;
        self.finish(retry).await
    }

    async fn refresh_with(&self, tokens: &TokenPair) -> ApiResult<String> {
        let body = serde_json::to_value(RefreshRequest {
            refresh: &tokens.refresh,
        })?;
        let resp = self.send(Method::POST, "/auth/refresh/", Some(&body), None).await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }
        let refreshed: RefreshResponse = decode(&text)?;
        self.tokens
            .save(&TokenPair {
                access: refreshed.access.clone(),
                refresh: tokens.refresh.clone(),
            })
            .await?;
        tracing::info!("access token refreshed");
        Ok(refreshed.access)
    }

    async fn expire_session(&self, cause: ApiError) -> ApiError {
        tracing::warn!(error = %cause, "token refresh failed, clearing session");
        if let Err(e) = self.tokens.clear().await {
            tracing::warn!(error = %e, "failed to clear stored tokens");
        }
        self.notifier.publish(AppEvent::SessionExpired);
        self.notifier.error(SESSION_EXPIRED_MESSAGE);
        ApiError::SessionExpired
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        access: Option<&str>,
    ) -> ApiResult<reqwest::Response> {
        let url = self.url(path);
        let request_id = Uuid::now_v7();
        tracing::debug!(%method, path, %request_id, "api request");

        let mut req = self
            .http
            .request(method, &url)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        // Absolute links (pagination `next`) may point at another host.
        if let Some(token) = access.filter(|_| self.owns(&url)) {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        Ok(req.send().await?)
    }

    async fn finish(&self, resp: reqwest::Response) -> ApiResult<String> {
        let status = resp.status();
        let text = resp.text().await.inspect_err(|e| {
            tracing::warn!(error = %e, "failed to read response body");
        })?;
        if status.is_success() {
            return Ok(text);
        }
        let err = ApiError::Status {
            status: status.as_u16(),
            message: error_message(status, &text),
        };
        self.report(&err);
        Err(err)
    }

    /// Map a fetched list, dropping records that fail mapping. Each one is
    /// logged and the user gets a single toast naming how many were skipped.
    pub(crate) fn keep_valid<R, T>(&self, path: &str, records: Vec<R>) -> Vec<T>
    where
        T: TryFrom<R, Error = DomainError>,
    {
        let (valid, rejected) = split_valid(records);
        if !rejected.is_empty() {
            for err in &rejected {
                tracing::warn!(path, error = %err, "skipping malformed record");
            }
            self.notifier.error(format!(
                "Skipped {} invalid record(s) from {path}",
                rejected.len()
            ));
        }
        valid
    }

    /// Is `url` under the configured API root?
    fn owns(&self, url: &str) -> bool {
        url.strip_prefix(&self.base_url)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?']))
    }

    fn report(&self, err: &ApiError) {
        tracing::warn!(error = %err, "api call failed");
        self.notifier.error(err.user_message());
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> ApiResult<T> {
    // 204 responses carry no body.
    let text = if text.trim().is_empty() { "null" } else { text };
    Ok(serde_json::from_str(text)?)
}

/// Human-readable message from an error body.
///
/// Understands `{"detail": ".."}`, `{"error": ".."}`, field errors like
/// `{"amount": ["..."]}` and bare lists of messages.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let fallback = || format!("Request failed with status {}", status.as_u16());
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        let trimmed = body.trim();
        return if trimmed.is_empty() || trimmed.starts_with('<') {
            fallback()
        } else {
            trimmed.to_string()
        };
    };

    match &value {
        Value::String(s) => s.clone(),
        Value::Array(items) => first_text(items).unwrap_or_else(fallback),
        Value::Object(map) => {
            for key in ["detail", "error", "message"] {
                if let Some(Value::String(s)) = map.get(key) {
                    return s.clone();
                }
            }
            if let Some(Value::Array(items)) = map.get("non_field_errors") {
                if let Some(msg) = first_text(items) {
                    return msg;
                }
            }
            map.iter()
                .find_map(|(field, v)| {
                    let msg = match v {
                        Value::String(s) => Some(s.clone()),
                        Value::Array(items) => first_text(items),
                        _ => None,
                    }?;
                    Some(format!("{field}: {msg}"))
                })
                .unwrap_or_else(fallback)
        }
        _ => fallback(),
    }
}

fn first_text(items: &[Value]) -> Option<String> {
    items.iter().find_map(|v| v.as_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_reads_detail_and_field_errors() {
        let s = StatusCode::BAD_REQUEST;
        assert_eq!(
            error_message(s, r#"{"detail": "This invoice has no broker assigned."}"#),
            "This invoice has no broker assigned."
        );
        assert_eq!(
            error_message(s, r#"{"amount": ["Ensure this value is greater than 0."]}"#),
            "amount: Ensure this value is greater than 0."
        );
        assert_eq!(
            error_message(s, r#"{"non_field_errors": ["Bad pair."]}"#),
            "Bad pair."
        );
        assert_eq!(error_message(s, r#"["Nope."]"#), "Nope.");
        assert_eq!(error_message(s, ""), "Request failed with status 400");
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"),
            "Request failed with status 502"
        );
    }

    #[test]
    fn list_body_accepts_bare_and_paginated() {
        let bare: ListBody<i32> = serde_json::from_str("[1,2]").unwrap();
        assert!(matches!(bare, ListBody::Bare(v) if v == vec![1, 2]));

        let empty: ListBody<i32> = serde_json::from_str("[]").unwrap();
        assert!(matches!(empty, ListBody::Bare(v) if v.is_empty()));

        let page: ListBody<i32> =
            serde_json::from_str(r#"{"count": 3, "next": "http://x/api/v/?page=2", "results": [1]}"#)
                .unwrap();
        assert!(matches!(page, ListBody::Page { results, next: Some(_) } if results == vec![1]));
    }

    #[test]
    fn empty_body_decodes_as_unit() {
        let unit: () = decode("").unwrap();
        assert_eq!(unit, ());
    }
}
