//! User-facing notifications published on the application bus.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::bus::{EventBus, Subscription};
use crate::envelope::Envelope;
use crate::in_memory_bus::InMemoryEventBus;

/// Severity of a toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// Everything the client layer tells the presentation layer about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// Short message for the user.
    Toast { level: ToastLevel, message: String },
    /// Someone asked for a soft reload of all data.
    RefreshRequested,
    /// A soft reload finished.
    DataRefreshed,
    /// Token refresh failed; stored tokens were cleared.
    SessionExpired,
    /// A payment was accepted by the backend for a document.
    PaymentRecorded { reference: String, status: String },
}

impl AppEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            AppEvent::Toast { .. } => "app.toast",
            AppEvent::RefreshRequested => "app.refresh_requested",
            AppEvent::DataRefreshed => "app.data_refreshed",
            AppEvent::SessionExpired => "app.session_expired",
            AppEvent::PaymentRecorded { .. } => "app.payment_recorded",
        }
    }
}

/// Cheap, cloneable handle for publishing [`AppEvent`]s.
///
/// One `Notifier` is created at the application root and cloned into the
/// HTTP client and the feature services.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    bus: Arc<InMemoryEventBus<Envelope<AppEvent>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription<Envelope<AppEvent>> {
        self.bus.subscribe()
    }

    pub fn publish(&self, event: AppEvent) {
        let kind = event.kind();
        if let Err(e) = self.bus.publish(Envelope::new(event)) {
            tracing::warn!(event = kind, error = ?e, "failed to publish app event");
        }
    }

    pub fn toast(&self, level: ToastLevel, message: impl Into<String>) {
        self.publish(AppEvent::Toast {
            level,
            message: message.into(),
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.toast(ToastLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.toast(ToastLevel::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.toast(ToastLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_reach_subscribers_in_order() {
        let notifier = Notifier::new();
        let sub = notifier.subscribe();

        notifier.info("Refreshing data...");
        notifier.clone().success("Data refreshed");

        let got: Vec<AppEvent> = sub.drain().into_iter().map(Envelope::into_payload).collect();
        assert_eq!(
            got,
            vec![
                AppEvent::Toast {
                    level: ToastLevel::Info,
                    message: "Refreshing data...".into()
                },
                AppEvent::Toast {
                    level: ToastLevel::Success,
                    message: "Data refreshed".into()
                },
            ]
        );
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        Notifier::new().publish(AppEvent::SessionExpired);
    }
}
