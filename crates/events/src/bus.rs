//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus distributes application events (toasts, refresh requests, session
//! expiry) from the client and feature services to whoever renders them: a
//! CLI printer, a log sink, a test subscriber. It is created once at the
//! application root and handed down explicitly; nothing registers global
//! listeners.
//!
//! Delivery is best-effort fan-out with no persistence. A subscriber that has
//! been dropped is silently pruned on the next publish.

use std::sync::Arc;
use std::sync::mpsc::Receiver;

/// A subscription to an event stream.
///
/// Each subscription gets a copy of every message published after it was
/// created (broadcast semantics).
///
/// ```ignore
/// let subscription = notifier.subscribe();
/// workspace.refresh().await?;
/// for envelope in subscription.drain() {
///     print_toast(envelope.into_payload());
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Drain everything that is currently queued without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// `publish()` can fail (e.g. lock poisoning); callers that only notify the
/// user treat a failure as non-fatal and log it.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
