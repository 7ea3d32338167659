//! Application events and the typed pub/sub bus scoped to the application root.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;
pub mod notification;

pub use bus::{EventBus, Subscription};
pub use envelope::Envelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use notification::{AppEvent, Notifier, ToastLevel};
