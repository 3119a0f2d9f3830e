//! The outbound event system.
//!
//! Finalized orders leave the engine as events. Boundary crates register hooks at startup
//! (e.g. to bridge completed orders onto an outbound queue); the engine itself only knows that
//! it hands each completed order to zero or more subscribers.

mod channel;
mod event_types;
mod hooks;
mod publisher;

pub use channel::{EventHandler, EventProducer, EventSendError, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
pub use publisher::EventPublisher;
