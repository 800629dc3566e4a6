//! Client SDK for the live read-model subscription protocol.
//!
//! The client is transport-agnostic: it drives any
//! [`SubscriptionTransport`] implementation and reconciles a declarative
//! desired-subscription set against whatever session is currently open.

pub(crate) mod backoff;
pub(crate) mod client;
pub(crate) mod desired;
pub(crate) mod error;
pub(crate) mod memory_transport;
pub(crate) mod transport;

#[cfg(test)]
mod tests;

pub use backoff::{Backoff, ReconnectConfig};
pub use client::{ClientConfig, LiveClient, SubscriptionHandle};
pub use desired::{DesiredSubscription, DesiredSubscriptions};
pub use error::{ClientError, Result};
pub use memory_transport::{MemoryListener, MemoryServerSession, MemoryTransport};
pub use transport::{SubscriptionTransport, TransportReceiver, TransportSender, TransportSession};
