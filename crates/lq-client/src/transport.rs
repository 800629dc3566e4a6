use async_trait::async_trait;
use lq_proto::{ClientMessage, ServerMessage};

use crate::error::Result;

/// Opens sessions against a subscription endpoint.
///
/// The client never speaks a transport directly; it drives whatever
/// implementation it is handed. Production deployments wrap their WebSocket
/// stack, tests use [`crate::MemoryTransport`].
#[async_trait]
pub trait SubscriptionTransport: Send + Sync {
    /// Open a fresh session. Each call is a new connection server-side.
    async fn connect(&self) -> Result<TransportSession>;
}

/// The two halves of one open session.
pub struct TransportSession {
    pub sender: Box<dyn TransportSender>,
    pub receiver: Box<dyn TransportReceiver>,
}

/// Outbound half of a session. Frames must reach the server in send order.
#[async_trait]
pub trait TransportSender: Send {
    async fn send(&mut self, message: ClientMessage) -> Result<()>;

    /// Signal an orderly close. Dropping the sender must also end the
    /// session; `close` just lets the far side see it as deliberate.
    async fn close(&mut self) -> Result<()>;
}

/// Inbound half of a session.
#[async_trait]
pub trait TransportReceiver: Send {
    /// Next server frame. `None` once the session is over; an `Err` item
    /// reports a frame that could not be read or decoded.
    async fn receive(&mut self) -> Option<Result<ServerMessage>>;
}
