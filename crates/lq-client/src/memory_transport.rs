use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lq_proto::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;

use crate::error::{ClientError, Result};
use crate::transport::{SubscriptionTransport, TransportReceiver, TransportSender, TransportSession};

/// In-process transport for tests and embedding without a network stack.
///
/// Every `connect` wires a fresh channel pair and hands the far ends to the
/// paired [`MemoryListener`], so a scripted server can accept sessions the
/// way a real endpoint would.
pub struct MemoryTransport {
    sessions: mpsc::UnboundedSender<MemoryServerSession>,
    fail_connects: Arc<AtomicUsize>,
}

impl MemoryTransport {
    pub fn new() -> (Self, MemoryListener) {
        let (sessions, incoming) = mpsc::unbounded_channel();
        let transport = Self {
            sessions,
            fail_connects: Arc::new(AtomicUsize::new(0)),
        };
        (transport, MemoryListener { incoming })
    }

    /// Refuse the next `count` connection attempts.
    pub fn fail_next_connects(&self, count: usize) {
        self.fail_connects.store(count, Ordering::Release);
    }
}

#[async_trait]
impl SubscriptionTransport for MemoryTransport {
    async fn connect(&self) -> Result<TransportSession> {
        let refused = self
            .fail_connects
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(ClientError::connection_failed("connection refused"));
        }

        let (client_tx, server_rx) = mpsc::unbounded_channel();
        let (server_tx, client_rx) = mpsc::unbounded_channel();
        self.sessions
            .send(MemoryServerSession {
                inbound: server_rx,
                outbound: server_tx,
            })
            .map_err(|_| ClientError::connection_failed("listener dropped"))?;

        Ok(TransportSession {
            sender: Box::new(MemorySender { frames: client_tx }),
            receiver: Box::new(MemoryReceiver { frames: client_rx }),
        })
    }
}

/// Server side of a [`MemoryTransport`]: yields one session per `connect`.
pub struct MemoryListener {
    incoming: mpsc::UnboundedReceiver<MemoryServerSession>,
}

impl MemoryListener {
    pub async fn accept(&mut self) -> Option<MemoryServerSession> {
        self.incoming.recv().await
    }
}

/// Far end of one connected session.
pub struct MemoryServerSession {
    inbound: mpsc::UnboundedReceiver<ClientMessage>,
    outbound: mpsc::UnboundedSender<ServerMessage>,
}

impl MemoryServerSession {
    /// Next client frame, `None` once the client hung up.
    pub async fn next_frame(&mut self) -> Option<ClientMessage> {
        self.inbound.recv().await
    }

    /// Push a frame to the client. `false` when the client is gone.
    pub fn send(&self, message: ServerMessage) -> bool {
        self.outbound.send(message).is_ok()
    }
}

struct MemorySender {
    frames: mpsc::UnboundedSender<ClientMessage>,
}

#[async_trait]
impl TransportSender for MemorySender {
    async fn send(&mut self, message: ClientMessage) -> Result<()> {
        self.frames
            .send(message)
            .map_err(|_| ClientError::connection_lost())
    }

    async fn close(&mut self) -> Result<()> {
        // Dropping the sender ends the session; nothing extra to flush.
        Ok(())
    }
}

struct MemoryReceiver {
    frames: mpsc::UnboundedReceiver<ServerMessage>,
}

#[async_trait]
impl TransportReceiver for MemoryReceiver {
    async fn receive(&mut self) -> Option<Result<ServerMessage>> {
        self.frames.recv().await.map(Ok)
    }
}
