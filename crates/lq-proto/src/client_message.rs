use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::selector_input::SelectorInput;

/// Frames a client sends over the realtime socket.
///
/// `id` is the client-chosen operation key. It scopes every later frame for
/// the same operation: acks, data, completion and errors all quote it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Open a subscription on a read-model type.
    Subscribe {
        id: String,
        read_model: String,
        #[serde(default)]
        selector: SelectorInput,
    },
    /// Close a subscription. Idempotent: unknown keys are answered, not
    /// faulted.
    Unsubscribe { id: String },
    /// Run a named mutation, e.g. `ChangeCartItem`.
    Mutate {
        id: String,
        name: String,
        input: Value,
    },
    Ping,
}

impl ClientMessage {
    pub fn decode(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The operation key this frame belongs to, when it has one.
    pub fn operation_id(&self) -> Option<&str> {
        match self {
            Self::Subscribe { id, .. } | Self::Unsubscribe { id } | Self::Mutate { id, .. } => {
                Some(id)
            }
            Self::Ping => None,
        }
    }

    /// Frame type tag for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Subscribe { .. } => "subscribe",
            Self::Unsubscribe { .. } => "unsubscribe",
            Self::Mutate { .. } => "mutate",
            Self::Ping => "ping",
        }
    }
}
