pub mod client_message;
pub mod error;
pub mod error_payload;
pub mod selector_input;
pub mod server_message;

pub use client_message::ClientMessage;
pub use error::{ProtoError, Result};
pub use error_payload::{ErrorCode, ErrorPayload};
pub use selector_input::SelectorInput;
pub use server_message::{CompleteReason, ServerMessage};

#[cfg(test)]
mod tests;
