use crate::{HandlerContext, WsError, handle_mutate, handle_subscribe, handle_unsubscribe};

use lq_proto::{ClientMessage, ServerMessage};

use std::panic::Location;

use error_location::ErrorLocation;
use lq_config::ValidationConfig;
use log::{error, info, warn};

/// Route one decoded frame to its handler under the configured time
/// budget, logging entry and exit with the frame's correlation id. A
/// timed-out handler answers with an error frame instead of hanging the
/// connection.
pub async fn dispatch(msg: ClientMessage, ctx: HandlerContext) -> Option<ServerMessage> {
    let operation_id = msg.operation_id().map(str::to_string);
    let handler_name = msg.kind();

    info!("{} -> {handler_name}", ctx.log_prefix());

    let timeout_secs = ctx.handler.timeout_secs;
    let budget = std::time::Duration::from_secs(timeout_secs);

    let response = match tokio::time::timeout(budget, dispatch_inner(msg, ctx.clone())).await {
        Ok(resp) => resp,
        Err(_elapsed) => {
            error!(
                "{} Handler {handler_name} timed out after {timeout_secs}s",
                ctx.log_prefix()
            );
            ctx.metrics.error_occurred("handler_timeout");
            let e = WsError::HandlerTimeout {
                timeout_secs,
                location: ErrorLocation::from(Location::caller()),
            };
            Some(build_error_frame(operation_id, &e, &ctx.validation))
        }
    };

    info!(
        "{} <- {handler_name} completed in {}ms",
        ctx.log_prefix(),
        ctx.trace.elapsed_ms()
    );

    response
}

async fn dispatch_inner(msg: ClientMessage, ctx: HandlerContext) -> Option<ServerMessage> {
    let operation_id = msg.operation_id().map(str::to_string);
    let handler_name = msg.kind();
    let log_prefix = ctx.log_prefix();
    let metrics = ctx.metrics;
    let validation = ctx.validation;

    let result = match msg {
        ClientMessage::Subscribe {
            id,
            read_model,
            selector,
        } => handle_subscribe(id, read_model, selector, ctx).await,

        ClientMessage::Unsubscribe { id } => handle_unsubscribe(id, ctx).await,

        ClientMessage::Mutate { id, name, input } => {
            handle_mutate(id, name, input, ctx).await.map(Some)
        }

        ClientMessage::Ping => return Some(ServerMessage::Pong),
    };

    match result {
        Ok(response) => response,
        Err(e) => {
            warn!(
                "{log_prefix} Handler {handler_name} failed: {e} (code: {:?})",
                e.error_code()
            );
            metrics.error_occurred(handler_name);
            Some(build_error_frame(operation_id, &e, &validation))
        }
    }
}

/// Build an error frame for the client. Operation-scoped when the failing
/// frame carried an id, connection-scoped otherwise.
pub fn build_error_frame(
    operation_id: Option<String>,
    error: &WsError,
    validation: &ValidationConfig,
) -> ServerMessage {
    ServerMessage::Error {
        id: operation_id,
        error: error.to_error_payload(validation.max_error_message_length),
    }
}
