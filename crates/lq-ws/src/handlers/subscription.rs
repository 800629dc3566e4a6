use crate::{HandlerContext, MessageValidator, Result as WsErrorResult, WsError};

use lq_proto::{CompleteReason, SelectorInput, ServerMessage};

use std::panic::Location;

use error_location::ErrorLocation;
use log::{debug, info};

/// Open a subscription: accept, acknowledge, then activate.
///
/// The ack frame is enqueued before activation, and deliveries only start
/// once the entry is Active, so on the wire every data frame follows the
/// ack for its operation key.
pub async fn handle_subscribe(
    id: String,
    read_model: String,
    selector: SelectorInput,
    ctx: HandlerContext,
) -> WsErrorResult<Option<ServerMessage>> {
    MessageValidator::validate_operation_id(&id, &ctx.validation)?;
    MessageValidator::validate_read_model(&read_model, &ctx.validation)?;
    let selector = MessageValidator::validate_selector(&selector, &ctx.validation)?;

    let subscription_id = ctx
        .registry
        .accept(ctx.connection_id, &id, &read_model, &selector)
        .await?;

    let ack = ServerMessage::SubscribeAck {
        id: id.clone(),
        subscription_id: subscription_id.to_string(),
    };
    if ctx.outbound.send(ack).await.is_err() {
        // Connection went away under us; take the pending entry back out.
        ctx.registry.remove(ctx.connection_id, &id).await;
        return Err(WsError::ConnectionClosed {
            reason: "outbound channel closed before subscribe ack".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    if ctx.registry.activate(ctx.connection_id, &id).await {
        ctx.metrics.subscription_opened();
        info!(
            "{} Subscribe: {read_model} as {subscription_id} (key {id})",
            ctx.log_prefix()
        );
    } else {
        debug!(
            "{} Subscription {id} vanished before activation",
            ctx.log_prefix()
        );
    }

    Ok(None)
}

/// Close a subscription. Idempotent: the complete frame goes out whether or
/// not the key was still live.
pub async fn handle_unsubscribe(
    id: String,
    ctx: HandlerContext,
) -> WsErrorResult<Option<ServerMessage>> {
    MessageValidator::validate_operation_id(&id, &ctx.validation)?;

    if ctx.registry.remove(ctx.connection_id, &id).await {
        ctx.metrics.subscriptions_closed(1, "unsubscribe");
        info!("{} Unsubscribe: {id}", ctx.log_prefix());
    } else {
        debug!("{} Unsubscribe for unknown key {id}, no-op", ctx.log_prefix());
    }

    Ok(Some(ServerMessage::Complete {
        id,
        reason: CompleteReason::Unsubscribe,
    }))
}
