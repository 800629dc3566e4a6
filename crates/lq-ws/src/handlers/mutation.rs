use crate::{HandlerContext, MessageValidator, Result as WsErrorResult, WsError};

use lq_proto::ServerMessage;

use log::info;
use serde::Deserialize;
use serde_json::Value;

/// Input payload of the `ChangeCartItem` mutation.
///
/// Quantity zero removes the product line from the cart.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeCartItemInput {
    pub cart_id: String,
    pub product_id: String,
    pub quantity: i64,
}

/// Run a named mutation against the store and report its result.
pub async fn handle_mutate(
    id: String,
    name: String,
    input: Value,
    ctx: HandlerContext,
) -> WsErrorResult<ServerMessage> {
    MessageValidator::validate_operation_id(&id, &ctx.validation)?;
    MessageValidator::validate_mutation_name(&name, &ctx.validation)?;

    // validate_mutation_name leaves exactly one name standing
    let input: ChangeCartItemInput = serde_json::from_value(input)
        .map_err(|e| WsError::invalid_message(format!("invalid {name} input: {e}")))?;
    MessageValidator::validate_change_cart_item(&input.cart_id, &input.product_id, input.quantity)?;

    let accepted = ctx
        .store
        .change_cart_item(&input.cart_id, &input.product_id, input.quantity)
        .await?;

    info!(
        "{} {name}: cart={} product={} quantity={}",
        ctx.log_prefix(),
        input.cart_id,
        input.product_id,
        input.quantity
    );

    Ok(ServerMessage::MutationResult {
        id,
        payload: Value::Bool(accepted),
    })
}
