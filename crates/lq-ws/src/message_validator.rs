use crate::{Result as WsErrorResult, WsError};

use lq_core::{CART_READ_MODEL, CHANGE_CART_ITEM, ReadModelSelector};
use lq_proto::SelectorInput;

use std::panic::Location;

use error_location::ErrorLocation;
use lq_config::ValidationConfig;

/// Validates decoded client frames before they reach a handler
pub struct MessageValidator;

impl MessageValidator {
    /// Validate the client-chosen operation id
    #[track_caller]
    pub fn validate_operation_id(id: &str, config: &ValidationConfig) -> WsErrorResult<()> {
        if id.is_empty() {
            return Err(WsError::invalid_message("id cannot be empty"));
        }

        if id.len() > config.max_operation_id_length {
            return Err(WsError::invalid_message(format!(
                "id exceeds maximum length ({})",
                config.max_operation_id_length
            )));
        }

        Ok(())
    }

    /// Validate a subscribe target. Only the cart read model is served.
    #[track_caller]
    pub fn validate_read_model(name: &str, config: &ValidationConfig) -> WsErrorResult<()> {
        Self::validate_name(name, "read_model", config)?;

        match name {
            CART_READ_MODEL => Ok(()),
            _ => Err(WsError::UnknownReadModel {
                name: name.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Validate a mutation name. Only `ChangeCartItem` is served.
    #[track_caller]
    pub fn validate_mutation_name(name: &str, config: &ValidationConfig) -> WsErrorResult<()> {
        Self::validate_name(name, "name", config)?;

        match name {
            CHANGE_CART_ITEM => Ok(()),
            _ => Err(WsError::UnknownMutation {
                name: name.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Validate a selector and convert it to its normalized form.
    /// Rejects selectors carrying both an id and a filter, unparseable
    /// filters, and filters above the clause cap.
    #[track_caller]
    pub fn validate_selector(
        input: &SelectorInput,
        config: &ValidationConfig,
    ) -> WsErrorResult<ReadModelSelector> {
        let selector = input.to_selector()?;

        if let ReadModelSelector::Matching(filter) = &selector
            && filter.clauses().len() > config.max_filter_clauses
        {
            return Err(WsError::invalid_message(format!(
                "filter exceeds maximum clause count ({})",
                config.max_filter_clauses
            )));
        }

        Ok(selector)
    }

    /// Validate `ChangeCartItem` input fields
    #[track_caller]
    pub fn validate_change_cart_item(
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> WsErrorResult<()> {
        if cart_id.is_empty() {
            return Err(WsError::invalid_message("cartId cannot be empty"));
        }

        if product_id.is_empty() {
            return Err(WsError::invalid_message("productId cannot be empty"));
        }

        if quantity < 0 {
            return Err(WsError::invalid_message(format!(
                "quantity cannot be negative: {quantity}"
            )));
        }

        Ok(())
    }

    #[track_caller]
    fn validate_name(
        value: &str,
        field_name: &str,
        config: &ValidationConfig,
    ) -> WsErrorResult<()> {
        if value.is_empty() {
            return Err(WsError::invalid_message(format!(
                "{field_name} cannot be empty"
            )));
        }

        if value.len() > config.max_name_length {
            return Err(WsError::invalid_message(format!(
                "{field_name} exceeds maximum length ({})",
                config.max_name_length
            )));
        }

        Ok(())
    }
}
