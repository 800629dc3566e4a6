use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Read-model type name used in subscribe requests and change fan-out.
pub const CART_READ_MODEL: &str = "CartReadModel";

/// Mutation name accepted by the demo surface.
pub const CHANGE_CART_ITEM: &str = "ChangeCartItem";

/// One product line in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub quantity: i64,
}

/// The cart projection served over the subscription surface.
///
/// `cart_items_ids` mirrors the product ids of `cart_items` so filters can
/// run an `includes` clause against a flat array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartReadModel {
    pub id: String,
    pub cart_items: Vec<CartItem>,
    pub cart_items_ids: Vec<String>,
}

impl CartReadModel {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cart_items: Vec::new(),
            cart_items_ids: Vec::new(),
        }
    }

    /// Apply a `ChangeCartItem` mutation.
    ///
    /// Quantity zero removes the line; any other quantity creates or
    /// replaces it. `cart_items_ids` is recomputed from the surviving lines.
    pub fn apply_change_item(&mut self, product_id: &str, quantity: i64) {
        self.cart_items.retain(|item| item.product_id != product_id);
        if quantity != 0 {
            self.cart_items.push(CartItem {
                product_id: product_id.to_string(),
                quantity,
            });
        }
        self.cart_items_ids = self
            .cart_items
            .iter()
            .map(|item| item.product_id.clone())
            .collect();
    }

    pub fn quantity_of(&self, product_id: &str) -> Option<i64> {
        self.cart_items
            .iter()
            .find(|item| item.product_id == product_id)
            .map(|item| item.quantity)
    }

    /// Serialize into the entity form filters evaluate against.
    pub fn to_entity(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_entity(entity: &Value) -> Result<Self> {
        Ok(serde_json::from_value(entity.clone())?)
    }
}
