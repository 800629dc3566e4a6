pub mod change;
pub mod error;
pub mod filter;
pub mod models;
pub mod selector;
pub mod wait;

pub use error_location::ErrorLocation;

pub use change::ReadModelChange;
pub use error::{CoreError, Result};
pub use filter::{FieldClause, Filter, Predicate};
pub use models::cart::{CART_READ_MODEL, CHANGE_CART_ITEM, CartItem, CartReadModel};
pub use selector::ReadModelSelector;
pub use wait::{WaitConfig, WaitError, wait_until, wait_until_or};
