pub mod error;
pub mod read_model_store;

pub use error::{Result, StoreError};
pub use read_model_store::ReadModelStore;
