pub mod admin;
pub mod error;
pub mod health;
pub mod logger;
pub mod routes;

pub use admin::StatsResponse;
pub use error::{Result as ServerErrorResult, ServerError};

pub use crate::routes::build_router;
