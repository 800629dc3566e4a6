use crate::{ConfigErrorResult, check_range};

use serde::Deserialize;

pub const MIN_OPERATION_ID_LENGTH: usize = 1;
pub const MAX_OPERATION_ID_LENGTH: usize = 512;
pub const DEFAULT_MAX_OPERATION_ID_LENGTH: usize = 128;

pub const MIN_NAME_LENGTH: usize = 1;
pub const MAX_NAME_LENGTH: usize = 512;
pub const DEFAULT_MAX_NAME_LENGTH: usize = 128;

pub const MIN_FILTER_CLAUSES: usize = 1;
pub const MAX_FILTER_CLAUSES: usize = 256;
pub const DEFAULT_MAX_FILTER_CLAUSES: usize = 32;

pub const MIN_ERROR_MESSAGE_LENGTH: usize = 32;
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 2048;
pub const DEFAULT_MAX_ERROR_MESSAGE_LENGTH: usize = 240;

/// Size caps enforced on inbound frames before they reach a handler.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum length for client-chosen operation keys
    pub max_operation_id_length: usize,
    /// Maximum length for read-model and mutation names
    pub max_name_length: usize,
    /// Maximum number of clauses in a subscription filter
    pub max_filter_clauses: usize,
    /// Cap on error text echoed back to clients
    pub max_error_message_length: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_operation_id_length: DEFAULT_MAX_OPERATION_ID_LENGTH,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            max_filter_clauses: DEFAULT_MAX_FILTER_CLAUSES,
            max_error_message_length: DEFAULT_MAX_ERROR_MESSAGE_LENGTH,
        }
    }
}

impl ValidationConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        check_range(
            "validation.max_operation_id_length",
            self.max_operation_id_length,
            MIN_OPERATION_ID_LENGTH,
            MAX_OPERATION_ID_LENGTH,
        )?;
        check_range(
            "validation.max_name_length",
            self.max_name_length,
            MIN_NAME_LENGTH,
            MAX_NAME_LENGTH,
        )?;
        check_range(
            "validation.max_filter_clauses",
            self.max_filter_clauses,
            MIN_FILTER_CLAUSES,
            MAX_FILTER_CLAUSES,
        )?;
        check_range(
            "validation.max_error_message_length",
            self.max_error_message_length,
            MIN_ERROR_MESSAGE_LENGTH,
            MAX_ERROR_MESSAGE_LENGTH,
        )
    }
}
