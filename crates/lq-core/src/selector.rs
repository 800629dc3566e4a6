use serde_json::Value;

use crate::filter::Filter;

/// What a subscription selects within one read-model type.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadModelSelector {
    /// A single entity by id.
    ById(String),
    /// Every entity matching the filter. `Filter::match_all()` selects the
    /// whole collection.
    Matching(Filter),
}

impl ReadModelSelector {
    pub fn all() -> Self {
        Self::Matching(Filter::match_all())
    }

    /// Normalize to a filter. Selecting by id is the same as an `eq` clause
    /// on the `id` field; the registry stores the normalized form so change
    /// matching has a single path.
    pub fn to_filter(&self) -> Filter {
        match self {
            Self::ById(id) => Filter::by_id(id.clone()),
            Self::Matching(filter) => filter.clone(),
        }
    }

    pub fn matches(&self, entity: &Value) -> bool {
        match self {
            Self::ById(id) => entity.get("id").and_then(Value::as_str) == Some(id.as_str()),
            Self::Matching(filter) => filter.matches(entity),
        }
    }
}
