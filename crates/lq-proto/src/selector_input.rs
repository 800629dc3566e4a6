use lq_core::{Filter, ReadModelSelector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProtoError, Result};

/// Wire form of a read-model selector inside a `subscribe` frame.
///
/// At most one of `id` and `filter` may be set. Both absent selects the
/// whole collection. `filter` carries the operator-object form accepted by
/// [`Filter::parse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
}

impl SelectorInput {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            filter: None,
        }
    }

    pub fn with_filter(filter: &Filter) -> Self {
        Self {
            id: None,
            filter: Some(filter.to_input()),
        }
    }

    pub fn to_selector(&self) -> Result<ReadModelSelector> {
        match (&self.id, &self.filter) {
            (Some(_), Some(_)) => Err(ProtoError::invalid_selector(
                "selector cannot carry both id and filter",
            )),
            (Some(id), None) => Ok(ReadModelSelector::ById(id.clone())),
            (None, Some(filter)) => Ok(ReadModelSelector::Matching(Filter::parse(filter)?)),
            (None, None) => Ok(ReadModelSelector::all()),
        }
    }

    pub fn from_selector(selector: &ReadModelSelector) -> Self {
        match selector {
            ReadModelSelector::ById(id) => Self::by_id(id.clone()),
            ReadModelSelector::Matching(filter) if filter.is_empty() => Self::all(),
            ReadModelSelector::Matching(filter) => Self::with_filter(filter),
        }
    }
}
