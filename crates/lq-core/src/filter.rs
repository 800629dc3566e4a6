use serde_json::{Map, Value};

use crate::error::{CoreError, Result};

/// A single operator applied to one resolved field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Deep JSON equality.
    Eq(Value),
    /// Membership. Array fields match when any element equals the needle;
    /// scalar fields degenerate to equality.
    Includes(Value),
}

/// One field path paired with one predicate.
///
/// Paths are dot-separated and resolve through nested objects, so
/// `lineItems.productId` reaches into `{"lineItems": {"productId": ...}}`.
/// A path that resolves to nothing never matches.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldClause {
    pub field: String,
    pub predicate: Predicate,
}

impl FieldClause {
    /// Evaluate against the full post-mutation entity state.
    pub fn matches(&self, entity: &Value) -> bool {
        let Some(actual) = resolve_path(entity, &self.field) else {
            return false;
        };
        match &self.predicate {
            Predicate::Eq(expected) => actual == expected,
            Predicate::Includes(needle) => match actual {
                Value::Array(items) => items.iter().any(|item| item == needle),
                scalar => scalar == needle,
            },
        }
    }
}

/// Conjunction of field clauses. Every clause must hold for the filter to
/// match; the empty filter matches every entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    clauses: Vec<FieldClause>,
}

impl Filter {
    /// The filter that matches every entity of the read-model type.
    pub fn match_all() -> Self {
        Self::default()
    }

    /// The filter equivalent to selecting a single entity by id.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::match_all().eq("id", Value::String(id.into()))
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(FieldClause {
            field: field.into(),
            predicate: Predicate::Eq(value.into()),
        });
        self
    }

    pub fn includes(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(FieldClause {
            field: field.into(),
            predicate: Predicate::Includes(value.into()),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[FieldClause] {
        &self.clauses
    }

    /// Evaluate every clause against the entity.
    pub fn matches(&self, entity: &Value) -> bool {
        self.clauses.iter().all(|clause| clause.matches(entity))
    }

    /// Parse the wire form: an object of field paths, each mapping to an
    /// object of operators.
    ///
    /// ```text
    /// {"id": {"eq": "cart-1"}, "cartItemsIds": {"includes": "product-7"}}
    /// ```
    pub fn parse(input: &Value) -> Result<Self> {
        let fields = input
            .as_object()
            .ok_or_else(|| CoreError::invalid_filter("filter must be an object"))?;
        let mut filter = Self::match_all();
        for (field, operators) in fields {
            filter = filter.parse_field(field, operators)?;
        }
        Ok(filter)
    }

    fn parse_field(mut self, field: &str, operators: &Value) -> Result<Self> {
        let operators = operators.as_object().ok_or_else(|| {
            CoreError::invalid_filter(format!("field '{field}' must map to an operator object"))
        })?;
        if operators.is_empty() {
            return Err(CoreError::invalid_filter(format!(
                "field '{field}' has no operators"
            )));
        }
        for (operator, value) in operators {
            let predicate = match operator.as_str() {
                "eq" => Predicate::Eq(value.clone()),
                "includes" => Predicate::Includes(value.clone()),
                other => {
                    return Err(CoreError::invalid_filter(format!(
                        "unknown operator '{other}' on field '{field}'"
                    )));
                }
            };
            self.clauses.push(FieldClause {
                field: field.to_string(),
                predicate,
            });
        }
        Ok(self)
    }

    /// Render back into the wire form accepted by [`Filter::parse`].
    pub fn to_input(&self) -> Value {
        let mut fields = Map::new();
        for clause in &self.clauses {
            let (operator, value) = match &clause.predicate {
                Predicate::Eq(value) => ("eq", value.clone()),
                Predicate::Includes(value) => ("includes", value.clone()),
            };
            let entry = fields
                .entry(clause.field.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(operators) = entry {
                operators.insert(operator.to_string(), value);
            }
        }
        Value::Object(fields)
    }
}

/// Walk a dot-separated path through nested objects. `None` when any segment
/// is missing or a non-object shows up before the final segment.
fn resolve_path<'a>(entity: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = entity;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}
