//! Keyed record store used by the task handlers.
//!
//! Records are attribute maps whose numbers are arbitrary-precision decimals.
//! Handlers never read-modify-write: partial updates go through
//! [`TaskStore::conditional_update`], which every backend applies atomically.

mod memory;
mod redis;

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use self::memory::InMemoryTaskStore;
pub use self::redis::RedisTaskStore;

/// A stored record: attribute name to attribute value.
pub type Item = BTreeMap<String, AttributeValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(Decimal),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    L(Vec<AttributeValue>),
    M(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Converts a JSON value, keeping numbers exact.
    pub fn from_json(value: Value) -> Result<Self, StoreError> {
        Ok(match value {
            Value::Null => Self::Null(true),
            Value::Bool(flag) => Self::Bool(flag),
            Value::String(text) => Self::S(text),
            Value::Number(number) => Self::N(parse_decimal(&number.to_string())?),
            Value::Array(values) => Self::L(
                values
                    .into_iter()
                    .map(Self::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => Self::M(
                map.into_iter()
                    .map(|(name, value)| Ok((name, Self::from_json(value)?)))
                    .collect::<Result<_, StoreError>>()?,
            ),
        })
    }

    /// Converts any serializable value through its JSON form.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, StoreError> {
        serde_json::to_value(value)
            .map_err(|error| StoreError::Encoding(error.to_string()))
            .and_then(Self::from_json)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::S(text) => Some(text),
            _ => None,
        }
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::S(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

fn parse_decimal(text: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|error| StoreError::Encoding(format!("number {text} out of range: {error}")))
}

/// Serializes any value that encodes as a JSON object into an [`Item`].
pub fn to_item<T: Serialize>(value: &T) -> Result<Item, StoreError> {
    match serde_json::to_value(value).map_err(|error| StoreError::Encoding(error.to_string()))? {
        Value::Object(map) => map
            .into_iter()
            .map(|(name, value)| Ok((name, AttributeValue::from_json(value)?)))
            .collect(),
        other => Err(StoreError::Encoding(format!(
            "expected an object, got {other}"
        ))),
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("record encoding error: {0}")]
    Encoding(String),
}

/// Ordered attribute assignments applied in one atomic update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignments {
    entries: Vec<(String, AttributeValue)>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an assignment, keeping first-insertion order.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Renders the assignment set as an update expression, e.g.
    /// `SET updatedAt = :updatedAt, title = :title`.
    pub fn expression(&self) -> String {
        let clauses: Vec<String> = self.names().map(|name| format!("{name} = :{name}")).collect();
        format!("SET {}", clauses.join(", "))
    }
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts or fully replaces the record under `key`.
    async fn put(&self, key: &str, item: Item) -> Result<(), StoreError>;

    /// Returns a snapshot of every stored record, in no particular order.
    async fn scan(&self) -> Result<Vec<Item>, StoreError>;

    /// Atomically merges `assignments` into the existing record under `key`
    /// and returns the record as it is after the merge.
    ///
    /// Fails with [`StoreError::NotFound`] without writing anything when no
    /// record exists under `key`.
    async fn conditional_update(
        &self,
        key: &str,
        assignments: &Assignments,
    ) -> Result<Item, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(3), Decimal::from(3))]
    #[case(json!(1.25), Decimal::new(125, 2))]
    #[case(json!(-7), Decimal::from(-7))]
    fn numbers_become_exact_decimals(#[case] input: Value, #[case] expected: Decimal) {
        assert_eq!(
            AttributeValue::from_json(input).unwrap(),
            AttributeValue::N(expected)
        );
    }

    #[test]
    fn to_item_maps_every_field() {
        let item = to_item(&json!({
            "title": "A",
            "completed": false,
            "tags": ["x"],
            "meta": {"priority": 2},
            "note": null,
        }))
        .unwrap();

        assert_eq!(item["title"], AttributeValue::S("A".into()));
        assert_eq!(item["completed"], AttributeValue::Bool(false));
        assert_eq!(item["tags"], AttributeValue::L(vec![AttributeValue::S("x".into())]));
        assert_eq!(
            item["meta"],
            AttributeValue::M(BTreeMap::from([(
                "priority".to_string(),
                AttributeValue::N(Decimal::from(2))
            )]))
        );
        assert_eq!(item["note"], AttributeValue::Null(true));
    }

    #[test]
    fn to_item_rejects_non_objects() {
        assert!(matches!(to_item(&json!([1, 2])), Err(StoreError::Encoding(_))));
    }

    #[test]
    fn assignments_replace_in_place() {
        let mut assignments = Assignments::new();
        assignments.set("a", true).set("b", "x".to_string()).set("a", false);

        let names: Vec<_> = assignments.names().collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(assignments.iter().next(), Some(("a", &AttributeValue::Bool(false))));
    }

    #[test]
    fn expression_lists_assignments_in_order() {
        let mut assignments = Assignments::new();
        assignments.set("updatedAt", "now".to_string()).set("completed", true);
        assert_eq!(
            assignments.expression(),
            "SET updatedAt = :updatedAt, completed = :completed"
        );
    }

    #[test]
    fn attribute_values_use_typed_wire_tags() {
        let encoded = serde_json::to_string(&AttributeValue::N(Decimal::new(150, 2))).unwrap();
        assert_eq!(encoded, r#"{"N":"1.50"}"#);

        let decoded: AttributeValue = serde_json::from_str(r#"{"BOOL":true}"#).unwrap();
        assert_eq!(decoded, AttributeValue::Bool(true));
    }
}
