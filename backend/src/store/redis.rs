//! Redis-backed store.
//!
//! Each record is a hash under `<table>:<key>`; every hash field holds one
//! attribute encoded as typed JSON (`{"S":"..."}`, `{"N":"1.5"}`, ...).

use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, Script};

use super::{AttributeValue, Assignments, Item, StoreError, TaskStore};

/// Applies every assignment only when the record exists, then returns it.
const CONDITIONAL_UPDATE_SCRIPT: &str = r"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return nil
end
for i = 1, #ARGV, 2 do
    redis.call('HSET', KEYS[1], ARGV[i], ARGV[i + 1])
end
return redis.call('HGETALL', KEYS[1])
";

pub struct RedisTaskStore {
    connection: MultiplexedConnection,
    table: String,
    update_script: Script,
}

impl RedisTaskStore {
    pub async fn connect(url: &str, table: impl Into<String>) -> Result<Self, StoreError> {
        let client = Client::open(url).map_err(backend_error)?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(backend_error)?;

        Ok(Self {
            connection,
            table: table.into(),
            update_script: Script::new(CONDITIONAL_UPDATE_SCRIPT),
        })
    }

    fn record_key(&self, key: &str) -> String {
        record_key(&self.table, key)
    }
}

fn record_key(table: &str, key: &str) -> String {
    format!("{table}:{key}")
}

fn backend_error(error: redis::RedisError) -> StoreError {
    StoreError::Backend(error.to_string())
}

fn encode_fields<'a>(
    fields: impl Iterator<Item = (&'a str, &'a AttributeValue)>,
) -> Result<Vec<(String, String)>, StoreError> {
    fields
        .map(|(name, value)| {
            serde_json::to_string(value)
                .map(|encoded| (name.to_string(), encoded))
                .map_err(|error| StoreError::Encoding(error.to_string()))
        })
        .collect()
}

fn decode_hash(hash: HashMap<String, String>) -> Result<Item, StoreError> {
    hash.into_iter()
        .map(|(name, encoded)| {
            serde_json::from_str(&encoded)
                .map(|value| (name.clone(), value))
                .map_err(|error| StoreError::Encoding(format!("attribute {name}: {error}")))
        })
        .collect()
}

#[async_trait]
impl TaskStore for RedisTaskStore {
    async fn put(&self, key: &str, item: Item) -> Result<(), StoreError> {
        let record_key = self.record_key(key);
        let fields = encode_fields(item.iter().map(|(name, value)| (name.as_str(), value)))?;
        let mut connection = self.connection.clone();

        let mut pipeline = redis::pipe();
        pipeline.atomic().del(&record_key).ignore();
        if !fields.is_empty() {
            pipeline.hset_multiple(&record_key, fields.as_slice()).ignore();
        }
        pipeline
            .query_async::<_, ()>(&mut connection)
            .await
            .map_err(backend_error)
    }

    async fn scan(&self) -> Result<Vec<Item>, StoreError> {
        let mut connection = self.connection.clone();

        let keys: Vec<String> = {
            let mut iter = connection
                .scan_match::<_, String>(record_key(&self.table, "*"))
                .await
                .map_err(backend_error)?;
            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            keys
        };

        let mut items = Vec::with_capacity(keys.len());
        for key in keys {
            let hash: HashMap<String, String> =
                connection.hgetall(&key).await.map_err(backend_error)?;
            // Deleted between SCAN and HGETALL.
            if hash.is_empty() {
                continue;
            }
            items.push(decode_hash(hash)?);
        }
        Ok(items)
    }

    async fn conditional_update(
        &self,
        key: &str,
        assignments: &Assignments,
    ) -> Result<Item, StoreError> {
        let fields = encode_fields(assignments.iter())?;
        let mut connection = self.connection.clone();

        let mut invocation = self.update_script.key(self.record_key(key));
        for (name, encoded) in &fields {
            invocation.arg(name).arg(encoded);
        }

        let hash: Option<HashMap<String, String>> = invocation
            .invoke_async(&mut connection)
            .await
            .map_err(backend_error)?;

        match hash {
            Some(hash) => decode_hash(hash),
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn record_keys_are_namespaced_by_table() {
        assert_eq!(record_key("todos", "abc"), "todos:abc");
        assert_eq!(record_key("todos", "*"), "todos:*");
    }

    #[test]
    fn hash_fields_decode_back_to_attributes() {
        let item = Item::from([
            ("title".to_string(), AttributeValue::S("A".into())),
            ("completed".to_string(), AttributeValue::Bool(true)),
            ("priority".to_string(), AttributeValue::N(Decimal::new(25, 1))),
        ]);

        let hash: HashMap<String, String> =
            encode_fields(item.iter().map(|(name, value)| (name.as_str(), value)))
                .unwrap()
                .into_iter()
                .collect();

        assert_eq!(hash["priority"], r#"{"N":"2.5"}"#);
        assert_eq!(decode_hash(hash).unwrap(), item);
    }

    #[test]
    fn corrupt_hash_field_is_an_encoding_error() {
        let hash = HashMap::from([("title".to_string(), "not json".to_string())]);
        assert!(matches!(decode_hash(hash), Err(StoreError::Encoding(_))));
    }
}
