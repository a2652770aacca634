//! Outbound record encoding.
//!
//! Stored numbers are exact decimals; clients get plain JSON numbers.

use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Number, Value};

use crate::store::{AttributeValue, Item};

/// Converts a stored record into the JSON body sent to clients.
pub fn normalize_item(item: &Item) -> Value {
    Value::Object(
        item.iter()
            .map(|(name, value)| (name.clone(), normalize_value(value)))
            .collect::<Map<_, _>>(),
    )
}

pub fn normalize_items(items: &[Item]) -> Value {
    Value::Array(items.iter().map(normalize_item).collect())
}

fn normalize_value(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(text) => Value::String(text.clone()),
        AttributeValue::N(number) => number
            .to_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number),
        AttributeValue::Bool(flag) => Value::Bool(*flag),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(values) => Value::Array(values.iter().map(normalize_value).collect()),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(name, value)| (name.clone(), normalize_value(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[rstest]
    #[case(Decimal::new(150, 2), json!(1.5))]
    #[case(Decimal::from(3), json!(3.0))]
    #[case(Decimal::new(-25, 1), json!(-2.5))]
    fn decimals_become_floats(#[case] stored: Decimal, #[case] expected: Value) {
        let item = Item::from([("n".to_string(), AttributeValue::N(stored))]);
        let normalized = normalize_item(&item);

        assert!(normalized["n"].is_f64());
        assert_eq!(normalized["n"], expected);
    }

    #[test]
    fn nested_values_are_walked() {
        let item = Item::from([
            (
                "scores".to_string(),
                AttributeValue::L(vec![AttributeValue::N(Decimal::from(1))]),
            ),
            (
                "meta".to_string(),
                AttributeValue::M(BTreeMap::from([(
                    "weight".to_string(),
                    AttributeValue::N(Decimal::new(5, 1)),
                )])),
            ),
            ("title".to_string(), AttributeValue::S("A".into())),
            ("done".to_string(), AttributeValue::Bool(true)),
            ("gone".to_string(), AttributeValue::Null(true)),
        ]);

        assert_eq!(
            normalize_item(&item),
            json!({
                "scores": [1.0],
                "meta": {"weight": 0.5},
                "title": "A",
                "done": true,
                "gone": null,
            })
        );
    }

    #[test]
    fn normalized_numbers_encode_as_json_numbers() {
        let item = Item::from([("n".to_string(), AttributeValue::N(Decimal::new(42, 1)))]);
        let encoded = serde_json::to_string(&normalize_items(&[item])).unwrap();
        assert_eq!(encoded, r#"[{"n":4.2}]"#);
    }
}
