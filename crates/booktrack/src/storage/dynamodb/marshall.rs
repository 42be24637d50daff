//! Conversion between JSON item attributes and DynamoDB `AttributeValue`s.
//!
//! Only the types the entity mapper produces are supported: null, bool,
//! number, string, array and nested object. Explicit nulls are written as
//! DynamoDB Null attributes so unset optional fields stay present, never
//! absent.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::{Number, Value};

use booktrack_core::storage::{Item, RepositoryError, Result};

/// Convert a stored item to a DynamoDB attribute map.
pub fn item_to_attributes(item: &Item) -> HashMap<String, AttributeValue> {
    item.iter()
        .map(|(k, v)| (k.clone(), to_attribute_value(v)))
        .collect()
}

/// Convert a DynamoDB attribute map back to a stored item.
pub fn attributes_to_item(attributes: &HashMap<String, AttributeValue>) -> Result<Item> {
    attributes
        .iter()
        .map(|(k, v)| Ok((k.clone(), from_attribute_value(v)?)))
        .collect()
}

fn to_attribute_value(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(to_attribute_value).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), to_attribute_value(v)))
                .collect(),
        ),
    }
}

fn from_attribute_value(value: &AttributeValue) -> Result<Value> {
    match value {
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::N(n) => parse_number(n),
        AttributeValue::S(s) => Ok(Value::String(s.clone())),
        AttributeValue::L(items) => Ok(Value::Array(
            items
                .iter()
                .map(from_attribute_value)
                .collect::<Result<Vec<_>>>()?,
        )),
        AttributeValue::M(map) => Ok(Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), from_attribute_value(v)?)))
                .collect::<Result<_>>()?,
        )),
        other => Err(RepositoryError::Serialization(format!(
            "Unsupported attribute type: {other:?}"
        ))),
    }
}

fn parse_number(n: &str) -> Result<Value> {
    if let Ok(i) = n.parse::<i64>() {
        return Ok(Value::Number(Number::from(i)));
    }
    if let Ok(u) = n.parse::<u64>() {
        return Ok(Value::Number(Number::from(u)));
    }
    n.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| RepositoryError::Serialization(format!("Invalid number attribute: {n}")))
}
