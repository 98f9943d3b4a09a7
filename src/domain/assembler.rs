//! Decoding of backend JSON responses into typed entities

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, SimulationError};

/// Decode a list response, either a bare array or an envelope `{ "data": [...] }`
pub fn entities_from_response<T: DeserializeOwned>(response: Value) -> Result<Vec<T>> {
    let items = match response {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(SimulationError::invalid_input(
                    "response",
                    "object response without a `data` array",
                ))
            }
        },
        other => {
            return Err(SimulationError::invalid_input(
                "response",
                format!("expected an array, got {}", other),
            ))
        }
    };

    items.into_iter().map(entity_from_resource).collect()
}

/// Decode a single resource object
pub fn entity_from_resource<T: DeserializeOwned>(resource: Value) -> Result<T> {
    Ok(serde_json::from_value(resource)?)
}

/// Decode a list response from its raw body
pub fn entities_from_str<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    entities_from_response(serde_json::from_str(body)?)
}
