//! Model-returned structure that may or may not have the expected shape.
//!
//! The model is asked for a fixed layout but nothing forces it to comply. A
//! [`Lenient`] value reads into the expected type when it can and otherwise
//! keeps the JSON exactly as received, so a malformed inner field never fails
//! the record that contains it and is exported unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    Known(T),
    Raw(Value),
}

impl<T> Lenient<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    pub fn known_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Raw(_) => None,
        }
    }
}

impl<T> From<T> for Lenient<T> {
    fn from(value: T) -> Self {
        Self::Known(value)
    }
}

impl Lenient<String> {
    /// Text reading: strings as is, numbers and booleans stringified.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Known(text) => Some(text.clone()),
            Self::Raw(value) => scalar_text(value),
        }
    }
}

/// Strings, numbers and booleans as text; `null`, arrays and objects have none.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Convenience for the optional text fields of model records.
pub fn text_of(field: &Option<Lenient<String>>) -> Option<String> {
    field.as_ref().and_then(Lenient::as_text)
}
