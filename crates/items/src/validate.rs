//! Request-body validation: untyped JSON in, typed commands out.
//!
//! Validators never stop at the first problem. Every offending field is
//! reported so a client can fix the whole payload in one round-trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::item::{CreateItem, UpdateItem};

/// A single field-level validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Body was absent or not a JSON object. Never combined with field errors.
    #[error("Request body must be a JSON object")]
    MalformedBody,

    /// One or more fields were invalid, in field order.
    #[error("Validation failed")]
    Fields(Vec<FieldError>),
}

impl ValidationError {
    pub fn details(&self) -> &[FieldError] {
        match self {
            ValidationError::MalformedBody => &[],
            ValidationError::Fields(details) => details,
        }
    }
}

/// Wildcard field name used when an update would change nothing.
pub const ANY_FIELD: &str = "*";

/// Validate a create payload.
///
/// `name` and `quantity` are required, `purchased` is optional.
pub fn validate_create(body: Option<&Value>) -> Result<CreateItem, ValidationError> {
    let obj = as_object(body)?;
    let mut details = Vec::new();

    let name = obj.get("name").and_then(non_empty_string);
    if name.is_none() {
        details.push(FieldError::new(
            "name",
            "name is required and must be a non-empty string",
        ));
    }

    let quantity = obj.get("quantity").and_then(positive_integer);
    if quantity.is_none() {
        details.push(FieldError::new(
            "quantity",
            "quantity is required and must be a number >= 1",
        ));
    }

    let purchased = match obj.get("purchased") {
        None => None,
        Some(v) => {
            let b = v.as_bool();
            if b.is_none() {
                details.push(FieldError::new("purchased", "purchased must be a boolean"));
            }
            b
        }
    };

    match (name, quantity) {
        (Some(name), Some(quantity)) if details.is_empty() => Ok(CreateItem {
            name: name.to_string(),
            quantity,
            purchased,
        }),
        _ => Err(ValidationError::Fields(details)),
    }
}

/// Validate a partial update payload.
///
/// Every field is optional, but at least one of them has to be present and
/// valid. When none survives, a wildcard entry follows any field errors.
pub fn validate_update(body: Option<&Value>) -> Result<UpdateItem, ValidationError> {
    let obj = as_object(body)?;
    let mut details = Vec::new();
    let mut cmd = UpdateItem::default();

    if let Some(v) = obj.get("name") {
        match non_empty_string(v) {
            Some(name) => cmd.name = Some(name.to_string()),
            None => details.push(FieldError::new("name", "name must be a non-empty string")),
        }
    }

    if let Some(v) = obj.get("quantity") {
        match positive_integer(v) {
            Some(quantity) => cmd.quantity = Some(quantity),
            None => details.push(FieldError::new("quantity", "quantity must be a number >= 1")),
        }
    }

    if let Some(v) = obj.get("purchased") {
        match v.as_bool() {
            Some(purchased) => cmd.purchased = Some(purchased),
            None => details.push(FieldError::new("purchased", "purchased must be a boolean")),
        }
    }

    if cmd.is_empty() {
        details.push(FieldError::new(
            ANY_FIELD,
            "Provide at least one of these: name, quantity, purchased",
        ));
    }

    if details.is_empty() {
        Ok(cmd)
    } else {
        Err(ValidationError::Fields(details))
    }
}

fn as_object(body: Option<&Value>) -> Result<&Map<String, Value>, ValidationError> {
    body.and_then(Value::as_object)
        .ok_or(ValidationError::MalformedBody)
}

fn non_empty_string(v: &Value) -> Option<&str> {
    v.as_str().filter(|s| !s.trim().is_empty())
}

/// Integral JSON number >= 1.
///
/// `2.0` counts as integral; `2.5` does not and is rejected rather than floored.
fn positive_integer(v: &Value) -> Option<i64> {
    if let Some(n) = v.as_i64() {
        return (n >= 1).then_some(n);
    }
    let f = v.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= 1.0 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
