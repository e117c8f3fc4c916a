//! Conversion between dynamically typed sample lists and [`Complex64`] slices.
//!
//! Callers that hold samples as untyped values (scripting bridges, JSON
//! payloads) go through here. Each element must be a `[re, im]` pair of
//! numbers or an object with exactly the keys `re` and `im`; anything else is
//! rejected with [`DftError::InvalidInput`] before any arithmetic runs.

use serde_json::{Map, Value};

use crate::transforms::{Complex64, DftError, allocate, transform};

/// Parse a JSON array of samples.
///
/// # Errors
///
/// [`DftError::NotASequence`] when `value` is not an array, and
/// [`DftError::InvalidInput`] carrying the index of the first malformed element.
pub fn samples_from_value(value: &Value) -> Result<Vec<Complex64>, DftError> {
    let Value::Array(items) = value else {
        return Err(DftError::NotASequence);
    };

    let mut samples = allocate(items.len())?;
    for (index, item) in items.iter().enumerate() {
        samples.push(sample_from_value(index, item)?);
    }
    Ok(samples)
}

/// Render samples as a JSON array of `[re, im]` pairs.
///
/// Non-finite components have no JSON representation and become `null`.
#[must_use]
pub fn samples_to_value(samples: &[Complex64]) -> Value {
    Value::Array(
        samples
            .iter()
            .map(|&(re, im)| Value::Array(vec![Value::from(re), Value::from(im)]))
            .collect(),
    )
}

/// Parse, transform with default options, and render back.
///
/// No output is produced unless every element parses.
pub fn calculate_dft(value: &Value) -> Result<Value, DftError> {
    let samples = samples_from_value(value)?;
    let spectrum = transform(&samples)?;
    Ok(samples_to_value(&spectrum))
}

fn sample_from_value(index: usize, item: &Value) -> Result<Complex64, DftError> {
    match item {
        Value::Array(pair) => match pair.as_slice() {
            [re, im] => Ok((component(index, re)?, component(index, im)?)),
            _ => Err(invalid(index, "expected exactly two components")),
        },
        Value::Object(fields) => sample_from_fields(index, fields),
        _ => Err(invalid(index, "expected a [re, im] pair or {re, im} object")),
    }
}

fn sample_from_fields(index: usize, fields: &Map<String, Value>) -> Result<Complex64, DftError> {
    if fields.len() != 2 {
        return Err(invalid(index, "expected exactly the keys `re` and `im`"));
    }
    match (fields.get("re"), fields.get("im")) {
        (Some(re), Some(im)) => Ok((component(index, re)?, component(index, im)?)),
        _ => Err(invalid(index, "expected exactly the keys `re` and `im`")),
    }
}

fn component(index: usize, value: &Value) -> Result<f64, DftError> {
    value
        .as_f64()
        .ok_or_else(|| invalid(index, "component is not numeric"))
}

fn invalid(index: usize, detail: &'static str) -> DftError {
    DftError::InvalidInput { index, detail }
}
