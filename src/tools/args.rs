//! Typed access to a tool's JSON arguments.
//!
//! `null` counts as absent so optional parameters fall back to their
//! defaults. Unknown keys are ignored.

use rmcp::model::JsonObject;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    #[error("missing required argument `{0}`")]
    Missing(&'static str),

    #[error("argument `{name}` must be {expected}")]
    InvalidType {
        name: &'static str,
        expected: &'static str,
    },

    #[error("argument `{name}` is out of range: {value}")]
    OutOfRange { name: &'static str, value: String },
}

/// Borrowed view over a call's arguments.
pub struct Args<'a> {
    inner: &'a JsonObject,
}

impl<'a> Args<'a> {
    pub fn new(inner: &'a JsonObject) -> Self {
        Self { inner }
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.inner.get(name).filter(|v| !v.is_null())
    }

    pub fn required_str(&self, name: &'static str) -> Result<String, ArgumentError> {
        self.optional_str(name)?.ok_or(ArgumentError::Missing(name))
    }

    pub fn optional_str(&self, name: &'static str) -> Result<Option<String>, ArgumentError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(ArgumentError::InvalidType {
                name,
                expected: "a string",
            }),
        }
    }

    pub fn optional_bool(&self, name: &'static str) -> Result<Option<bool>, ArgumentError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(ArgumentError::InvalidType {
                name,
                expected: "a boolean",
            }),
        }
    }

    pub fn bool_or(&self, name: &'static str, default: bool) -> Result<bool, ArgumentError> {
        Ok(self.optional_bool(name)?.unwrap_or(default))
    }

    pub fn required_i32(&self, name: &'static str) -> Result<i32, ArgumentError> {
        self.optional_i32(name)?.ok_or(ArgumentError::Missing(name))
    }

    /// Accepts integral JSON numbers, including ones written as `17.0`.
    pub fn optional_i32(&self, name: &'static str) -> Result<Option<i32>, ArgumentError> {
        let number = match self.get(name) {
            None => return Ok(None),
            Some(Value::Number(n)) => n,
            Some(_) => {
                return Err(ArgumentError::InvalidType {
                    name,
                    expected: "an integer",
                });
            }
        };

        let wide = if let Some(i) = number.as_i64() {
            i
        } else {
            match number.as_f64() {
                Some(f) if f.fract() != 0.0 => {
                    return Err(ArgumentError::InvalidType {
                        name,
                        expected: "an integer",
                    });
                }
                Some(f) if f.abs() < 1e18 => f as i64,
                _ => {
                    return Err(ArgumentError::OutOfRange {
                        name,
                        value: number.to_string(),
                    });
                }
            }
        };

        i32::try_from(wide)
            .map(Some)
            .map_err(|_| ArgumentError::OutOfRange {
                name,
                value: number.to_string(),
            })
    }

    pub fn i32_or(&self, name: &'static str, default: i32) -> Result<i32, ArgumentError> {
        Ok(self.optional_i32(name)?.unwrap_or(default))
    }
}
