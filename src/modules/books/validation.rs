//! Turns untyped request bodies into typed book records.
//!
//! Validation is all-or-nothing: every violated field is reported together
//! and nothing is produced unless the whole payload is acceptable.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::models::{BookPatch, Condition, NewBook, DEFAULT_DESCRIPTION};

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    #[serde(rename = "error")]
    pub reason: String,
}

/// Every violation found in one payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} field(s) failed validation", .violations.len())]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Whether `field` is among the violations.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

/// Validate a create payload, applying schema defaults.
pub fn validate_new_book(input: &Value) -> Result<NewBook, ValidationError> {
    let mut fields = Fields::of(input)?;

    // Failed required fields are recorded as violations, so the empty
    // fallbacks never leave this function.
    let book_name = fields.required_text("book_name").unwrap_or_default();
    let author_name = fields.required_text("author_name").unwrap_or_default();
    let year_of_publication = fields.text("year_of_publication");
    let price = fields.positive_number("price");
    let discount = fields.text("discount");
    let number_of_pages = fields.positive_integer("number_of_pages");
    let condition = fields.condition("condition");
    let description = fields.text("description");

    fields.finish()?;

    Ok(NewBook {
        book_name,
        author_name,
        year_of_publication,
        price,
        discount,
        number_of_pages,
        condition: condition.unwrap_or_default(),
        description: description.unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
    })
}

/// Validate a partial update. Only supplied fields are checked and kept;
/// unknown keys are dropped.
pub fn validate_patch(input: &Value) -> Result<BookPatch, ValidationError> {
    let mut fields = Fields::of(input)?;

    let patch = BookPatch {
        book_name: fields.nonempty_text("book_name"),
        author_name: fields.nonempty_text("author_name"),
        year_of_publication: fields.text("year_of_publication"),
        price: fields.positive_number("price"),
        discount: fields.text("discount"),
        number_of_pages: fields.positive_integer("number_of_pages"),
        condition: fields.condition("condition"),
        description: fields.text("description"),
    };

    fields.finish()?;
    Ok(patch)
}

/// Field reader that accumulates violations instead of failing fast.
struct Fields<'a> {
    object: &'a Map<String, Value>,
    violations: Vec<Violation>,
}

impl<'a> Fields<'a> {
    fn of(input: &'a Value) -> Result<Self, ValidationError> {
        match input {
            Value::Object(object) => Ok(Self {
                object,
                violations: Vec::new(),
            }),
            _ => Err(ValidationError {
                violations: vec![Violation {
                    field: "body".to_string(),
                    reason: "must be a JSON object".to_string(),
                }],
            }),
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                violations: self.violations,
            })
        }
    }

    fn reject(&mut self, field: &str, reason: &str) {
        self.violations.push(Violation {
            field: field.to_string(),
            reason: reason.to_string(),
        });
    }

    /// `null` counts as not supplied.
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.object.get(field).filter(|value| !value.is_null())
    }

    /// Like `required_text`, but absence is not a violation.
    fn nonempty_text(&mut self, field: &str) -> Option<String> {
        self.get(field)?;
        self.required_text(field)
    }

    fn required_text(&mut self, field: &str) -> Option<String> {
        match self.get(field) {
            None => {
                self.reject(field, "is required");
                None
            }
            Some(Value::String(text)) if text.trim().is_empty() => {
                self.reject(field, "must not be empty");
                None
            }
            Some(Value::String(text)) => Some(text.trim().to_string()),
            Some(_) => {
                self.reject(field, "must be a string");
                None
            }
        }
    }

    fn text(&mut self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::String(text) => Some(text.clone()),
            _ => {
                self.reject(field, "must be a string");
                None
            }
        }
    }

    fn positive_number(&mut self, field: &str) -> Option<f64> {
        let value = self.get(field)?;
        match value.as_f64() {
            Some(number) if number.is_finite() && number > 0.0 => Some(number),
            _ => {
                self.reject(field, "must be a positive number");
                None
            }
        }
    }

    fn positive_integer(&mut self, field: &str) -> Option<u64> {
        let value = self.get(field)?;
        let integer = value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|n| n.fract() == 0.0 && *n >= 1.0 && *n <= u64::MAX as f64)
                .map(|n| n as u64)
        });
        match integer {
            Some(pages) if pages > 0 => Some(pages),
            _ => {
                self.reject(field, "must be a positive integer");
                None
            }
        }
    }

    fn condition(&mut self, field: &str) -> Option<Condition> {
        let value = self.get(field)?;
        match value.as_str().and_then(Condition::parse) {
            Some(condition) => Some(condition),
            None => {
                self.reject(field, "must be one of: new, used");
                None
            }
        }
    }
}
