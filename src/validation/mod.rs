/*!
 * # Schema Validation
 *
 * Declarative per-endpoint schemas: each schema kind is a table of
 * [`FieldRule`]s evaluated in order by [`validate`]. A rule's check
 * composes sanitize -> constrain -> transform and reports every problem it
 * finds, so one call can return multiple messages per field. Validation is
 * all-or-nothing: on success the caller gets the fully transformed object
 * (never the raw input), on failure a map of field paths to messages and no
 * partial data.
 */

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::security::{password, sanitize};

mod schemas;

pub use schemas::SchemaKind;

/// Field path -> ordered list of human-readable messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Error produced by a single field check. `Nested` carries fully-pathed
/// keys (e.g. `items[2].quantity`) and is merged into the result verbatim.
#[derive(Debug)]
pub enum RuleError {
    Field(Vec<String>),
    Nested(FieldErrors),
}

/// One row of a schema table.
pub struct FieldRule {
    pub field: &'static str,
    pub required: bool,
    pub check: Box<dyn Fn(&Value) -> Result<Value, RuleError> + Send + Sync>,
}

pub(crate) fn rule(
    field: &'static str,
    required: bool,
    check: impl Fn(&Value) -> Result<Value, RuleError> + Send + Sync + 'static,
) -> FieldRule {
    FieldRule {
        field,
        required,
        check: Box::new(check),
    }
}

/// Validate a raw JSON object against a schema kind. Returns the
/// transformed object or the accumulated field errors; never panics and
/// never returns partially-applied data.
pub fn validate(kind: SchemaKind, raw: &Value) -> Result<Value, FieldErrors> {
    let Some(input) = raw.as_object() else {
        let mut errors = FieldErrors::new();
        errors.insert(
            "body".to_string(),
            vec!["Expected a JSON object".to_string()],
        );
        return Err(errors);
    };

    let mut output = Map::new();
    let mut errors = FieldErrors::new();

    for rule in kind.rules() {
        match input.get(rule.field) {
            None | Some(Value::Null) => {
                if rule.required {
                    errors.insert(
                        rule.field.to_string(),
                        vec![format!("{} is required", rule.field)],
                    );
                }
            }
            Some(value) => match (rule.check)(value) {
                Ok(transformed) => {
                    output.insert(rule.field.to_string(), transformed);
                }
                Err(RuleError::Field(messages)) => {
                    errors.insert(rule.field.to_string(), messages);
                }
                Err(RuleError::Nested(nested)) => {
                    errors.extend(nested);
                }
            },
        }
    }

    if errors.is_empty() {
        Ok(Value::Object(output))
    } else {
        Err(errors)
    }
}

fn field_err(message: impl Into<String>) -> RuleError {
    RuleError::Field(vec![message.into()])
}

fn as_str(value: &Value) -> Result<&str, RuleError> {
    value.as_str().ok_or_else(|| field_err("Must be a string"))
}

lazy_static::lazy_static! {
    static ref RESIDUAL_HANDLER: regex::Regex = regex::Regex::new(r"(?i)\bon\w+=").unwrap();
}

/// Dangerous patterns that must not survive sanitization. Checked again
/// after the sanitizer runs, as a second line against sanitizer gaps.
fn has_dangerous_residue(s: &str) -> bool {
    let lower = s.to_lowercase();
    lower.contains("javascript:") || lower.contains("<script") || RESIDUAL_HANDLER.is_match(&lower)
}

/// Free text: sanitize, then bound the length, then reject any residual
/// dangerous pattern. All applicable messages are reported together.
pub(crate) fn text_field(value: &Value, min: usize, max: usize) -> Result<Value, RuleError> {
    let raw = as_str(value)?;
    let clean = sanitize::text(raw);
    let mut messages = Vec::new();
    let length = clean.chars().count();
    if length < min {
        messages.push(format!("Must be at least {min} characters"));
    }
    if length > max {
        messages.push(format!("Must be at most {max} characters"));
    }
    if has_dangerous_residue(&clean) {
        messages.push("Contains invalid characters".to_string());
    }
    if messages.is_empty() {
        Ok(Value::String(clean))
    } else {
        Err(RuleError::Field(messages))
    }
}

/// Email: sanitize, then require a syntactically plausible address.
pub(crate) fn email_field(value: &Value) -> Result<Value, RuleError> {
    let raw = as_str(value)?;
    let clean = sanitize::email(raw);
    if is_valid_email(&clean) {
        Ok(Value::String(clean))
    } else {
        Err(field_err("Must be a valid email address"))
    }
}

fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || local.len() > 64 || domain.is_empty() || domain.len() > 255 {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Integer within an inclusive range.
pub(crate) fn int_field(value: &Value, min: i64, max: i64) -> Result<Value, RuleError> {
    let Some(n) = value.as_i64() else {
        return Err(field_err("Must be a whole number"));
    };
    let mut messages = Vec::new();
    if n < min {
        messages.push(format!("Must be at least {min}"));
    }
    if n > max {
        messages.push(format!("Must be at most {max}"));
    }
    if messages.is_empty() {
        Ok(Value::from(n))
    } else {
        Err(RuleError::Field(messages))
    }
}

/// Non-negative amount within an inclusive upper bound.
pub(crate) fn price_field(value: &Value, max: f64) -> Result<Value, RuleError> {
    let Some(n) = value.as_f64() else {
        return Err(field_err("Must be a number"));
    };
    let mut messages = Vec::new();
    if !n.is_finite() || n < 0.0 {
        messages.push("Must be zero or greater".to_string());
    }
    if n > max {
        messages.push(format!("Must be at most {max}"));
    }
    if messages.is_empty() {
        Ok(Value::from(n))
    } else {
        Err(RuleError::Field(messages))
    }
}

/// Member of a closed uppercase set, after trim + uppercase transform.
pub(crate) fn enum_field(value: &Value, allowed: &[&str]) -> Result<Value, RuleError> {
    let raw = as_str(value)?;
    let normalized = raw.trim().to_uppercase();
    if allowed.contains(&normalized.as_str()) {
        Ok(Value::String(normalized))
    } else {
        Err(field_err(format!("Must be one of: {}", allowed.join(", "))))
    }
}

/// String matching a fixed pattern, trimmed but otherwise untransformed.
pub(crate) fn pattern_field(
    value: &Value,
    pattern: &regex::Regex,
    message: &str,
) -> Result<Value, RuleError> {
    let raw = as_str(value)?;
    let trimmed = raw.trim();
    if pattern.is_match(trimmed) {
        Ok(Value::String(trimmed.to_string()))
    } else {
        Err(field_err(message))
    }
}

/// Container tracking id: trim + uppercase first, then constrain to
/// 4-20 characters of letters and digits.
pub(crate) fn tracking_id_field(value: &Value) -> Result<Value, RuleError> {
    let raw = as_str(value)?;
    let normalized = raw.trim().to_uppercase();
    let mut messages = Vec::new();
    let length = normalized.chars().count();
    if !(4..=20).contains(&length) {
        messages.push("Must be between 4 and 20 characters".to_string());
    }
    if !normalized.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        messages.push("Must contain only letters and digits".to_string());
    }
    if messages.is_empty() {
        Ok(Value::String(normalized))
    } else {
        Err(RuleError::Field(messages))
    }
}

/// Password for account creation: complexity rules plus an upper length cap.
/// The value passes through untransformed.
pub(crate) fn password_field(value: &Value) -> Result<Value, RuleError> {
    let raw = as_str(value)?;
    let strength = password::check_strength(raw);
    let mut messages = strength.errors;
    if raw.chars().count() > 128 {
        messages.push("Password must be at most 128 characters long".to_string());
    }
    if messages.is_empty() {
        Ok(Value::String(raw.to_string()))
    } else {
        Err(RuleError::Field(messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_object_body_is_rejected() {
        let err = validate(SchemaKind::ContactForm, &json!("not an object")).unwrap_err();
        assert!(err.contains_key("body"));
    }

    #[test]
    fn text_field_accumulates_errors() {
        let err = text_field(&json!("j<script>avascript:x"), 40, 60).unwrap_err();
        let RuleError::Field(messages) = err else {
            panic!("expected field messages");
        };
        assert!(messages.iter().any(|m| m.contains("at least 40")));
    }

    #[test]
    fn email_field_rules() {
        assert_eq!(
            email_field(&json!("  TEST@EXAMPLE.COM  ")).unwrap(),
            json!("test@example.com")
        );
        assert!(email_field(&json!("invalid")).is_err());
        assert!(email_field(&json!("user@.com")).is_err());
        assert!(email_field(&json!(42)).is_err());
    }

    #[test]
    fn int_and_price_bounds() {
        assert!(int_field(&json!(1), 1, 10_000).is_ok());
        assert!(int_field(&json!(0), 1, 10_000).is_err());
        assert!(int_field(&json!(10_001), 1, 10_000).is_err());
        assert!(int_field(&json!(2.5), 1, 10_000).is_err());
        assert!(price_field(&json!(0), 1_000_000.0).is_ok());
        assert!(price_field(&json!(-1), 1_000_000.0).is_err());
        assert!(price_field(&json!(1_000_001), 1_000_000.0).is_err());
    }

    #[test]
    fn tracking_id_rules() {
        for id in ["ABCD1234567", "EFGH9876543", "IJKL5555555"] {
            assert!(tracking_id_field(&json!(id)).is_ok(), "{id} should pass");
        }
        assert_eq!(
            tracking_id_field(&json!("  msku123  ")).unwrap(),
            json!("MSKU123")
        );
        assert!(tracking_id_field(&json!("")).is_err());
        assert!(tracking_id_field(&json!("AB")).is_err());
        assert!(tracking_id_field(&json!("A".repeat(29))).is_err());
        assert!(tracking_id_field(&json!("ABC-1234")).is_err());
    }

    #[test]
    fn enum_field_normalizes_and_rejects() {
        assert_eq!(
            enum_field(&json!(" admin "), &["ADMIN", "STAFF"]).unwrap(),
            json!("ADMIN")
        );
        assert!(enum_field(&json!("owner"), &["ADMIN", "STAFF"]).is_err());
    }
}
