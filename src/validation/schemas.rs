//! Schema tables for every endpoint kind. Each table is built once and
//! evaluated in row order by the driver in the parent module.

use lazy_static::lazy_static;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::{
    email_field, enum_field, int_field, password_field, pattern_field, price_field, rule,
    text_field, tracking_id_field, FieldErrors, FieldRule, RuleError,
};

lazy_static! {
    static ref CURRENCY_CODE: Regex = Regex::new(r"^[A-Z]{3}$").unwrap();
    static ref SWIFT_CODE: Regex = Regex::new(r"^[A-Z]{6}[A-Z0-9]{2}([A-Z0-9]{3})?$").unwrap();
}

const MAX_INVOICE_ITEMS: usize = 50;

/// The endpoint kinds the pipeline validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    ContactForm,
    Invoice,
    User,
    Login,
    TrackingId,
    UploadMetadata,
    CompanySettings,
}

impl SchemaKind {
    pub(crate) fn rules(&self) -> &'static [FieldRule] {
        match self {
            Self::ContactForm => &CONTACT_FORM,
            Self::Invoice => &INVOICE,
            Self::User => &USER,
            Self::Login => &LOGIN,
            Self::TrackingId => &TRACKING_ID,
            Self::UploadMetadata => &UPLOAD_METADATA,
            Self::CompanySettings => &COMPANY_SETTINGS,
        }
    }
}

static CONTACT_FORM: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        rule("name", true, |v| text_field(v, 2, 100)),
        rule("email", true, email_field),
        rule("phone", false, |v| text_field(v, 5, 30)),
        rule("subject", false, |v| text_field(v, 2, 150)),
        rule("message", true, |v| text_field(v, 10, 2000)),
    ]
});

static INVOICE: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        rule("customer_name", true, |v| text_field(v, 2, 100)),
        rule("customer_email", true, email_field),
        rule("currency", true, |v| {
            pattern_field(v, &CURRENCY_CODE, "Must be a 3-letter uppercase currency code")
        }),
        rule("swift_code", false, |v| {
            pattern_field(v, &SWIFT_CODE, "Must be a valid SWIFT/BIC code")
        }),
        rule("bank_name", false, |v| text_field(v, 2, 100)),
        rule("account_name", false, |v| text_field(v, 2, 100)),
        rule("notes", false, |v| text_field(v, 0, 1000)),
        rule("items", true, invoice_items_field),
    ]
});

static INVOICE_ITEM: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        rule("description", true, |v| text_field(v, 1, 500)),
        rule("quantity", true, |v| int_field(v, 1, 10_000)),
        rule("unit_price", true, |v| price_field(v, 1_000_000.0)),
    ]
});

static USER: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        rule("name", true, |v| text_field(v, 2, 100)),
        rule("email", true, email_field),
        rule("password", true, password_field),
        rule("role", true, |v| enum_field(v, &["ADMIN", "STAFF"])),
    ]
});

static LOGIN: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        rule("email", true, email_field),
        // strength is only enforced at account creation; login just needs
        // a bounded non-empty secret
        rule("password", true, |v| {
            let raw = v.as_str().ok_or_else(|| {
                RuleError::Field(vec!["Must be a string".to_string()])
            })?;
            if raw.is_empty() || raw.chars().count() > 128 {
                return Err(RuleError::Field(vec![
                    "Password must be between 1 and 128 characters".to_string(),
                ]));
            }
            Ok(Value::String(raw.to_string()))
        }),
    ]
});

static TRACKING_ID: Lazy<Vec<FieldRule>> =
    Lazy::new(|| vec![rule("container_id", true, tracking_id_field)]);

static UPLOAD_METADATA: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        rule("file_name", true, |v| {
            let raw = v.as_str().ok_or_else(|| {
                RuleError::Field(vec!["Must be a string".to_string()])
            })?;
            let clean = crate::security::sanitize::filename(raw);
            if clean.is_empty() {
                return Err(RuleError::Field(vec!["File name is required".to_string()]));
            }
            Ok(Value::String(clean))
        }),
        rule("mime_type", true, |v| text_field(v, 3, 100)),
        rule("size_bytes", true, |v| int_field(v, 1, i64::MAX)),
    ]
});

static COMPANY_SETTINGS: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        rule("company_name", true, |v| text_field(v, 2, 150)),
        rule("contact_email", true, email_field),
        rule("phone", false, |v| text_field(v, 5, 30)),
        rule("address", false, |v| text_field(v, 5, 300)),
        rule("about", false, |v| text_field(v, 0, 5000)),
    ]
});

/// Invoice line items: 1-50 entries, each validated by the item sub-table.
/// Item errors are keyed `items[i].field`.
fn invoice_items_field(value: &Value) -> Result<Value, RuleError> {
    let Some(items) = value.as_array() else {
        return Err(RuleError::Field(vec!["Must be a list of items".to_string()]));
    };
    if items.is_empty() {
        return Err(RuleError::Field(vec![
            "At least one item is required".to_string(),
        ]));
    }
    if items.len() > MAX_INVOICE_ITEMS {
        return Err(RuleError::Field(vec![format!(
            "At most {MAX_INVOICE_ITEMS} items are allowed"
        )]));
    }

    let mut transformed = Vec::with_capacity(items.len());
    let mut errors = FieldErrors::new();
    for (index, item) in items.iter().enumerate() {
        let Some(fields) = item.as_object() else {
            errors.insert(
                format!("items[{index}]"),
                vec!["Must be an object".to_string()],
            );
            continue;
        };
        let mut out = Map::new();
        for item_rule in INVOICE_ITEM.iter() {
            match fields.get(item_rule.field) {
                None | Some(Value::Null) => {
                    if item_rule.required {
                        errors.insert(
                            format!("items[{index}].{}", item_rule.field),
                            vec![format!("{} is required", item_rule.field)],
                        );
                    }
                }
                Some(v) => match (item_rule.check)(v) {
                    Ok(t) => {
                        out.insert(item_rule.field.to_string(), t);
                    }
                    Err(RuleError::Field(messages)) => {
                        errors.insert(format!("items[{index}].{}", item_rule.field), messages);
                    }
                    Err(RuleError::Nested(nested)) => {
                        errors.extend(nested);
                    }
                },
            }
        }
        transformed.push(Value::Object(out));
    }

    if errors.is_empty() {
        Ok(Value::Array(transformed))
    } else {
        Err(RuleError::Nested(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::super::validate;
    use super::*;
    use serde_json::json;

    #[test]
    fn contact_form_round_trip() {
        let payload = json!({
            "name": "John Doe",
            "email": "  JOHN@Example.com ",
            "message": "A sufficiently long test message."
        });
        let data = validate(SchemaKind::ContactForm, &payload).unwrap();
        assert_eq!(data["email"], "john@example.com");
        assert_eq!(data["name"], "John Doe");
        // optional fields absent from input are absent from output
        assert!(data.get("phone").is_none());
    }

    #[test]
    fn contact_form_short_message_fails() {
        let payload = json!({
            "name": "John Doe",
            "email": "john@example.com",
            "message": "abc"
        });
        let errors = validate(SchemaKind::ContactForm, &payload).unwrap_err();
        assert!(errors.contains_key("message"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn contact_form_missing_fields_are_reported_together() {
        let errors = validate(SchemaKind::ContactForm, &json!({})).unwrap_err();
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("message"));
    }

    #[test]
    fn tracking_schema_examples() {
        for id in ["ABCD1234567", "EFGH9876543", "IJKL5555555"] {
            assert!(validate(SchemaKind::TrackingId, &json!({ "container_id": id })).is_ok());
        }
        let too_long = "Z".repeat(29);
        for id in ["", "AB", too_long.as_str()] {
            assert!(
                validate(SchemaKind::TrackingId, &json!({ "container_id": id })).is_err(),
                "{id:?} should fail"
            );
        }
    }

    #[test]
    fn invoice_valid_payload_transforms() {
        let payload = json!({
            "customer_name": "Acme GmbH",
            "customer_email": "BILLING@ACME.DE",
            "currency": "EUR",
            "swift_code": "DEUTDEFF",
            "items": [
                { "description": "Sea freight 40ft", "quantity": 2, "unit_price": 1850.0 },
                { "description": "Customs clearance", "quantity": 1, "unit_price": 240.5 }
            ]
        });
        let data = validate(SchemaKind::Invoice, &payload).unwrap();
        assert_eq!(data["customer_email"], "billing@acme.de");
        assert_eq!(data["items"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn invoice_item_errors_are_pathed() {
        let payload = json!({
            "customer_name": "Acme GmbH",
            "customer_email": "billing@acme.de",
            "currency": "EUR",
            "items": [
                { "description": "ok", "quantity": 1, "unit_price": 10.0 },
                { "description": "bad", "quantity": 0, "unit_price": -5 }
            ]
        });
        let errors = validate(SchemaKind::Invoice, &payload).unwrap_err();
        assert!(errors.contains_key("items[1].quantity"));
        assert!(errors.contains_key("items[1].unit_price"));
        assert!(!errors.contains_key("items[0].quantity"));
    }

    #[test]
    fn invoice_item_count_bounds() {
        let base = json!({
            "customer_name": "Acme GmbH",
            "customer_email": "billing@acme.de",
            "currency": "EUR",
        });
        let mut empty = base.clone();
        empty["items"] = json!([]);
        assert!(validate(SchemaKind::Invoice, &empty).unwrap_err().contains_key("items"));

        let item = json!({ "description": "x", "quantity": 1, "unit_price": 1.0 });
        let mut too_many = base.clone();
        too_many["items"] = Value::Array(vec![item; 51]);
        assert!(validate(SchemaKind::Invoice, &too_many)
            .unwrap_err()
            .contains_key("items"));
    }

    #[test]
    fn invoice_rejects_bad_currency_and_swift() {
        let payload = json!({
            "customer_name": "Acme GmbH",
            "customer_email": "billing@acme.de",
            "currency": "eur",
            "swift_code": "nope",
            "items": [{ "description": "x", "quantity": 1, "unit_price": 1.0 }]
        });
        let errors = validate(SchemaKind::Invoice, &payload).unwrap_err();
        assert!(errors.contains_key("currency"));
        assert!(errors.contains_key("swift_code"));
    }

    #[test]
    fn user_schema_enforces_password_strength_and_role() {
        let weak = json!({
            "name": "Jane Admin",
            "email": "jane@tradeport.example",
            "password": "weak",
            "role": "ADMIN"
        });
        let errors = validate(SchemaKind::User, &weak).unwrap_err();
        assert!(errors.contains_key("password"));
        assert!(errors["password"].len() > 1);

        let good = json!({
            "name": "Jane Admin",
            "email": "jane@tradeport.example",
            "password": "StrongP@ssw0rd123",
            "role": "staff"
        });
        let data = validate(SchemaKind::User, &good).unwrap();
        assert_eq!(data["role"], "STAFF");
    }

    #[test]
    fn login_schema_skips_strength() {
        let payload = json!({ "email": "jane@tradeport.example", "password": "weak" });
        assert!(validate(SchemaKind::Login, &payload).is_ok());
        let empty = json!({ "email": "jane@tradeport.example", "password": "" });
        assert!(validate(SchemaKind::Login, &empty).is_err());
    }

    #[test]
    fn upload_metadata_sanitizes_file_name() {
        let payload = json!({
            "file_name": "../../../etc/passwd",
            "mime_type": "application/pdf",
            "size_bytes": 1024
        });
        let data = validate(SchemaKind::UploadMetadata, &payload).unwrap();
        let name = data["file_name"].as_str().unwrap();
        assert!(!name.contains('/'));
        assert!(!name.contains(".."));
    }

    #[test]
    fn company_settings_sanitizes_text() {
        let payload = json!({
            "company_name": "TradePort <script>x</script>Ltd",
            "contact_email": "INFO@TRADEPORT.EXAMPLE",
            "about": "Importers of <b>fine goods</b> since 1998"
        });
        let data = validate(SchemaKind::CompanySettings, &payload).unwrap();
        assert_eq!(data["company_name"], "TradePort Ltd");
        assert_eq!(data["contact_email"], "info@tradeport.example");
        assert_eq!(data["about"], "Importers of fine goods since 1998");
    }
}
