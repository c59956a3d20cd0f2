//! Password strength checking, shared by schema validation and the public
//! strength-meter endpoint that backs the signup form UI.

/// Result of a strength check. `strength` counts satisfied rules (0-5);
/// a password is only `valid` when every rule is satisfied.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PasswordStrength {
    pub valid: bool,
    pub errors: Vec<String>,
    pub strength: u8,
    pub strength_label: &'static str,
}

const LABELS: [&str; 5] = ["Very Weak", "Weak", "Fair", "Good", "Strong"];

const MIN_LENGTH: usize = 8;

/// Score a password against the five complexity rules: minimum length,
/// uppercase, lowercase, digit, special character.
pub fn check_strength(password: &str) -> PasswordStrength {
    let mut errors = Vec::new();
    let mut strength: u8 = 0;

    if password.chars().count() >= MIN_LENGTH {
        strength += 1;
    } else {
        errors.push(format!(
            "Password must be at least {} characters long",
            MIN_LENGTH
        ));
    }

    if password.chars().any(|c| c.is_uppercase()) {
        strength += 1;
    } else {
        errors.push("Password must contain at least one uppercase letter".to_string());
    }

    if password.chars().any(|c| c.is_lowercase()) {
        strength += 1;
    } else {
        errors.push("Password must contain at least one lowercase letter".to_string());
    }

    if password.chars().any(|c| c.is_ascii_digit()) {
        strength += 1;
    } else {
        errors.push("Password must contain at least one number".to_string());
    }

    if password.chars().any(|c| !c.is_alphanumeric()) {
        strength += 1;
    } else {
        errors.push("Password must contain at least one special character".to_string());
    }

    // 0 and 1 both map to the first label
    let label_index = strength.saturating_sub(1).min(4) as usize;

    PasswordStrength {
        valid: strength == 5,
        errors,
        strength,
        strength_label: LABELS[label_index],
    }
}
