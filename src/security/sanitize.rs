/*!
 * # Input Sanitization
 *
 * Pure, idempotent transforms for untrusted strings and JSON documents.
 * Values can pass through the pipeline more than once (an admin edit is
 * re-validated, for example), so every function here must satisfy
 * `f(f(x)) == f(x)`. Stripping passes can uncover new dangerous patterns
 * (`java{script:}` becomes `javascript:` once braces are removed), so each
 * transform iterates its pass to a fixed point rather than trusting a
 * single sweep.
 */

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref SCRIPT_BLOCK: Regex = Regex::new(r"(?is)<script[^>]*>.*?</script\s*>").unwrap();
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref JS_PROTOCOL: Regex = Regex::new(r"(?i)javascript:").unwrap();
    static ref EVENT_HANDLER: Regex = Regex::new(r"(?i)\bon\w+\s*=").unwrap();
    static ref ALLOWED_TAG: Regex =
        Regex::new(r"(?i)^</?(b|i|em|strong|p|ul|ol|li|br)\s*/?>$").unwrap();
    static ref UNDERSCORE_RUN: Regex = Regex::new(r"_{2,}").unwrap();
    static ref DOT_RUN: Regex = Regex::new(r"\.{2,}").unwrap();
}

/// Iterate a stripping pass until it converges. Passes only ever remove
/// text, so every non-converged round strictly shrinks the string and the
/// loop terminates after at most `input.len()` rounds.
fn fixed_point(input: &str, pass: impl Fn(&str) -> String) -> String {
    let mut current = input.to_string();
    loop {
        let next = pass(&current);
        if next == current {
            return current;
        }
        debug_assert!(next.len() < current.len(), "pass must shrink the string");
        current = next;
    }
}

/// Strip script blocks (with their content), remaining HTML tags,
/// `javascript:` protocol occurrences, inline event handler patterns and
/// residual angle/curly braces from free text.
pub fn text(input: &str) -> String {
    let stripped = fixed_point(input, |s| {
        let s = SCRIPT_BLOCK.replace_all(s, "");
        let s = HTML_TAG.replace_all(&s, "");
        let s = JS_PROTOCOL.replace_all(&s, "");
        let s = EVENT_HANDLER.replace_all(&s, "");
        s.chars()
            .filter(|c| !matches!(c, '<' | '>' | '{' | '}'))
            .collect()
    });
    stripped.trim().to_string()
}

/// Strip markup down to a small whitelist of attribute-free inline formatting
/// tags. Script blocks, event handlers and `javascript:` URLs never survive.
pub fn html(input: &str) -> String {
    let stripped = fixed_point(input, |s| {
        let s = SCRIPT_BLOCK.replace_all(s, "");
        let s = HTML_TAG.replace_all(&s, |caps: &regex::Captures<'_>| {
            let tag = &caps[0];
            if ALLOWED_TAG.is_match(tag) {
                tag.to_string()
            } else {
                String::new()
            }
        });
        let s = JS_PROTOCOL.replace_all(&s, "");
        EVENT_HANDLER.replace_all(&s, "").into_owned()
    });
    stripped.trim().to_string()
}

/// Normalize an email address: trim, lowercase, and drop anything outside
/// the `[\w@.-]` class.
pub fn email(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '-' | '_'))
        .collect()
}

/// Normalize a filename for safe storage: anything outside `[A-Za-z0-9.-]`
/// becomes `_`, runs of dots and underscores collapse, edge underscores are
/// trimmed, and the result is capped at 255 characters. Replacing `/` and
/// collapsing `..` neutralizes path traversal.
pub fn filename(input: &str) -> String {
    let replaced: String = input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let collapsed = DOT_RUN.replace_all(&replaced, ".");
    let collapsed = UNDERSCORE_RUN.replace_all(&collapsed, "_");
    let capped: String = collapsed.chars().take(255).collect();
    capped.trim_matches('_').to_string()
}

/// Recursively sanitize every string in a JSON document with [`text`].
/// Objects and arrays are walked; numbers, booleans and nulls pass through.
pub fn sanitize_json(value: &mut Value) {
    match value {
        Value::String(s) => {
            *s = text(s);
        }
        Value::Object(map) => {
            for (_, v) in map.iter_mut() {
                sanitize_json(v);
            }
        }
        Value::Array(arr) => {
            for v in arr.iter_mut() {
                sanitize_json(v);
            }
        }
        _ => {}
    }
}
