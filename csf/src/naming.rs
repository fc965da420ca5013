//! Story naming conventions.
//!
//! Derives the human-readable name of a story from its export key, and the
//! stable story id from a (title, name) pair. Both are pure functions; test
//! tooling correlates generated tests back to stories through the id.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use thiserror::Error;

/// Error type for story id derivation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("Invalid {part} '{value}', must include alphanumeric characters")]
    Invalid { part: &'static str, value: String },
}

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[_\-.]").expect("separator expression must compile");
    static ref CAPITALIZED_WORD: Regex =
        Regex::new(r"([^\n])([A-Z])([a-z])").expect("capitalized word expression must compile");
    static ref LOWER_UPPER: Regex =
        Regex::new(r"([a-z])([A-Z])").expect("case boundary expression must compile");
    static ref LETTER_DIGIT: Regex =
        Regex::new(r"(?i)([a-z])([0-9])").expect("letter digit expression must compile");
    static ref DIGIT_LETTER: Regex =
        Regex::new(r"(?i)([0-9])([a-z])").expect("digit letter expression must compile");
    static ref WORD_START: Regex =
        Regex::new(r"(\s|^)([A-Za-z0-9_])").expect("word start expression must compile");
    static ref SPACES: Regex = Regex::new(r" +").expect("space run expression must compile");
    static ref UNSAFE_ID_CHARS: Regex =
        Regex::new(r#"[ ’–—―′¿'`~!@#$%^&*()_|+\-=?;:",.<>{}\[\]\\/]"#)
            .expect("id character expression must compile");
    static ref DASH_RUNS: Regex = Regex::new(r"-+").expect("dash run expression must compile");
}

/// Start-case an export key: `primaryButton` becomes `Primary Button`.
pub fn story_name_from_export(key: &str) -> String {
    let name = SEPARATORS.replace_all(key, " ");
    let name = CAPITALIZED_WORD.replace_all(&name, "$1 $2$3");
    let name = LOWER_UPPER.replace_all(&name, "$1 $2");
    let name = LETTER_DIGIT.replace_all(&name, "$1 $2");
    let name = DIGIT_LETTER.replace_all(&name, "$1 $2");
    let name = WORD_START.replace_all(&name, |caps: &Captures| {
        format!("{}{}", &caps[1], caps[2].to_uppercase())
    });
    let name = SPACES.replace_all(&name, " ");
    name.trim().to_string()
}

/// Lowercase and replace punctuation with single dashes.
pub fn sanitize(value: &str) -> String {
    let lowered = value.to_lowercase();
    let dashed = UNSAFE_ID_CHARS.replace_all(&lowered, "-");
    let collapsed = DASH_RUNS.replace_all(&dashed, "-");
    collapsed.trim_matches('-').to_string()
}

fn sanitize_safe(value: &str, part: &'static str) -> Result<String, NamingError> {
    let sanitized = sanitize(value);
    if sanitized.is_empty() {
        return Err(NamingError::Invalid {
            part,
            value: value.to_string(),
        });
    }
    Ok(sanitized)
}

/// Stable story id, e.g. `example-button--primary`.
///
/// An empty `name` yields the id of the title alone.
pub fn to_id(title: &str, name: &str) -> Result<String, NamingError> {
    let kind = sanitize_safe(title, "kind")?;
    if name.is_empty() {
        return Ok(kind);
    }
    Ok(format!("{kind}--{}", sanitize_safe(name, "name")?))
}
