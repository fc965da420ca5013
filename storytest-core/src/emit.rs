//! Emission policy: how generated tests are spliced into the output module.

use crate::options::TransformOptions;
use serde::{Deserialize, Serialize};

/// Guard condition used when none is configured.
pub const DEFAULT_ENTRY_GUARD: &str = "!require.main";

/// The condition wrapping the appended suite.
///
/// The suite only registers when the module is loaded by the test runner,
/// not when it is the program entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryGuard {
    condition: String,
}

impl EntryGuard {
    pub fn new(condition: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
        }
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// `\nif (<condition>) {\n  <suite>\n}` with continuation lines indented.
    pub fn wrap(&self, rendered_suite: &str) -> String {
        let indented = rendered_suite.replace('\n', "\n  ");
        format!("\nif ({}) {{\n  {}\n}}", self.condition, indented)
    }
}

impl Default for EntryGuard {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRY_GUARD)
    }
}

/// What the output module consists of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionState {
    /// The retained (or cleared) body, no tests.
    OriginalOnly,
    /// The retained (or cleared) body followed by the guarded suite.
    AppendSuite,
    /// A placeholder suite only; the body is not retained.
    NoOpFallback,
}

impl EmissionState {
    pub fn decide(has_suite: bool, insert_test_if_empty: bool) -> Self {
        match (has_suite, insert_test_if_empty) {
            (true, _) => EmissionState::AppendSuite,
            (false, true) => EmissionState::NoOpFallback,
            (false, false) => EmissionState::OriginalOnly,
        }
    }
}

/// Placeholder suite for modules that produced no tests.
pub fn no_op_suite(title: Option<&str>) -> String {
    format!(
        "describe('{}', () => {{ it('no-op', () => {{}}) }});",
        title.unwrap_or("undefined")
    )
}

/// Assemble the output module text.
pub fn emit(
    source: &str,
    rendered_suite: Option<&str>,
    title: Option<&str>,
    options: &TransformOptions,
) -> (EmissionState, String) {
    let state = EmissionState::decide(rendered_suite.is_some(), options.insert_test_if_empty);
    let body = if options.clear_body {
        String::new()
    } else {
        format!("{source}\n")
    };

    let output = match (state, rendered_suite) {
        (EmissionState::AppendSuite, Some(suite)) => body + &options.entry_guard.wrap(suite),
        (EmissionState::NoOpFallback, _) => no_op_suite(title),
        _ => body,
    };
    (state, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_wraps_and_indents() {
        let wrapped = EntryGuard::default().wrap("describe(\"A\", () => {\n  x;\n});");
        assert_eq!(
            wrapped,
            "\nif (!require.main) {\n  describe(\"A\", () => {\n    x;\n  });\n}"
        );
        assert_eq!(
            EntryGuard::new("import.meta.vitest").wrap("a;"),
            "\nif (import.meta.vitest) {\n  a;\n}"
        );
    }

    #[test]
    fn test_decide() {
        assert_eq!(EmissionState::decide(true, true), EmissionState::AppendSuite);
        assert_eq!(EmissionState::decide(false, true), EmissionState::NoOpFallback);
        assert_eq!(EmissionState::decide(false, false), EmissionState::OriginalOnly);
    }

    #[test]
    fn test_no_op_suite() {
        assert_eq!(
            no_op_suite(None),
            "describe('undefined', () => { it('no-op', () => {}) });"
        );
        assert_eq!(
            no_op_suite(Some("Button")),
            "describe('Button', () => { it('no-op', () => {}) });"
        );
    }

    #[test]
    fn test_emit_states() {
        let options = TransformOptions::new();
        assert_eq!(
            emit("code();", None, Some("Button"), &options),
            (EmissionState::OriginalOnly, "code();\n".to_string())
        );
        assert_eq!(
            emit("code();", Some("suite;"), Some("Button"), &options),
            (
                EmissionState::AppendSuite,
                "code();\n\nif (!require.main) {\n  suite;\n}".to_string()
            )
        );

        let cleared = TransformOptions::new().with_clear_body(true);
        assert_eq!(emit("code();", None, None, &cleared).1, "");

        let fallback = TransformOptions::new().with_insert_test_if_empty(true);
        assert_eq!(
            emit("code();", None, Some("Button"), &fallback),
            (
                EmissionState::NoOpFallback,
                "describe('Button', () => { it('no-op', () => {}) });".to_string()
            )
        );
    }

    #[test]
    fn test_entry_guard_serializes_as_string() {
        let guard: EntryGuard = serde_json::from_str("\"!module.parent\"").unwrap();
        assert_eq!(guard.condition(), "!module.parent");
    }
}
