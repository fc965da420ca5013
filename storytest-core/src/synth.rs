//! Test case synthesis: one `it(...)` statement per story.

use crate::ast::{Expression, Statement};
use crate::context::build_context;
use crate::error::Result;
use crate::prefixer::{apply_test_prefixer, TestPrefixer};
use serde::{Deserialize, Serialize};

/// Which kind of test a story gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestKind {
    /// The story has an interaction script.
    PlayTest,
    /// The story only needs to render.
    SmokeTest,
}

impl TestKind {
    pub fn for_play(play: Option<&str>) -> Self {
        if play.is_some() {
            TestKind::PlayTest
        } else {
            TestKind::SmokeTest
        }
    }

    /// Name of the generated test case.
    pub fn label(self) -> &'static str {
        match self {
            TestKind::PlayTest => "play-test",
            TestKind::SmokeTest => "smoke-test",
        }
    }
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Build the test case for one story of a titled module.
///
/// Without a prefixer the body is the play script, or `undefined`. With a
/// prefixer the body comes from the hook and the play script only decides
/// the label.
pub fn make_test_case(
    export_key: &str,
    title: &str,
    play: Option<&str>,
    prefixer: Option<&dyn TestPrefixer>,
) -> Result<Statement> {
    let kind = TestKind::for_play(play);
    let context = build_context(export_key, title)?;
    let body = match prefixer {
        Some(prefixer) => apply_test_prefixer(prefixer, &context, export_key)?,
        None => play.map_or(Expression::Undefined, Expression::raw),
    };

    tracing::trace!(story = export_key, id = %context.id, kind = %kind, "synthesized test case");

    Ok(Expression::call_global("it", vec![Expression::string(kind.label()), body]).into_statement())
}
