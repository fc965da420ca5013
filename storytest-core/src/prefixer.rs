//! Prefixer hooks.
//!
//! Hooks let the caller replace what each generated test does:
//! - A test prefixer receives the story's [`TestContext`] and returns a
//!   fragment of at least two statements. The expression of the second one
//!   becomes the test body; the first is scaffolding and is dropped.
//! - A before-each prefixer returns exactly one expression statement, which
//!   becomes the argument of the module's `beforeEach(...)`.
//!
//! Plain closures implement both traits. [`PrefixedTest`] builds a conforming
//! test prefixer result without counting statements by hand.

use crate::ast::{Expression, Fragment, Statement};
use crate::context::TestContext;
use crate::error::{Result, TransformError};

pub const TEST_PREFIXER: &str = "testPrefixer";
pub const BEFORE_EACH_PREFIXER: &str = "beforeEachPrefixer";

/// Produces the body of each generated test.
pub trait TestPrefixer: Send + Sync {
    fn prefix(&self, context: &TestContext) -> Fragment;
}

impl<F> TestPrefixer for F
where
    F: Fn(&TestContext) -> Fragment + Send + Sync,
{
    fn prefix(&self, context: &TestContext) -> Fragment {
        self(context)
    }
}

/// Produces the argument of the shared `beforeEach(...)` hook.
pub trait BeforeEachPrefixer: Send + Sync {
    fn prefix(&self) -> Fragment;
}

impl<F> BeforeEachPrefixer for F
where
    F: Fn() -> Fragment + Send + Sync,
{
    fn prefix(&self) -> Fragment {
        self()
    }
}

/// A two-slot test prefixer result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixedTest {
    /// Leading statement, discarded by the synthesizer.
    pub setup: Statement,
    /// The test body.
    pub value: Expression,
}

impl PrefixedTest {
    pub fn new(setup: Statement, value: Expression) -> Self {
        Self { setup, value }
    }

    /// A result whose only meaningful part is the body.
    pub fn value(value: Expression) -> Self {
        Self {
            setup: Statement::Block(Default::default()),
            value,
        }
    }
}

impl From<PrefixedTest> for Fragment {
    fn from(test: PrefixedTest) -> Self {
        Fragment::Many(vec![test.setup, Statement::Expression(test.value)])
    }
}

/// Run the test prefixer for one story and pick out the test body.
pub fn apply_test_prefixer(
    prefixer: &dyn TestPrefixer,
    context: &TestContext,
    export_key: &str,
) -> Result<Expression> {
    let malformed = |reason: String| TransformError::MalformedPrefixerResult {
        hook: TEST_PREFIXER,
        story: Some(export_key.to_string()),
        reason,
    };

    let statements = prefixer.prefix(context).into_statements();
    let count = statements.len();
    let Some(second) = statements.into_iter().nth(1) else {
        return Err(malformed(format!(
            "expected at least 2 statements, got {count}"
        )));
    };
    second
        .into_expression()
        .ok_or_else(|| malformed("statement 2 is not an expression statement".to_string()))
}

/// Build the `beforeEach(...)` statement from the hook.
pub fn make_before_each(prefixer: &dyn BeforeEachPrefixer) -> Result<Statement> {
    let malformed = |reason: String| TransformError::MalformedPrefixerResult {
        hook: BEFORE_EACH_PREFIXER,
        story: None,
        reason,
    };

    let mut statements = prefixer.prefix().into_statements();
    if statements.len() != 1 {
        return Err(malformed(format!(
            "expected 1 statement, got {}",
            statements.len()
        )));
    }
    let expression = statements
        .pop()
        .and_then(Statement::into_expression)
        .ok_or_else(|| malformed("statement 1 is not an expression statement".to_string()))?;

    Ok(Expression::call_global("beforeEach", vec![expression]).into_statement())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::build_context;
    use crate::render::Renderer;

    fn context() -> TestContext {
        build_context("Primary", "Example/Button").unwrap()
    }

    #[test]
    fn test_closure_prefixer_receives_context() {
        let prefixer = |ctx: &TestContext| -> Fragment {
            PrefixedTest::new(
                Statement::raw("console.log('setup');"),
                Expression::call(Expression::raw("visit"), vec![ctx.id_literal()]),
            )
            .into()
        };

        let body = apply_test_prefixer(&prefixer, &context(), "Primary").unwrap();
        assert_eq!(
            Renderer::new().render_expression(&body).unwrap(),
            "visit(\"example-button--primary\")"
        );
    }

    #[test]
    fn test_only_second_statement_is_used() {
        let prefixer = |_: &TestContext| -> Fragment {
            Fragment::Many(vec![
                Statement::raw("first();"),
                Expression::raw("second").into_statement(),
                Expression::raw("third").into_statement(),
            ])
        };
        assert_eq!(
            apply_test_prefixer(&prefixer, &context(), "Primary").unwrap(),
            Expression::raw("second")
        );
    }

    #[test]
    fn test_short_prefixer_result_fails() {
        let prefixer = |_: &TestContext| -> Fragment { Expression::Undefined.into() };
        let error = apply_test_prefixer(&prefixer, &context(), "Primary").unwrap_err();
        assert_eq!(
            error,
            TransformError::MalformedPrefixerResult {
                hook: TEST_PREFIXER,
                story: Some("Primary".to_string()),
                reason: "expected at least 2 statements, got 1".to_string(),
            }
        );
    }

    #[test]
    fn test_second_statement_must_be_expression() {
        let prefixer = |_: &TestContext| -> Fragment {
            Fragment::Many(vec![Statement::raw("a();"), Statement::raw("b();")])
        };
        assert!(matches!(
            apply_test_prefixer(&prefixer, &context(), "Primary"),
            Err(TransformError::MalformedPrefixerResult { .. })
        ));
    }

    #[test]
    fn test_make_before_each() {
        let prefixer = || -> Fragment { Expression::raw("async () => { await setup(); }").into() };
        let statement = make_before_each(&prefixer).unwrap();
        assert_eq!(
            Renderer::new().render(&statement).unwrap(),
            "beforeEach(async () => { await setup(); });"
        );
    }

    #[test]
    fn test_before_each_requires_single_expression() {
        let empty = || -> Fragment { Fragment::Many(Vec::new()) };
        assert_eq!(
            make_before_each(&empty).unwrap_err(),
            TransformError::MalformedPrefixerResult {
                hook: BEFORE_EACH_PREFIXER,
                story: None,
                reason: "expected 1 statement, got 0".to_string(),
            }
        );

        let block = || -> Fragment { Statement::Block(Default::default()).into() };
        assert!(make_before_each(&block).is_err());
    }
}
