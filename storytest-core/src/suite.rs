//! Suite assembly: per-story `describe` blocks nested in a module-level one.

use crate::ast::{Expression, Statement};

/// A `describe` block under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    pub name: String,
    /// Runs before the body, e.g. a `beforeEach(...)` statement.
    pub setup: Option<Statement>,
    pub body: Vec<Statement>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            setup: None,
            body: Vec::new(),
        }
    }

    pub fn with_setup(mut self, setup: Statement) -> Self {
        self.setup = Some(setup);
        self
    }

    pub fn with_statement(mut self, statement: Statement) -> Self {
        self.body.push(statement);
        self
    }

    pub fn push(&mut self, statement: impl Into<Statement>) {
        self.body.push(statement.into());
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// `describe(<name>, () => { <setup> <body> });`
    pub fn into_statement(self) -> Statement {
        let statements = self.setup.into_iter().chain(self.body).collect();
        Expression::call_global(
            "describe",
            vec![Expression::string(self.name), Expression::arrow(statements)],
        )
        .into_statement()
    }
}

impl From<Suite> for Statement {
    fn from(suite: Suite) -> Self {
        suite.into_statement()
    }
}

/// Wrap one story's test case in a suite named after its export key.
pub fn story_suite(export_key: &str, test: Statement) -> Suite {
    Suite::new(export_key).with_statement(test)
}

/// Nest story suites under the module title.
///
/// No story suites means no module suite.
pub fn module_suite(title: &str, stories: Vec<Suite>, before_each: Option<Statement>) -> Option<Suite> {
    if stories.is_empty() {
        return None;
    }
    let mut suite = match before_each {
        Some(setup) => Suite::new(title).with_setup(setup),
        None => Suite::new(title),
    };
    for story in stories {
        suite.push(story);
    }
    Some(suite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Renderer;

    fn smoke_test() -> Statement {
        Expression::call_global("it", vec![Expression::string("smoke-test"), Expression::Undefined])
            .into_statement()
    }

    #[test]
    fn test_module_suite_nests_story_suites() {
        let stories = vec![
            story_suite("Primary", smoke_test()),
            story_suite("Secondary", smoke_test()),
        ];
        let suite = module_suite("Button", stories, None).unwrap();
        assert_eq!(
            Renderer::new().render(&suite.into_statement()).unwrap(),
            "describe(\"Button\", () => {\n  describe(\"Primary\", () => {\n    it(\"smoke-test\", undefined);\n  });\n  describe(\"Secondary\", () => {\n    it(\"smoke-test\", undefined);\n  });\n});"
        );
    }

    #[test]
    fn test_before_each_comes_first() {
        let before_each = Expression::call_global("beforeEach", vec![Expression::raw("setup")])
            .into_statement();
        let stories = vec![story_suite("Primary", smoke_test())];
        let suite = module_suite("Button", stories, Some(before_each.clone())).unwrap();
        assert_eq!(suite.setup.as_ref(), Some(&before_each));
        assert_eq!(suite.body.len(), 1);
        let statement = suite.into_statement();
        let Some(Expression::Call(call)) = statement.expression() else {
            panic!("expected a describe call");
        };
        let Expression::Arrow(arrow) = &call.arguments[1] else {
            panic!("expected an arrow body");
        };
        assert_eq!(arrow.body.statements.len(), 2);
        assert_eq!(arrow.body.statements[0], before_each);
    }

    #[test]
    fn test_no_stories_no_suite() {
        assert!(module_suite("Button", Vec::new(), None).is_none());
        assert!(Suite::new("Empty").is_empty());
    }
}
