//! Text-template prefixers, for hooks that come from configuration files.
//!
//! Templates are source text with `{{placeholder}}` slots:
//! - `{{id}}`, `{{title}}`, `{{name}}` expand to double-quoted string literals
//! - `{{storyExport}}` expands to the story's identifier, or `undefined`
//!
//! Before-each templates run once per module and cannot use placeholders.

use crate::ast::{Block, Expression, Fragment, Statement};
use crate::context::TestContext;
use crate::prefixer::{BeforeEachPrefixer, PrefixedTest, TestPrefixer};
use crate::render::quote_string;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use thiserror::Error;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{\{\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*\}\}")
        .expect("placeholder expression must compile");
}

const PLACEHOLDERS: &[&str] = &["id", "title", "name", "storyExport"];

/// Errors from compiling a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Template is empty")]
    Empty,

    #[error("Unknown template placeholder '{0}'")]
    UnknownPlaceholder(String),

    #[error("Placeholder '{0}' is not available in a before-each template")]
    PlaceholderWithoutContext(String),
}

/// A validated source template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
}

impl Template {
    pub fn parse(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        if source.trim().is_empty() {
            return Err(TemplateError::Empty);
        }
        for caps in PLACEHOLDER.captures_iter(&source) {
            if !PLACEHOLDERS.contains(&&caps[1]) {
                return Err(TemplateError::UnknownPlaceholder(caps[1].to_string()));
            }
        }
        Ok(Self { source })
    }

    /// Placeholder names used by this template, in order of appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        PLACEHOLDER
            .captures_iter(&self.source)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute the context's values into the template.
    pub fn expand(&self, context: &TestContext) -> String {
        PLACEHOLDER
            .replace_all(&self.source, |caps: &Captures| match &caps[1] {
                "id" => quote_string(&context.id),
                "title" => quote_string(&context.title),
                "name" => quote_string(&context.name),
                _ => context
                    .story_export
                    .as_ref()
                    .map_or_else(|| "undefined".to_string(), |id| id.to_string()),
            })
            .into_owned()
    }
}

/// Test prefixer built from a body template and an optional setup template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePrefixer {
    setup: Option<Template>,
    body: Template,
}

impl TemplatePrefixer {
    pub fn new(body: &str) -> Result<Self, TemplateError> {
        Ok(Self {
            setup: None,
            body: Template::parse(body)?,
        })
    }

    pub fn with_setup(mut self, setup: &str) -> Result<Self, TemplateError> {
        self.setup = Some(Template::parse(setup)?);
        Ok(self)
    }
}

impl TestPrefixer for TemplatePrefixer {
    fn prefix(&self, context: &TestContext) -> Fragment {
        let setup = match &self.setup {
            Some(template) => Statement::Raw(template.expand(context)),
            None => Statement::Block(Block::default()),
        };
        PrefixedTest::new(setup, Expression::Raw(self.body.expand(context))).into()
    }
}

/// Before-each prefixer built from a fixed expression template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateBeforeEach {
    expression: Template,
}

impl TemplateBeforeEach {
    pub fn new(expression: &str) -> Result<Self, TemplateError> {
        let expression = Template::parse(expression)?;
        if let Some(name) = expression.placeholders().first() {
            return Err(TemplateError::PlaceholderWithoutContext(name.to_string()));
        }
        Ok(Self { expression })
    }
}

impl BeforeEachPrefixer for TemplateBeforeEach {
    fn prefix(&self) -> Fragment {
        Expression::Raw(self.expression.source().to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::build_context;
    use crate::prefixer::{apply_test_prefixer, make_before_each};
    use crate::render::Renderer;

    #[test]
    fn test_template_expansion() {
        let template = Template::parse("visit({{ id }}, {{title}}, {{name}}, {{storyExport}})").unwrap();
        assert_eq!(template.placeholders(), vec!["id", "title", "name", "storyExport"]);

        let context = build_context("Primary", "Example/Button").unwrap();
        assert_eq!(
            template.expand(&context),
            "visit(\"example-button--primary\", \"Example/Button\", \"Primary\", Primary)"
        );

        let context = build_context("default-story", "Example/Button").unwrap();
        assert!(template.expand(&context).ends_with(", undefined)"));
    }

    #[test]
    fn test_template_errors() {
        assert_eq!(Template::parse("  ").unwrap_err(), TemplateError::Empty);
        assert_eq!(
            Template::parse("run({{storyId}})").unwrap_err(),
            TemplateError::UnknownPlaceholder("storyId".to_string())
        );
        assert_eq!(
            TemplateBeforeEach::new("setup({{id}})").unwrap_err(),
            TemplateError::PlaceholderWithoutContext("id".to_string())
        );
    }

    #[test]
    fn test_template_prefixer_yields_body() {
        let prefixer = TemplatePrefixer::new("async () => { await page.goto({{id}}); }")
            .unwrap()
            .with_setup("console.log({{name}});")
            .unwrap();
        let context = build_context("Primary", "Button").unwrap();

        let statements = prefixer.prefix(&context).into_statements();
        assert_eq!(statements[0], Statement::raw("console.log(\"Primary\");"));

        let body = apply_test_prefixer(&prefixer, &context, "Primary").unwrap();
        assert_eq!(
            Renderer::new().render_expression(&body).unwrap(),
            "async () => { await page.goto(\"button--primary\"); }"
        );
    }

    #[test]
    fn test_template_before_each() {
        let prefixer = TemplateBeforeEach::new("async () => { await reset(); }").unwrap();
        let statement = make_before_each(&prefixer).unwrap();
        assert_eq!(
            Renderer::new().render(&statement).unwrap(),
            "beforeEach(async () => { await reset(); });"
        );
    }
}
