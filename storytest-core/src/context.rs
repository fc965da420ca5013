//! Per-story test context handed to prefixer hooks.

use crate::ast::{Expression, Identifier};
use crate::error::Result;
use csf::{story_name_from_export, to_id};

/// Everything a hook may need to know about the story under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestContext {
    /// Reference to the story export, when its key is a plain identifier.
    pub story_export: Option<Identifier>,
    /// Display name derived from the export key.
    pub name: String,
    /// Group title of the module.
    pub title: String,
    /// Stable id of the story, derived from title and name.
    pub id: String,
}

impl TestContext {
    pub fn id_literal(&self) -> Expression {
        Expression::string(&self.id)
    }

    pub fn title_literal(&self) -> Expression {
        Expression::string(&self.title)
    }

    pub fn name_literal(&self) -> Expression {
        Expression::string(&self.name)
    }

    /// The story export as an identifier, or `undefined`.
    pub fn story_export_expression(&self) -> Expression {
        match &self.story_export {
            Some(identifier) => Expression::Identifier(identifier.clone()),
            None => Expression::Undefined,
        }
    }
}

/// Build the context for one story of a titled module.
pub fn build_context(export_key: &str, title: &str) -> Result<TestContext> {
    let name = story_name_from_export(export_key);
    let id = to_id(title, &name)?;
    Ok(TestContext {
        story_export: Identifier::new(export_key).ok(),
        name,
        title: title.to_string(),
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;

    #[test]
    fn test_build_context() {
        let context = build_context("primaryButton", "Example/Button").unwrap();
        assert_eq!(context.name, "Primary Button");
        assert_eq!(context.title, "Example/Button");
        assert_eq!(context.id, "example-button--primary-button");
        assert_eq!(
            context.story_export_expression(),
            Expression::ident("primaryButton").unwrap()
        );
        assert_eq!(context.id_literal(), Expression::string("example-button--primary-button"));
        assert_eq!(context.title_literal(), Expression::string("Example/Button"));
        assert_eq!(context.name_literal(), Expression::string("Primary Button"));
    }

    #[test]
    fn test_build_context_is_deterministic() {
        assert_eq!(
            build_context("Primary", "Button").unwrap(),
            build_context("Primary", "Button").unwrap()
        );
    }

    #[test]
    fn test_build_context_rejects_unnamed_title() {
        assert!(matches!(
            build_context("Primary", "???"),
            Err(TransformError::Naming(_))
        ));
    }
}
