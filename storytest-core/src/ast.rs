//! Fragment AST for generated test modules.
//!
//! A deliberately small, closed tree covering what synthesized suites need:
//! - Expressions: identifiers, string literals, `undefined`, calls, arrow
//!   functions, and raw source text carried over from the story module
//! - Statements: expression statements, blocks, and raw source text
//!
//! Identifiers are validated when constructed, so a rendered tree never
//! contains a name the target language would reject.

use thiserror::Error;

/// Errors from building fragments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FragmentError {
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),
}

const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Check whether `name` is usable as a plain identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first == '$' || first == '_' || first.is_alphabetic()) {
        return false;
    }
    if !chars.all(|c| c == '$' || c == '_' || c.is_alphanumeric()) {
        return false;
    }
    !RESERVED_WORDS.contains(&name)
}

/// A validated identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Validate and wrap an identifier name.
    pub fn new(name: impl Into<String>) -> Result<Self, FragmentError> {
        let name = name.into();
        if is_identifier(&name) {
            Ok(Self(name))
        } else {
            Err(FragmentError::InvalidIdentifier(name))
        }
    }

    /// Identifiers of the test runner's globals, known to be valid.
    pub(crate) fn runner_global(name: &'static str) -> Self {
        debug_assert!(is_identifier(name));
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A call expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
}

/// A parameterless arrow function with a block body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrow {
    pub is_async: bool,
    pub body: Block,
}

/// A braced statement list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Identifier(Identifier),
    StringLiteral(String),
    Undefined,
    Call(Call),
    Arrow(Arrow),
    /// Source text of an expression, emitted as is (reindented).
    Raw(String),
}

impl Expression {
    /// Reference a variable by name.
    pub fn ident(name: impl Into<String>) -> Result<Self, FragmentError> {
        Ok(Self::Identifier(Identifier::new(name)?))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::StringLiteral(value.into())
    }

    pub fn raw(source: impl Into<String>) -> Self {
        Self::Raw(source.into())
    }

    pub fn call(callee: Expression, arguments: Vec<Expression>) -> Self {
        Self::Call(Call {
            callee: Box::new(callee),
            arguments,
        })
    }

    /// `() => { ... }`
    pub fn arrow(statements: Vec<Statement>) -> Self {
        Self::Arrow(Arrow {
            is_async: false,
            body: Block::new(statements),
        })
    }

    /// `async () => { ... }`
    pub fn async_arrow(statements: Vec<Statement>) -> Self {
        Self::Arrow(Arrow {
            is_async: true,
            body: Block::new(statements),
        })
    }

    /// Call one of the test runner's globals (`describe`, `it`, ...).
    pub(crate) fn call_global(name: &'static str, arguments: Vec<Expression>) -> Self {
        Self::call(Self::Identifier(Identifier::runner_global(name)), arguments)
    }

    /// Wrap in an expression statement.
    pub fn into_statement(self) -> Statement {
        Statement::Expression(self)
    }
}

impl From<Identifier> for Expression {
    fn from(identifier: Identifier) -> Self {
        Self::Identifier(identifier)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// An expression statement.
    Expression(Expression),
    Block(Block),
    /// Source text of one or more statements, emitted as is (reindented).
    Raw(String),
}

impl Statement {
    pub fn raw(source: impl Into<String>) -> Self {
        Self::Raw(source.into())
    }

    /// The expression of an expression statement.
    pub fn expression(&self) -> Option<&Expression> {
        match self {
            Statement::Expression(expression) => Some(expression),
            _ => None,
        }
    }

    /// Take the expression out of an expression statement.
    pub fn into_expression(self) -> Option<Expression> {
        match self {
            Statement::Expression(expression) => Some(expression),
            _ => None,
        }
    }
}

impl From<Expression> for Statement {
    fn from(expression: Expression) -> Self {
        Statement::Expression(expression)
    }
}

/// What a prefixer hook hands back: one statement or several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Single(Statement),
    Many(Vec<Statement>),
}

impl Fragment {
    /// Normalize into a statement sequence.
    pub fn into_statements(self) -> Vec<Statement> {
        match self {
            Fragment::Single(statement) => vec![statement],
            Fragment::Many(statements) => statements,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Fragment::Single(_) => 1,
            Fragment::Many(statements) => statements.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Statement> for Fragment {
    fn from(statement: Statement) -> Self {
        Fragment::Single(statement)
    }
}

impl From<Expression> for Fragment {
    fn from(expression: Expression) -> Self {
        Fragment::Single(Statement::Expression(expression))
    }
}

impl From<Vec<Statement>> for Fragment {
    fn from(statements: Vec<Statement>) -> Self {
        Fragment::Many(statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validation() {
        assert!(Identifier::new("Primary").is_ok());
        assert!(Identifier::new("_private$").is_ok());
        assert!(Identifier::new("Ünïcode").is_ok());
        assert_eq!(
            Identifier::new("1st").unwrap_err(),
            FragmentError::InvalidIdentifier("1st".to_string())
        );
        assert!(Identifier::new("with-dash").is_err());
        assert!(Identifier::new("").is_err());
        assert!(Identifier::new("default").is_err());
    }

    #[test]
    fn test_fragment_normalization() {
        let single = Fragment::from(Expression::Undefined);
        assert_eq!(single.len(), 1);
        assert_eq!(
            single.into_statements(),
            vec![Statement::Expression(Expression::Undefined)]
        );

        let many = Fragment::from(vec![Statement::raw("setup();"), Expression::string("x").into()]);
        let statements = many.into_statements();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1].expression(), Some(&Expression::string("x")));

        assert!(Fragment::Many(Vec::new()).is_empty());
    }

    #[test]
    fn test_statement_expression_accessors() {
        assert!(Statement::raw("a();").expression().is_none());
        assert!(Statement::Block(Block::default()).into_expression().is_none());
        assert_eq!(
            Expression::raw("run").into_statement().into_expression(),
            Some(Expression::raw("run"))
        );
    }
}
