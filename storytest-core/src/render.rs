//! Source rendering for fragment trees.
//!
//! Output follows a fixed house style: double-quoted strings, two-space
//! indentation, one statement per line, `() => {` arrow bodies. Raw fragments
//! keep their own line structure; continuation lines are reindented to the
//! surrounding depth, except lines inside multi-line string or template
//! literals, which are left untouched.

use crate::ast::{Arrow, Block, Call, Expression, Statement};
use csf::lexer::{self, Token, TokenKind};
use thiserror::Error;

const INDENT: &str = "  ";

/// Errors from rendering a fragment tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Raw fragment is empty")]
    EmptyRawFragment,

    #[error("Raw fragment is malformed: {0}")]
    MalformedRawFragment(String),

    #[error("Raw fragment has unbalanced '{delimiter}' at line {line}")]
    UnbalancedRawFragment { delimiter: char, line: usize },
}

/// Renders statements to source text.
#[derive(Debug, Default, Clone, Copy)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Render one top-level statement.
    pub fn render(&self, statement: &Statement) -> Result<String, RenderError> {
        let mut out = String::new();
        self.write_statement(&mut out, statement, 0)?;
        Ok(out)
    }

    /// Render a lone expression, as it would appear at the top level.
    pub fn render_expression(&self, expression: &Expression) -> Result<String, RenderError> {
        let mut out = String::new();
        self.write_expression(&mut out, expression, 0)?;
        Ok(out)
    }

    fn write_statement(
        &self,
        out: &mut String,
        statement: &Statement,
        level: usize,
    ) -> Result<(), RenderError> {
        match statement {
            Statement::Expression(expression) => {
                self.write_expression(out, expression, level)?;
                out.push(';');
            }
            Statement::Block(block) => self.write_block(out, block, level)?,
            Statement::Raw(source) => write_raw(out, source, level)?,
        }
        Ok(())
    }

    fn write_block(&self, out: &mut String, block: &Block, level: usize) -> Result<(), RenderError> {
        if block.statements.is_empty() {
            out.push_str("{}");
            return Ok(());
        }
        out.push_str("{\n");
        for statement in &block.statements {
            push_indent(out, level + 1);
            self.write_statement(out, statement, level + 1)?;
            out.push('\n');
        }
        push_indent(out, level);
        out.push('}');
        Ok(())
    }

    fn write_expression(
        &self,
        out: &mut String,
        expression: &Expression,
        level: usize,
    ) -> Result<(), RenderError> {
        match expression {
            Expression::Identifier(identifier) => out.push_str(identifier.as_str()),
            Expression::StringLiteral(value) => out.push_str(&quote_string(value)),
            Expression::Undefined => out.push_str("undefined"),
            Expression::Call(call) => self.write_call(out, call, level)?,
            Expression::Arrow(arrow) => self.write_arrow(out, arrow, level)?,
            Expression::Raw(source) => write_raw(out, source, level)?,
        }
        Ok(())
    }

    fn write_call(&self, out: &mut String, call: &Call, level: usize) -> Result<(), RenderError> {
        let parenthesize = matches!(*call.callee, Expression::Arrow(_));
        if parenthesize {
            out.push('(');
        }
        self.write_expression(out, &call.callee, level)?;
        if parenthesize {
            out.push(')');
        }
        out.push('(');
        for (index, argument) in call.arguments.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            self.write_expression(out, argument, level)?;
        }
        out.push(')');
        Ok(())
    }

    fn write_arrow(&self, out: &mut String, arrow: &Arrow, level: usize) -> Result<(), RenderError> {
        if arrow.is_async {
            out.push_str("async ");
        }
        out.push_str("() => ");
        self.write_block(out, &arrow.body, level)
    }
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

/// Quote a string as a double-quoted literal.
pub fn quote_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\u{8}' => quoted.push_str("\\b"),
            '\u{b}' => quoted.push_str("\\v"),
            '\u{c}' => quoted.push_str("\\f"),
            '\0' => quoted.push_str("\\0"),
            '\u{2028}' => quoted.push_str("\\u2028"),
            '\u{2029}' => quoted.push_str("\\u2029"),
            c if (c as u32) < 0x20 => quoted.push_str(&format!("\\x{:02X}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn write_raw(out: &mut String, source: &str, level: usize) -> Result<(), RenderError> {
    let source = source.trim();
    if source.is_empty() {
        return Err(RenderError::EmptyRawFragment);
    }
    let tokens =
        lexer::tokenize(source).map_err(|e| RenderError::MalformedRawFragment(e.to_string()))?;
    check_balance(source, &tokens)?;

    let mut lines = Vec::new();
    let mut line_start = 0;
    for (index, _) in source.match_indices('\n') {
        lines.push((line_start, &source[line_start..index]));
        line_start = index + 1;
    }
    lines.push((line_start, &source[line_start..]));

    // Continuation lines that begin inside a literal are verbatim content.
    let inside_literal = |offset: usize| {
        tokens
            .iter()
            .any(|t| t.start < offset && offset < t.end)
    };

    let common = lines
        .iter()
        .skip(1)
        .filter(|(start, line)| !line.trim().is_empty() && !inside_literal(*start))
        .map(|(_, line)| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    for (index, (start, line)) in lines.iter().enumerate() {
        if index == 0 {
            out.push_str(line);
            continue;
        }
        out.push('\n');
        if inside_literal(*start) {
            out.push_str(line);
        } else if !line.trim().is_empty() {
            push_indent(out, level);
            out.push_str(line[common..].trim_end());
        }
    }
    Ok(())
}

fn check_balance(source: &str, tokens: &[Token]) -> Result<(), RenderError> {
    let mut open: Vec<(char, usize)> = Vec::new();
    for token in tokens.iter().filter(|t| t.kind == TokenKind::Punct) {
        let delimiter = match token.text(source) {
            "(" => '(',
            "[" => '[',
            "{" => '{',
            ")" => ')',
            "]" => ']',
            "}" => '}',
            _ => continue,
        };
        let expected = match delimiter {
            ')' => '(',
            ']' => '[',
            '}' => '{',
            opener => {
                open.push((opener, token.start));
                continue;
            }
        };
        match open.pop() {
            Some((opener, _)) if opener == expected => {}
            _ => {
                return Err(RenderError::UnbalancedRawFragment {
                    delimiter,
                    line: lexer::line_at(source, token.start),
                })
            }
        }
    }
    match open.pop() {
        Some((opener, offset)) => Err(RenderError::UnbalancedRawFragment {
            delimiter: opener,
            line: lexer::line_at(source, offset),
        }),
        None => Ok(()),
    }
}
