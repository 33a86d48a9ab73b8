//! Error types for each stage of the pipeline.
//!
//! Every error is fatal for the session that raised it: lexing, parsing and
//! evaluation stop at the first failure and hand the error to the caller.

use thiserror::Error;

use crate::lexer::Position;
use crate::token::TokenKind;

/// The current character matches no token rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("{position}: invalid character '{ch}'")]
    InvalidCharacter { ch: char, position: Position },
    #[error("{position}: numeric literal '{literal}' is out of range")]
    LiteralOutOfRange { literal: String, position: Position },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Raised by `eat` when the lookahead is not the expected kind.
    #[error("{position}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        position: Position,
    },
    /// No alternative of `rule` starts with the lookahead token.
    #[error("{position}: unexpected {found} in {rule}")]
    InvalidSyntax {
        rule: &'static str,
        found: TokenKind,
        position: Position,
    },
    /// Parentheses, signs, blocks or operator chains nest past `limit`.
    #[error("{position}: program nests deeper than {limit} levels")]
    NestingTooDeep { limit: usize, position: Position },
    #[error(transparent)]
    Lex(#[from] LexError),
}

impl ParseError {
    /// The `(expected, found)` pair of an `eat` mismatch.
    pub fn mismatch(&self) -> Option<(TokenKind, TokenKind)> {
        match self {
            ParseError::UnexpectedToken {
                expected, found, ..
            } => Some((*expected, *found)),
            _ => None,
        }
    }
}

/// Family a [`RuntimeError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    /// Reference to a variable with no binding.
    Name,
    /// Division by zero, overflow or an operand of the wrong numeric kind.
    Arithmetic,
    /// A tree shape the parser never produces.
    Internal,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in {operator}")]
    Overflow { operator: &'static str },
    #[error("{operator} requires integer operands")]
    NonIntegerOperand { operator: &'static str },
    #[error("{node} node does not produce a value")]
    MissingValue { node: &'static str },
}

impl RuntimeError {
    pub fn kind(&self) -> RuntimeErrorKind {
        match self {
            RuntimeError::UndefinedVariable { .. } => RuntimeErrorKind::Name,
            RuntimeError::DivisionByZero
            | RuntimeError::Overflow { .. }
            | RuntimeError::NonIntegerOperand { .. } => RuntimeErrorKind::Arithmetic,
            RuntimeError::MissingValue { .. } => RuntimeErrorKind::Internal,
        }
    }
}

/// Any failure of [`crate::execute`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_error_kinds() {
        let name = RuntimeError::UndefinedVariable {
            name: "y".to_string(),
        };
        assert_eq!(name.kind(), RuntimeErrorKind::Name);
        assert_eq!(RuntimeError::DivisionByZero.kind(), RuntimeErrorKind::Arithmetic);
        assert_eq!(
            RuntimeError::NonIntegerOperand { operator: "DIV" }.kind(),
            RuntimeErrorKind::Arithmetic
        );
    }

    #[test]
    fn test_parse_error_message_names_kinds() {
        let err = ParseError::UnexpectedToken {
            expected: TokenKind::Semi,
            found: TokenKind::Var,
            position: Position { line: 1, column: 11 },
        };
        assert_eq!(err.to_string(), "line 1, column 11: expected SEMI_COLON, found VAR");
        assert_eq!(err.mismatch(), Some((TokenKind::Semi, TokenKind::Var)));
    }

    #[test]
    fn test_nesting_error_names_limit() {
        let err = ParseError::NestingTooDeep {
            limit: 256,
            position: Position { line: 1, column: 300 },
        };
        assert_eq!(err.to_string(), "line 1, column 300: program nests deeper than 256 levels");
        assert_eq!(err.mismatch(), None);
    }

    #[test]
    fn test_lex_error_through_parse_error_is_transparent() {
        let lex = LexError::InvalidCharacter {
            ch: '@',
            position: Position { line: 2, column: 3 },
        };
        let err = ParseError::from(lex.clone());
        assert_eq!(err.to_string(), lex.to_string());
        assert_eq!(err.mismatch(), None);
    }
}
