// ABOUTME: Error types for tokenizing, parsing, and evaluation failures

use crate::tokenizer::Position;
use crate::value::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum EvalError {
    /// Malformed lexeme in the tokenizer
    #[error("token error at {position}: {message}")]
    Token { message: String, position: Position },

    /// Structural error while folding tokens into expressions
    #[error("parse error at {position}: {message}")]
    Parse { message: String, position: Position },

    /// Name lookup failed in every enclosing environment frame
    #[error("undefined symbol: {name}")]
    UnboundSymbol {
        name: String,
        position: Option<Position>,
    },

    /// Wrong value variant, including calling a non-callable
    #[error("type error: {message}")]
    Type {
        message: String,
        position: Option<Position>,
    },

    /// Argument count mismatch, raised before the handler runs for
    /// fixed-arity builtins
    #[error("{name}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    Arity {
        name: String,
        expected: String,
        actual: usize,
    },

    /// Well-typed but semantically invalid argument
    #[error("{name}: {message}")]
    Argument { name: String, message: String },

    #[error("division by zero")]
    DivisionByZero { position: Option<Position> },

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    /// Raised from interpreted code or a plugin
    #[error("{0}")]
    User(String),
}

impl EvalError {
    pub fn token_error(message: impl Into<String>, position: Position) -> Self {
        EvalError::Token {
            message: message.into(),
            position,
        }
    }

    pub fn parse_error(message: impl Into<String>, position: Position) -> Self {
        EvalError::Parse {
            message: message.into(),
            position,
        }
    }

    pub fn unbound(name: impl Into<String>, position: Option<Position>) -> Self {
        EvalError::UnboundSymbol {
            name: name.into(),
            position,
        }
    }

    /// Type mismatch with the operation name and the offending value's type
    pub fn type_error(name: &str, expected: &str, actual: &Value) -> Self {
        EvalError::Type {
            message: format!("{}: expected {}, got {}", name, expected, actual.type_name()),
            position: None,
        }
    }

    pub fn not_callable(value: &Value, position: Option<Position>) -> Self {
        EvalError::Type {
            message: format!("value of type {} is not callable", value.type_name()),
            position,
        }
    }

    pub fn arity_error(name: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::Arity {
            name: name.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn argument_error(name: &str, message: impl Into<String>) -> Self {
        EvalError::Argument {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// Source position of the failure, when one was recorded
    pub fn position(&self) -> Option<Position> {
        match self {
            EvalError::Token { position, .. } | EvalError::Parse { position, .. } => {
                Some(*position)
            }
            EvalError::UnboundSymbol { position, .. }
            | EvalError::Type { position, .. }
            | EvalError::DivisionByZero { position } => *position,
            _ => None,
        }
    }
}
