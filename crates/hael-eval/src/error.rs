//! Runtime error types for the Hael evaluator.

use thiserror::Error;

use crate::object::{Object, ObjectType};

/// A runtime fault.
///
/// Runtime errors are values in the language: the evaluator surfaces them as
/// [`Object::Error`], and the `Display` text is the message that object
/// carries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("identifier not found: {0}")]
    UnknownIdentifier(String),

    #[error("type mismatch: {left} {op} {right}")]
    TypeMismatch {
        left: ObjectType,
        op: &'static str,
        right: ObjectType,
    },

    #[error("unknown operator: {op}{operand}")]
    UnknownPrefixOperator { op: &'static str, operand: ObjectType },

    #[error("unknown operator: {left} {op} {right}")]
    UnknownInfixOperator {
        left: ObjectType,
        op: &'static str,
        right: ObjectType,
    },

    #[error("not a function: {0}")]
    NotAFunction(ObjectType),

    #[error("wrong number of arguments. got={got}, want={want}")]
    WrongArgumentCount { got: usize, want: String },

    #[error("index operator not supported: {0}")]
    IndexNotSupported(ObjectType),

    #[error("unusable as hash key: {0}")]
    UnusableHashKey(ObjectType),

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow: {left} {op} {right}")]
    IntegerOverflow {
        left: i64,
        op: &'static str,
        right: i64,
    },

    #[error("integer overflow: -{0}")]
    NegationOverflow(i64),

    #[error("maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),

    /// A failure reported by a built-in function.
    #[error("{0}")]
    Builtin(String),
}

impl RuntimeError {
    pub fn wrong_arguments(got: usize, want: impl ToString) -> Self {
        Self::WrongArgumentCount {
            got,
            want: want.to_string(),
        }
    }

    pub fn builtin(message: impl Into<String>) -> Self {
        Self::Builtin(message.into())
    }
}

/// Non-local exits from evaluation.
///
/// `return` and runtime errors share this one propagation path: both skip
/// the rest of every enclosing block. A function call absorbs `Return`; the
/// program boundary absorbs both.
#[derive(Debug, Clone, PartialEq)]
pub enum Unwind {
    /// `return value;`
    Return(Object),
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(err: RuntimeError) -> Self {
        Unwind::Error(err)
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T = Object> = Result<T, Unwind>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = RuntimeError::TypeMismatch {
            left: ObjectType::Integer,
            op: "+",
            right: ObjectType::Boolean,
        };
        assert_eq!(err.to_string(), "type mismatch: INTEGER + BOOLEAN");

        let err = RuntimeError::UnknownPrefixOperator {
            op: "-",
            operand: ObjectType::Boolean,
        };
        assert_eq!(err.to_string(), "unknown operator: -BOOLEAN");

        assert_eq!(
            RuntimeError::wrong_arguments(2, "2 or 3").to_string(),
            "wrong number of arguments. got=2, want=2 or 3"
        );
        assert_eq!(
            RuntimeError::UnknownIdentifier("foobar".into()).to_string(),
            "identifier not found: foobar"
        );
    }

    #[test]
    fn test_unwind_from_runtime_error() {
        let unwind: Unwind = RuntimeError::DivisionByZero.into();
        assert_eq!(unwind, Unwind::Error(RuntimeError::DivisionByZero));
    }
}
