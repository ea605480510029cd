//! Hael tree-walking evaluator.
//!
//! Executes Hael programs directly from the AST: the object model, scoped
//! environments, the evaluator, the built-in registry, and an
//! [`Interpreter`] session for hosts such as the CLI and REPL.

pub mod builtins;
pub mod env;
pub mod error;
pub mod evaluator;
pub mod interpreter;
pub mod object;

pub use builtins::{Builtin, BuiltinFn, Builtins};
pub use env::Environment;
pub use error::{EvalResult, RuntimeError, Unwind};
pub use evaluator::{EvalConfig, Evaluator};
pub use interpreter::{Interpreter, Outcome};
pub use object::{Function, HashKey, Object, ObjectType};
