//! Built-in function registry and the standard built-ins.
//!
//! A built-in receives the evaluator and its already-evaluated arguments and
//! returns one object. Arity and argument kinds are the built-in's own
//! business: failures come back as [`Object::Error`], which the evaluator
//! propagates like any other runtime error.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::RuntimeError;
use crate::evaluator::Evaluator;
use crate::object::{Object, ObjectType};

/// Native function signature.
pub type BuiltinFn = fn(&mut Evaluator, Vec<Object>) -> Object;

/// A named native function.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// Name → built-in lookup table, consulted when an identifier is not bound
/// in any scope.
#[derive(Debug, Clone, Default)]
pub struct Builtins {
    table: BTreeMap<&'static str, Builtin>,
}

impl Builtins {
    /// A registry with no built-ins.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard built-ins: `len`, `push`, `pop`, `type`, `slice`,
    /// `print`, `do`.
    pub fn standard() -> Self {
        let mut builtins = Self::empty();
        builtins.register("len", len);
        builtins.register("push", push);
        builtins.register("pop", pop);
        builtins.register("type", type_of);
        builtins.register("slice", slice);
        builtins.register("print", print);
        builtins.register("do", apply);
        builtins
    }

    /// Add or replace a built-in.
    pub fn register(&mut self, name: &'static str, func: BuiltinFn) {
        self.table.insert(name, Builtin { name, func });
    }

    pub fn get(&self, name: &str) -> Option<Builtin> {
        self.table.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.table.keys().copied()
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn error(err: RuntimeError) -> Object {
    Object::Error(err)
}

fn check_arity(args: &[Object], want: usize) -> Result<(), Object> {
    if args.len() == want {
        Ok(())
    } else {
        Err(error(RuntimeError::wrong_arguments(args.len(), want)))
    }
}

fn wrong_kind(message: String) -> Object {
    error(RuntimeError::builtin(message))
}

// ── Standard built-ins ───────────────────────────────────────────────────────

/// `len(x)`: array length or string length in bytes.
fn len(_: &mut Evaluator, args: Vec<Object>) -> Object {
    if let Err(e) = check_arity(&args, 1) {
        return e;
    }
    match &args[0] {
        Object::Array(elements) => Object::Integer(elements.borrow().len() as i64),
        Object::String(s) => Object::Integer(s.len() as i64),
        other => wrong_kind(format!(
            "argument to `len` not supported, got {}",
            other.object_type()
        )),
    }
}

/// `push(arr, v)`: appends in place and returns the same array.
fn push(_: &mut Evaluator, args: Vec<Object>) -> Object {
    if let Err(e) = check_arity(&args, 2) {
        return e;
    }
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(Object::Array(elements)), Some(value)) => {
            elements.borrow_mut().push(value);
            Object::Array(elements)
        }
        (Some(other), _) => wrong_kind(format!(
            "argument to `push` must be ARRAY, got {}",
            other.object_type()
        )),
        _ => error(RuntimeError::wrong_arguments(0, 2)),
    }
}

/// `pop(arr)`: removes and returns the last element in place.
fn pop(_: &mut Evaluator, args: Vec<Object>) -> Object {
    if let Err(e) = check_arity(&args, 1) {
        return e;
    }
    match &args[0] {
        Object::Array(elements) => match elements.borrow_mut().pop() {
            Some(last) => last,
            None => wrong_kind("cannot pop from empty array".to_string()),
        },
        other => wrong_kind(format!(
            "argument to `pop` must be ARRAY, got {}",
            other.object_type()
        )),
    }
}

/// `type(x)`: the object kind as a string, e.g. `"INTEGER"`.
fn type_of(_: &mut Evaluator, args: Vec<Object>) -> Object {
    if let Err(e) = check_arity(&args, 1) {
        return e;
    }
    Object::string(args[0].object_type().name())
}

/// `slice(arr, start[, end])`: a new array of `arr[start..end]`.
fn slice(_: &mut Evaluator, args: Vec<Object>) -> Object {
    if !(2..=3).contains(&args.len()) {
        return error(RuntimeError::wrong_arguments(args.len(), "2 or 3"));
    }
    let Object::Array(elements) = &args[0] else {
        return wrong_kind(format!(
            "first argument to `slice` must be ARRAY, got {}",
            args[0].object_type()
        ));
    };
    let Object::Integer(start) = args[1] else {
        return wrong_kind(format!(
            "second argument to `slice` must be INTEGER, got {}",
            args[1].object_type()
        ));
    };
    let elements = elements.borrow();
    let end = match args.get(2) {
        None => elements.len() as i64,
        Some(Object::Integer(end)) => *end,
        Some(other) => {
            return wrong_kind(format!(
                "third argument to `slice` must be INTEGER, got {}",
                other.object_type()
            ))
        }
    };
    if start < 0 || end > elements.len() as i64 || start > end {
        return wrong_kind(format!(
            "invalid slice indices: start={start}, end={end}"
        ));
    }
    Object::array(elements[start as usize..end as usize].to_vec())
}

/// `print(args...)`: writes each argument on its own line; returns `null`.
fn print(evaluator: &mut Evaluator, args: Vec<Object>) -> Object {
    for arg in &args {
        evaluator.emit(arg.to_string());
    }
    Object::Null
}

/// `do(f, args...)`: calls `f` with the remaining arguments.
fn apply(evaluator: &mut Evaluator, args: Vec<Object>) -> Object {
    let mut args = args.into_iter();
    let Some(callee) = args.next() else {
        return error(RuntimeError::wrong_arguments(0, "at least 1"));
    };
    if !matches!(
        callee.object_type(),
        ObjectType::Function | ObjectType::Builtin
    ) {
        return wrong_kind(format!(
            "first argument to `do` must be FUNCTION, got {}",
            callee.object_type()
        ));
    }
    evaluator.apply(callee, args.collect())
}
