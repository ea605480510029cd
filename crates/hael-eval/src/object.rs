//! Runtime values.
//!
//! Scalars (`Integer`, `String`, `Boolean`, `Null`) are plain values.
//! Arrays and hashes are shared, mutable containers: copying an `Object`
//! copies the handle, so every binding that aliases an array observes a
//! `push` made through any of them.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use hael_types::ast::FunctionLit;

use crate::builtins::Builtin;
use crate::env::Environment;
use crate::error::RuntimeError;

/// Shared array storage.
pub type ArrayRef = Rc<RefCell<Vec<Object>>>;
/// Shared hash storage, ordered by key.
pub type HashRef = Rc<RefCell<BTreeMap<HashKey, Object>>>;

/// A runtime value.
#[derive(Clone)]
pub enum Object {
    Integer(i64),
    String(String),
    Boolean(bool),
    Null,
    Array(ArrayRef),
    Hash(HashRef),
    Function(Rc<Function>),
    Builtin(Builtin),
    Error(RuntimeError),
}

impl Object {
    pub fn array(elements: Vec<Object>) -> Self {
        Object::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn hash(pairs: BTreeMap<HashKey, Object>) -> Self {
        Object::Hash(Rc::new(RefCell::new(pairs)))
    }

    pub fn string(text: impl Into<String>) -> Self {
        Object::String(text.into())
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::String(_) => ObjectType::String,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::Null => ObjectType::Null,
            Object::Array(_) => ObjectType::Array,
            Object::Hash(_) => ObjectType::Hash,
            Object::Function(_) => ObjectType::Function,
            Object::Builtin(_) => ObjectType::Builtin,
            Object::Error(_) => ObjectType::Error,
        }
    }

    /// Truthiness: booleans are themselves, `null` is false, everything
    /// else (including `0` and `""`) is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Object::Boolean(b) => *b,
            Object::Null => false,
            _ => true,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// The key this value hashes to, if it can be used as a hash key.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Object::Integer(n) => Some(HashKey::Integer(*n)),
            Object::String(s) => Some(HashKey::String(s.clone())),
            Object::Boolean(b) => Some(HashKey::Boolean(*b)),
            _ => None,
        }
    }
}

/// Scalars compare by value; arrays, hashes, and functions by identity.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::String(a), Object::String(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::Array(a), Object::Array(b)) => Rc::ptr_eq(a, b),
            (Object::Hash(a), Object::Hash(b)) => Rc::ptr_eq(a, b),
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::Builtin(a), Object::Builtin(b)) => a.name == b.name,
            (Object::Error(a), Object::Error(b)) => a == b,
            _ => false,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Object kinds
// ══════════════════════════════════════════════════════════════════════════════

/// The kind of an [`Object`], as named in error messages and by `type()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Integer,
    String,
    Boolean,
    Null,
    Array,
    Hash,
    Function,
    Builtin,
    Error,
}

impl ObjectType {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectType::Integer => "INTEGER",
            ObjectType::String => "STRING",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::Null => "NULL",
            ObjectType::Array => "ARRAY",
            ObjectType::Hash => "HASH",
            ObjectType::Function => "FUNCTION",
            ObjectType::Builtin => "BUILTIN",
            ObjectType::Error => "ERROR",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Hash keys
// ══════════════════════════════════════════════════════════════════════════════

/// The hashable subset of objects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashKey {
    Integer(i64),
    String(String),
    Boolean(bool),
}

impl From<HashKey> for Object {
    fn from(key: HashKey) -> Self {
        match key {
            HashKey::Integer(n) => Object::Integer(n),
            HashKey::String(s) => Object::String(s),
            HashKey::Boolean(b) => Object::Boolean(b),
        }
    }
}

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashKey::Integer(n) => write!(f, "{n}"),
            HashKey::String(s) => f.write_str(s),
            HashKey::Boolean(b) => write!(f, "{b}"),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Functions
// ══════════════════════════════════════════════════════════════════════════════

/// A closure: a function literal plus the scope it was evaluated in.
pub struct Function {
    pub literal: Rc<FunctionLit>,
    pub env: Environment,
}

impl Function {
    pub fn new(literal: Rc<FunctionLit>, env: Environment) -> Self {
        Self { literal, env }
    }

    pub fn arity(&self) -> usize {
        self.literal.params.len()
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("literal", &self.literal.to_string())
            .field("env", &self.env)
            .finish()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Rendering
// ══════════════════════════════════════════════════════════════════════════════

thread_local! {
    /// Containers currently being rendered on this thread, innermost last.
    static RENDERING: RefCell<Vec<*const ()>> = const { RefCell::new(Vec::new()) };
}

/// Marks one array or hash as being rendered until dropped.
struct RenderGuard;

impl RenderGuard {
    /// Returns `None` when `container` is already being rendered further
    /// up, i.e. it contains itself.
    fn enter<T>(container: &Rc<T>) -> Option<Self> {
        let ptr = Rc::as_ptr(container).cast::<()>();
        RENDERING.with(|active| {
            let mut active = active.borrow_mut();
            if active.contains(&ptr) {
                None
            } else {
                active.push(ptr);
                Some(RenderGuard)
            }
        })
    }
}

impl Drop for RenderGuard {
    fn drop(&mut self) {
        RENDERING.with(|active| {
            active.borrow_mut().pop();
        });
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(n) => write!(f, "{n}"),
            Object::String(s) => f.write_str(s),
            Object::Boolean(b) => write!(f, "{b}"),
            Object::Null => f.write_str("null"),
            Object::Array(elements) => {
                let Some(_guard) = RenderGuard::enter(elements) else {
                    return f.write_str("[...]");
                };
                f.write_str("[")?;
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")
            }
            Object::Hash(pairs) => {
                let Some(_guard) = RenderGuard::enter(pairs) else {
                    return f.write_str("{...}");
                };
                f.write_str("{")?;
                for (i, (key, value)) in pairs.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Object::Function(func) => write!(f, "{}", func.literal),
            Object::Builtin(builtin) => write!(f, "builtin function {}", builtin.name),
            Object::Error(err) => write!(f, "ERROR: {err}"),
        }
    }
}

/// Containers debug-print through [`Display`](fmt::Display), which stops at
/// self-references.
impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(n) => f.debug_tuple("Integer").field(n).finish(),
            Object::String(s) => f.debug_tuple("String").field(s).finish(),
            Object::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Object::Null => f.write_str("Null"),
            Object::Array(_) => f.debug_tuple("Array").field(&format_args!("{self}")).finish(),
            Object::Hash(_) => f.debug_tuple("Hash").field(&format_args!("{self}")).finish(),
            Object::Function(func) => f.debug_tuple("Function").field(func).finish(),
            Object::Builtin(builtin) => f.debug_tuple("Builtin").field(builtin).finish(),
            Object::Error(err) => f.debug_tuple("Error").field(err).finish(),
        }
    }
}
