//! Scoped variable environment for the Hael evaluator.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::object::Object;

/// A single scope level.
#[derive(Default)]
struct Scope {
    bindings: BTreeMap<String, Object>,
    outer: Option<Environment>,
}

/// A shared, chained variable scope.
///
/// Cloning an `Environment` clones the handle, not the bindings: closures
/// hold a handle to the scope they were created in and see later bindings
/// made there. Lookup walks outward through enclosing scopes; `set` always
/// binds in this scope, so re-binding a name only shadows an outer one.
#[derive(Clone, Default)]
pub struct Environment(Rc<RefCell<Scope>>);

impl Environment {
    /// Create a root environment with no enclosing scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh scope chained to `outer`.
    pub fn new_enclosed(outer: &Environment) -> Self {
        Self(Rc::new(RefCell::new(Scope {
            bindings: BTreeMap::new(),
            outer: Some(outer.clone()),
        })))
    }

    /// Look up a variable, searching from innermost to outermost scope.
    pub fn get(&self, name: &str) -> Option<Object> {
        let scope = self.0.borrow();
        match scope.bindings.get(name) {
            Some(value) => Some(value.clone()),
            None => scope.outer.as_ref().and_then(|outer| outer.get(name)),
        }
    }

    /// Bind a variable in this scope, replacing any existing binding here.
    pub fn set(&self, name: impl Into<String>, value: Object) {
        self.0.borrow_mut().bindings.insert(name.into(), value);
    }

    /// Names bound directly in this scope, sorted.
    pub fn names(&self) -> Vec<String> {
        self.0.borrow().bindings.keys().cloned().collect()
    }

    /// Returns `true` if both handles refer to the same scope.
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// A closure stored in the scope it captured makes the chain cyclic, so only
// the names are printed.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("names", &self.names())
            .field("enclosed", &self.0.borrow().outer.is_some())
            .finish()
    }
}
