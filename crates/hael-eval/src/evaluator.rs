//! Core expression and statement evaluator.

use std::collections::BTreeMap;
use std::rc::Rc;

use hael_types::ast::*;

use crate::builtins::Builtins;
use crate::env::Environment;
use crate::error::{EvalResult, RuntimeError, Unwind};
use crate::object::{Function, Object, ObjectType};

/// Evaluator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum number of nested function calls before evaluation fails with
    /// [`RuntimeError::CallDepthExceeded`].
    pub max_call_depth: usize,
    /// Write `print` output straight to stdout instead of capturing it in
    /// [`Evaluator::output`].
    pub echo_output: bool,
}

impl EvalConfig {
    pub const DEFAULT_MAX_CALL_DEPTH: usize = 128;
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_call_depth: Self::DEFAULT_MAX_CALL_DEPTH,
            echo_output: false,
        }
    }
}

/// The core evaluator: walks AST nodes against an [`Environment`] and
/// produces [`Object`]s.
pub struct Evaluator {
    builtins: Builtins,
    config: EvalConfig,
    /// Current function call nesting.
    depth: usize,
    /// Lines written by `print` when output is not echoed.
    pub output: Vec<String>,
}

impl Evaluator {
    /// Create an evaluator with the standard built-ins.
    pub fn new(config: EvalConfig) -> Self {
        Self::with_builtins(config, Builtins::standard())
    }

    pub fn with_builtins(config: EvalConfig, builtins: Builtins) -> Self {
        Self {
            builtins,
            config,
            depth: 0,
            output: Vec::new(),
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn builtins_mut(&mut self) -> &mut Builtins {
        &mut self.builtins
    }

    /// Drain the captured `print` output.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Record one line of program output.
    pub(crate) fn emit(&mut self, line: String) {
        if self.config.echo_output {
            println!("{line}");
        } else {
            self.output.push(line);
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Public entry points
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate a program in `env`.
    ///
    /// Returns the value of the last statement, the value of a top-level
    /// `return`, or the first runtime error as an [`Object::Error`]. An
    /// empty program evaluates to `null`.
    pub fn eval_program(&mut self, program: &Program, env: &Environment) -> Object {
        let mut result = Object::Null;
        for stmt in &program.stmts {
            match self.eval_stmt(stmt, env) {
                Ok(value) => result = value,
                Err(Unwind::Return(value)) => return value,
                Err(Unwind::Error(err)) => {
                    log::debug!("runtime error at {}: {err}", stmt.span());
                    return Object::Error(err);
                }
            }
        }
        result
    }

    /// Evaluate a single expression in `env`.
    pub fn eval_expression(&mut self, expr: &Expr, env: &Environment) -> Object {
        match self.eval_expr(expr, env) {
            Ok(value) | Err(Unwind::Return(value)) => value,
            Err(Unwind::Error(err)) => Object::Error(err),
        }
    }

    /// Call a function or built-in with already-evaluated arguments.
    pub fn apply(&mut self, callee: Object, args: Vec<Object>) -> Object {
        match self.apply_function(callee, args) {
            Ok(value) | Err(Unwind::Return(value)) => value,
            Err(Unwind::Error(err)) => Object::Error(err),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    fn eval_block(&mut self, block: &Block, env: &Environment) -> EvalResult {
        let mut result = Object::Null;
        for stmt in &block.stmts {
            result = self.eval_stmt(stmt, env)?;
        }
        Ok(result)
    }

    fn eval_stmt(&mut self, stmt: &Stmt, env: &Environment) -> EvalResult {
        match stmt {
            Stmt::Let(binding) => {
                let value = self.eval_expr(&binding.value, env)?;
                env.set(binding.name.name.as_str(), value);
                Ok(Object::Null)
            }
            Stmt::Return(ret) => {
                let value = self.eval_expr(&ret.value, env)?;
                Err(Unwind::Return(value))
            }
            Stmt::Expr(expr_stmt) => self.eval_expr(&expr_stmt.expr, env),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    fn eval_expr(&mut self, expr: &Expr, env: &Environment) -> EvalResult {
        match &expr.kind {
            ExprKind::IntegerLit(n) => Ok(Object::Integer(*n)),
            ExprKind::StringLit(s) => Ok(Object::string(s.as_str())),
            ExprKind::BooleanLit(b) => Ok(Object::Boolean(*b)),
            ExprKind::ArrayLit(elements) => {
                let values = self.eval_expressions(elements, env)?;
                Ok(Object::array(values))
            }
            ExprKind::HashLit(entries) => self.eval_hash_literal(entries, env),

            ExprKind::Identifier(name) => self.eval_identifier(name, env),

            ExprKind::Prefix { op, operand } => {
                let operand = self.eval_expr(operand, env)?;
                eval_prefix(*op, operand)
            }
            ExprKind::Infix { left, op, right } => {
                let left = self.eval_expr(left, env)?;
                let right = self.eval_expr(right, env)?;
                eval_infix(*op, &left, &right)
            }
            ExprKind::Index { collection, index } => {
                let collection = self.eval_expr(collection, env)?;
                let index = self.eval_expr(index, env)?;
                eval_index(&collection, &index)
            }

            ExprKind::If(if_expr) => self.eval_if(if_expr, env),

            ExprKind::Function(literal) => Ok(Object::Function(Rc::new(Function::new(
                Rc::clone(literal),
                env.clone(),
            )))),
            ExprKind::Call { callee, args } => {
                let callee = self.eval_expr(callee, env)?;
                let args = self.eval_expressions(args, env)?;
                self.apply_function(callee, args)
            }
        }
    }

    /// Evaluate expressions left to right, stopping at the first failure.
    fn eval_expressions(&mut self, exprs: &[Expr], env: &Environment) -> EvalResult<Vec<Object>> {
        exprs.iter().map(|e| self.eval_expr(e, env)).collect()
    }

    fn eval_identifier(&self, name: &str, env: &Environment) -> EvalResult {
        if let Some(value) = env.get(name) {
            return Ok(value);
        }
        match self.builtins.get(name) {
            Some(builtin) => Ok(Object::Builtin(builtin)),
            None => Err(RuntimeError::UnknownIdentifier(name.to_string()).into()),
        }
    }

    fn eval_hash_literal(&mut self, entries: &[HashEntry], env: &Environment) -> EvalResult {
        let mut pairs = BTreeMap::new();
        for entry in entries {
            let key = self.eval_expr(&entry.key, env)?;
            let hash_key = key
                .hash_key()
                .ok_or(RuntimeError::UnusableHashKey(key.object_type()))?;
            let value = self.eval_expr(&entry.value, env)?;
            pairs.insert(hash_key, value);
        }
        Ok(Object::hash(pairs))
    }

    fn eval_if(&mut self, if_expr: &IfExpr, env: &Environment) -> EvalResult {
        let condition = self.eval_expr(&if_expr.condition, env)?;
        if condition.is_truthy() {
            self.eval_block(&if_expr.consequence, env)
        } else if let Some(alternative) = &if_expr.alternative {
            self.eval_block(alternative, env)
        } else {
            Ok(Object::Null)
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Calls
    // ══════════════════════════════════════════════════════════════════════

    fn apply_function(&mut self, callee: Object, args: Vec<Object>) -> EvalResult {
        match callee {
            Object::Function(func) => self.call_function(&func, args),
            Object::Builtin(builtin) => {
                log::trace!("calling builtin {} with {} args", builtin.name, args.len());
                match (builtin.func)(self, args) {
                    Object::Error(err) => Err(Unwind::Error(err)),
                    value => Ok(value),
                }
            }
            other => Err(RuntimeError::NotAFunction(other.object_type()).into()),
        }
    }

    fn call_function(&mut self, func: &Function, args: Vec<Object>) -> EvalResult {
        if args.len() != func.arity() {
            return Err(RuntimeError::wrong_arguments(args.len(), func.arity()).into());
        }
        if self.depth >= self.config.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded(self.config.max_call_depth).into());
        }

        let env = Environment::new_enclosed(&func.env);
        for (param, arg) in func.literal.params.iter().zip(args) {
            env.set(param.name.as_str(), arg);
        }

        self.depth += 1;
        log::trace!("call depth {} entering {}", self.depth, func.literal.span);
        let result = self.eval_block(&func.literal.body, &env);
        self.depth -= 1;

        match result {
            Err(Unwind::Return(value)) => Ok(value),
            other => other,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Operators
// ══════════════════════════════════════════════════════════════════════════

fn eval_prefix(op: PrefixOp, operand: Object) -> EvalResult {
    match (op, &operand) {
        (PrefixOp::Not, _) => Ok(Object::Boolean(!operand.is_truthy())),
        (PrefixOp::Neg, Object::Integer(n)) => n
            .checked_neg()
            .map(Object::Integer)
            .ok_or_else(|| RuntimeError::NegationOverflow(*n).into()),
        (PrefixOp::Neg, _) => Err(RuntimeError::UnknownPrefixOperator {
            op: op.as_str(),
            operand: operand.object_type(),
        }
        .into()),
    }
}

fn eval_infix(op: InfixOp, left: &Object, right: &Object) -> EvalResult {
    match (left, right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix(op, *l, *r),
        (Object::String(l), Object::String(r)) => eval_string_infix(op, l, r),
        _ if op == InfixOp::Eq => Ok(Object::Boolean(left == right)),
        _ if op == InfixOp::NotEq => Ok(Object::Boolean(left != right)),
        _ if left.object_type() != right.object_type() => Err(RuntimeError::TypeMismatch {
            left: left.object_type(),
            op: op.as_str(),
            right: right.object_type(),
        }
        .into()),
        _ => Err(RuntimeError::UnknownInfixOperator {
            left: left.object_type(),
            op: op.as_str(),
            right: right.object_type(),
        }
        .into()),
    }
}

fn eval_integer_infix(op: InfixOp, l: i64, r: i64) -> EvalResult {
    let checked = match op {
        InfixOp::Add => l.checked_add(r),
        InfixOp::Sub => l.checked_sub(r),
        InfixOp::Mul => l.checked_mul(r),
        InfixOp::Div => {
            if r == 0 {
                return Err(RuntimeError::DivisionByZero.into());
            }
            l.checked_div(r)
        }
        InfixOp::Less => return Ok(Object::Boolean(l < r)),
        InfixOp::Greater => return Ok(Object::Boolean(l > r)),
        InfixOp::Eq => return Ok(Object::Boolean(l == r)),
        InfixOp::NotEq => return Ok(Object::Boolean(l != r)),
    };
    checked.map(Object::Integer).ok_or_else(|| {
        RuntimeError::IntegerOverflow {
            left: l,
            op: op.as_str(),
            right: r,
        }
        .into()
    })
}

fn eval_string_infix(op: InfixOp, l: &str, r: &str) -> EvalResult {
    match op {
        InfixOp::Add => Ok(Object::string(format!("{l}{r}"))),
        InfixOp::Eq => Ok(Object::Boolean(l == r)),
        InfixOp::NotEq => Ok(Object::Boolean(l != r)),
        _ => Err(RuntimeError::UnknownInfixOperator {
            left: ObjectType::String,
            op: op.as_str(),
            right: ObjectType::String,
        }
        .into()),
    }
}

fn eval_index(collection: &Object, index: &Object) -> EvalResult {
    match (collection, index) {
        (Object::Array(elements), Object::Integer(i)) => {
            let elements = elements.borrow();
            let element = usize::try_from(*i).ok().and_then(|i| elements.get(i));
            Ok(element.cloned().unwrap_or(Object::Null))
        }
        (Object::Hash(pairs), _) => {
            let key = index
                .hash_key()
                .ok_or(RuntimeError::UnusableHashKey(index.object_type()))?;
            Ok(pairs.borrow().get(&key).cloned().unwrap_or(Object::Null))
        }
        _ => Err(RuntimeError::IndexNotSupported(collection.object_type()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Object {
        Object::Integer(n)
    }

    #[test]
    fn test_integer_infix() {
        assert_eq!(eval_integer_infix(InfixOp::Add, 2, 3), Ok(int(5)));
        assert_eq!(eval_integer_infix(InfixOp::Div, 7, 2), Ok(int(3)));
        assert_eq!(eval_integer_infix(InfixOp::Div, -7, 2), Ok(int(-3)));
        assert_eq!(
            eval_integer_infix(InfixOp::Less, 1, 2),
            Ok(Object::Boolean(true))
        );
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(
            eval_integer_infix(InfixOp::Div, 1, 0),
            Err(Unwind::Error(RuntimeError::DivisionByZero))
        );
        assert!(matches!(
            eval_integer_infix(InfixOp::Add, i64::MAX, 1),
            Err(Unwind::Error(RuntimeError::IntegerOverflow { .. }))
        ));
        assert!(matches!(
            eval_integer_infix(InfixOp::Div, i64::MIN, -1),
            Err(Unwind::Error(RuntimeError::IntegerOverflow { .. }))
        ));
        assert_eq!(
            eval_prefix(PrefixOp::Neg, int(i64::MIN)),
            Err(Unwind::Error(RuntimeError::NegationOverflow(i64::MIN)))
        );
    }

    #[test]
    fn test_equality_fallback() {
        let a = Object::array(vec![]);
        assert_eq!(eval_infix(InfixOp::Eq, &a, &a.clone()), Ok(Object::Boolean(true)));
        assert_eq!(
            eval_infix(InfixOp::Eq, &a, &Object::array(vec![])),
            Ok(Object::Boolean(false))
        );
        assert_eq!(
            eval_infix(InfixOp::NotEq, &int(1), &Object::Null),
            Ok(Object::Boolean(true))
        );
    }

    #[test]
    fn test_echoed_output_is_not_captured() {
        let mut captured = Evaluator::new(EvalConfig::default());
        captured.emit("1".to_string());
        assert_eq!(captured.take_output(), vec!["1"]);

        let mut echoed = Evaluator::new(EvalConfig {
            echo_output: true,
            ..EvalConfig::default()
        });
        echoed.emit("1".to_string());
        assert!(echoed.output.is_empty());
    }

    #[test]
    fn test_negative_index_is_null() {
        let a = Object::array(vec![int(1)]);
        assert_eq!(eval_index(&a, &int(-1)), Ok(Object::Null));
        assert_eq!(eval_index(&a, &int(0)), Ok(int(1)));
        assert_eq!(eval_index(&a, &int(1)), Ok(Object::Null));
    }
}
