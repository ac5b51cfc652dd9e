//! Function combinators: comp, partial, complement, juxt
//!
//! Each returns a first-class Combinator value; the call protocol applies
//! them like any other callable.

use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expr::Expr;
use crate::value::{Combinator, CombinatorKind, Value};
use cloje_macros::builtin;
use std::rc::Rc;

fn ensure_callable(name: &str, value: &Value) -> Result<(), EvalError> {
    match value {
        Value::Function(_) | Value::Builtin(_) | Value::Combinator(_) => Ok(()),
        other => Err(EvalError::type_error(name, "a callable", other)),
    }
}

fn build(
    name: &str,
    kind: CombinatorKind,
    parts: Vec<Value>,
) -> Result<Value, EvalError> {
    for part in &parts {
        ensure_callable(name, part)?;
    }
    Ok(Value::Combinator(Rc::new(Combinator { kind, parts })))
}

#[builtin(name = "comp", category = "Combinators", arity = -1)]
/// Right-to-left composition: ((comp f g) x) is (f (g x)). With no
/// functions, behaves as the identity.
///
/// ((comp first reverse) [1 2 3]) => 3
pub fn builtin_comp(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let parts = ev.eval_args(args)?;
    build("comp", CombinatorKind::Comp, parts)
}

#[builtin(name = "partial", category = "Combinators", arity = -1)]
/// Pre-binds leading arguments: ((partial f a) x) is (f a x).
///
/// ((partial + 5) 3) => 8
pub fn builtin_partial(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let parts = ev.eval_args(args)?;
    if parts.is_empty() {
        return Err(EvalError::arity_error("partial", "at least 1", 0));
    }
    ensure_callable("partial", &parts[0])?;
    Ok(Value::Combinator(Rc::new(Combinator {
        kind: CombinatorKind::Partial,
        parts,
    })))
}

#[builtin(name = "complement", category = "Combinators", arity = 1)]
/// Wraps a predicate so its truthiness is inverted.
///
/// ((complement empty?) [1]) => true
pub fn builtin_complement(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let parts = ev.eval_args(args)?;
    build("complement", CombinatorKind::Complement, parts)
}

#[builtin(name = "juxt", category = "Combinators", arity = -1)]
/// Applies every function to the same arguments, collecting the results
/// into a vector.
///
/// ((juxt first last) [1 2 3]) => [1 3]
pub fn builtin_juxt(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let parts = ev.eval_args(args)?;
    build("juxt", CombinatorKind::Juxt, parts)
}

#[cfg(test)]
mod tests {
    use crate::error::EvalError;
    use crate::interpreter::Interpreter;
    use crate::value::Value;

    fn eval_ok(source: &str) -> Value {
        Interpreter::with_core()
            .expect("interpreter")
            .eval_source(source)
            .unwrap_or_else(|e| panic!("eval of {:?} failed: {}", source, e))
    }

    #[test]
    fn test_comp_composes_right_to_left() {
        assert_eq!(
            eval_ok("((comp first reverse) [1 2 3])"),
            Value::Number(3.0)
        );
        assert_eq!(
            eval_ok("(defn add1 [x] (+ x 1)) (defn dbl [x] (* 2 x)) ((comp dbl add1) 5)"),
            Value::Number(12.0)
        );
    }

    #[test]
    fn test_comp_zero_functions_is_identity() {
        assert_eq!(eval_ok("((comp) 7)"), Value::Number(7.0));
    }

    #[test]
    fn test_partial_prepends_bound_arguments() {
        assert_eq!(eval_ok("((partial + 5) 3)"), Value::Number(8.0));
        assert_eq!(eval_ok("((partial - 10 3) 2)"), Value::Number(5.0));
    }

    #[test]
    fn test_complement_inverts_truthiness() {
        assert_eq!(eval_ok("((complement empty?) [1])"), Value::Bool(true));
        assert_eq!(eval_ok("((complement empty?) [])"), Value::Bool(false));
    }

    #[test]
    fn test_juxt_collects_into_vector() {
        assert_eq!(
            eval_ok("((juxt first last) [1 2 3])"),
            Value::Vector(vec![Value::Number(1.0), Value::Number(3.0)])
        );
    }

    #[test]
    fn test_combinators_are_first_class() {
        assert_eq!(
            eval_ok("(def neg? (complement (partial <= 0))) (neg? -3)"),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_non_callable_rejected() {
        let interp = Interpreter::with_core().expect("interpreter");
        assert!(matches!(
            interp.eval_source("(comp 1 2)"),
            Err(EvalError::Type { .. })
        ));
    }
}
