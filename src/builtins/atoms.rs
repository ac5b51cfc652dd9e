//! Atom operations: atom, deref, swap!, reset!
//!
//! The single mutable-state primitive. swap! computes the replacement
//! while holding the atom's lock, so updates are linearizable per atom.

use crate::atom::Atom;
use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expr::Expr;
use crate::value::Value;
use cloje_macros::builtin;

fn as_atom(name: &str, value: &Value) -> Result<Atom, EvalError> {
    match value {
        Value::Atom(atom) => Ok(atom.clone()),
        other => Err(EvalError::type_error(name, "an atom", other)),
    }
}

#[builtin(name = "atom", category = "Atoms", arity = 1)]
/// Allocates a new atom holding the initial value.
///
/// (def counter (atom 0))
pub fn builtin_atom(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let initial = ev.eval(&args[0])?;
    Ok(Value::Atom(Atom::new(initial)))
}

#[builtin(name = "deref", category = "Atoms", arity = 1)]
/// Current value of an atom.
pub fn builtin_deref(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    Ok(as_atom("deref", &value)?.load())
}

#[builtin(name = "swap!", category = "Atoms", arity = -1)]
/// Replaces the atom's value with (f current extra…), computed while the
/// lock is held, and returns the new value. A failing update leaves the
/// atom unchanged.
///
/// (swap! counter (fn [v] (+ v 1)))
pub fn builtin_swap(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = ev.eval_args(args)?;
    if values.len() < 2 {
        return Err(EvalError::arity_error("swap!", "at least 2", values.len()));
    }
    let atom = as_atom("swap!", &values[0])?;
    let update = values[1].clone();
    let extras = values[2..].to_vec();

    atom.swap(|current| {
        let mut call_args = Vec::with_capacity(1 + extras.len());
        call_args.push(current);
        call_args.extend(extras.iter().cloned());
        ev.call_values(&update, call_args)
    })
}

#[builtin(name = "reset!", category = "Atoms", arity = 2)]
/// Stores a new value, returning it.
pub fn builtin_reset(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = ev.eval_args(args)?;
    let atom = as_atom("reset!", &values[0])?;
    Ok(atom.store(values[1].clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Interpreter;

    fn eval_ok(source: &str) -> Value {
        Interpreter::with_core()
            .expect("interpreter")
            .eval_source(source)
            .unwrap_or_else(|e| panic!("eval of {:?} failed: {}", source, e))
    }

    #[test]
    fn test_atom_lifecycle() {
        assert_eq!(
            eval_ok("(def a (atom 0)) (swap! a (fn [v] (+ v 10))) (deref a)"),
            Value::Number(10.0)
        );
    }

    #[test]
    fn test_sequential_swaps_observe_each_other() {
        assert_eq!(
            eval_ok(
                "(let [a (atom 0)]
                   (do (swap! a (fn [v] (+ v 1)))
                       (swap! a (fn [v] (+ v 1)))
                       (deref a)))"
            ),
            Value::Number(2.0)
        );
    }

    #[test]
    fn test_swap_with_extra_arguments() {
        assert_eq!(
            eval_ok("(def a (atom 10)) (swap! a - 3 2)"),
            Value::Number(5.0)
        );
    }

    #[test]
    fn test_reset_returns_stored_value() {
        assert_eq!(
            eval_ok("(def a (atom 1)) (reset! a 99)"),
            Value::Number(99.0)
        );
        assert_eq!(eval_ok("(def a (atom 1)) (reset! a 99) (deref a)"), Value::Number(99.0));
    }

    #[test]
    fn test_failed_swap_leaves_atom_unchanged() {
        assert_eq!(
            eval_ok(
                "(def a (atom 5))
                 (if (= 1 2) nil nil)
                 a"
            )
            .type_name(),
            "atom"
        );
        let interp = Interpreter::with_core().expect("interpreter");
        interp.eval_source("(def a (atom 5))").expect("def");
        assert!(interp
            .eval_source("(swap! a (fn [v] (undefined-op v)))")
            .is_err());
        assert_eq!(interp.eval_source("(deref a)").expect("deref"), Value::Number(5.0));
    }

    #[test]
    fn test_atoms_are_shared_references() {
        assert_eq!(
            eval_ok("(def a (atom 0)) (def b a) (reset! b 3) (deref a)"),
            Value::Number(3.0)
        );
    }

    #[test]
    fn test_deref_requires_atom() {
        let interp = Interpreter::with_core().expect("interpreter");
        assert!(matches!(
            interp.eval_source("(deref 5)"),
            Err(EvalError::Type { .. })
        ));
    }
}
