//! Sets plugin: union, intersection, difference
//!
//! Set semantics over ordinary sequences: results are lists of distinct
//! elements, keeping the order of first appearance.

use crate::builtins::sequences::seq_items;
use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expr::Expr;
use crate::registry::{Metadata, Plugin, Registry};
use crate::value::Value;

pub static PLUGIN: Plugin = Plugin {
    name: "sets",
    version: "0.3.0",
    dependencies: &[],
    register,
};

fn register(registry: &mut Registry) -> Result<(), EvalError> {
    registry.register(
        Metadata::new(
            "union",
            "Sets",
            -1,
            "Distinct elements appearing in any of the sequences.",
        ),
        builtin_union,
    )?;
    registry.register(
        Metadata::new(
            "intersection",
            "Sets",
            -1,
            "Distinct elements of the first sequence appearing in every other.",
        ),
        builtin_intersection,
    )?;
    registry.register(
        Metadata::new(
            "difference",
            "Sets",
            -1,
            "Distinct elements of the first sequence appearing in no other.",
        ),
        builtin_difference,
    )?;
    Ok(())
}

fn sequences(
    name: &str,
    ev: &mut Evaluator,
    args: &[Expr],
) -> Result<Vec<Vec<Value>>, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_error(name, "at least 1", 0));
    }
    ev.eval_args(args)?
        .iter()
        .map(|value| seq_items(name, value))
        .collect()
}

fn push_distinct(out: &mut Vec<Value>, item: Value) {
    if !out.contains(&item) {
        out.push(item);
    }
}

fn builtin_union(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let sets = sequences("union", ev, args)?;
    let mut out = Vec::new();
    for set in sets {
        for item in set {
            push_distinct(&mut out, item);
        }
    }
    Ok(Value::List(out))
}

fn builtin_intersection(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let mut sets = sequences("intersection", ev, args)?;
    let first = sets.remove(0);
    let mut out = Vec::new();
    for item in first {
        if sets.iter().all(|set| set.contains(&item)) {
            push_distinct(&mut out, item);
        }
    }
    Ok(Value::List(out))
}

fn builtin_difference(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let mut sets = sequences("difference", ev, args)?;
    let first = sets.remove(0);
    let mut out = Vec::new();
    for item in first {
        if !sets.iter().any(|set| set.contains(&item)) {
            push_distinct(&mut out, item);
        }
    }
    Ok(Value::List(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Interpreter;

    fn eval_ok(source: &str) -> Value {
        let mut registry = Registry::with_core().expect("core registry");
        registry.install(&PLUGIN).expect("install sets");
        Interpreter::new(registry)
            .eval_source(source)
            .unwrap_or_else(|e| panic!("eval of {:?} failed: {}", source, e))
    }

    #[test]
    fn test_union() {
        assert_eq!(
            eval_ok("(union [1 2] [2 3] [3 1])"),
            Value::List(vec![
                Value::Number(1.0),
                Value::Number(2.0),
                Value::Number(3.0)
            ])
        );
    }

    #[test]
    fn test_intersection() {
        assert_eq!(
            eval_ok("(intersection [1 2 3] [2 3 4] [3 2])"),
            Value::List(vec![Value::Number(2.0), Value::Number(3.0)])
        );
    }

    #[test]
    fn test_difference() {
        assert_eq!(
            eval_ok("(difference [1 2 3 1] [2])"),
            Value::List(vec![Value::Number(1.0), Value::Number(3.0)])
        );
    }

    #[test]
    fn test_single_argument_deduplicates() {
        assert_eq!(
            eval_ok("(union [1 1 2])"),
            Value::List(vec![Value::Number(1.0), Value::Number(2.0)])
        );
    }
}
