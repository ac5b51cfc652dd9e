//! Sequence-tools plugin: map, filter, reduce, apply, range, repeat
//!
//! Higher-order operations built on the evaluator's `call_values`
//! contract, so they accept user functions, builtins, and combinators
//! alike.

use crate::builtins::sequences::seq_items;
use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expr::Expr;
use crate::registry::{Metadata, Plugin, Registry};
use crate::value::Value;

pub static PLUGIN: Plugin = Plugin {
    name: "seq",
    version: "0.3.0",
    dependencies: &[],
    register,
};

fn register(registry: &mut Registry) -> Result<(), EvalError> {
    registry.register(
        Metadata::new(
            "map",
            "Sequences",
            2,
            "Applies a function to every element, returning a new list.",
        ),
        builtin_map,
    )?;
    registry.register(
        Metadata::new(
            "filter",
            "Sequences",
            2,
            "Keeps the elements for which the predicate is truthy.",
        ),
        builtin_filter,
    )?;
    registry.register(
        Metadata::new(
            "reduce",
            "Sequences",
            3,
            "Folds a sequence left to right from an initial accumulator.",
        ),
        builtin_reduce,
    )?;
    registry.register(
        Metadata::new(
            "apply",
            "Sequences",
            -1,
            "Calls a function with leading arguments plus a final sequence of arguments.",
        ),
        builtin_apply,
    )?;
    registry.register(
        Metadata::new(
            "range",
            "Sequences",
            -1,
            "Integers from 0 to n (exclusive), or from start to end.",
        ),
        builtin_range,
    )?;
    registry.register(
        Metadata::new("repeat", "Sequences", 2, "A list of n copies of a value."),
        builtin_repeat,
    )?;
    Ok(())
}

fn builtin_map(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let f = ev.eval(&args[0])?;
    let coll = ev.eval(&args[1])?;
    let items = seq_items("map", &coll)?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(ev.call_values(&f, vec![item])?);
    }
    Ok(Value::List(out))
}

fn builtin_filter(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let pred = ev.eval(&args[0])?;
    let coll = ev.eval(&args[1])?;
    let items = seq_items("filter", &coll)?;
    let mut out = Vec::new();
    for item in items {
        if ev.call_values(&pred, vec![item.clone()])?.is_truthy() {
            out.push(item);
        }
    }
    Ok(Value::List(out))
}

fn builtin_reduce(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let f = ev.eval(&args[0])?;
    let mut acc = ev.eval(&args[1])?;
    let coll = ev.eval(&args[2])?;
    for item in seq_items("reduce", &coll)? {
        acc = ev.call_values(&f, vec![acc, item])?;
    }
    Ok(acc)
}

fn builtin_apply(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let mut values = ev.eval_args(args)?;
    if values.len() < 2 {
        return Err(EvalError::arity_error("apply", "at least 2", values.len()));
    }
    let trailing = values
        .pop()
        .unwrap_or(Value::Nil);
    let f = values.remove(0);
    let mut call_args = values;
    call_args.extend(seq_items("apply", &trailing)?);
    ev.call_values(&f, call_args)
}

fn int_arg(name: &str, value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Number(n) if n.fract() == 0.0 => Ok(*n as i64),
        other => Err(EvalError::type_error(name, "an integer", other)),
    }
}

fn builtin_range(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = ev.eval_args(args)?;
    let (start, end) = match values.as_slice() {
        [end] => (0, int_arg("range", end)?),
        [start, end] => (int_arg("range", start)?, int_arg("range", end)?),
        _ => return Err(EvalError::arity_error("range", "1-2", values.len())),
    };
    Ok(Value::List(
        (start..end.max(start)).map(|n| Value::Number(n as f64)).collect(),
    ))
}

fn builtin_repeat(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let count_value = ev.eval(&args[0])?;
    let value = ev.eval(&args[1])?;
    let count = int_arg("repeat", &count_value)?;
    if count < 0 {
        return Err(EvalError::argument_error("repeat", "count must be non-negative"));
    }
    Ok(Value::List(vec![value; count as usize]))
}
