//! Math plugin: abs, sqrt, pow, log, floor, ceil, round, min, max, inc,
//! dec, even?, odd?

use crate::builtins::arithmetic::{as_f64, normalize_int, numeric_args};
use crate::builtins::comparison::numeric_compare;
use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expr::Expr;
use crate::registry::{Metadata, Plugin, Registry};
use crate::value::Value;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, Pow, Signed, Zero};
use std::cmp::Ordering;

pub static PLUGIN: Plugin = Plugin {
    name: "math",
    version: "0.3.0",
    dependencies: &[],
    register,
};

fn register(registry: &mut Registry) -> Result<(), EvalError> {
    registry.register(
        Metadata::new("abs", "Math", 1, "Absolute value of a number."),
        builtin_abs,
    )?;
    registry.register(
        Metadata::new(
            "sqrt",
            "Math",
            1,
            "Square root; negative input is an error.",
        ),
        builtin_sqrt,
    )?;
    registry.register(
        Metadata::new(
            "pow",
            "Math",
            2,
            "Base raised to an exponent. Integer cases stay exact and may promote.",
        ),
        builtin_pow,
    )?;
    registry.register(
        Metadata::new(
            "log",
            "Math",
            1,
            "Natural logarithm; non-positive input is an error.",
        ),
        builtin_log,
    )?;
    registry.register(
        Metadata::new("floor", "Math", 1, "Largest integer not above the argument."),
        builtin_floor,
    )?;
    registry.register(
        Metadata::new("ceil", "Math", 1, "Smallest integer not below the argument."),
        builtin_ceil,
    )?;
    registry.register(
        Metadata::new("round", "Math", 1, "Nearest integer, half away from zero."),
        builtin_round,
    )?;
    registry.register(
        Metadata::new("min", "Math", -1, "Smallest of the arguments."),
        builtin_min,
    )?;
    registry.register(
        Metadata::new("max", "Math", -1, "Largest of the arguments."),
        builtin_max,
    )?;
    registry.register(
        Metadata::new("inc", "Math", 1, "Argument plus one."),
        builtin_inc,
    )?;
    registry.register(
        Metadata::new("dec", "Math", 1, "Argument minus one."),
        builtin_dec,
    )?;
    registry.register(
        Metadata::new("even?", "Math", 1, "True for even integers."),
        builtin_even_q,
    )?;
    registry.register(
        Metadata::new("odd?", "Math", 1, "True for odd integers."),
        builtin_odd_q,
    )?;
    Ok(())
}

fn builtin_abs(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = numeric_args("abs", ev, args)?;
    match &values[0] {
        Value::Number(n) => Ok(Value::Number(n.abs())),
        Value::BigNumber(b) => Ok(Value::BigNumber(b.abs())),
        _ => unreachable!("numeric_args admits only numbers"),
    }
}

fn builtin_sqrt(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = numeric_args("sqrt", ev, args)?;
    let n = as_f64("sqrt", &values[0])?;
    if n < 0.0 {
        return Err(EvalError::argument_error(
            "sqrt",
            "negative argument has no real root",
        ));
    }
    Ok(Value::Number(n.sqrt()))
}

fn builtin_pow(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = numeric_args("pow", ev, args)?;
    // Exact path: integral base, small non-negative integral exponent
    if let (Some(base), Value::Number(exp)) = (integral_big(&values[0]), &values[1]) {
        if exp.fract() == 0.0 && *exp >= 0.0 && *exp <= u32::MAX as f64 {
            let promote = matches!(values[0], Value::BigNumber(_));
            return Ok(normalize_int(base.pow(*exp as u32), promote));
        }
    }
    let base = as_f64("pow", &values[0])?;
    let exp = as_f64("pow", &values[1])?;
    Ok(Value::Number(base.powf(exp)))
}

fn builtin_log(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = numeric_args("log", ev, args)?;
    let n = as_f64("log", &values[0])?;
    if n <= 0.0 {
        return Err(EvalError::argument_error(
            "log",
            "argument must be positive",
        ));
    }
    Ok(Value::Number(n.ln()))
}

fn builtin_floor(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    rounding("floor", ev, args, f64::floor)
}

fn builtin_ceil(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    rounding("ceil", ev, args, f64::ceil)
}

fn builtin_round(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    rounding("round", ev, args, f64::round)
}

fn rounding(
    name: &str,
    ev: &mut Evaluator,
    args: &[Expr],
    op: fn(f64) -> f64,
) -> Result<Value, EvalError> {
    let values = numeric_args(name, ev, args)?;
    match &values[0] {
        Value::Number(n) => Ok(Value::Number(op(*n))),
        big @ Value::BigNumber(_) => Ok(big.clone()),
        _ => unreachable!("numeric_args admits only numbers"),
    }
}

fn builtin_min(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    extremum("min", ev, args, Ordering::Less)
}

fn builtin_max(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    extremum("max", ev, args, Ordering::Greater)
}

fn extremum(
    name: &str,
    ev: &mut Evaluator,
    args: &[Expr],
    keep: Ordering,
) -> Result<Value, EvalError> {
    let values = numeric_args(name, ev, args)?;
    let mut iter = values.into_iter();
    let mut best = iter
        .next()
        .ok_or_else(|| EvalError::arity_error(name, "at least 1", 0))?;
    for candidate in iter {
        if numeric_compare(name, &candidate, &best)? == keep {
            best = candidate;
        }
    }
    Ok(best)
}

fn builtin_inc(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    shift("inc", ev, args, 1)
}

fn builtin_dec(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    shift("dec", ev, args, -1)
}

fn shift(name: &str, ev: &mut Evaluator, args: &[Expr], delta: i64) -> Result<Value, EvalError> {
    let values = numeric_args(name, ev, args)?;
    match &values[0] {
        Value::Number(n) => Ok(Value::Number(n + delta as f64)),
        Value::BigNumber(b) => Ok(normalize_int(b + delta, true)),
        _ => unreachable!("numeric_args admits only numbers"),
    }
}

fn integral_big(value: &Value) -> Option<BigInt> {
    match value {
        Value::Number(n) if n.is_finite() && n.fract() == 0.0 => BigInt::from_f64(*n),
        Value::BigNumber(b) => Some(b.clone()),
        _ => None,
    }
}

fn parity(name: &str, ev: &mut Evaluator, args: &[Expr]) -> Result<bool, EvalError> {
    let values = numeric_args(name, ev, args)?;
    let big = integral_big(&values[0]).ok_or_else(|| {
        EvalError::argument_error(name, "argument must be an integer")
    })?;
    Ok((big % 2i32).is_zero())
}

fn builtin_even_q(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    Ok(Value::Bool(parity("even?", ev, args)?))
}

fn builtin_odd_q(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    Ok(Value::Bool(!parity("odd?", ev, args)?))
}
