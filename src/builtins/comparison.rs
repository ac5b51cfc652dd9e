//! Comparison operations: =, <, >, <=, >=
//!
//! Numeric operands compare by mathematical value across Number and
//! BigNumber; `=` on anything else is structural.

use crate::builtins::arithmetic::big_to_f64;
use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expr::Expr;
use crate::value::Value;
use cloje_macros::builtin;
use num_bigint::BigInt;
use num_traits::FromPrimitive;
use std::cmp::Ordering;

/// Order two numeric values exactly where possible: integral floats
/// compare against big integers without rounding.
pub(crate) fn numeric_compare(
    name: &str,
    a: &Value,
    b: &Value,
) -> Result<Ordering, EvalError> {
    let ordering = match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y),
        (Value::BigNumber(x), Value::BigNumber(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::BigNumber(y)) => float_vs_big(*x, y),
        (Value::BigNumber(x), Value::Number(y)) => float_vs_big(*y, x).map(Ordering::reverse),
        (Value::Number(_) | Value::BigNumber(_), other)
        | (other, Value::Number(_) | Value::BigNumber(_)) => {
            return Err(EvalError::type_error(name, "a number", other));
        }
        (other, _) => return Err(EvalError::type_error(name, "a number", other)),
    };
    ordering.ok_or_else(|| EvalError::argument_error(name, "cannot order NaN"))
}

fn float_vs_big(x: f64, y: &BigInt) -> Option<Ordering> {
    if x.is_finite() && x.fract() == 0.0 {
        if let Some(exact) = BigInt::from_f64(x) {
            return Some(exact.cmp(y));
        }
    }
    x.partial_cmp(&big_to_f64(y))
}

fn compare_with(
    name: &str,
    ev: &mut Evaluator,
    args: &[Expr],
    accept: fn(Ordering) -> bool,
) -> Result<Value, EvalError> {
    let values = ev.eval_args(args)?;
    let ordering = numeric_compare(name, &values[0], &values[1])?;
    Ok(Value::Bool(accept(ordering)))
}

#[builtin(name = "=", category = "Comparison", arity = 2)]
/// Structural equality; numbers compare by value across Number and
/// BigNumber. nil is equal only to nil.
///
/// (= 1 1) => true
/// (= (list 1 2) (list 1 2)) => true
pub fn builtin_eq(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = ev.eval_args(args)?;
    Ok(Value::Bool(values[0] == values[1]))
}

#[builtin(name = "<", category = "Comparison", arity = 2)]
/// True when the first number is strictly smaller.
pub fn builtin_lt(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    compare_with("<", ev, args, |o| o == Ordering::Less)
}

#[builtin(name = ">", category = "Comparison", arity = 2)]
/// True when the first number is strictly greater.
pub fn builtin_gt(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    compare_with(">", ev, args, |o| o == Ordering::Greater)
}

#[builtin(name = "<=", category = "Comparison", arity = 2)]
/// True when the first number is smaller or equal.
pub fn builtin_le(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    compare_with("<=", ev, args, |o| o != Ordering::Greater)
}

#[builtin(name = ">=", category = "Comparison", arity = 2)]
/// True when the first number is greater or equal.
pub fn builtin_ge(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    compare_with(">=", ev, args, |o| o != Ordering::Less)
}
