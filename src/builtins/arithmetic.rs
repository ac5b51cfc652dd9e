//! Arithmetic operations: +, -, *, /, %
//!
//! Variadic where that makes sense; promotion to arbitrary-precision
//! integers is decided by scanning the operands before any computation so
//! intermediate precision is never lost mid-reduction.

use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expr::Expr;
use crate::tokenizer::MAX_SAFE_INTEGER;
use crate::value::Value;
use cloje_macros::builtin;
use num_bigint::{BigInt, Sign};
use num_traits::{FromPrimitive, ToPrimitive};

/// Evaluate arguments and require every one to be numeric
pub(crate) fn numeric_args(
    name: &str,
    ev: &mut Evaluator,
    args: &[Expr],
) -> Result<Vec<Value>, EvalError> {
    let values = ev.eval_args(args)?;
    for value in &values {
        if !matches!(value, Value::Number(_) | Value::BigNumber(_)) {
            return Err(EvalError::type_error(name, "a number", value));
        }
    }
    Ok(values)
}

pub(crate) fn as_f64(name: &str, value: &Value) -> Result<f64, EvalError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::BigNumber(b) => Ok(big_to_f64(b)),
        other => Err(EvalError::type_error(name, "a number", other)),
    }
}

pub(crate) fn big_to_f64(b: &BigInt) -> f64 {
    b.to_f64().unwrap_or(if b.sign() == Sign::Minus {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    })
}

fn all_integral(values: &[Value]) -> bool {
    values.iter().all(|value| match value {
        Value::Number(n) => n.is_finite() && n.fract() == 0.0,
        Value::BigNumber(_) => true,
        _ => false,
    })
}

fn any_big(values: &[Value]) -> bool {
    values.iter().any(|v| matches!(v, Value::BigNumber(_)))
}

// Only valid on integral values; callers check with all_integral first.
fn to_bigint(value: &Value) -> BigInt {
    match value {
        Value::Number(n) => BigInt::from_f64(*n).unwrap_or_default(),
        Value::BigNumber(b) => b.clone(),
        _ => BigInt::default(),
    }
}

/// Narrow an exact integer result back to a Number when it fits the safe
/// float range and no operand forced promotion.
pub(crate) fn normalize_int(result: BigInt, promote: bool) -> Value {
    if !promote {
        if let Some(n) = result.to_i64() {
            if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&n) {
                return Value::Number(n as f64);
            }
        }
    }
    Value::BigNumber(result)
}

#[builtin(name = "+", category = "Arithmetic", arity = -1)]
/// Returns the sum of all arguments. Any big-number operand promotes the
/// result, as does an exact integer sum outside the safe float range.
///
/// (+ 1 2 3) => 6
/// (+) => 0
pub fn builtin_add(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = numeric_args("+", ev, args)?;
    if all_integral(&values) {
        let promote = any_big(&values);
        let mut sum = BigInt::default();
        for value in &values {
            sum += to_bigint(value);
        }
        Ok(normalize_int(sum, promote))
    } else {
        let mut sum = 0.0;
        for value in &values {
            sum += as_f64("+", value)?;
        }
        Ok(Value::Number(sum))
    }
}

#[builtin(name = "-", category = "Arithmetic", arity = -1)]
/// Subtracts subsequent arguments from the first. With one argument,
/// returns its negation.
///
/// (- 10 3 2) => 5
/// (- 5) => -5
pub fn builtin_sub(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = numeric_args("-", ev, args)?;
    if values.is_empty() {
        return Err(EvalError::arity_error("-", "at least 1", 0));
    }

    if all_integral(&values) {
        let promote = any_big(&values);
        let mut result = to_bigint(&values[0]);
        if values.len() == 1 {
            return Ok(normalize_int(-result, promote));
        }
        for value in &values[1..] {
            result -= to_bigint(value);
        }
        Ok(normalize_int(result, promote))
    } else {
        let mut result = as_f64("-", &values[0])?;
        if values.len() == 1 {
            return Ok(Value::Number(-result));
        }
        for value in &values[1..] {
            result -= as_f64("-", value)?;
        }
        Ok(Value::Number(result))
    }
}

#[builtin(name = "*", category = "Arithmetic", arity = -1)]
/// Returns the product of all arguments.
///
/// (* 2 3 4) => 24
/// (*) => 1
pub fn builtin_mul(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = numeric_args("*", ev, args)?;
    if all_integral(&values) {
        let promote = any_big(&values);
        let mut product = BigInt::from(1);
        for value in &values {
            product *= to_bigint(value);
        }
        Ok(normalize_int(product, promote))
    } else {
        let mut product = 1.0;
        for value in &values {
            product *= as_f64("*", value)?;
        }
        Ok(Value::Number(product))
    }
}

#[builtin(name = "/", category = "Arithmetic", arity = -1)]
/// Divides the first argument by the rest. Integer operands still yield a
/// floating result. With one argument, returns the reciprocal.
///
/// (/ 20 4) => 5
/// (/ 4) => 0.25
pub fn builtin_div(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = numeric_args("/", ev, args)?;
    if values.is_empty() {
        return Err(EvalError::arity_error("/", "at least 1", 0));
    }

    let first = as_f64("/", &values[0])?;
    if values.len() == 1 {
        if first == 0.0 {
            return Err(EvalError::DivisionByZero { position: None });
        }
        return Ok(Value::Number(1.0 / first));
    }

    let mut result = first;
    for value in &values[1..] {
        let divisor = as_f64("/", value)?;
        if divisor == 0.0 {
            return Err(EvalError::DivisionByZero { position: None });
        }
        result /= divisor;
    }
    Ok(Value::Number(result))
}

#[builtin(name = "%", category = "Arithmetic", arity = 2)]
/// Floating modulo; the result takes the sign of the dividend.
///
/// (% 17 5) => 2
/// (% -7 2) => -1
pub fn builtin_mod(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = numeric_args("%", ev, args)?;
    let dividend = as_f64("%", &values[0])?;
    let divisor = as_f64("%", &values[1])?;
    if divisor == 0.0 {
        return Err(EvalError::DivisionByZero { position: None });
    }
    Ok(Value::Number(dividend % divisor))
}
