//! Logical operations: and, or, not
//!
//! `and` and `or` receive their argument expressions unevaluated and
//! short-circuit; later arguments are never touched once the answer is
//! known.

use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expr::Expr;
use crate::value::Value;
use cloje_macros::builtin;

#[builtin(name = "and", category = "Logic", arity = -1)]
/// Evaluates arguments left to right, returning the first falsey value or
/// the last value. (and) => true.
///
/// (and 1 2 3) => 3
/// (and 1 nil 3) => nil
pub fn builtin_and(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let mut last = Value::Bool(true);
    for arg in args {
        let value = ev.eval(arg)?;
        if !value.is_truthy() {
            return Ok(value);
        }
        last = value;
    }
    Ok(last)
}

#[builtin(name = "or", category = "Logic", arity = -1)]
/// Evaluates arguments left to right, returning the first truthy value or
/// the last value. (or) => false.
///
/// (or nil false 3) => 3
/// (or nil false) => false
pub fn builtin_or(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let mut last = Value::Bool(false);
    for arg in args {
        let value = ev.eval(arg)?;
        if value.is_truthy() {
            return Ok(value);
        }
        last = value;
    }
    Ok(last)
}

#[builtin(name = "not", category = "Logic", arity = 1)]
/// Logical negation by truthiness: true only for false and nil.
pub fn builtin_not(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    Ok(Value::Bool(!value.is_truthy()))
}
