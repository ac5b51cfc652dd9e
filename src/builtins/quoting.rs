//! Quoting and macro inspection: quote, unquote, macroexpand
//!
//! `quote` and `quasiquote` are intercepted as special forms at call
//! sites; these registry entries make the names first-class and give
//! `macroexpand` a home.

use crate::error::EvalError;
use crate::eval::{expand_once, Evaluator};
use crate::expr::{Expr, ExprKind};
use crate::value::Value;
use cloje_macros::builtin;
use std::rc::Rc;

#[builtin(name = "quote", category = "Quoting", arity = 1)]
/// Returns the argument expression unevaluated; equivalent to 'x.
pub fn builtin_quote(_ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    Ok(Value::Quoted(Rc::new(args[0].clone())))
}

#[builtin(name = "unquote", category = "Quoting", arity = 1)]
/// Only meaningful inside quasiquote, where the evaluator splices it; as a
/// call it is always an error.
pub fn builtin_unquote(_ev: &mut Evaluator, _args: &[Expr]) -> Result<Value, EvalError> {
    Err(EvalError::argument_error(
        "unquote",
        "used outside quasiquote",
    ))
}

#[builtin(name = "macroexpand", category = "Quoting", arity = 1)]
/// Performs one level of macro expansion on a quoted form and returns the
/// result quoted for inspection. The macro table consulted is the current
/// environment; a form whose head is no macro comes back unchanged.
///
/// (macroexpand '(when cond body))
pub fn builtin_macroexpand(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    let form = match &value {
        Value::Quoted(inner) => (**inner).clone(),
        other => other.to_expr(),
    };

    if let ExprKind::List(items) = &form.kind {
        if let Some(ExprKind::Symbol(name)) = items.first().map(|e| &e.kind) {
            if let Some(Value::Macro(mac)) = ev.env().get(name) {
                let expanded = expand_once(ev, &mac, &items[1..])?;
                return Ok(Value::Quoted(Rc::new(expanded)));
            }
        }
    }

    Ok(Value::Quoted(Rc::new(form)))
}
