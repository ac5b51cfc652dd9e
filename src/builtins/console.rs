//! Console output: print, println, pr, prn
//!
//! print/println render raw (strings without quotes); pr/prn render
//! re-escaped so the output reads back.

use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expr::Expr;
use crate::value::Value;
use cloje_macros::builtin;

fn join(values: &[Value], readably: bool) -> String {
    values
        .iter()
        .map(|v| {
            if readably {
                v.pr_str()
            } else {
                v.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[builtin(name = "print", category = "Console", arity = -1)]
/// Prints arguments separated by spaces, without a newline. Strings print
/// raw.
pub fn builtin_print(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = ev.eval_args(args)?;
    print!("{}", join(&values, false));
    Ok(Value::Nil)
}

#[builtin(name = "println", category = "Console", arity = -1)]
/// Prints arguments separated by spaces, followed by a newline.
pub fn builtin_println(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = ev.eval_args(args)?;
    println!("{}", join(&values, false));
    Ok(Value::Nil)
}

#[builtin(name = "pr", category = "Console", arity = -1)]
/// Prints arguments in re-escaped form, without a newline.
pub fn builtin_pr(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = ev.eval_args(args)?;
    print!("{}", join(&values, true));
    Ok(Value::Nil)
}

#[builtin(name = "prn", category = "Console", arity = -1)]
/// Prints arguments in re-escaped form, followed by a newline.
pub fn builtin_prn(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = ev.eval_args(args)?;
    println!("{}", join(&values, true));
    Ok(Value::Nil)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_raw_vs_readable() {
        let values = vec![Value::Str("hi".to_string()), Value::Number(1.0)];
        assert_eq!(join(&values, false), "hi 1");
        assert_eq!(join(&values, true), "\"hi\" 1");
    }
}
