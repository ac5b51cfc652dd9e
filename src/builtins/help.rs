//! Help surface: doc, help
//!
//! Both read the registry's metadata; categories exist only for this
//! module's benefit.

use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expr::{Expr, ExprKind};
use crate::value::Value;
use cloje_macros::builtin;

fn name_of(value: &Value) -> Result<String, EvalError> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        Value::Keyword(k) => Ok(k.clone()),
        Value::Builtin(name) => Ok(name.clone()),
        Value::Quoted(inner) => match &inner.kind {
            ExprKind::Symbol(s) => Ok(s.clone()),
            _ => Err(EvalError::argument_error(
                "doc",
                "expected a quoted symbol or a name string",
            )),
        },
        other => Err(EvalError::type_error(
            "doc",
            "a name (string, keyword, or quoted symbol)",
            other,
        )),
    }
}

#[builtin(name = "doc", category = "Help", arity = 1)]
/// Documentation string of a registered operation, or nil when unknown.
///
/// (doc '+)
/// (doc "swap!")
pub fn builtin_doc(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    let name = name_of(&value)?;
    match ev.registry().lookup(&name) {
        Some((metadata, _)) => {
            let arity = if metadata.arity < 0 {
                "variadic".to_string()
            } else {
                format!("{} args", metadata.arity)
            };
            Ok(Value::Str(format!(
                "{} [{}, {}]\n{}",
                metadata.name, metadata.category, arity, metadata.help
            )))
        }
        None => Ok(Value::Nil),
    }
}

#[builtin(name = "help", category = "Help", arity = -1)]
/// With no arguments, prints every registered operation grouped by
/// category. With one, prints that operation's documentation.
pub fn builtin_help(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    match args.len() {
        0 => {
            for (category, entries) in ev.registry().by_category() {
                let names: Vec<&str> = entries.iter().map(|m| m.name.as_str()).collect();
                println!("{}: {}", category, names.join(" "));
            }
            Ok(Value::Nil)
        }
        1 => {
            match builtin_doc(ev, args)? {
                Value::Str(text) => println!("{}", text),
                _ => println!("nothing is registered under that name"),
            }
            Ok(Value::Nil)
        }
        n => Err(EvalError::arity_error("help", "0-1", n)),
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::Interpreter;
    use crate::value::Value;

    #[test]
    fn test_doc_returns_registry_help() {
        let interp = Interpreter::with_core().expect("interpreter");
        match interp.eval_source("(doc '+)").expect("doc") {
            Value::Str(text) => {
                assert!(text.starts_with("+ ["));
                assert!(text.contains("Arithmetic"));
            }
            other => panic!("expected string, got {:?}", other),
        }
    }

    #[test]
    fn test_doc_accepts_strings_and_builtin_handles() {
        let interp = Interpreter::with_core().expect("interpreter");
        assert!(matches!(
            interp.eval_source("(doc \"first\")").expect("doc"),
            Value::Str(_)
        ));
        assert!(matches!(
            interp.eval_source("(doc first)").expect("doc"),
            Value::Str(_)
        ));
    }

    #[test]
    fn test_doc_unknown_name_is_nil() {
        let interp = Interpreter::with_core().expect("interpreter");
        assert_eq!(
            interp.eval_source("(doc 'no-such-op)").expect("doc"),
            Value::Nil
        );
    }
}
