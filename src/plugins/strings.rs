//! Strings plugin: str, str-upper, str-lower, str-trim, str-split,
//! str-join, str-contains?, str-replace, subs
//!
//! Positions and lengths are code-point based throughout.

use crate::builtins::sequences::seq_items;
use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expr::Expr;
use crate::registry::{Metadata, Plugin, Registry};
use crate::value::Value;

pub static PLUGIN: Plugin = Plugin {
    name: "strings",
    version: "0.3.0",
    dependencies: &[],
    register,
};

fn register(registry: &mut Registry) -> Result<(), EvalError> {
    registry.register(
        Metadata::new(
            "str",
            "Strings",
            -1,
            "Concatenates the raw renderings of its arguments; nil renders as the empty string.",
        ),
        builtin_str,
    )?;
    registry.register(
        Metadata::new("str-upper", "Strings", 1, "Uppercase copy of a string."),
        builtin_upper,
    )?;
    registry.register(
        Metadata::new("str-lower", "Strings", 1, "Lowercase copy of a string."),
        builtin_lower,
    )?;
    registry.register(
        Metadata::new("str-trim", "Strings", 1, "Copy with surrounding whitespace removed."),
        builtin_trim,
    )?;
    registry.register(
        Metadata::new(
            "str-split",
            "Strings",
            2,
            "Splits a string on a separator, returning a list of strings.",
        ),
        builtin_split,
    )?;
    registry.register(
        Metadata::new(
            "str-join",
            "Strings",
            2,
            "Joins the elements of a sequence with a separator string.",
        ),
        builtin_join,
    )?;
    registry.register(
        Metadata::new(
            "str-contains?",
            "Strings",
            2,
            "True when the first string contains the second.",
        ),
        builtin_contains,
    )?;
    registry.register(
        Metadata::new(
            "str-replace",
            "Strings",
            3,
            "Copy with every occurrence of a pattern replaced.",
        ),
        builtin_replace,
    )?;
    registry.register(
        Metadata::new(
            "subs",
            "Strings",
            -1,
            "Substring by code-point start (and optional end), bounds-checked.",
        ),
        builtin_subs,
    )?;
    Ok(())
}

fn as_str(name: &str, value: &Value) -> Result<String, EvalError> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        other => Err(EvalError::type_error(name, "a string", other)),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Nil => String::new(),
        other => other.to_string(),
    }
}

fn builtin_str(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = ev.eval_args(args)?;
    Ok(Value::Str(values.iter().map(render).collect()))
}

fn builtin_upper(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    Ok(Value::Str(as_str("str-upper", &value)?.to_uppercase()))
}

fn builtin_lower(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    Ok(Value::Str(as_str("str-lower", &value)?.to_lowercase()))
}

fn builtin_trim(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    Ok(Value::Str(as_str("str-trim", &value)?.trim().to_string()))
}

fn builtin_split(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let string_value = ev.eval(&args[0])?;
    let sep_value = ev.eval(&args[1])?;
    let string = as_str("str-split", &string_value)?;
    let sep = as_str("str-split", &sep_value)?;
    if sep.is_empty() {
        return Err(EvalError::argument_error(
            "str-split",
            "separator must be non-empty",
        ));
    }
    Ok(Value::List(
        string
            .split(&sep)
            .map(|part| Value::Str(part.to_string()))
            .collect(),
    ))
}

fn builtin_join(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let sep_value = ev.eval(&args[0])?;
    let coll = ev.eval(&args[1])?;
    let sep = as_str("str-join", &sep_value)?;
    let parts: Vec<String> = seq_items("str-join", &coll)?
        .iter()
        .map(render)
        .collect();
    Ok(Value::Str(parts.join(&sep)))
}

fn builtin_contains(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let haystack_value = ev.eval(&args[0])?;
    let needle_value = ev.eval(&args[1])?;
    let haystack = as_str("str-contains?", &haystack_value)?;
    let needle = as_str("str-contains?", &needle_value)?;
    Ok(Value::Bool(haystack.contains(&needle)))
}

fn builtin_replace(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let string_value = ev.eval(&args[0])?;
    let from_value = ev.eval(&args[1])?;
    let to_value = ev.eval(&args[2])?;
    let string = as_str("str-replace", &string_value)?;
    let from = as_str("str-replace", &from_value)?;
    let to = as_str("str-replace", &to_value)?;
    if from.is_empty() {
        return Err(EvalError::argument_error(
            "str-replace",
            "pattern must be non-empty",
        ));
    }
    Ok(Value::Str(string.replace(&from, &to)))
}

fn builtin_subs(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = ev.eval_args(args)?;
    if values.len() < 2 || values.len() > 3 {
        return Err(EvalError::arity_error("subs", "2-3", values.len()));
    }
    let chars: Vec<char> = as_str("subs", &values[0])?.chars().collect();
    let start = bound("subs", &values[1], chars.len())?;
    let end = match values.get(2) {
        Some(value) => bound("subs", value, chars.len())?,
        None => chars.len(),
    };
    if start > end {
        return Err(EvalError::argument_error("subs", "start is past end"));
    }
    Ok(Value::Str(chars[start..end].iter().collect()))
}

fn bound(name: &str, value: &Value, len: usize) -> Result<usize, EvalError> {
    let n = match value {
        Value::Number(n) if n.fract() == 0.0 => *n as i64,
        other => return Err(EvalError::type_error(name, "an integer index", other)),
    };
    if n < 0 || n as usize > len {
        return Err(EvalError::IndexOutOfBounds { index: n, len });
    }
    Ok(n as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Interpreter;

    fn interp() -> Interpreter {
        let mut registry = Registry::with_core().expect("core registry");
        registry.install(&PLUGIN).expect("install strings");
        Interpreter::new(registry)
    }

    fn eval_ok(source: &str) -> Value {
        interp()
            .eval_source(source)
            .unwrap_or_else(|e| panic!("eval of {:?} failed: {}", source, e))
    }

    #[test]
    fn test_str_concatenates_raw() {
        assert_eq!(
            eval_ok("(str \"n=\" 42 \" \" :k)"),
            Value::Str("n=42 :k".to_string())
        );
        assert_eq!(eval_ok("(str nil)"), Value::Str(String::new()));
        assert_eq!(eval_ok("(str)"), Value::Str(String::new()));
    }

    #[test]
    fn test_case_and_trim() {
        assert_eq!(eval_ok("(str-upper \"abc\")"), Value::Str("ABC".to_string()));
        assert_eq!(eval_ok("(str-lower \"AbC\")"), Value::Str("abc".to_string()));
        assert_eq!(eval_ok("(str-trim \"  x \")"), Value::Str("x".to_string()));
    }

    #[test]
    fn test_split_and_join_round_trip() {
        assert_eq!(
            eval_ok("(str-split \"a,b,c\" \",\")"),
            Value::List(vec![
                Value::Str("a".to_string()),
                Value::Str("b".to_string()),
                Value::Str("c".to_string())
            ])
        );
        assert_eq!(
            eval_ok("(str-join \",\" (str-split \"a,b,c\" \",\"))"),
            Value::Str("a,b,c".to_string())
        );
    }

    #[test]
    fn test_contains_and_replace() {
        assert_eq!(eval_ok("(str-contains? \"hello\" \"ell\")"), Value::Bool(true));
        assert_eq!(
            eval_ok("(str-replace \"aXbX\" \"X\" \"-\")"),
            Value::Str("a-b-".to_string())
        );
    }

    #[test]
    fn test_subs_is_code_point_based() {
        assert_eq!(eval_ok("(subs \"héllo\" 1 3)"), Value::Str("él".to_string()));
        assert_eq!(eval_ok("(subs \"abc\" 1)"), Value::Str("bc".to_string()));
        assert!(matches!(
            interp().eval_source("(subs \"abc\" 0 9)"),
            Err(EvalError::IndexOutOfBounds { .. })
        ));
    }
}
