//! Hash-map operations: hash-map, get, contains?, keys, vals, assoc, dissoc
//!
//! Updates are immutable: a new map is returned, the original is untouched.
//! Keys are strings or keywords, stored as raw key text.

use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expr::Expr;
use crate::value::{map_key, Value};
use cloje_macros::builtin;
use std::collections::HashMap;

fn as_map(name: &str, value: &Value) -> Result<HashMap<String, Value>, EvalError> {
    match value {
        Value::Map(entries) => Ok(entries.clone()),
        other => Err(EvalError::type_error(name, "a hash-map", other)),
    }
}

#[builtin(name = "hash-map", category = "Hash Maps", arity = -1)]
/// Creates a hash-map from alternating keys and values; equivalent to the
/// { … } literal.
///
/// (hash-map :a 1 :b 2) => {:a 1 :b 2}
pub fn builtin_hash_map(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = ev.eval_args(args)?;
    if values.len() % 2 != 0 {
        return Err(EvalError::argument_error(
            "hash-map",
            "expected an even number of arguments",
        ));
    }
    let mut entries = HashMap::with_capacity(values.len() / 2);
    for pair in values.chunks(2) {
        entries.insert(map_key("hash-map", &pair[0])?, pair[1].clone());
    }
    Ok(Value::Map(entries))
}

#[builtin(name = "get", category = "Hash Maps", arity = 2)]
/// Value for a key, or nil when absent.
///
/// (get {:name "Alice"} :name) => "Alice"
/// (get {:a 1} :missing) => nil
pub fn builtin_get(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let map_value = ev.eval(&args[0])?;
    let key_value = ev.eval(&args[1])?;
    let entries = as_map("get", &map_value)?;
    let key = map_key("get", &key_value)?;
    Ok(entries.get(&key).cloned().unwrap_or(Value::Nil))
}

#[builtin(name = "contains?", category = "Hash Maps", arity = 2)]
/// True when the map has an entry for the key.
pub fn builtin_contains_q(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let map_value = ev.eval(&args[0])?;
    let key_value = ev.eval(&args[1])?;
    let entries = as_map("contains?", &map_value)?;
    let key = map_key("contains?", &key_value)?;
    Ok(Value::Bool(entries.contains_key(&key)))
}

#[builtin(name = "keys", category = "Hash Maps", arity = 1)]
/// All keys as keywords, in unspecified order.
pub fn builtin_keys(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let map_value = ev.eval(&args[0])?;
    let entries = as_map("keys", &map_value)?;
    Ok(Value::List(
        entries.into_keys().map(Value::Keyword).collect(),
    ))
}

#[builtin(name = "vals", category = "Hash Maps", arity = 1)]
/// All values, in unspecified order.
pub fn builtin_vals(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let map_value = ev.eval(&args[0])?;
    let entries = as_map("vals", &map_value)?;
    Ok(Value::List(entries.into_values().collect()))
}

#[builtin(name = "assoc", category = "Hash Maps", arity = -1)]
/// A new map with the given key/value pairs added or replaced.
///
/// (assoc {:a 1} :b 2) => {:a 1 :b 2}
pub fn builtin_assoc(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = ev.eval_args(args)?;
    if values.len() < 3 || values.len() % 2 == 0 {
        return Err(EvalError::arity_error(
            "assoc",
            "a map plus key/value pairs",
            values.len(),
        ));
    }
    let mut entries = as_map("assoc", &values[0])?;
    for pair in values[1..].chunks(2) {
        entries.insert(map_key("assoc", &pair[0])?, pair[1].clone());
    }
    Ok(Value::Map(entries))
}

#[builtin(name = "dissoc", category = "Hash Maps", arity = -1)]
/// A new map with the given keys removed.
///
/// (dissoc {:a 1 :b 2} :a) => {:b 2}
pub fn builtin_dissoc(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let values = ev.eval_args(args)?;
    if values.len() < 2 {
        return Err(EvalError::arity_error("dissoc", "at least 2", values.len()));
    }
    let mut entries = as_map("dissoc", &values[0])?;
    for key_value in &values[1..] {
        entries.remove(&map_key("dissoc", key_value)?);
    }
    Ok(Value::Map(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Interpreter;

    fn eval_ok(source: &str) -> Value {
        Interpreter::with_core()
            .expect("interpreter")
            .eval_source(source)
            .unwrap_or_else(|e| panic!("eval of {:?} failed: {}", source, e))
    }

    fn run(source: &str) -> Result<Value, EvalError> {
        Interpreter::with_core().expect("interpreter").eval_source(source)
    }

    #[test]
    fn test_literal_and_constructor_agree() {
        assert_eq!(
            eval_ok("(= {:a 1 :b 2} (hash-map :a 1 :b 2))"),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_get() {
        assert_eq!(
            eval_ok("(get {:name \"Alice\" :age 30} :age)"),
            Value::Number(30.0)
        );
        assert_eq!(eval_ok("(get {:a 1} :missing)"), Value::Nil);
    }

    #[test]
    fn test_string_and_keyword_keys_share_text() {
        assert_eq!(eval_ok("(get {\"a\" 1} :a)"), Value::Number(1.0));
        assert_eq!(eval_ok("(get {:a 1} \"a\")"), Value::Number(1.0));
    }

    #[test]
    fn test_numeric_keys_rejected() {
        assert!(matches!(run("(get {:a 1} 2)"), Err(EvalError::Type { .. })));
        assert!(matches!(run("(hash-map 1 2)"), Err(EvalError::Type { .. })));
    }

    #[test]
    fn test_contains() {
        assert_eq!(eval_ok("(contains? {:a 1} :a)"), Value::Bool(true));
        assert_eq!(eval_ok("(contains? {:a 1} :b)"), Value::Bool(false));
    }

    #[test]
    fn test_keys_and_vals() {
        assert_eq!(
            eval_ok("(sort (vals {:a 1 :b 2}))"),
            Value::List(vec![Value::Number(1.0), Value::Number(2.0)])
        );
        assert_eq!(eval_ok("(count (keys {:a 1 :b 2}))"), Value::Number(2.0));
        assert_eq!(
            eval_ok("(contains? {:a 1} (first (keys {:a 1})))"),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_assoc_builds_new_map() {
        assert_eq!(
            eval_ok("(= (assoc {:a 1} :b 2) {:a 1 :b 2})"),
            Value::Bool(true)
        );
        assert_eq!(
            eval_ok("(= (assoc {} :a 1 :b 2) {:a 1 :b 2})"),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_assoc_and_dissoc_are_immutable() {
        assert_eq!(
            eval_ok("(def m {:a 1}) (assoc m :b 2) (get m :b)"),
            Value::Nil
        );
        assert_eq!(
            eval_ok("(def m {:a 1}) (dissoc m :a) (get m :a)"),
            Value::Number(1.0)
        );
    }

    #[test]
    fn test_dissoc() {
        assert_eq!(
            eval_ok("(= (dissoc {:a 1 :b 2} :a) {:b 2})"),
            Value::Bool(true)
        );
        assert_eq!(
            eval_ok("(= (dissoc {:a 1} :missing) {:a 1})"),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_assoc_odd_pairs_rejected() {
        assert!(matches!(
            run("(assoc {:a 1} :b)"),
            Err(EvalError::Arity { .. })
        ));
    }
}
