//! Sequence operations, polymorphic over lists, vectors, strings (as
//! sequences of single-character strings), and nil (the empty sequence).

use crate::builtins::comparison::numeric_compare;
use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expr::Expr;
use crate::value::Value;
use cloje_macros::builtin;
use std::cmp::Ordering;

/// Materialize any sequence-shaped value into its elements
pub(crate) fn seq_items(name: &str, value: &Value) -> Result<Vec<Value>, EvalError> {
    match value {
        Value::List(items) | Value::Vector(items) => Ok(items.clone()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
        Value::Nil => Ok(Vec::new()),
        other => Err(EvalError::type_error(name, "a sequence", other)),
    }
}

fn index_arg(name: &str, value: &Value, len: usize) -> Result<usize, EvalError> {
    let n = match value {
        Value::Number(n) if n.fract() == 0.0 => *n as i64,
        other => return Err(EvalError::type_error(name, "an integer index", other)),
    };
    if n < 0 || n as usize >= len {
        return Err(EvalError::IndexOutOfBounds { index: n, len });
    }
    Ok(n as usize)
}

fn count_arg(name: &str, value: &Value) -> Result<usize, EvalError> {
    match value {
        Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 => Ok(*n as usize),
        other => Err(EvalError::type_error(name, "a non-negative integer", other)),
    }
}

/// Ordering used by `sort`: numbers by value, strings/keywords/booleans
/// lexically, anything else refuses.
fn compare_elements(name: &str, a: &Value, b: &Value) -> Result<Ordering, EvalError> {
    match (a, b) {
        (Value::Number(_) | Value::BigNumber(_), Value::Number(_) | Value::BigNumber(_)) => {
            numeric_compare(name, a, b)
        }
        (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
        (Value::Keyword(x), Value::Keyword(y)) => Ok(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
        _ => Err(EvalError::argument_error(
            name,
            format!("cannot order {} against {}", a.type_name(), b.type_name()),
        )),
    }
}

#[builtin(name = "list", category = "Sequences", arity = -1)]
/// Creates a list of the evaluated arguments.
///
/// (list 1 2 3) => (1 2 3)
pub fn builtin_list(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    Ok(Value::List(ev.eval_args(args)?))
}

#[builtin(name = "vector", category = "Sequences", arity = -1)]
/// Creates a vector of the evaluated arguments; equivalent to the [ … ]
/// literal.
pub fn builtin_vector(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    Ok(Value::Vector(ev.eval_args(args)?))
}

#[builtin(name = "first", category = "Sequences", arity = 1)]
/// First element of a sequence, or nil when empty.
pub fn builtin_first(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    let items = seq_items("first", &value)?;
    Ok(items.into_iter().next().unwrap_or(Value::Nil))
}

#[builtin(name = "second", category = "Sequences", arity = 1)]
/// Second element of a sequence, or nil.
pub fn builtin_second(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    let items = seq_items("second", &value)?;
    Ok(items.into_iter().nth(1).unwrap_or(Value::Nil))
}

#[builtin(name = "rest", category = "Sequences", arity = 1)]
/// Everything after the first element, always as a list; empty input gives
/// an empty list.
pub fn builtin_rest(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    let mut items = seq_items("rest", &value)?;
    if !items.is_empty() {
        items.remove(0);
    }
    Ok(Value::List(items))
}

#[builtin(name = "last", category = "Sequences", arity = 1)]
/// Last element of a sequence, or nil when empty.
pub fn builtin_last(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    let items = seq_items("last", &value)?;
    Ok(items.into_iter().next_back().unwrap_or(Value::Nil))
}

#[builtin(name = "nth", category = "Sequences", arity = 2)]
/// Zero-based, bounds-checked element access. For strings the element is a
/// single code point.
///
/// (nth [10 20 30] 1) => 20
/// (nth "abc" 1) => "b"
pub fn builtin_nth(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let coll = ev.eval(&args[0])?;
    let idx_value = ev.eval(&args[1])?;
    let mut items = seq_items("nth", &coll)?;
    let index = index_arg("nth", &idx_value, items.len())?;
    Ok(items.swap_remove(index))
}

#[builtin(name = "empty?", category = "Sequences", arity = 1)]
/// True when the sequence has no elements.
pub fn builtin_empty_q(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    let items = seq_items("empty?", &value)?;
    Ok(Value::Bool(items.is_empty()))
}

#[builtin(name = "seq", category = "Sequences", arity = 1)]
/// The canonical sequence view: a list of the elements, or nil when empty.
pub fn builtin_seq(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    let items = seq_items("seq", &value)?;
    if items.is_empty() {
        Ok(Value::Nil)
    } else {
        Ok(Value::List(items))
    }
}

#[builtin(name = "take", category = "Sequences", arity = 2)]
/// First n elements as a list; n past the end takes everything.
pub fn builtin_take(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let n_value = ev.eval(&args[0])?;
    let coll = ev.eval(&args[1])?;
    let n = count_arg("take", &n_value)?;
    let mut items = seq_items("take", &coll)?;
    items.truncate(n);
    Ok(Value::List(items))
}

#[builtin(name = "drop", category = "Sequences", arity = 2)]
/// All but the first n elements as a list.
pub fn builtin_drop(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let n_value = ev.eval(&args[0])?;
    let coll = ev.eval(&args[1])?;
    let n = count_arg("drop", &n_value)?;
    let items = seq_items("drop", &coll)?;
    Ok(Value::List(items.into_iter().skip(n).collect()))
}

#[builtin(name = "reverse", category = "Sequences", arity = 1)]
/// Elements in reverse order, as a list.
pub fn builtin_reverse(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    let mut items = seq_items("reverse", &value)?;
    items.reverse();
    Ok(Value::List(items))
}

#[builtin(name = "distinct", category = "Sequences", arity = 1)]
/// Elements with duplicates removed, keeping first occurrences.
pub fn builtin_distinct(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    let items = seq_items("distinct", &value)?;
    let mut out: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    Ok(Value::List(out))
}

#[builtin(name = "sort", category = "Sequences", arity = 1)]
/// Elements in ascending order, as a list. Elements must be mutually
/// orderable.
pub fn builtin_sort(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    let mut items = seq_items("sort", &value)?;
    let mut failure = None;
    items.sort_by(|a, b| match compare_elements("sort", a, b) {
        Ok(ordering) => ordering,
        Err(err) => {
            failure.get_or_insert(err);
            Ordering::Equal
        }
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(Value::List(items)),
    }
}

#[builtin(name = "conj", category = "Sequences", arity = -1)]
/// Conjoin elements onto a collection: appended to vectors, prepended one
/// at a time to lists. nil counts as an empty list.
///
/// (conj [1 2] 3 4) => [1 2 3 4]
/// (conj (list 1 2) 3 4) => (4 3 1 2)
pub fn builtin_conj(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let mut values = ev.eval_args(args)?;
    if values.len() < 2 {
        return Err(EvalError::arity_error("conj", "at least 2", values.len()));
    }
    let additions = values.split_off(1);
    let target = values.remove(0);
    match target {
        Value::Vector(mut items) => {
            items.extend(additions);
            Ok(Value::Vector(items))
        }
        Value::List(mut items) => {
            for addition in additions {
                items.insert(0, addition);
            }
            Ok(Value::List(items))
        }
        Value::Nil => {
            let mut items = Vec::new();
            for addition in additions {
                items.insert(0, addition);
            }
            Ok(Value::List(items))
        }
        other => Err(EvalError::type_error("conj", "a list or vector", &other)),
    }
}

#[builtin(name = "count", category = "Sequences", arity = 1)]
/// Number of elements; strings count code points.
pub fn builtin_count(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    match &value {
        Value::Map(entries) => Ok(Value::Number(entries.len() as f64)),
        _ => {
            let items = seq_items("count", &value)?;
            Ok(Value::Number(items.len() as f64))
        }
    }
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
    fn test_first_rest_last_second() {
        assert_eq!(eval_ok("(first [10 20 30])"), Value::Number(10.0));
        assert_eq!(
            eval_ok("(rest [10 20 30])"),
            Value::List(vec![Value::Number(20.0), Value::Number(30.0)])
        );
        assert_eq!(eval_ok("(last (list 1 2 3))"), Value::Number(3.0));
        assert_eq!(eval_ok("(second [1 2 3])"), Value::Number(2.0));
    }

    #[test]
    fn test_empty_sequences_yield_nil_not_errors() {
        assert_eq!(eval_ok("(first [])"), Value::Nil);
        assert_eq!(eval_ok("(last nil)"), Value::Nil);
        assert_eq!(eval_ok("(second [1])"), Value::Nil);
        assert_eq!(eval_ok("(rest [])"), Value::List(vec![]));
    }

    #[test]
    fn test_strings_are_sequences_of_code_points() {
        assert_eq!(eval_ok("(first \"abc\")"), Value::Str("a".to_string()));
        assert_eq!(eval_ok("(nth \"abc\" 1)"), Value::Str("b".to_string()));
        assert_eq!(eval_ok("(nth \"héllo\" 1)"), Value::Str("é".to_string()));
        assert_eq!(eval_ok("(count \"héllo\")"), Value::Number(5.0));
    }

    #[test]
    fn test_nth_bounds_checked() {
        assert!(matches!(
            run("(nth [1 2] 5)"),
            Err(EvalError::IndexOutOfBounds { index: 5, len: 2 })
        ));
        assert!(matches!(
            run("(nth [1 2] -1)"),
            Err(EvalError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_take_drop() {
        assert_eq!(
            eval_ok("(take 2 [1 2 3])"),
            Value::List(vec![Value::Number(1.0), Value::Number(2.0)])
        );
        assert_eq!(eval_ok("(take 9 [1])"), Value::List(vec![Value::Number(1.0)]));
        assert_eq!(
            eval_ok("(drop 1 (list 1 2 3))"),
            Value::List(vec![Value::Number(2.0), Value::Number(3.0)])
        );
    }

    #[test]
    fn test_reverse_distinct_sort() {
        assert_eq!(
            eval_ok("(reverse [1 2 3])"),
            Value::List(vec![
                Value::Number(3.0),
                Value::Number(2.0),
                Value::Number(1.0)
            ])
        );
        assert_eq!(
            eval_ok("(distinct [1 2 1 3 2])"),
            Value::List(vec![
                Value::Number(1.0),
                Value::Number(2.0),
                Value::Number(3.0)
            ])
        );
        assert_eq!(
            eval_ok("(sort [3 1 2])"),
            Value::List(vec![
                Value::Number(1.0),
                Value::Number(2.0),
                Value::Number(3.0)
            ])
        );
        assert!(run("(sort [1 \"a\"])").is_err());
    }

    #[test]
    fn test_conj_direction() {
        assert_eq!(
            eval_ok("(conj [1 2] 3)"),
            Value::Vector(vec![
                Value::Number(1.0),
                Value::Number(2.0),
                Value::Number(3.0)
            ])
        );
        assert_eq!(
            eval_ok("(conj (list 1 2) 3 4)"),
            Value::List(vec![
                Value::Number(4.0),
                Value::Number(3.0),
                Value::Number(1.0),
                Value::Number(2.0)
            ])
        );
    }

    #[test]
    fn test_conj_is_immutable() {
        assert_eq!(
            eval_ok("(def v [1 2]) (conj v 3) v"),
            Value::Vector(vec![Value::Number(1.0), Value::Number(2.0)])
        );
    }

    #[test]
    fn test_seq_and_empty() {
        assert_eq!(eval_ok("(seq [])"), Value::Nil);
        assert_eq!(
            eval_ok("(seq \"ab\")"),
            Value::List(vec![Value::Str("a".to_string()), Value::Str("b".to_string())])
        );
        assert_eq!(eval_ok("(empty? nil)"), Value::Bool(true));
        assert_eq!(eval_ok("(empty? [1])"), Value::Bool(false));
    }

    #[test]
    fn test_count() {
        assert_eq!(eval_ok("(count [1 2 3])"), Value::Number(3.0));
        assert_eq!(eval_ok("(count nil)"), Value::Number(0.0));
        assert_eq!(eval_ok("(count {:a 1 :b 2})"), Value::Number(2.0));
    }
}
