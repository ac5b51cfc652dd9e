//! Type predicates: number?, string?, keyword?, nil?, bool?, list?,
//! vector?, map?, fn?, atom?

use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expr::Expr;
use crate::value::Value;
use cloje_macros::builtin;

#[builtin(name = "number?", category = "Type Predicates", arity = 1)]
/// True for numbers, including big integers.
pub fn builtin_number_q(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    Ok(Value::Bool(matches!(
        value,
        Value::Number(_) | Value::BigNumber(_)
    )))
}

#[builtin(name = "string?", category = "Type Predicates", arity = 1)]
/// True for strings.
pub fn builtin_string_q(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    Ok(Value::Bool(matches!(value, Value::Str(_))))
}

#[builtin(name = "keyword?", category = "Type Predicates", arity = 1)]
/// True for keywords.
pub fn builtin_keyword_q(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    Ok(Value::Bool(matches!(value, Value::Keyword(_))))
}

#[builtin(name = "nil?", category = "Type Predicates", arity = 1)]
/// True only for nil.
pub fn builtin_nil_q(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    Ok(Value::Bool(matches!(value, Value::Nil)))
}

#[builtin(name = "bool?", category = "Type Predicates", arity = 1)]
/// True for true and false.
pub fn builtin_bool_q(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    Ok(Value::Bool(matches!(value, Value::Bool(_))))
}

#[builtin(name = "list?", category = "Type Predicates", arity = 1)]
/// True for lists.
pub fn builtin_list_q(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    Ok(Value::Bool(matches!(value, Value::List(_))))
}

#[builtin(name = "vector?", category = "Type Predicates", arity = 1)]
/// True for vectors.
pub fn builtin_vector_q(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    Ok(Value::Bool(matches!(value, Value::Vector(_))))
}

#[builtin(name = "map?", category = "Type Predicates", arity = 1)]
/// True for hash-maps.
pub fn builtin_map_q(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    Ok(Value::Bool(matches!(value, Value::Map(_))))
}

#[builtin(name = "fn?", category = "Type Predicates", arity = 1)]
/// True for anything callable as a function: user functions, builtins,
/// and combinators.
pub fn builtin_fn_q(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    Ok(Value::Bool(matches!(
        value,
        Value::Function(_) | Value::Builtin(_) | Value::Combinator(_)
    )))
}

#[builtin(name = "atom?", category = "Type Predicates", arity = 1)]
/// True for atoms.
pub fn builtin_atom_q(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    Ok(Value::Bool(matches!(value, Value::Atom(_))))
}

#[cfg(test)]
mod tests {
    use crate::interpreter::Interpreter;
    use crate::value::Value;

    fn eval_ok(source: &str) -> Value {
        Interpreter::with_core()
            .expect("interpreter")
            .eval_source(source)
            .unwrap_or_else(|e| panic!("eval of {:?} failed: {}", source, e))
    }

    #[test]
    fn test_predicates() {
        assert_eq!(eval_ok("(number? 1)"), Value::Bool(true));
        assert_eq!(eval_ok("(number? 10000000000000000000)"), Value::Bool(true));
        assert_eq!(eval_ok("(string? \"s\")"), Value::Bool(true));
        assert_eq!(eval_ok("(keyword? :k)"), Value::Bool(true));
        assert_eq!(eval_ok("(nil? nil)"), Value::Bool(true));
        assert_eq!(eval_ok("(nil? false)"), Value::Bool(false));
        assert_eq!(eval_ok("(bool? false)"), Value::Bool(true));
        assert_eq!(eval_ok("(list? (list 1))"), Value::Bool(true));
        assert_eq!(eval_ok("(list? [1])"), Value::Bool(false));
        assert_eq!(eval_ok("(vector? [1])"), Value::Bool(true));
        assert_eq!(eval_ok("(map? {})"), Value::Bool(true));
        assert_eq!(eval_ok("(atom? (atom 1))"), Value::Bool(true));
    }

    #[test]
    fn test_fn_predicate_covers_all_callables() {
        assert_eq!(eval_ok("(fn? (fn [x] x))"), Value::Bool(true));
        assert_eq!(eval_ok("(fn? +)"), Value::Bool(true));
        assert_eq!(eval_ok("(fn? (partial + 1))"), Value::Bool(true));
        assert_eq!(eval_ok("(fn? 1)"), Value::Bool(false));
    }
}
