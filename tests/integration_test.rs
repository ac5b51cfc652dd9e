// ABOUTME: End-to-end tests driving source text through the full pipeline

use cloje::error::EvalError;
use cloje::interpreter::Interpreter;
use cloje::registry::Registry;
use cloje::value::Value;

/// Full interpreter: core builtins plus every bundled plugin
fn setup() -> Interpreter {
    let mut registry = Registry::with_core().expect("core registry");
    cloje::plugins::install_all(&mut registry).expect("plugin install");
    Interpreter::new(registry)
}

fn eval_ok(interp: &Interpreter, source: &str) -> Value {
    interp
        .eval_source(source)
        .unwrap_or_else(|e| panic!("eval of {:?} failed: {}", source, e))
}

#[test]
fn test_arithmetic_pipeline() {
    let interp = setup();
    assert_eq!(eval_ok(&interp, "(+ 1 2 3)"), Value::Number(6.0));
    assert_eq!(eval_ok(&interp, "(* (+ 1 2) 3)"), Value::Number(9.0));
}

#[test]
fn test_let_with_dependent_bindings() {
    let interp = setup();
    assert_eq!(
        eval_ok(&interp, "(let [x 5 y (+ x 3)] (* x y))"),
        Value::Number(40.0)
    );
}

#[test]
fn test_factorial_promotes_to_big_number() {
    let interp = setup();
    let result = eval_ok(
        &interp,
        "(def fact (fn [n] (if (<= n 1) 1 (* n (fact (- n 1)))))) (fact 20)",
    );
    match result {
        Value::BigNumber(b) => assert_eq!(b.to_string(), "2432902008176640000"),
        other => panic!("expected big number, got {:?}", other),
    }
    assert_eq!(
        eval_ok(&interp, "(= (fact 20) 2432902008176640000)"),
        Value::Bool(true)
    );
}

#[test]
fn test_atom_swap_deref() {
    let interp = setup();
    assert_eq!(
        eval_ok(
            &interp,
            "(def a (atom 0)) (swap! a (fn [v] (+ v 10))) (deref a)"
        ),
        Value::Number(10.0)
    );
}

#[test]
fn test_sequence_accessors() {
    let interp = setup();
    assert_eq!(eval_ok(&interp, "(first [10 20 30])"), Value::Number(10.0));
    assert_eq!(
        eval_ok(&interp, "(rest [10 20 30])"),
        Value::List(vec![Value::Number(20.0), Value::Number(30.0)])
    );
    assert_eq!(eval_ok(&interp, "(nth \"abc\" 1)"), Value::Str("b".to_string()));
    assert_eq!(eval_ok(&interp, "(first [])"), Value::Nil);
}

#[test]
fn test_hash_map_access() {
    let interp = setup();
    assert_eq!(
        eval_ok(&interp, "(get {:name \"Alice\" :age 30} :age)"),
        Value::Number(30.0)
    );
    assert_eq!(eval_ok(&interp, "(get {:a 1} :missing)"), Value::Nil);
    assert_eq!(
        eval_ok(&interp, "(= (assoc {:a 1} :b 2) {:a 1 :b 2})"),
        Value::Bool(true)
    );
}

#[test]
fn test_higher_order_pipeline() {
    let interp = setup();
    assert_eq!(
        eval_ok(
            &interp,
            "(reduce + 0 (map (fn [x] (* x x)) (filter odd? (range 10))))"
        ),
        Value::Number(165.0)
    );
}

#[test]
fn test_macro_driven_control_flow() {
    let interp = setup();
    eval_ok(
        &interp,
        "(defmacro my-when [c b] (list 'if c b nil))
         (defmacro my-unless [c b] `(if ~c nil ~b))",
    );
    assert_eq!(eval_ok(&interp, "(my-when (< 1 2) :yes)"), Value::Keyword("yes".to_string()));
    assert_eq!(eval_ok(&interp, "(my-when (> 1 2) :yes)"), Value::Nil);
    assert_eq!(eval_ok(&interp, "(my-unless (> 1 2) :no)"), Value::Keyword("no".to_string()));
}

#[test]
fn test_closure_counter_over_atom() {
    let interp = setup();
    assert_eq!(
        eval_ok(
            &interp,
            "(defn make-counter []
               (let [state (atom 0)]
                 (fn [] (swap! state inc))))
             (def tick (make-counter))
             (tick) (tick) (tick)"
        ),
        Value::Number(3.0)
    );
}

#[test]
fn test_printed_value_format() {
    let interp = setup();
    assert_eq!(eval_ok(&interp, "(list 1 2 3)").pr_str(), "(1 2 3)");
    assert_eq!(eval_ok(&interp, "[1 [2] \"s\"]").pr_str(), "[1 [2] \"s\"]");
    assert_eq!(eval_ok(&interp, "{:a 1}").pr_str(), "{:a 1}");
    assert_eq!(eval_ok(&interp, "(fn [x] x)").pr_str(), "#<fn>");
    assert_eq!(eval_ok(&interp, "(defn named [x] x)").pr_str(), "#<fn:named>");
    assert_eq!(eval_ok(&interp, "(atom 1)").pr_str(), "#<atom>");
    assert_eq!(eval_ok(&interp, "42.0").pr_str(), "42");
    assert_eq!(eval_ok(&interp, "-0.5").pr_str(), "-0.5");
}

#[test]
fn test_errors_surface_with_kinds() {
    let interp = setup();
    assert!(matches!(
        interp.eval_source("(nth [1] 9)"),
        Err(EvalError::IndexOutOfBounds { .. })
    ));
    assert!(matches!(
        interp.eval_source("(/ 1 0)"),
        Err(EvalError::DivisionByZero { .. })
    ));
    assert!(matches!(
        interp.eval_source("missing-name"),
        Err(EvalError::UnboundSymbol { .. })
    ));
    assert!(matches!(
        interp.eval_source("(sqrt -1)"),
        Err(EvalError::Argument { .. })
    ));
    assert!(matches!(
        interp.eval_source("("),
        Err(EvalError::Parse { .. })
    ));
    assert!(matches!(
        interp.eval_source("\"open"),
        Err(EvalError::Token { .. })
    ));
}

#[test]
fn test_definitions_survive_errors() {
    let interp = setup();
    eval_ok(&interp, "(def x 1)");
    assert!(interp.eval_source("(boom)").is_err());
    assert_eq!(eval_ok(&interp, "x"), Value::Number(1.0));
}

#[test]
fn test_whole_file_evaluates_in_order() {
    let interp = setup();
    let script = "
        ; a tiny program
        (def total (atom 0))
        (defn add! [n] (swap! total + n))
        (add! 1)
        (add! 2)
        (add! 3)
        (deref total)
    ";
    assert_eq!(eval_ok(&interp, script), Value::Number(6.0));
}

#[test]
fn test_combinators_end_to_end() {
    let interp = setup();
    assert_eq!(
        eval_ok(&interp, "(map (comp str-upper str) [:a :b])"),
        Value::List(vec![Value::Str(":A".to_string()), Value::Str(":B".to_string())])
    );
    assert_eq!(
        eval_ok(&interp, "((juxt min max) 3 1 2)"),
        Value::Vector(vec![Value::Number(1.0), Value::Number(3.0)])
    );
}

#[test]
fn test_json_round_trip_through_interpreter() {
    let interp = setup();
    assert_eq!(
        eval_ok(
            &interp,
            "(get (json-decode (json-encode {:name \"Ada\" :tags [1 2]})) :name)"
        ),
        Value::Str("Ada".to_string())
    );
}
