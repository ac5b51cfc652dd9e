// ABOUTME: Interpreter facade wiring a registry to a root environment

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expr::Expr;
use crate::parser::parse_source;
use crate::registry::Registry;
use crate::value::Value;
use std::rc::Rc;

/// One interpreter instance: a registry (fixed at construction, per the
/// explicit-collaborator rule) and a long-lived root environment whose
/// frame holds a `Builtin` handle for every registered operation.
pub struct Interpreter {
    registry: Rc<Registry>,
    root: Rc<Environment>,
}

impl Interpreter {
    /// Build an interpreter around a registry. Every registered name gets a
    /// first-class `Builtin` binding in the root frame, so call sites reach
    /// builtins through ordinary symbol lookup.
    pub fn new(registry: Registry) -> Self {
        let registry = Rc::new(registry);
        let root = Environment::new();
        for name in registry.names() {
            root.define(name.clone(), Value::Builtin(name));
        }
        Interpreter { registry, root }
    }

    /// An interpreter with the core builtin surface and no plugins
    pub fn with_core() -> Result<Self, EvalError> {
        Ok(Interpreter::new(Registry::with_core()?))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn root_env(&self) -> &Rc<Environment> {
        &self.root
    }

    /// A fresh evaluator rooted at the interpreter's root environment
    pub fn evaluator(&self) -> Evaluator {
        Evaluator::new(Rc::clone(&self.registry), Rc::clone(&self.root))
    }

    pub fn eval_expr(&self, expr: &Expr) -> Result<Value, EvalError> {
        self.evaluator().eval(expr)
    }

    /// Tokenize, parse, and evaluate all top-level forms in order,
    /// returning the last value (nil for empty input)
    pub fn eval_source(&self, source: &str) -> Result<Value, EvalError> {
        let exprs = parse_source(source)?;
        let mut ev = self.evaluator();
        let mut last = Value::Nil;
        for expr in &exprs {
            last = ev.eval(expr)?;
        }
        Ok(last)
    }
}
