// ABOUTME: Tree-walking evaluator implementing the special-form protocol,
// ABOUTME: call convention, macro expansion, quoting, and tail-call elimination

use crate::env::Environment;
use crate::error::EvalError;
use crate::expr::{Expr, ExprKind};
use crate::registry::Registry;
use crate::tokenizer::Position;
use crate::value::{map_key, Combinator, CombinatorKind, Function, MacroDef, Value};
use std::collections::HashMap;
use std::rc::Rc;

/// The evaluation context handed to builtin handlers: a registry plus the
/// environment of the call site. `eval`, `eval_with`, and `call` form the
/// contract plugins program against.
pub struct Evaluator {
    registry: Rc<Registry>,
    env: Rc<Environment>,
}

impl Evaluator {
    pub fn new(registry: Rc<Registry>, env: Rc<Environment>) -> Self {
        Evaluator { registry, env }
    }

    pub fn env(&self) -> &Rc<Environment> {
        &self.env
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Evaluate in the current environment
    pub fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        let env = Rc::clone(&self.env);
        self.eval_in(env, expr.clone())
    }

    /// Evaluate every expression left-to-right into values
    pub fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, EvalError> {
        args.iter().map(|arg| self.eval(arg)).collect()
    }

    /// Evaluate in a child environment with the given names pre-bound
    pub fn eval_with(
        &mut self,
        expr: &Expr,
        bindings: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<Value, EvalError> {
        let child = Environment::extend(Rc::clone(&self.env), bindings);
        self.eval_in(child, expr.clone())
    }

    /// Invoke any callable with unevaluated argument expressions. Macros
    /// expand, builtins receive the expressions as-is, functions and
    /// combinators see them evaluated first.
    pub fn call(&mut self, callee: &Value, args: &[Expr]) -> Result<Value, EvalError> {
        match callee {
            Value::Macro(mac) => {
                let expanded = expand_macro(mac, args)?;
                let produced = self.eval(&expanded)?;
                let form = produced.to_expr();
                self.eval(&form)
            }
            Value::Builtin(name) => {
                let registry = Rc::clone(&self.registry);
                registry.invoke(name, self, args)
            }
            Value::Function(_) | Value::Combinator(_) => {
                let values = self.eval_args(args)?;
                self.call_values(callee, values)
            }
            other => Err(EvalError::not_callable(other, None)),
        }
    }

    /// Invoke a callable with already-evaluated arguments. Builtins and
    /// macros receive expressions by contract, so the values are preserved
    /// out-of-band: each is bound in a hidden child frame and passed as the
    /// symbol that resolves to it.
    pub fn call_values(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, EvalError> {
        match callee {
            Value::Function(func) => {
                let call_env = bind_params(func, args)?;
                match func.body.split_last() {
                    None => Ok(Value::Nil),
                    Some((last, init)) => {
                        for expr in init {
                            self.eval_in(Rc::clone(&call_env), expr.clone())?;
                        }
                        self.eval_in(call_env, last.clone())
                    }
                }
            }
            Value::Combinator(comb) => {
                let comb = Rc::clone(comb);
                self.apply_combinator(&comb, args)
            }
            Value::Builtin(_) | Value::Macro(_) => {
                let child = Environment::with_parent(Rc::clone(&self.env));
                let mut exprs = Vec::with_capacity(args.len());
                for (i, value) in args.into_iter().enumerate() {
                    let slot = format!("__call-arg-{}", i);
                    child.define(slot.clone(), value);
                    exprs.push(Expr::synthetic(ExprKind::Symbol(slot)));
                }
                let mut ev = Evaluator::new(Rc::clone(&self.registry), child);
                ev.call(callee, &exprs)
            }
            other => Err(EvalError::not_callable(other, None)),
        }
    }

    /// The tree walk. `expr`/`env` are rebound and the loop re-entered for
    /// tail positions (`if` branches, `do`/`let`/function-body tails, and
    /// macro expansion results), so iterative recursion runs in constant
    /// Rust stack. Non-tail recursion can still exhaust the stack.
    fn eval_in(&mut self, env: Rc<Environment>, expr: Expr) -> Result<Value, EvalError> {
        let mut env = env;
        let mut expr = expr;
        loop {
            match &expr.kind {
                ExprKind::Number(n) => return Ok(Value::Number(*n)),
                ExprKind::BigNumber(b) => return Ok(Value::BigNumber(b.clone())),
                ExprKind::Str(s) => return Ok(Value::Str(s.clone())),
                ExprKind::Bool(b) => return Ok(Value::Bool(*b)),
                ExprKind::Keyword(k) => return Ok(Value::Keyword(k.clone())),
                ExprKind::Nil => return Ok(Value::Nil),

                ExprKind::Symbol(name) => {
                    return env
                        .get(name)
                        .ok_or_else(|| EvalError::unbound(name, Some(expr.pos)));
                }

                ExprKind::Bracket(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for item in items {
                        out.push(self.eval_in(Rc::clone(&env), item.clone())?);
                    }
                    return Ok(Value::Vector(out));
                }

                ExprKind::Brace(children) => {
                    if children.len() % 2 != 0 {
                        return Err(EvalError::argument_error(
                            "hash-map",
                            "literal requires an even number of forms",
                        ));
                    }
                    let mut entries = HashMap::new();
                    for pair in children.chunks(2) {
                        let key_value = self.eval_in(Rc::clone(&env), pair[0].clone())?;
                        let key = map_key("hash-map", &key_value)?;
                        let value = self.eval_in(Rc::clone(&env), pair[1].clone())?;
                        entries.insert(key, value);
                    }
                    return Ok(Value::Map(entries));
                }

                ExprKind::Quote(inner) => {
                    return Ok(Value::Quoted(Rc::new((**inner).clone())));
                }

                ExprKind::Quasiquote(inner) => {
                    let rewritten = self.quasiquote(&env, inner, 0)?;
                    return Ok(Value::Quoted(Rc::new(rewritten)));
                }

                ExprKind::Unquote(_) => {
                    return Err(EvalError::argument_error(
                        "unquote",
                        "used outside quasiquote",
                    ));
                }

                ExprKind::List(items) if items.is_empty() => {
                    return Ok(Value::List(Vec::new()));
                }

                ExprKind::List(items) => {
                    let head = match &items[0].kind {
                        ExprKind::Symbol(s) => Some(s.as_str()),
                        _ => None,
                    };

                    match head {
                        Some("def") => return self.form_def(&env, &items[1..]),
                        Some("defn") => return self.form_defn(&env, &items[1..]),
                        Some("set!") => return self.form_set(&env, &items[1..]),
                        Some("fn") => {
                            return self.make_function(&env, &items[1..], None);
                        }
                        Some("defmacro") => {
                            return self.form_defmacro(&env, &items[1..], expr.pos)
                        }
                        Some("quote") => {
                            if items.len() != 2 {
                                return Err(EvalError::arity_error("quote", "1", items.len() - 1));
                            }
                            return Ok(Value::Quoted(Rc::new(items[1].clone())));
                        }
                        Some("quasiquote") => {
                            if items.len() != 2 {
                                return Err(EvalError::arity_error(
                                    "quasiquote",
                                    "1",
                                    items.len() - 1,
                                ));
                            }
                            let rewritten = self.quasiquote(&env, &items[1], 0)?;
                            return Ok(Value::Quoted(Rc::new(rewritten)));
                        }
                        Some("if") => {
                            if items.len() < 3 || items.len() > 4 {
                                return Err(EvalError::arity_error("if", "2-3", items.len() - 1));
                            }
                            let condition = self.eval_in(Rc::clone(&env), items[1].clone())?;
                            if condition.is_truthy() {
                                expr = items[2].clone();
                            } else if items.len() == 4 {
                                expr = items[3].clone();
                            } else {
                                return Ok(Value::Nil);
                            }
                            continue;
                        }
                        Some("do") => {
                            if items.len() == 1 {
                                return Ok(Value::Nil);
                            }
                            for item in &items[1..items.len() - 1] {
                                self.eval_in(Rc::clone(&env), item.clone())?;
                            }
                            expr = items[items.len() - 1].clone();
                            continue;
                        }
                        Some("let") => {
                            let (child, tail) = self.form_let(&env, &items[1..])?;
                            env = child;
                            expr = tail;
                            continue;
                        }
                        _ => {}
                    }

                    // Call protocol: evaluate the head, then dispatch on what
                    // kind of callable it produced.
                    let callee = self.eval_in(Rc::clone(&env), items[0].clone())?;
                    match callee {
                        Value::Macro(mac) => {
                            let expanded = expand_macro(&mac, &items[1..])?;
                            let produced = self.eval_in(Rc::clone(&env), expanded)?;
                            expr = produced.to_expr();
                            continue;
                        }
                        Value::Function(func) => {
                            let mut args = Vec::with_capacity(items.len() - 1);
                            for item in &items[1..] {
                                args.push(self.eval_in(Rc::clone(&env), item.clone())?);
                            }
                            let call_env = bind_params(&func, args)?;
                            match func.body.split_last() {
                                None => return Ok(Value::Nil),
                                Some((last, init)) => {
                                    for body_expr in init {
                                        self.eval_in(Rc::clone(&call_env), body_expr.clone())?;
                                    }
                                    expr = last.clone();
                                    env = call_env;
                                    continue;
                                }
                            }
                        }
                        Value::Builtin(name) => {
                            let registry = Rc::clone(&self.registry);
                            let mut ev =
                                Evaluator::new(Rc::clone(&self.registry), Rc::clone(&env));
                            return registry.invoke(&name, &mut ev, &items[1..]);
                        }
                        Value::Combinator(comb) => {
                            let mut args = Vec::with_capacity(items.len() - 1);
                            for item in &items[1..] {
                                args.push(self.eval_in(Rc::clone(&env), item.clone())?);
                            }
                            let mut ev =
                                Evaluator::new(Rc::clone(&self.registry), Rc::clone(&env));
                            return ev.apply_combinator(&comb, args);
                        }
                        other => {
                            return Err(EvalError::not_callable(&other, Some(items[0].pos)));
                        }
                    }
                }
            }
        }
    }

    /// (def sym expr) — bind in the ROOT frame, return the value
    fn form_def(&mut self, env: &Rc<Environment>, args: &[Expr]) -> Result<Value, EvalError> {
        if args.len() != 2 {
            return Err(EvalError::arity_error("def", "2", args.len()));
        }
        let name = symbol_name(&args[0], "def")?;
        let mut value = self.eval_in(Rc::clone(env), args[1].clone())?;
        if let Value::Function(func) = &value {
            if func.name.is_none() {
                value = Value::Function(Rc::new(Function {
                    name: Some(name.clone()),
                    params: func.params.clone(),
                    rest: func.rest.clone(),
                    body: func.body.clone(),
                    env: Rc::clone(&func.env),
                }));
            }
        }
        env.root().define(name, value.clone());
        Ok(value)
    }

    /// (defn name [params] body…) — shorthand for (def name (fn [params] body…))
    fn form_defn(&mut self, env: &Rc<Environment>, args: &[Expr]) -> Result<Value, EvalError> {
        if args.len() < 2 {
            return Err(EvalError::argument_error(
                "defn",
                "expected a name, a parameter vector, and a body",
            ));
        }
        let name = symbol_name(&args[0], "defn")?;
        let value = self.make_function(env, &args[1..], Some(name.clone()))?;
        env.root().define(name, value.clone());
        Ok(value)
    }

    /// (set! sym expr) — update the nearest binding, error if unbound
    fn form_set(&mut self, env: &Rc<Environment>, args: &[Expr]) -> Result<Value, EvalError> {
        if args.len() != 2 {
            return Err(EvalError::arity_error("set!", "2", args.len()));
        }
        let name = symbol_name(&args[0], "set!")?;
        let value = self.eval_in(Rc::clone(env), args[1].clone())?;
        env.set(&name, value.clone()).map_err(|err| match err {
            EvalError::UnboundSymbol { name, .. } => EvalError::unbound(name, Some(args[0].pos)),
            other => other,
        })?;
        Ok(value)
    }

    /// (let [s₁ v₁ …] body…) — sequential bindings in a fresh child frame.
    /// Returns the child environment and the tail expression so the caller's
    /// loop can continue without growing the stack.
    fn form_let(
        &mut self,
        env: &Rc<Environment>,
        args: &[Expr],
    ) -> Result<(Rc<Environment>, Expr), EvalError> {
        if args.len() < 2 {
            return Err(EvalError::argument_error(
                "let",
                "expected a binding vector and a body",
            ));
        }
        let pairs = match &args[0].kind {
            ExprKind::Bracket(items) if items.len() % 2 == 0 => items,
            _ => {
                return Err(EvalError::argument_error(
                    "let",
                    "bindings must be a bracket with an even number of forms",
                ));
            }
        };

        let child = Environment::with_parent(Rc::clone(env));
        for pair in pairs.chunks(2) {
            let name = symbol_name(&pair[0], "let")?;
            // Sequential scoping: each init expression sees the bindings
            // established before it.
            let value = self.eval_in(Rc::clone(&child), pair[1].clone())?;
            child.define(name, value);
        }

        for body_expr in &args[1..args.len() - 1] {
            self.eval_in(Rc::clone(&child), body_expr.clone())?;
        }
        Ok((child, args[args.len() - 1].clone()))
    }

    /// (fn [params…] body…) — capture the current environment
    fn make_function(
        &mut self,
        env: &Rc<Environment>,
        args: &[Expr],
        name: Option<String>,
    ) -> Result<Value, EvalError> {
        let form = if name.is_some() { "defn" } else { "fn" };
        if args.is_empty() {
            return Err(EvalError::argument_error(form, "expected a parameter vector"));
        }
        let (params, rest) = parse_params(&args[0], form)?;
        Ok(Value::Function(Rc::new(Function {
            name,
            params,
            rest,
            body: args[1..].to_vec(),
            env: Rc::clone(env),
        })))
    }

    /// (defmacro name [params…] body…) — define a transformer in the root frame
    fn form_defmacro(
        &mut self,
        env: &Rc<Environment>,
        args: &[Expr],
        pos: Position,
    ) -> Result<Value, EvalError> {
        if args.len() < 3 {
            return Err(EvalError::argument_error(
                "defmacro",
                "expected a name, a parameter vector, and a body",
            ));
        }
        let name = symbol_name(&args[0], "defmacro")?;
        let (params, rest) = parse_params(&args[1], "defmacro")?;
        if rest.is_some() {
            return Err(EvalError::argument_error(
                "defmacro",
                "variadic parameters are not supported",
            ));
        }
        let body = if args.len() == 3 {
            args[2].clone()
        } else {
            let mut items = vec![Expr::new(ExprKind::Symbol("do".to_string()), pos)];
            items.extend_from_slice(&args[2..]);
            Expr::new(ExprKind::List(items), pos)
        };
        let value = Value::Macro(Rc::new(MacroDef {
            name: Some(name.clone()),
            params,
            body,
        }));
        env.root().define(name, value.clone());
        Ok(value)
    }

    /// Quasiquote walk: preserve nodes verbatim except active unquotes,
    /// whose evaluated results are reified back into the tree. Nested
    /// quasiquotes deepen the counter; only depth-0 unquotes are active.
    fn quasiquote(
        &mut self,
        env: &Rc<Environment>,
        expr: &Expr,
        depth: u32,
    ) -> Result<Expr, EvalError> {
        let kind = match &expr.kind {
            ExprKind::Unquote(inner) => {
                if depth == 0 {
                    let value = self.eval_in(Rc::clone(env), (**inner).clone())?;
                    return Ok(value.to_expr());
                }
                ExprKind::Unquote(Box::new(self.quasiquote(env, inner, depth - 1)?))
            }
            ExprKind::Quasiquote(inner) => {
                ExprKind::Quasiquote(Box::new(self.quasiquote(env, inner, depth + 1)?))
            }
            ExprKind::Quote(inner) => {
                ExprKind::Quote(Box::new(self.quasiquote(env, inner, depth)?))
            }
            ExprKind::List(items) => ExprKind::List(self.quasiquote_all(env, items, depth)?),
            ExprKind::Bracket(items) => {
                ExprKind::Bracket(self.quasiquote_all(env, items, depth)?)
            }
            ExprKind::Brace(items) => ExprKind::Brace(self.quasiquote_all(env, items, depth)?),
            _ => return Ok(expr.clone()),
        };
        Ok(Expr::new(kind, expr.pos))
    }

    fn quasiquote_all(
        &mut self,
        env: &Rc<Environment>,
        items: &[Expr],
        depth: u32,
    ) -> Result<Vec<Expr>, EvalError> {
        items
            .iter()
            .map(|item| self.quasiquote(env, item, depth))
            .collect()
    }

    /// Apply a comp/partial/complement/juxt value to evaluated arguments
    pub fn apply_combinator(
        &mut self,
        comb: &Combinator,
        args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        match comb.kind {
            CombinatorKind::Comp => {
                let mut parts = comb.parts.iter().rev();
                let innermost = match parts.next() {
                    Some(f) => f,
                    // Zero functions compose to the identity
                    None => return Ok(args.into_iter().next().unwrap_or(Value::Nil)),
                };
                let mut acc = self.call_values(innermost, args)?;
                for f in parts {
                    acc = self.call_values(f, vec![acc])?;
                }
                Ok(acc)
            }
            CombinatorKind::Partial => {
                let target = comb.parts[0].clone();
                let mut full = comb.parts[1..].to_vec();
                full.extend(args);
                self.call_values(&target, full)
            }
            CombinatorKind::Complement => {
                let target = comb.parts[0].clone();
                let result = self.call_values(&target, args)?;
                Ok(Value::Bool(!result.is_truthy()))
            }
            CombinatorKind::Juxt => {
                let mut out = Vec::with_capacity(comb.parts.len());
                for f in &comb.parts {
                    out.push(self.call_values(f, args.clone())?);
                }
                Ok(Value::Vector(out))
            }
        }
    }
}

fn symbol_name(expr: &Expr, form: &str) -> Result<String, EvalError> {
    match &expr.kind {
        ExprKind::Symbol(name) => Ok(name.clone()),
        _ => Err(EvalError::argument_error(
            form,
            format!("expected a symbol, got {}", expr),
        )),
    }
}

fn parse_params(expr: &Expr, form: &str) -> Result<(Vec<String>, Option<String>), EvalError> {
    let items = match &expr.kind {
        ExprKind::Bracket(items) => items,
        _ => {
            return Err(EvalError::argument_error(
                form,
                "parameters must be a bracket of symbols",
            ));
        }
    };

    let mut params = Vec::new();
    let mut rest = None;
    let mut iter = items.iter();
    while let Some(item) = iter.next() {
        match &item.kind {
            ExprKind::Symbol(s) if s == "&" => {
                match iter.next().map(|e| &e.kind) {
                    Some(ExprKind::Symbol(r)) if iter.next().is_none() => {
                        rest = Some(r.clone());
                    }
                    _ => {
                        return Err(EvalError::argument_error(
                            form,
                            "'&' must be followed by exactly one symbol",
                        ));
                    }
                }
            }
            ExprKind::Symbol(s) => params.push(s.clone()),
            _ => {
                return Err(EvalError::argument_error(
                    form,
                    "parameters must be symbols",
                ));
            }
        }
    }
    Ok((params, rest))
}

/// Bind evaluated arguments positionally in a child of the function's
/// captured environment; the rest parameter, if any, takes the remainder
/// as a list.
fn bind_params(func: &Function, mut args: Vec<Value>) -> Result<Rc<Environment>, EvalError> {
    let name = func.name.as_deref().unwrap_or("fn");
    let required = func.params.len();
    if func.rest.is_some() {
        if args.len() < required {
            return Err(EvalError::arity_error(
                name,
                format!("at least {}", required),
                args.len(),
            ));
        }
    } else if args.len() != required {
        return Err(EvalError::arity_error(name, required.to_string(), args.len()));
    }

    let rest_values = args.split_off(required);
    let env = Environment::with_parent(Rc::clone(&func.env));
    for (param, value) in func.params.iter().zip(args) {
        env.define(param.clone(), value);
    }
    if let Some(rest) = &func.rest {
        env.define(rest.clone(), Value::List(rest_values));
    }
    Ok(env)
}

/// Macro expansion step 1: deep textual substitution of the unevaluated
/// argument expressions for the parameter symbols, traversing every
/// compound node. Unhygienic by design; capture is the caller's problem.
fn expand_macro(mac: &MacroDef, args: &[Expr]) -> Result<Expr, EvalError> {
    if args.len() != mac.params.len() {
        return Err(EvalError::arity_error(
            mac.name.as_deref().unwrap_or("macro"),
            mac.params.len().to_string(),
            args.len(),
        ));
    }
    let mut bindings: HashMap<&str, &Expr> = HashMap::new();
    for (param, arg) in mac.params.iter().zip(args) {
        bindings.insert(param.as_str(), arg);
    }
    Ok(substitute(&mac.body, &bindings))
}

fn substitute(expr: &Expr, bindings: &HashMap<&str, &Expr>) -> Expr {
    let kind = match &expr.kind {
        ExprKind::Symbol(s) => match bindings.get(s.as_str()) {
            Some(replacement) => return (*replacement).clone(),
            None => ExprKind::Symbol(s.clone()),
        },
        ExprKind::List(items) => {
            ExprKind::List(items.iter().map(|e| substitute(e, bindings)).collect())
        }
        ExprKind::Bracket(items) => {
            ExprKind::Bracket(items.iter().map(|e| substitute(e, bindings)).collect())
        }
        ExprKind::Brace(items) => {
            ExprKind::Brace(items.iter().map(|e| substitute(e, bindings)).collect())
        }
        ExprKind::Quote(inner) => ExprKind::Quote(Box::new(substitute(inner, bindings))),
        ExprKind::Quasiquote(inner) => {
            ExprKind::Quasiquote(Box::new(substitute(inner, bindings)))
        }
        ExprKind::Unquote(inner) => ExprKind::Unquote(Box::new(substitute(inner, bindings))),
        leaf => leaf.clone(),
    };
    Expr::new(kind, expr.pos)
}

/// One-level expansion for `macroexpand`: substitute, evaluate the
/// transformer body, reify the produced value back to an expression.
pub fn expand_once(
    ev: &mut Evaluator,
    mac: &MacroDef,
    args: &[Expr],
) -> Result<Expr, EvalError> {
    let expanded = expand_macro(mac, args)?;
    let produced = ev.eval(&expanded)?;
    Ok(produced.to_expr())
}
