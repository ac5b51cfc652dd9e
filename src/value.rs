// ABOUTME: Runtime value types representing interpreter data and callables

use crate::atom::Atom;
use crate::env::Environment;
use crate::error::EvalError;
use crate::expr::{escape_string, write_number, Expr, ExprKind};
use num_bigint::BigInt;
use num_traits::FromPrimitive;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    BigNumber(BigInt),
    Str(String),
    Bool(bool),
    Keyword(String),
    Nil,
    List(Vec<Value>),
    Vector(Vec<Value>),
    /// Keys are the raw key text: a keyword key is stored without its colon,
    /// so `:a` and `"a"` address the same slot. Iteration order is
    /// unspecified.
    Map(HashMap<String, Value>),
    Function(Rc<Function>),
    /// First-class handle to a registered builtin, resolved by registry key
    Builtin(String),
    Macro(Rc<MacroDef>),
    /// An un-evaluated AST fragment surfaced as a value
    Quoted(Rc<Expr>),
    Atom(Atom),
    Combinator(Rc<Combinator>),
}

/// A user-defined procedure plus the environment it closed over
#[derive(Debug)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<String>,
    /// Symbol after `&` in the parameter vector; binds remaining arguments
    /// as a list
    pub rest: Option<String>,
    pub body: Vec<Expr>,
    pub env: Rc<Environment>,
}

/// Syntactic transformer; parameters bind unevaluated argument expressions
#[derive(Debug)]
pub struct MacroDef {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinatorKind {
    Comp,
    Partial,
    Complement,
    Juxt,
}

impl CombinatorKind {
    pub fn name(self) -> &'static str {
        match self {
            CombinatorKind::Comp => "comp",
            CombinatorKind::Partial => "partial",
            CombinatorKind::Complement => "complement",
            CombinatorKind::Juxt => "juxt",
        }
    }
}

/// Higher-order function value built by comp/partial/complement/juxt.
/// For Partial the first part is the wrapped callable and the remainder are
/// the pre-bound argument values.
#[derive(Debug)]
pub struct Combinator {
    pub kind: CombinatorKind,
    pub parts: Vec<Value>,
}

impl Value {
    /// Exactly two values are falsey: false and nil
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::Nil)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) | Value::BigNumber(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Keyword(_) => "keyword",
            Value::Nil => "nil",
            Value::List(_) => "list",
            Value::Vector(_) => "vector",
            Value::Map(_) => "hash-map",
            Value::Function(_) | Value::Combinator(_) => "fn",
            Value::Builtin(_) => "builtin",
            Value::Macro(_) => "macro",
            Value::Quoted(_) => "quoted",
            Value::Atom(_) => "atom",
        }
    }

    /// Re-escaped, read-back form: what `pr` prints and the REPL echoes
    pub fn pr_str(&self) -> String {
        format!("{}", Printed(self, true))
    }

    /// Convert a runtime value back into an expression fragment. Used by
    /// quasiquote when splicing unquoted results and when handing values to
    /// expression-level callables. Values with no syntax (functions, atoms,
    /// macros) become an opaque symbol that cannot be evaluated.
    pub fn to_expr(&self) -> Expr {
        let kind = match self {
            Value::Number(n) => ExprKind::Number(*n),
            Value::BigNumber(b) => ExprKind::BigNumber(b.clone()),
            Value::Str(s) => ExprKind::Str(s.clone()),
            Value::Bool(b) => ExprKind::Bool(*b),
            Value::Keyword(k) => ExprKind::Keyword(k.clone()),
            Value::Nil => ExprKind::Nil,
            Value::List(items) => ExprKind::List(items.iter().map(Value::to_expr).collect()),
            Value::Vector(items) => ExprKind::Bracket(items.iter().map(Value::to_expr).collect()),
            Value::Map(entries) => {
                let mut children = Vec::with_capacity(entries.len() * 2);
                for (k, v) in entries {
                    children.push(Expr::synthetic(ExprKind::Keyword(k.clone())));
                    children.push(v.to_expr());
                }
                ExprKind::Brace(children)
            }
            Value::Quoted(inner) => return (**inner).clone(),
            opaque => ExprKind::Symbol(format!("#<value:{}>", opaque.type_name())),
        };
        Expr::synthetic(kind)
    }
}

/// Hash-map key from a value: strings and keywords only, stored as raw text
pub fn map_key(name: &str, value: &Value) -> Result<String, EvalError> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        Value::Keyword(k) => Ok(k.clone()),
        other => Err(EvalError::type_error(name, "a string or keyword key", other)),
    }
}

fn number_equals_big(n: f64, b: &BigInt) -> bool {
    n.is_finite() && n.fract() == 0.0 && BigInt::from_f64(n).is_some_and(|i| &i == b)
}

// Structural equality, with Number/BigNumber comparing by mathematical
// value when the float is integral.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::BigNumber(a), Value::BigNumber(b)) => a == b,
            (Value::Number(n), Value::BigNumber(b)) | (Value::BigNumber(b), Value::Number(n)) => {
                number_equals_big(*n, b)
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Keyword(a), Value::Keyword(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Macro(a), Value::Macro(b)) => Rc::ptr_eq(a, b),
            (Value::Quoted(a), Value::Quoted(b)) => a == b,
            (Value::Atom(a), Value::Atom(b)) => a.ptr_eq(b),
            (Value::Combinator(a), Value::Combinator(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Rendering adapter: `readably` re-escapes strings (pr form), otherwise
/// strings print raw (print form).
#[derive(Clone, Copy)]
struct Printed<'a>(&'a Value, bool);

impl fmt::Display for Printed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Printed(value, readably) = *self;
        match value {
            Value::Number(n) => write_number(f, *n),
            Value::BigNumber(b) => write!(f, "{}", b),
            Value::Str(s) => {
                if readably {
                    write!(f, "\"{}\"", escape_string(s))
                } else {
                    write!(f, "{}", s)
                }
            }
            Value::Bool(b) => write!(f, "{}", b),
            Value::Keyword(k) => write!(f, ":{}", k),
            Value::Nil => write!(f, "nil"),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", Printed(item, readably))?;
                }
                write!(f, ")")
            }
            Value::Vector(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", Printed(item, readably))?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, ":{} {}", k, Printed(v, readably))?;
                }
                write!(f, "}}")
            }
            Value::Function(func) => match &func.name {
                Some(name) => write!(f, "#<fn:{}>", name),
                None => write!(f, "#<fn>"),
            },
            Value::Builtin(name) => write!(f, "#<builtin:{}>", name),
            Value::Macro(_) => write!(f, "#<macro>"),
            Value::Quoted(inner) => write!(f, "{}", inner),
            Value::Atom(_) => write!(f, "#<atom>"),
            Value::Combinator(comb) => write!(f, "#<fn:{}>", comb.kind.name()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Printed(self, false))
    }
}
