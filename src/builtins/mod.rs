//! # Built-in Functions Module
//!
//! The core builtin surface, one submodule per registry category:
//!
//! - **[arithmetic]**: +, -, *, /, % with big-integer promotion
//! - **[comparison]**: =, <, >, <=, >=
//! - **[logic]**: and, or, not (short-circuiting)
//! - **[sequences]**: list, vector, first, rest, last, second, nth, empty?,
//!   seq, take, drop, reverse, distinct, sort, conj, count
//! - **[maps]**: hash-map, get, contains?, keys, vals, assoc, dissoc
//! - **[atoms]**: atom, deref, swap!, reset!
//! - **[combinators]**: comp, partial, complement, juxt
//! - **[quoting]**: quote, unquote, macroexpand
//! - **[console]**: print, println, pr, prn
//! - **[types]**: type predicates
//! - **[help]**: doc, help
//!
//! Every function here carries a `#[builtin]` attribute, which submits it
//! to the inventory that `Registry::with_core` collects. Handlers receive
//! the evaluator and the unevaluated argument expressions; most evaluate
//! them immediately, the short-circuiting ones do not.

pub mod arithmetic;
pub mod atoms;
pub mod combinators;
pub mod comparison;
pub mod console;
pub mod help;
pub mod logic;
pub mod maps;
pub mod quoting;
pub mod sequences;
pub mod types;
