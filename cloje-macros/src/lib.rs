//! Procedural macros for cloje builtin functions
//!
//! Provides the `#[builtin]` attribute macro for defining interpreter
//! builtins. The handler's rustdoc comment becomes the registry help
//! string, and a registration record is submitted to the host crate's
//! inventory so `Registry::with_core` picks the builtin up automatically.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, ItemFn, Meta};

/// Extract rustdoc comments from function attributes
fn extract_doc_comments(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter_map(|attr| {
            if attr.path().is_ident("doc") {
                if let Meta::NameValue(nv) = &attr.meta {
                    if let syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(lit_str),
                        ..
                    }) = &nv.value
                    {
                        return Some(lit_str.value().trim().to_string());
                    }
                }
            }
            None
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse builtin attribute arguments: name = "...", category = "...", arity = N
fn parse_builtin_args(attr_stream: TokenStream) -> (String, String, i32) {
    let attr_str = attr_stream.to_string();

    let mut name = String::new();
    let mut category = String::new();
    let mut arity: i32 = -1;

    if let Some(start) = attr_str.find("name = \"") {
        let rest = &attr_str[start + 8..];
        if let Some(end) = rest.find('"') {
            name = rest[..end].to_string();
        }
    }

    if let Some(start) = attr_str.find("category = \"") {
        let rest = &attr_str[start + 12..];
        if let Some(end) = rest.find('"') {
            category = rest[..end].to_string();
        }
    }

    if let Some(start) = attr_str.find("arity = ") {
        let rest = &attr_str[start + 8..];
        let end = rest.find(',').unwrap_or(rest.len());
        // The token stream may insert spaces around the minus sign
        let digits: String = rest[..end].chars().filter(|c| !c.is_whitespace()).collect();
        if let Ok(n) = digits.parse::<i32>() {
            arity = n;
        }
    }

    (name, category, arity)
}

/// Attribute macro for defining interpreter builtin functions
///
/// # Attribute Arguments
///
/// - `name`: the Lisp name of the builtin (e.g. `"+"`); defaults to the
///   Rust function name
/// - `category`: registry category used by the help surface
/// - `arity`: fixed argument count, or `-1` for variadic (the default)
///
/// # Example
///
/// ```ignore
/// #[builtin(name = "not", category = "Logic", arity = 1)]
/// /// Logical negation by truthiness.
/// pub fn builtin_not(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn builtin(attr: TokenStream, item: TokenStream) -> TokenStream {
    let func = parse_macro_input!(item as ItemFn);

    let (lisp_name, category, arity) = parse_builtin_args(attr);

    let fn_name = func.sig.ident.clone();
    let fn_ident_str = fn_name.to_string();

    let name_to_use = if !lisp_name.is_empty() {
        lisp_name
    } else {
        fn_ident_str
    };

    let cat_to_use = if !category.is_empty() {
        category
    } else {
        "Other".to_string()
    };

    let help = extract_doc_comments(&func.attrs);

    let expanded = quote! {
        #func

        inventory::submit! {
            crate::registry::BuiltinDef {
                name: #name_to_use,
                category: #cat_to_use,
                arity: #arity,
                help: #help,
                handler: #fn_name,
            }
        }
    };

    TokenStream::from(expanded)
}
