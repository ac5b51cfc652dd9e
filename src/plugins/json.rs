//! JSON plugin: json-encode, json-decode
//!
//! Maps interpreter data onto serde_json's value tree. Decoded integers
//! beyond the safe float range come back as big numbers; encoding a big
//! number outside that range goes through f64 and loses precision.

use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expr::Expr;
use crate::registry::{Metadata, Plugin, Registry};
use crate::tokenizer::MAX_SAFE_INTEGER;
use crate::value::Value;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde_json::{json, Map};

pub static PLUGIN: Plugin = Plugin {
    name: "json",
    version: "0.3.0",
    dependencies: &[],
    register,
};

fn register(registry: &mut Registry) -> Result<(), EvalError> {
    registry.register(
        Metadata::new(
            "json-encode",
            "JSON",
            1,
            "Renders a value as JSON text. Functions, macros, and atoms are not representable.",
        ),
        builtin_encode,
    )?;
    registry.register(
        Metadata::new("json-decode", "JSON", 1, "Parses JSON text into values."),
        builtin_decode,
    )?;
    Ok(())
}

fn encode(value: &Value) -> Result<serde_json::Value, EvalError> {
    Ok(match value {
        Value::Nil => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Number(n) => {
            if n.fract() == 0.0 && n.is_finite() && n.abs() <= MAX_SAFE_INTEGER as f64 {
                json!(*n as i64)
            } else {
                serde_json::Number::from_f64(*n)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| {
                        EvalError::argument_error(
                            "json-encode",
                            "non-finite numbers are not representable",
                        )
                    })?
            }
        }
        Value::BigNumber(b) => match b.to_i64() {
            Some(n) => json!(n),
            None => json!(b.to_f64().unwrap_or(f64::MAX)),
        },
        Value::Str(s) => json!(s),
        Value::Keyword(k) => json!(k),
        Value::List(items) | Value::Vector(items) => serde_json::Value::Array(
            items.iter().map(encode).collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Map(entries) => {
            let mut object = Map::with_capacity(entries.len());
            for (key, value) in entries {
                object.insert(key.clone(), encode(value)?);
            }
            serde_json::Value::Object(object)
        }
        other => {
            return Err(EvalError::argument_error(
                "json-encode",
                format!("{} values are not representable", other.type_name()),
            ));
        }
    })
}

fn decode(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&i) {
                    Value::Number(i as f64)
                } else {
                    Value::BigNumber(BigInt::from(i))
                }
            } else if let Some(u) = n.as_u64() {
                Value::BigNumber(BigInt::from(u))
            } else {
                Value::Number(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => Value::Vector(items.iter().map(decode).collect()),
        serde_json::Value::Object(object) => Value::Map(
            object
                .iter()
                .map(|(k, v)| (k.clone(), decode(v)))
                .collect(),
        ),
    }
}

fn builtin_encode(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    let encoded = encode(&value)?;
    Ok(Value::Str(encoded.to_string()))
}

fn builtin_decode(ev: &mut Evaluator, args: &[Expr]) -> Result<Value, EvalError> {
    let value = ev.eval(&args[0])?;
    let text = match &value {
        Value::Str(s) => s,
        other => return Err(EvalError::type_error("json-decode", "a string", other)),
    };
    let parsed: serde_json::Value = serde_json::from_str(text)
        .map_err(|err| EvalError::argument_error("json-decode", err.to_string()))?;
    Ok(decode(&parsed))
}
