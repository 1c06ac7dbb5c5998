use crate::binder::Bound;
use crate::dispatcher::Reply;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct Operands {
    a: i64,
    b: i64,
}

/// `GET /math/{a}and{b}`
pub fn handler(bound: &Bound) -> anyhow::Result<Reply> {
    let Operands { a, b } = bound.parse("path")?;
    let sum = a
        .checked_add(b)
        .ok_or_else(|| anyhow::anyhow!("{a} + {b} overflows"))?;
    let product = a
        .checked_mul(b)
        .ok_or_else(|| anyhow::anyhow!("{a} * {b} overflows"))?;
    Ok(json!({ "a+b": sum, "a*b": product }).into())
}
