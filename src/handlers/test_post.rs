use crate::binder::Bound;
use crate::dispatcher::Reply;

/// `POST /test`: stamps the body with `code=100` and a message naming the
/// `x` header.
pub fn handler(bound: &Bound) -> anyhow::Result<Reply> {
    let x = bound.require("headers")?.require_str("x")?;
    let mut data = bound.require("data")?.clone();
    data.set("code", 100)?;
    data.set("msg", format!("test message {x}"))?;
    Ok(data.into())
}
