use crate::binder::Bound;
use crate::dispatcher::Reply;
use serde_json::Value;

/// `GET /hello?name=`
pub fn handler(bound: &Bound) -> anyhow::Result<Reply> {
    let name = bound
        .require("query")?
        .get_str("name")
        .filter(|n| !n.is_empty())
        .unwrap_or("world~");
    Ok(Value::String(format!("Hello {name}")).into())
}
