use crate::binder::Bound;
use crate::dispatcher::Reply;
use serde_json::json;

/// `GET /filter/{item_id}`, filters from the query string
pub fn events(bound: &Bound) -> anyhow::Result<Reply> {
    let filters = bound.require("filters")?;
    Ok(json!({ "filters": filters.to_value() }).into())
}

/// `POST /filter/{item_id}?q=`, filters from the body
pub fn search(bound: &Bound) -> anyhow::Result<Reply> {
    let filters = bound.require("filters")?;
    Ok(json!({ "filters": filters.to_value() }).into())
}
