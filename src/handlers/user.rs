use crate::binder::Bound;
use crate::dispatcher::Reply;
use serde_json::json;

fn details_and_file(bound: &Bound) -> anyhow::Result<Reply> {
    let details = bound.require("details")?;
    let file = bound.require_file("file")?;
    Ok(json!([details.to_value(), file.name()]).into())
}

/// `POST /user-form`: details from form fields, plus an uploaded file
pub fn create_user_form(bound: &Bound) -> anyhow::Result<Reply> {
    details_and_file(bound)
}

/// `POST /user-json`: details as a JSON document, plus an uploaded file
pub fn create_user_json(bound: &Bound) -> anyhow::Result<Reply> {
    details_and_file(bound)
}
