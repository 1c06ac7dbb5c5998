use crate::binder::Bound;
use crate::dispatcher::Reply;

/// `POST /camel`: echoes the item; keys go out under their generated aliases.
pub fn handler(bound: &Bound) -> anyhow::Result<Reply> {
    Ok(bound.require("item")?.clone().into())
}
