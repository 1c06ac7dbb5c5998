//! # Demo API
//!
//! Handlers of the demo service. Each one is a pure function of its bound
//! parameters; routes, parameter sources and response schemas are declared in
//! [`registry`](crate::registry).
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/hello` | [`hello::handler`] |
//! | GET | `/math/{a}and{b}` | [`math::handler`] |
//! | POST | `/test` | [`test_post::handler`] |
//! | GET | `/filter/{item_id}` | [`filters::events`] |
//! | POST | `/filter/{item_id}` | [`filters::search`] |
//! | POST | `/user-form` | [`user::create_user_form`] |
//! | POST | `/user-json` | [`user::create_user_json`] |
//! | POST | `/camel` | [`camel::handler`] |

pub mod camel;
pub mod filters;
pub mod hello;
pub mod math;
pub mod parser;
pub mod schemas;
pub mod test_post;
pub mod user;

pub use schemas::DemoSchemas;
