//! # Dispatcher Module
//!
//! Maps a handler's return value to the response schema declared for its
//! status code and serializes the result into a [`ResponseEnvelope`].
//!
//! ## Status resolution
//!
//! - [`Reply::Value`] is answered with 200
//! - [`Reply::Status`] carries an explicit status, honored literally
//!
//! ## Shaping
//!
//! When the route declares a schema for the resolved status, the value must be
//! an object holding every required field (looked up by internal name, then by
//! alias). Only declared fields are emitted, in declaration order and under
//! their external names; extra keys are dropped and absent optional fields
//! take their default. Without a declared schema the value passes through.
//!
//! A value that fails its schema is a [`ResponseError`]; the service answers
//! it with HTTP 500.

mod core;

pub use core::{
    dispatch, dispatch_reply, shape, Handler, Reply, ResponseBindings, ResponseEnvelope,
    ResponseError, JSON_CONTENT_TYPE,
};
