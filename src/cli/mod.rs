//! # CLI Module
//!
//! ```bash
//! # serve on the configured address (default 0.0.0.0:8080)
//! brrtbind serve --config brrtbind.yaml
//!
//! # override the listen address
//! brrtbind serve --addr 127.0.0.1:3000
//!
//! # list routes with their handlers and response schemas
//! brrtbind routes
//! ```
//!
//! Configuration precedence for the listen address: `--addr`, then
//! `BRRTB_ADDR`, then `http.addr` in the config file, then the default.

mod commands;


pub use commands::{run, run_cli, Cli, Commands};
