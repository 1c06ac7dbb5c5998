//! Route declarations of the demo service.

use crate::binder::Param;
use crate::config::AppConfig;
use crate::handlers::{self, DemoSchemas};
use crate::router::{RouteDef, RouteTable};
use crate::schema::SchemaRegistry;
use crate::server::AppService;
use http::Method;
use std::sync::Arc;

/// Register every demo route on `table`.
///
/// # Errors
///
/// Fails on a route declaration error (see [`RouteError`](crate::router::RouteError)).
pub fn register_all(table: &mut RouteTable, s: &DemoSchemas) -> anyhow::Result<()> {
    table.add(
        RouteDef::new(Method::GET, "/hello", handlers::hello::handler)
            .name("hello")
            .param(Param::query("query", &s.hello_query)),
    )?;
    table.add(
        RouteDef::new(Method::GET, "/math/{a}and{b}", handlers::math::handler)
            .name("math")
            .param(Param::path("path", &s.math_path)),
    )?;
    table.add(
        RouteDef::new(Method::POST, "/test", handlers::test_post::handler)
            .name("test_post")
            .param(Param::body("data", &s.test))
            .param(Param::header("headers", &s.test_headers))
            .response(200, &s.test)
            .response(403, &s.error),
    )?;
    table.add(
        RouteDef::new(Method::GET, "/filter/{item_id}", handlers::filters::events)
            .name("events")
            .param(Param::path("path", &s.item_path))
            .param(Param::query("filters", &s.filters)),
    )?;
    table.add(
        RouteDef::new(Method::POST, "/filter/{item_id}", handlers::filters::search)
            .name("filters")
            .param(Param::path("path", &s.item_path))
            .param(Param::body("filters", &s.filters))
            .param(Param::query("query", &s.search_query)),
    )?;
    table.add(
        RouteDef::new(Method::POST, "/user-form", handlers::user::create_user_form)
            .name("create_user_form")
            .param(Param::form("details", &s.user_details))
            .param(Param::file("file")),
    )?;
    table.add(
        RouteDef::new(Method::POST, "/user-json", handlers::user::create_user_json)
            .name("create_user_json")
            .param(Param::body("details", &s.user_details))
            .param(Param::file("file")),
    )?;
    table.add(
        RouteDef::new(Method::POST, "/camel", handlers::camel::handler)
            .name("camel")
            .param(Param::body("item", &s.camel))
            .response(200, &s.camel),
    )?;
    Ok(())
}

/// Define the demo schemas and build the route table.
///
/// # Errors
///
/// Fails on any schema or route definition error.
pub fn build_route_table() -> anyhow::Result<RouteTable> {
    let mut schemas = SchemaRegistry::new();
    let demo = DemoSchemas::define(&mut schemas)?;
    let mut table = RouteTable::new();
    register_all(&mut table, &demo)?;
    Ok(table)
}

/// Demo service: route table, lenient JSON parser and configured limits.
///
/// # Errors
///
/// See [`build_route_table`].
pub fn build_service(config: &AppConfig) -> anyhow::Result<AppService> {
    let table = build_route_table()?;
    Ok(AppService::from_config(Arc::new(table), config)
        .with_parser(handlers::parser::lenient_json))
}
