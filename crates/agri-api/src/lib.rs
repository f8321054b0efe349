//! HTTP surface for AgriAssist: warp routes over the shared services.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod app_services;
pub mod reply;
pub mod routes;
pub mod server;

pub use app_services::AppServices;
pub use routes::routes;
pub use server::serve;
