pub mod common;
pub mod cors;
#[allow(clippy::module_inception)]
pub mod routes;
pub mod task;
pub mod user;
