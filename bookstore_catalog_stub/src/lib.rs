pub mod app_config;
pub mod catalog_store;
mod handlers;
pub mod request_log;
pub mod server;
