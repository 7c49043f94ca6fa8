pub mod api;
pub mod book_form;
pub mod client;
pub mod console;
pub mod errors;
pub mod notifications;
pub mod price;
pub mod query_cache;
pub mod session;
pub mod settings;
pub mod telemetry;
pub mod uploads;
pub mod validation;
