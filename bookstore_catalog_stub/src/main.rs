use std::env;
use std::net::TcpListener;
use std::sync::Arc;

use bookstore_admin::telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig};
use bookstore_catalog_stub::catalog_store::{InMemoryCatalogStore, ADMIN_EMAIL, ADMIN_PASSWORD};
use bookstore_catalog_stub::request_log::RequestLog;
use bookstore_catalog_stub::server::run;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry(TelemetryConfig {
        app_name: "bookstore_catalog_stub",
        default_filter: "info",
        jaeger_enabled: env::var("JAEGER_ENABLED")
            .map(|value| value.to_lowercase() == "true")
            .unwrap_or_default(),
        writer: std::io::stdout,
    })?;

    let port = env::var("PORT").unwrap_or("8080".to_string());
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port))?;
    println!("starting HTTP server at http://localhost:{}/api/v1", port);
    tracing::info!("Seeded administrator {} / {}", ADMIN_EMAIL, ADMIN_PASSWORD);

    run(
        listener,
        Arc::new(InMemoryCatalogStore::default()),
        Arc::new(RequestLog::default()),
    )?
    .await?;
    shutdown_telemetry();
    Ok(())
}
