use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::{Server, Service};
use actix_web::{App, HttpServer};
use futures_util::future::{ready, Either, TryFutureExt};
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;

use crate::app_config::config_app;
use crate::catalog_store::{CatalogStore, InMemoryCatalogStore};
use crate::handlers::message_response;
use crate::request_log::RequestLog;

/// Book files may be up to 50MB, multipart framing comes on top
const MAX_UPLOAD_BYTES: usize = 60 * 1024 * 1024;

pub fn run(
    listener: TcpListener,
    store: Arc<dyn CatalogStore + Send + Sync>,
    requests: Arc<RequestLog>,
) -> std::io::Result<Server> {
    let server = HttpServer::new(move || {
        let requests = requests.clone();
        App::new()
            .wrap_api()
            .app_data(web::Data::new(store.clone()))
            .app_data(actix_web::web::PayloadConfig::new(MAX_UPLOAD_BYTES))
            .wrap_fn(move |request, service| {
                let injected = requests.observe(request.method().as_str(), request.path());
                match injected {
                    Some(status) => {
                        tracing::info!(
                            "Answering {} {} with queued status {}",
                            request.method(),
                            request.path(),
                            status
                        );
                        let response =
                            message_response(status, "Service temporarily failing".to_string());
                        Either::Left(ready(Ok::<_, actix_web::Error>(
                            request.into_response(response).map_into_right_body(),
                        )))
                    }
                    None => Either::Right(
                        service
                            .call(request)
                            .map_ok(|response| response.map_into_left_body()),
                    ),
                }
            })
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .listen(listener)?
    .run();
    Ok(server)
}

/// Stub running in the background of the current runtime
pub struct StubServer {
    pub address: String,
    pub store: Arc<InMemoryCatalogStore>,
    pub requests: Arc<RequestLog>,
}

impl StubServer {
    /// Base url the admin client is configured with
    pub fn api_url(&self) -> String {
        format!("{}/api/v1", self.address)
    }
}

/// Starts the stub on a free local port, must be called inside a tokio runtime
pub fn spawn() -> std::io::Result<StubServer> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    let store = Arc::new(InMemoryCatalogStore::default());
    let requests = Arc::new(RequestLog::default());
    let server = run(listener, store.clone(), requests.clone())?;
    tokio::spawn(server);

    Ok(StubServer {
        address: format!("http://127.0.0.1:{}", port),
        store,
        requests,
    })
}

#[cfg(test)]
mod server_tests {
    use actix_web::http::StatusCode;
    use serde_json::Value;

    use super::spawn;

    #[tokio::test]
    /// 1. Checks health and the generated api spec
    /// 2. Lists books without a token - expects 401 with a message
    async fn test_health_spec_and_auth() {
        let stub = spawn().expect("Failed to spawn stub");
        let client = reqwest::Client::new();

        let health = client
            .get(format!("{}/health", stub.address))
            .send()
            .await
            .unwrap();
        assert!(health.status().is_success());

        let spec: Value = client
            .get(format!("{}/apispec/v2", stub.address))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(spec["paths"]
            .as_object()
            .unwrap()
            .contains_key("/api/v1/admin/books"));

        let unauthorized = client
            .get(format!("{}/admin/books", stub.api_url()))
            .send()
            .await
            .unwrap();
        assert_eq!(unauthorized.status(), 401);
        let body: Value = unauthorized.json().await.unwrap();
        assert_eq!(body["message"], "Unauthorized");
        assert_eq!(stub.requests.count("GET", "/api/v1/admin/books"), 1);
    }

    #[tokio::test]
    /// Queues a 503 for health - the next call gets it, the one after is served
    async fn test_queued_failure() {
        let stub = spawn().expect("Failed to spawn stub");
        let client = reqwest::Client::new();
        stub.requests
            .fail_next("GET", "/health", StatusCode::SERVICE_UNAVAILABLE);

        let failed = client
            .get(format!("{}/health", stub.address))
            .send()
            .await
            .unwrap();
        assert_eq!(failed.status(), 503);
        let served = client
            .get(format!("{}/health", stub.address))
            .send()
            .await
            .unwrap();
        assert!(served.status().is_success());
        assert_eq!(stub.requests.count("GET", "/health"), 2);
    }
}
