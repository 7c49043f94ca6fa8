use actix_web::http::StatusCode as ServerStatus;
use bookstore_admin::api::BookQueryParams;
use bookstore_admin::session::Route;
use reqwest::StatusCode;

use crate::harness::{book_form, Harness};

const BOOKS_PATH: &str = "/api/v1/admin/books";

#[tokio::test]
/// 1. Queues one 503 for the book listing
/// 2. Lists books with retries enabled - expects success after a second attempt
async fn transient_read_failure_is_retried() {
    let harness = Harness::start_with_read_retries(2).log_in().await;
    harness
        .stub
        .requests
        .fail_next("GET", BOOKS_PATH, ServerStatus::SERVICE_UNAVAILABLE);

    let listed = harness
        .console
        .books()
        .list(&BookQueryParams::default())
        .await
        .expect("Failed to list books after a retry");

    assert_eq!(listed.meta.total_items, 0);
    assert_eq!(harness.stub.requests.count("GET", BOOKS_PATH), 2);
    assert!(harness.errors().is_empty());
}

#[tokio::test]
/// 1. Revokes the token on the server
/// 2. Lists books with retries enabled - expects a single request and a redirect to login
async fn unauthorized_read_is_not_retried() {
    let harness = Harness::start_with_read_retries(3).log_in().await;
    harness.stub.store.revoke_tokens();

    let result = harness
        .console
        .books()
        .list(&BookQueryParams::default())
        .await;

    assert!(result.unwrap_err().is_unauthorized());
    assert_eq!(harness.stub.requests.count("GET", BOOKS_PATH), 1);
    assert_eq!(harness.navigator.routes().last(), Some(&Route::Login));
}

#[tokio::test]
/// 1. Queues one 503 for book creation
/// 2. Submits a new book with read retries enabled - expects one request and the failure toast
async fn failing_write_is_not_retried() {
    let harness = Harness::start_with_read_retries(3).log_in().await;
    harness
        .stub
        .requests
        .fail_next("POST", BOOKS_PATH, ServerStatus::SERVICE_UNAVAILABLE);

    let result = harness
        .console
        .books()
        .submit_form(&book_form("Walden"), None)
        .await;

    assert_eq!(
        result.unwrap_err().status(),
        Some(StatusCode::SERVICE_UNAVAILABLE)
    );
    assert_eq!(harness.stub.requests.count("POST", BOOKS_PATH), 1);
    assert!(harness.stub.store.recorded_requests().is_empty());
    assert_eq!(harness.errors(), vec!["Service temporarily failing"]);
}
