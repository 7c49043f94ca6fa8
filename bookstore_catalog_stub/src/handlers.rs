use std::sync::Arc;

use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{Error, HttpRequest, HttpResponse};
use bookstore_admin::api::{
    BookQueryParams, CreateAgeGroupPayload, CreateBookPayload, CreateCategoryPayload,
    FindAllAgeGroupsResponse, FindAllCategoriesResponse, ListParams, RefundRequest, SignIn,
    TransactionQueryParams, UpdateAgeGroupPayload, UpdateBookPayload, UpdateCategoryPayload,
    UploadResponse,
};
use paperclip::actix::{
    api_v2_operation,
    web::{self},
};
use serde::Serialize;
use serde_json::json;

use crate::catalog_store::{CatalogStore, CatalogStoreError, RecordedRequest};

type Store = Data<Arc<dyn CatalogStore + Send + Sync>>;

pub(crate) fn message_response(status: StatusCode, message: String) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "message": message, "statusCode": status.as_u16() }))
}

fn error_response(err: CatalogStoreError) -> HttpResponse {
    let message = err.to_string();
    match err {
        CatalogStoreError::NotFound(_) => message_response(StatusCode::NOT_FOUND, message),
        CatalogStoreError::InvalidCredentials => {
            message_response(StatusCode::UNAUTHORIZED, message)
        }
        CatalogStoreError::NotAnAdmin => message_response(StatusCode::FORBIDDEN, message),
        CatalogStoreError::Conflict(_) => message_response(StatusCode::CONFLICT, message),
        CatalogStoreError::Rejected(_) => message_response(StatusCode::BAD_REQUEST, message),
        CatalogStoreError::DeserializationError(_) => {
            tracing::error!("Store failure {}", message);
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn ok_or_error<T: Serialize>(result: Result<T, CatalogStoreError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(err) => error_response(err),
    }
}

fn created_or_error<T: Serialize>(result: Result<T, CatalogStoreError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Created().json(value),
        Err(err) => error_response(err),
    }
}

fn deleted_or_error(result: Result<(), CatalogStoreError>) -> HttpResponse {
    match result {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "Deleted" })),
        Err(err) => error_response(err),
    }
}

/// Some(401 response) unless the request carries a token issued by login
fn reject_unauthorized(store: &Store, request: &HttpRequest) -> Option<HttpResponse> {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map_or(false, |token| store.is_token_valid(token));
    if authorized {
        None
    } else {
        Some(message_response(
            StatusCode::UNAUTHORIZED,
            "Unauthorized".to_string(),
        ))
    }
}

fn record<T: Serialize>(store: &Store, request: &HttpRequest, body: &T) {
    store.record_request(RecordedRequest {
        method: request.method().to_string(),
        path: request.path().to_string(),
        body: serde_json::to_value(body).unwrap_or_default(),
    });
}

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn login(store: Store, sign_in: web::Json<SignIn>) -> Result<HttpResponse, Error> {
    let result = store.login(sign_in.into_inner()).await;
    if let Err(err) = &result {
        tracing::info!("Login rejected {}", err);
    }
    Ok(ok_or_error(result))
}

#[api_v2_operation]
pub async fn get_all_books(
    store: Store,
    request: HttpRequest,
    params: web::Query<BookQueryParams>,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    Ok(ok_or_error(store.list_books(params.into_inner()).await))
}

#[api_v2_operation]
pub async fn add_book(
    store: Store,
    request: HttpRequest,
    payload: web::Json<CreateBookPayload>,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    record(&store, &request, &*payload);
    Ok(created_or_error(store.add_book(payload.into_inner()).await))
}

#[api_v2_operation]
pub async fn get_book(
    store: Store,
    request: HttpRequest,
    book_id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    Ok(ok_or_error(store.get_book(book_id.into_inner()).await))
}

#[api_v2_operation]
pub async fn update_book(
    store: Store,
    request: HttpRequest,
    book_id: web::Path<String>,
    patch: web::Json<UpdateBookPayload>,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    record(&store, &request, &*patch);
    Ok(ok_or_error(
        store
            .update_book(book_id.into_inner(), patch.into_inner())
            .await,
    ))
}

#[api_v2_operation]
pub async fn delete_book(
    store: Store,
    request: HttpRequest,
    book_id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    Ok(deleted_or_error(store.delete_book(book_id.into_inner()).await))
}

/// Multipart body with a single `file` part, only the file name is kept
#[api_v2_operation(skip)]
pub async fn upload(
    store: Store,
    request: HttpRequest,
    body: actix_web::web::Bytes,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    let Some(file_name) = multipart_file_name(&body) else {
        return Ok(message_response(
            StatusCode::BAD_REQUEST,
            "File is required".to_string(),
        ));
    };

    Ok(match store.store_upload(file_name).await {
        Ok(path) => {
            let connection = request.connection_info();
            HttpResponse::Created().json(UploadResponse {
                url: format!("{}://{}{}", connection.scheme(), connection.host(), path),
            })
        }
        Err(err) => error_response(err),
    })
}

fn multipart_file_name(body: &[u8]) -> Option<String> {
    const MARKER: &str = "filename=\"";
    let text = String::from_utf8_lossy(body);
    let start = text.find(MARKER)? + MARKER.len();
    let length = text[start..].find('"')?;
    Some(text[start..start + length].to_string()).filter(|name| !name.is_empty())
}

#[api_v2_operation]
pub async fn get_all_categories(
    store: Store,
    request: HttpRequest,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    Ok(ok_or_error(
        store
            .list_categories(params.into_inner())
            .await
            .map(|data| FindAllCategoriesResponse {
                message: "Categories fetched successfully".to_string(),
                data,
            }),
    ))
}

#[api_v2_operation]
pub async fn add_category(
    store: Store,
    request: HttpRequest,
    payload: web::Json<CreateCategoryPayload>,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    record(&store, &request, &*payload);
    Ok(created_or_error(store.add_category(payload.into_inner()).await))
}

#[api_v2_operation]
pub async fn get_category(
    store: Store,
    request: HttpRequest,
    category_id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    Ok(ok_or_error(store.get_category(category_id.into_inner()).await))
}

#[api_v2_operation]
pub async fn update_category(
    store: Store,
    request: HttpRequest,
    category_id: web::Path<String>,
    patch: web::Json<UpdateCategoryPayload>,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    record(&store, &request, &*patch);
    Ok(ok_or_error(
        store
            .update_category(category_id.into_inner(), patch.into_inner())
            .await,
    ))
}

#[api_v2_operation]
pub async fn delete_category(
    store: Store,
    request: HttpRequest,
    category_id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    Ok(deleted_or_error(
        store.delete_category(category_id.into_inner()).await,
    ))
}

#[api_v2_operation]
pub async fn get_all_age_groups(
    store: Store,
    request: HttpRequest,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    Ok(ok_or_error(
        store
            .list_age_groups(params.into_inner())
            .await
            .map(|data| FindAllAgeGroupsResponse { data }),
    ))
}

#[api_v2_operation]
pub async fn add_age_group(
    store: Store,
    request: HttpRequest,
    payload: web::Json<CreateAgeGroupPayload>,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    record(&store, &request, &*payload);
    Ok(created_or_error(store.add_age_group(payload.into_inner()).await))
}

#[api_v2_operation]
pub async fn get_age_group(
    store: Store,
    request: HttpRequest,
    age_group_id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    Ok(ok_or_error(store.get_age_group(age_group_id.into_inner()).await))
}

#[api_v2_operation]
pub async fn update_age_group(
    store: Store,
    request: HttpRequest,
    age_group_id: web::Path<String>,
    patch: web::Json<UpdateAgeGroupPayload>,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    record(&store, &request, &*patch);
    Ok(ok_or_error(
        store
            .update_age_group(age_group_id.into_inner(), patch.into_inner())
            .await,
    ))
}

#[api_v2_operation]
pub async fn delete_age_group(
    store: Store,
    request: HttpRequest,
    age_group_id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    Ok(deleted_or_error(
        store.delete_age_group(age_group_id.into_inner()).await,
    ))
}

#[api_v2_operation]
pub async fn get_all_transactions(
    store: Store,
    request: HttpRequest,
    params: web::Query<TransactionQueryParams>,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    Ok(ok_or_error(store.list_transactions(params.into_inner()).await))
}

#[api_v2_operation]
pub async fn refund_transaction(
    store: Store,
    request: HttpRequest,
    transaction_id: web::Path<String>,
    refund: web::Json<RefundRequest>,
) -> Result<HttpResponse, Error> {
    if let Some(rejection) = reject_unauthorized(&store, &request) {
        return Ok(rejection);
    }
    record(&store, &request, &*refund);
    Ok(ok_or_error(
        store
            .refund_transaction(transaction_id.into_inner(), refund.into_inner())
            .await,
    ))
}

#[cfg(test)]
mod handler_tests {
    use super::multipart_file_name;

    #[test]
    fn file_name_is_read_from_content_disposition() {
        let body = b"--boundary\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cover.png\"\r\nContent-Type: image/png\r\n\r\n\x89PNG\r\n--boundary--\r\n";
        assert_eq!(multipart_file_name(body), Some("cover.png".to_string()));
        assert_eq!(multipart_file_name(b"no parts here"), None);
        assert_eq!(multipart_file_name(b"filename=\"\""), None);
    }
}
