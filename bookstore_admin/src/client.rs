use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::multipart::{Form, Part};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{
    AgeGroup, AuthResponse, Book, Category, CreateAgeGroupPayload, CreateBookPayload,
    CreateCategoryPayload, FindAllAgeGroupsResponse, FindAllBooksResponse,
    FindAllCategoriesResponse, BookQueryParams, ListParams, RefundRequest, SignIn,
    TransactionQueryParams, TransactionsResponse, UpdateAgeGroupPayload, UpdateBookPayload,
    UpdateCategoryPayload, UploadResponse,
};
use crate::errors::ApiError;
use crate::uploads::UploadFile;

/// Supplies the bearer token attached to every request
pub trait AccessTokenSource: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base of every endpoint, e.g. `http://localhost:8080/api/v1`
    pub base_url: String,
    pub timeout: Duration,
    /// Retries of transient failures for reads, writes are never retried
    pub max_read_retries: u32,
}

pub struct BookstoreAdminClient {
    url: String,
    read_client: ClientWithMiddleware,
    write_client: ClientWithMiddleware,
    upload_client: reqwest::Client,
    tokens: Arc<dyn AccessTokenSource>,
}

impl BookstoreAdminClient {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn AccessTokenSource>) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build reqwest client")?;

        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_read_retries);
        let read_client = ClientBuilder::new(reqwest_client.clone())
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        let write_client = ClientBuilder::new(reqwest_client.clone())
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: config.base_url.trim_end_matches('/').to_string(),
            read_client,
            write_client,
            upload_client: reqwest_client,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.access_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            tracing::debug!("Request failed with status {}", status);
            return Err(ApiError::from_status(status, &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: Option<&Q>,
    ) -> Result<T, ApiError> {
        let mut request = self.read_client.get(self.endpoint(path));
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = self.authorize(request).send().await?;
        Self::parse(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.write_client.post(self.endpoint(path)).json(body);
        let response = self.authorize(request).send().await?;
        Self::parse(response).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.write_client.put(self.endpoint(path)).json(body);
        let response = self.authorize(request).send().await?;
        Self::parse(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.write_client.delete(self.endpoint(path));
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.bytes().await?;
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Calls POST /admin/auth/login
    pub async fn login(&self, sign_in: &SignIn) -> Result<AuthResponse, ApiError> {
        self.post("/admin/auth/login", sign_in).await
    }

    /// Calls GET /admin/books
    pub async fn list_books(
        &self,
        params: &BookQueryParams,
    ) -> Result<FindAllBooksResponse, ApiError> {
        self.get("/admin/books", Some(params)).await
    }

    /// Calls GET /admin/books/{id}
    pub async fn get_book(&self, id: &str) -> Result<Book, ApiError> {
        self.get::<_, ()>(&format!("/admin/books/{}", id), None).await
    }

    /// Calls POST /admin/books, returns the created book
    pub async fn create_book(&self, payload: &CreateBookPayload) -> Result<Book, ApiError> {
        self.post("/admin/books", payload).await
    }

    /// Calls PUT /admin/books/{id}, returns the book after the update
    pub async fn update_book(
        &self,
        id: &str,
        payload: &UpdateBookPayload,
    ) -> Result<Book, ApiError> {
        self.put(&format!("/admin/books/{}", id), payload).await
    }

    /// Calls DELETE /admin/books/{id}
    pub async fn delete_book(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/admin/books/{}", id)).await
    }

    /// Calls POST /admin/upload with the file as multipart field `file`
    pub async fn upload_file(&self, file: UploadFile) -> Result<UploadResponse, ApiError> {
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(file.mime_type)?;
        let mut request = self
            .upload_client
            .post(self.endpoint("/admin/upload"))
            .multipart(Form::new().part("file", part));
        if let Some(token) = self.tokens.access_token() {
            request = request.bearer_auth(token);
        }
        Self::parse(request.send().await?).await
    }

    /// Calls GET /categories
    pub async fn list_categories(
        &self,
        params: &ListParams,
    ) -> Result<FindAllCategoriesResponse, ApiError> {
        self.get("/categories", Some(params)).await
    }

    /// Calls GET /categories/{id}
    pub async fn get_category(&self, id: &str) -> Result<Category, ApiError> {
        self.get::<_, ()>(&format!("/categories/{}", id), None).await
    }

    /// Calls POST /categories
    pub async fn create_category(
        &self,
        payload: &CreateCategoryPayload,
    ) -> Result<Category, ApiError> {
        self.post("/categories", payload).await
    }

    /// Calls PUT /categories/{id}
    pub async fn update_category(
        &self,
        id: &str,
        payload: &UpdateCategoryPayload,
    ) -> Result<Category, ApiError> {
        self.put(&format!("/categories/{}", id), payload).await
    }

    /// Calls DELETE /categories/{id}
    pub async fn delete_category(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/categories/{}", id)).await
    }

    /// Calls GET /age-groups
    pub async fn list_age_groups(
        &self,
        params: &ListParams,
    ) -> Result<FindAllAgeGroupsResponse, ApiError> {
        self.get("/age-groups", Some(params)).await
    }

    /// Calls GET /age-groups/{id}
    pub async fn get_age_group(&self, id: &str) -> Result<AgeGroup, ApiError> {
        self.get::<_, ()>(&format!("/age-groups/{}", id), None).await
    }

    /// Calls POST /age-groups
    pub async fn create_age_group(
        &self,
        payload: &CreateAgeGroupPayload,
    ) -> Result<AgeGroup, ApiError> {
        self.post("/age-groups", payload).await
    }

    /// Calls PUT /age-groups/{id}
    pub async fn update_age_group(
        &self,
        id: &str,
        payload: &UpdateAgeGroupPayload,
    ) -> Result<AgeGroup, ApiError> {
        self.put(&format!("/age-groups/{}", id), payload).await
    }

    /// Calls DELETE /age-groups/{id}
    pub async fn delete_age_group(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/age-groups/{}", id)).await
    }

    /// Calls GET /transactions
    pub async fn list_transactions(
        &self,
        params: &TransactionQueryParams,
    ) -> Result<TransactionsResponse, ApiError> {
        self.get("/transactions", Some(params)).await
    }

    /// Calls POST /transactions/{id}/refund
    /// Refund bookkeeping belongs to the backend, its answer is passed through as is
    pub async fn refund_transaction(
        &self,
        id: &str,
        refund: &RefundRequest,
    ) -> Result<serde_json::Value, ApiError> {
        self.post(&format!("/transactions/{}/refund", id), refund)
            .await
    }
}
