pub use in_memory_catalog_store::{
    InMemoryCatalogStore, ADMIN_EMAIL, ADMIN_PASSWORD, CUSTOMER_EMAIL, CUSTOMER_PASSWORD,
};

use bookstore_admin::api::{
    AgeGroup, AuthResponse, Book, BookQueryParams, Category, CreateAgeGroupPayload,
    CreateBookPayload, CreateCategoryPayload, FindAllBooksResponse, ListParams, RefundRequest,
    SignIn, TransactionQueryParams, TransactionsResponse, UpdateAgeGroupPayload,
    UpdateBookPayload, UpdateCategoryPayload,
};
use serde::Serialize;

mod in_memory_catalog_store;

#[derive(thiserror::Error, Debug)]
pub enum CatalogStoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Forbidden resource")]
    NotAnAdmin,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Failed to deserialize record: {0}")]
    DeserializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Write request as it reached the server, kept for assertions
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: serde_json::Value,
}

#[async_trait::async_trait]
pub trait CatalogStore {
    /// Issues a token for an administrator
    async fn login(&self, sign_in: SignIn) -> Result<AuthResponse, CatalogStoreError>;
    /// Checks a bearer token issued by [`CatalogStore::login`]
    fn is_token_valid(&self, token: &str) -> bool;
    fn record_request(&self, request: RecordedRequest);

    /// Lists books newest first, filtered and paginated by `params`
    async fn list_books(
        &self,
        params: BookQueryParams,
    ) -> Result<FindAllBooksResponse, CatalogStoreError>;
    async fn get_book(&self, book_id: String) -> Result<Book, CatalogStoreError>;
    /// Adds a book, the slug is derived from the title when missing and must be unique
    async fn add_book(&self, payload: CreateBookPayload) -> Result<Book, CatalogStoreError>;
    /// Merges the set fields of `patch` into the book
    async fn update_book(
        &self,
        book_id: String,
        patch: UpdateBookPayload,
    ) -> Result<Book, CatalogStoreError>;
    async fn delete_book(&self, book_id: String) -> Result<(), CatalogStoreError>;

    async fn list_categories(&self, params: ListParams) -> Result<Vec<Category>, CatalogStoreError>;
    async fn get_category(&self, category_id: String) -> Result<Category, CatalogStoreError>;
    async fn add_category(
        &self,
        payload: CreateCategoryPayload,
    ) -> Result<Category, CatalogStoreError>;
    async fn update_category(
        &self,
        category_id: String,
        patch: UpdateCategoryPayload,
    ) -> Result<Category, CatalogStoreError>;
    async fn delete_category(&self, category_id: String) -> Result<(), CatalogStoreError>;

    async fn list_age_groups(&self, params: ListParams) -> Result<Vec<AgeGroup>, CatalogStoreError>;
    async fn get_age_group(&self, age_group_id: String) -> Result<AgeGroup, CatalogStoreError>;
    async fn add_age_group(
        &self,
        payload: CreateAgeGroupPayload,
    ) -> Result<AgeGroup, CatalogStoreError>;
    async fn update_age_group(
        &self,
        age_group_id: String,
        patch: UpdateAgeGroupPayload,
    ) -> Result<AgeGroup, CatalogStoreError>;
    async fn delete_age_group(&self, age_group_id: String) -> Result<(), CatalogStoreError>;

    /// Keeps the uploaded file name and returns the path it is served under
    async fn store_upload(&self, file_name: String) -> Result<String, CatalogStoreError>;

    async fn list_transactions(
        &self,
        params: TransactionQueryParams,
    ) -> Result<TransactionsResponse, CatalogStoreError>;
    /// Refunds a successful transaction, fully when no amount is given
    async fn refund_transaction(
        &self,
        transaction_id: String,
        refund: RefundRequest,
    ) -> Result<serde_json::Value, CatalogStoreError>;
}

/// Lowercase words of `text` joined by dashes
pub fn slugify(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
