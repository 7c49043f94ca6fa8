use std::path::Path;

use futures_util::future::try_join;

use crate::api::{
    AgeGroup, Book, BookQueryParams, Category, CreateBookPayload, FindAllBooksResponse,
    ListParams, UpdateBookPayload, UploadResponse,
};
use crate::book_form::BookFormValues;
use crate::console::AdminConsole;
use crate::errors::ApiError;
use crate::query_cache::{KeyMatch, BOOK_KEYS};
use crate::session::Route;
use crate::uploads::{self, UploadKind};

const FALLBACK_ERROR: &str = "An unexpected error occurred";
/// Page size of the book listing screen, refreshed explicitly after a create
const LISTING_PAGE_SIZE: u32 = 50;

/// Choices offered by the book form
#[derive(Debug, Clone)]
pub struct BookFormOptions {
    pub categories: Vec<Category>,
    pub age_groups: Vec<AgeGroup>,
}

pub struct Books<'a> {
    console: &'a AdminConsole,
}

impl<'a> Books<'a> {
    pub(super) fn new(console: &'a AdminConsole) -> Self {
        Self { console }
    }

    pub async fn list(&self, params: &BookQueryParams) -> Result<FindAllBooksResponse, ApiError> {
        let client = &self.console.client;
        self.console
            .query(BOOK_KEYS.list(params), || client.list_books(params))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Book, ApiError> {
        let client = &self.console.client;
        self.console
            .query(BOOK_KEYS.detail(id), || client.get_book(id))
            .await
    }

    pub async fn create(&self, payload: &CreateBookPayload) -> Result<Book, ApiError> {
        match self.console.client.create_book(payload).await {
            Ok(book) => {
                self.console
                    .mutation_succeeded("Book created successfully", &BOOK_KEYS.lists());
                Ok(book)
            }
            Err(err) => {
                self.console.mutation_failed(&err, FALLBACK_ERROR);
                Err(err)
            }
        }
    }

    /// Besides refreshing lists, seeds the detail entry with the updated book
    pub async fn update(&self, id: &str, payload: &UpdateBookPayload) -> Result<Book, ApiError> {
        match self.console.client.update_book(id, payload).await {
            Ok(book) => {
                self.console
                    .mutation_succeeded("Book updated successfully", &BOOK_KEYS.lists());
                self.console
                    .cache
                    .set_query_data(BOOK_KEYS.detail(&book.id), &book);
                Ok(book)
            }
            Err(err) => {
                self.console.mutation_failed(&err, FALLBACK_ERROR);
                Err(err)
            }
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        match self.console.client.delete_book(id).await {
            Ok(()) => {
                self.console
                    .mutation_succeeded("Book deleted successfully", &BOOK_KEYS.lists());
                self.console.cache.remove(&BOOK_KEYS.detail(id));
                Ok(())
            }
            Err(err) => {
                self.console.mutation_failed(&err, FALLBACK_ERROR);
                Err(err)
            }
        }
    }

    /// Uploads a cover, snapshot or book file and returns the url to put in the form
    pub async fn upload_file(&self, path: &Path, kind: UploadKind) -> Result<UploadResponse, ApiError> {
        let result = match uploads::read_upload(path, kind).await {
            Ok(file) => self.console.client.upload_file(file).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(uploaded) => {
                self.console.notifier.success("File uploaded successfully");
                Ok(uploaded)
            }
            Err(err) => {
                self.console.mutation_failed(&err, "Failed to upload file");
                Err(err)
            }
        }
    }

    /// Categories and age groups for the form, fetched side by side
    pub async fn form_options(&self) -> Result<BookFormOptions, ApiError> {
        let params = ListParams::default();
        let (categories, age_groups) = try_join(
            self.console.categories().list(&params),
            self.console.age_groups().list(&params),
        )
        .await?;
        Ok(BookFormOptions {
            categories: categories.data,
            age_groups: age_groups.data,
        })
    }

    /// Validates the form and creates the book, or updates it when `existing_id` is given.
    /// Field errors come back as [`ApiError::Validation`] and nothing is sent
    pub async fn submit_form(
        &self,
        form: &BookFormValues,
        existing_id: Option<&str>,
    ) -> Result<Book, ApiError> {
        let base_url = self.console.client.base_url();

        match existing_id {
            Some(id) => {
                let payload = form.submit_update(base_url)?;
                self.update(id, &payload).await
            }
            None => {
                let payload = form.submit(base_url)?;
                let book = self.create(&payload).await?;
                let listing = BookQueryParams {
                    limit: Some(LISTING_PAGE_SIZE),
                    ..Default::default()
                };
                self.console
                    .cache
                    .invalidate(&BOOK_KEYS.list(&listing), KeyMatch::Exact);
                self.console.session.navigate(Route::Books);
                Ok(book)
            }
        }
    }
}
