use crate::api::{
    Category, CreateCategoryPayload, FindAllCategoriesResponse, ListParams, UpdateCategoryPayload,
};
use crate::console::AdminConsole;
use crate::errors::ApiError;
use crate::query_cache::{KeyMatch, CATEGORY_KEYS};

pub struct Categories<'a> {
    console: &'a AdminConsole,
}

impl<'a> Categories<'a> {
    pub(super) fn new(console: &'a AdminConsole) -> Self {
        Self { console }
    }

    pub async fn list(&self, params: &ListParams) -> Result<FindAllCategoriesResponse, ApiError> {
        let client = &self.console.client;
        self.console
            .query(CATEGORY_KEYS.list(params), || client.list_categories(params))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Category, ApiError> {
        let client = &self.console.client;
        self.console
            .query(CATEGORY_KEYS.detail(id), || client.get_category(id))
            .await
    }

    pub async fn create(&self, payload: &CreateCategoryPayload) -> Result<Category, ApiError> {
        match self.console.client.create_category(payload).await {
            Ok(category) => {
                self.console
                    .mutation_succeeded("Category created successfully", &CATEGORY_KEYS.lists());
                Ok(category)
            }
            Err(err) => {
                self.console.mutation_failed(&err, "Failed to create category");
                Err(err)
            }
        }
    }

    pub async fn update(
        &self,
        id: &str,
        payload: &UpdateCategoryPayload,
    ) -> Result<Category, ApiError> {
        match self.console.client.update_category(id, payload).await {
            Ok(category) => {
                self.console
                    .mutation_succeeded("Category updated successfully", &CATEGORY_KEYS.lists());
                self.console
                    .cache
                    .invalidate(&CATEGORY_KEYS.detail(&category.id), KeyMatch::Exact);
                Ok(category)
            }
            Err(err) => {
                self.console.mutation_failed(&err, "Failed to update category");
                Err(err)
            }
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        match self.console.client.delete_category(id).await {
            Ok(()) => {
                self.console
                    .mutation_succeeded("Category deleted successfully", &CATEGORY_KEYS.lists());
                Ok(())
            }
            Err(err) => {
                self.console.mutation_failed(&err, "Failed to delete category");
                Err(err)
            }
        }
    }
}
