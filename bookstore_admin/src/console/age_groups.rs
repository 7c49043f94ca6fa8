use crate::api::{
    AgeGroup, CreateAgeGroupPayload, FindAllAgeGroupsResponse, ListParams, UpdateAgeGroupPayload,
};
use crate::console::AdminConsole;
use crate::errors::ApiError;
use crate::query_cache::{KeyMatch, AGE_GROUP_KEYS};

pub struct AgeGroups<'a> {
    console: &'a AdminConsole,
}

impl<'a> AgeGroups<'a> {
    pub(super) fn new(console: &'a AdminConsole) -> Self {
        Self { console }
    }

    pub async fn list(&self, params: &ListParams) -> Result<FindAllAgeGroupsResponse, ApiError> {
        let client = &self.console.client;
        self.console
            .query(AGE_GROUP_KEYS.list(params), || client.list_age_groups(params))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<AgeGroup, ApiError> {
        let client = &self.console.client;
        self.console
            .query(AGE_GROUP_KEYS.detail(id), || client.get_age_group(id))
            .await
    }

    pub async fn create(&self, payload: &CreateAgeGroupPayload) -> Result<AgeGroup, ApiError> {
        match self.console.client.create_age_group(payload).await {
            Ok(age_group) => {
                self.console
                    .mutation_succeeded("Age group created successfully", &AGE_GROUP_KEYS.lists());
                Ok(age_group)
            }
            Err(err) => {
                self.console.mutation_failed(&err, "Failed to create age group");
                Err(err)
            }
        }
    }

    pub async fn update(
        &self,
        id: &str,
        payload: &UpdateAgeGroupPayload,
    ) -> Result<AgeGroup, ApiError> {
        match self.console.client.update_age_group(id, payload).await {
            Ok(age_group) => {
                self.console
                    .mutation_succeeded("Age group updated successfully", &AGE_GROUP_KEYS.lists());
                self.console
                    .cache
                    .invalidate(&AGE_GROUP_KEYS.detail(&age_group.id), KeyMatch::Exact);
                Ok(age_group)
            }
            Err(err) => {
                self.console.mutation_failed(&err, "Failed to update age group");
                Err(err)
            }
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        match self.console.client.delete_age_group(id).await {
            Ok(()) => {
                self.console
                    .mutation_succeeded("Age group deleted successfully", &AGE_GROUP_KEYS.lists());
                Ok(())
            }
            Err(err) => {
                self.console.mutation_failed(&err, "Failed to delete age group");
                Err(err)
            }
        }
    }
}
