//! Operations as the admin performs them: each read goes through the query cache,
//! each write reports back through the notifier and refreshes the affected lists.
//! Any 401 ends the session.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use age_groups::AgeGroups;
pub use auth::Auth;
pub use books::{BookFormOptions, Books};
pub use categories::Categories;
pub use transactions::Transactions;

use crate::client::BookstoreAdminClient;
use crate::errors::ApiError;
use crate::notifications::Notifier;
use crate::query_cache::{KeyMatch, QueryCache, QueryKey};
use crate::session::Session;

mod age_groups;
mod auth;
mod books;
mod categories;
mod transactions;

pub struct AdminConsole {
    client: Arc<BookstoreAdminClient>,
    cache: Arc<QueryCache>,
    session: Arc<Session>,
    notifier: Arc<dyn Notifier>,
}

impl AdminConsole {
    pub fn new(
        client: Arc<BookstoreAdminClient>,
        cache: Arc<QueryCache>,
        session: Arc<Session>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            cache,
            session,
            notifier,
        }
    }

    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    pub fn books(&self) -> Books<'_> {
        Books::new(self)
    }

    pub fn categories(&self) -> Categories<'_> {
        Categories::new(self)
    }

    pub fn age_groups(&self) -> AgeGroups<'_> {
        AgeGroups::new(self)
    }

    pub fn transactions(&self) -> Transactions<'_> {
        Transactions::new(self)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Serves `key` from the cache when fresh, otherwise fetches and stores it
    async fn query<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if let Some(cached) = self.cache.get_fresh(&key) {
            tracing::debug!("Serving {} from cache", key);
            return Ok(cached);
        }

        match fetch().await {
            Ok(value) => {
                self.cache.set_query_data(key, &value);
                Ok(value)
            }
            Err(err) => {
                if err.is_unauthorized() {
                    self.session.handle_unauthorized();
                } else {
                    tracing::error!("Query {} failed {}", key, err);
                }
                Err(err)
            }
        }
    }

    /// Reports a successful write and marks the given lists stale
    fn mutation_succeeded(&self, message: &str, stale_lists: &QueryKey) {
        self.notifier.success(message);
        self.cache.invalidate(stale_lists, KeyMatch::Prefix);
    }

    fn mutation_failed(&self, err: &ApiError, fallback: &str) {
        if err.is_unauthorized() {
            self.session.handle_unauthorized();
            return;
        }
        tracing::error!("Mutation failed {}", err);
        self.notifier.error(&err.user_message(fallback));
    }
}
