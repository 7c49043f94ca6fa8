//! Request-scoped cache of read results keyed the same way for every entity:
//! `[root]`, `[root, "list"]`, `[root, "list", params]`, `[root, "detail"]`,
//! `[root, "detail", id]`. Invalidating a key marks every entry under it stale.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    fn extend(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        QueryKey(segments)
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[derive(Debug, Clone, Copy)]
/// Key factory for one entity
pub struct QueryKeys {
    root: &'static str,
}

pub const BOOK_KEYS: QueryKeys = QueryKeys::new("books");
pub const CATEGORY_KEYS: QueryKeys = QueryKeys::new("categories");
pub const AGE_GROUP_KEYS: QueryKeys = QueryKeys::new("age-groups");
pub const TRANSACTION_KEYS: QueryKeys = QueryKeys::new("transactions");

impl QueryKeys {
    pub const fn new(root: &'static str) -> Self {
        Self { root }
    }

    pub fn all(&self) -> QueryKey {
        QueryKey(vec![self.root.to_string()])
    }

    pub fn lists(&self) -> QueryKey {
        self.all().extend("list")
    }

    /// Params are part of the key through their JSON form, so equal params share an entry
    pub fn list<P: Serialize>(&self, params: &P) -> QueryKey {
        let params = serde_json::to_string(params).unwrap_or_default();
        self.lists().extend(params)
    }

    pub fn details(&self) -> QueryKey {
        self.all().extend("detail")
    }

    pub fn detail(&self, id: &str) -> QueryKey {
        self.details().extend(id)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum KeyMatch {
    /// The key itself and everything nested under it
    Prefix,
    Exact,
}

struct CacheEntry {
    value: Value,
    fetched_at: Instant,
    invalidated: bool,
}

pub struct QueryCache {
    stale_time: Duration,
    entries: parking_lot::RwLock<HashMap<QueryKey, CacheEntry>>,
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            stale_time,
            entries: Default::default(),
        }
    }

    /// Returns the cached value unless it is missing, invalidated or older than the stale time
    pub fn get_fresh<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.invalidated || entry.fetched_at.elapsed() > self.stale_time {
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Last value stored under the key, stale or not
    pub fn get_previous<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.entries.read();
        serde_json::from_value(entries.get(key)?.value.clone()).ok()
    }

    pub fn set_query_data<T: Serialize>(&self, key: QueryKey, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.entries.write().insert(
                    key,
                    CacheEntry {
                        value,
                        fetched_at: Instant::now(),
                        invalidated: false,
                    },
                );
            }
            Err(err) => tracing::warn!("Failed to cache value for {}: {}", key, err),
        }
    }

    /// Marks matching entries stale, returns how many were affected
    pub fn invalidate(&self, key: &QueryKey, key_match: KeyMatch) -> usize {
        let mut entries = self.entries.write();
        let mut invalidated = 0;
        for (entry_key, entry) in entries.iter_mut() {
            let matches = match key_match {
                KeyMatch::Prefix => entry_key.starts_with(key),
                KeyMatch::Exact => entry_key == key,
            };
            if matches {
                entry.invalidated = true;
                invalidated += 1;
            }
        }
        tracing::debug!("Invalidated {} cache entries under {}", invalidated, key);
        invalidated
    }

    pub fn remove(&self, key: &QueryKey) {
        self.entries.write().remove(key);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod query_cache_tests {
    use crate::api::{BookQueryParams, VisibilityFilter};

    use super::*;

    fn cache() -> QueryCache {
        QueryCache::new(Duration::from_secs(60))
    }

    #[test]
    fn keys_nest_under_their_root() {
        let params = BookQueryParams {
            limit: Some(50),
            ..Default::default()
        };
        let list_key = BOOK_KEYS.list(&params);

        assert!(list_key.starts_with(&BOOK_KEYS.lists()));
        assert!(list_key.starts_with(&BOOK_KEYS.all()));
        assert!(!list_key.starts_with(&BOOK_KEYS.details()));
        assert!(!list_key.starts_with(&CATEGORY_KEYS.all()));
        assert_eq!(list_key, BOOK_KEYS.list(&params.clone()));
        assert_eq!(BOOK_KEYS.detail("42").to_string(), "[books, detail, 42]");
    }

    #[test]
    fn different_params_are_different_entries() {
        let cache = cache();
        let drafts = BookQueryParams {
            visibility: Some(VisibilityFilter::Draft),
            ..Default::default()
        };
        cache.set_query_data(BOOK_KEYS.list(&BookQueryParams::default()), &vec![1, 2]);
        cache.set_query_data(BOOK_KEYS.list(&drafts), &vec![3]);

        assert_eq!(
            cache.get_fresh::<Vec<i32>>(&BOOK_KEYS.list(&drafts)),
            Some(vec![3])
        );
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn invalidating_lists_leaves_details_fresh() {
        let cache = cache();
        let list_key = BOOK_KEYS.list(&BookQueryParams::default());
        cache.set_query_data(list_key.clone(), &"list");
        cache.set_query_data(BOOK_KEYS.detail("1"), &"detail");
        cache.set_query_data(CATEGORY_KEYS.list(&BookQueryParams::default()), &"categories");

        assert_eq!(cache.invalidate(&BOOK_KEYS.lists(), KeyMatch::Prefix), 1);

        assert_eq!(cache.get_fresh::<String>(&list_key), None);
        assert_eq!(cache.get_previous::<String>(&list_key).as_deref(), Some("list"));
        assert_eq!(
            cache.get_fresh::<String>(&BOOK_KEYS.detail("1")).as_deref(),
            Some("detail")
        );
        assert!(cache
            .get_fresh::<String>(&CATEGORY_KEYS.list(&BookQueryParams::default()))
            .is_some());
    }

    #[test]
    fn exact_invalidation_only_hits_one_key() {
        let cache = cache();
        let fifty = BookQueryParams {
            limit: Some(50),
            ..Default::default()
        };
        cache.set_query_data(BOOK_KEYS.list(&fifty), &1);
        cache.set_query_data(BOOK_KEYS.list(&BookQueryParams::default()), &2);

        assert_eq!(cache.invalidate(&BOOK_KEYS.list(&fifty), KeyMatch::Exact), 1);
        assert_eq!(cache.invalidate(&BOOK_KEYS.lists(), KeyMatch::Exact), 0);
        assert!(cache
            .get_fresh::<i32>(&BOOK_KEYS.list(&BookQueryParams::default()))
            .is_some());
    }

    #[test]
    fn entries_go_stale_with_time_and_refresh_on_set() {
        let cache = QueryCache::new(Duration::ZERO);
        cache.set_query_data(BOOK_KEYS.detail("1"), &"v1");
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get_fresh::<String>(&BOOK_KEYS.detail("1")), None);

        let cache = cache_with_entry();
        cache.invalidate(&BOOK_KEYS.all(), KeyMatch::Prefix);
        cache.set_query_data(BOOK_KEYS.detail("1"), &"v2");
        assert_eq!(
            cache.get_fresh::<String>(&BOOK_KEYS.detail("1")).as_deref(),
            Some("v2")
        );

        cache.clear();
        assert!(cache.is_empty());
    }

    fn cache_with_entry() -> QueryCache {
        let cache = cache();
        cache.set_query_data(BOOK_KEYS.detail("1"), &"v1");
        cache
    }
}
