/// In-memory data store
///
/// Used by tests and the `memory` backend. Supports switching itself
/// offline, adding latency, and breaking lookups for single users so the
/// feed's failure paths can be exercised.
use crate::{
    error::{ShelfError, ShelfResult},
    feed::types::RawReview,
    store::{DataStore, UserRecord},
};
use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Fault applied to lookups of one user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserFault {
    /// Lookup fails with `Internal`
    Fail,
    /// Lookup is delayed before answering
    Delay(Duration),
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
    reviews: Arc<RwLock<Vec<RawReview>>>,
    user_faults: Arc<RwLock<HashMap<String, UserFault>>>,
    offline: Arc<AtomicBool>,
    latency: Option<Duration>,
    review_queries: Arc<AtomicUsize>,
    user_lookups: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// When false, every call fails with `DataUnavailable`
    pub fn set_available(&self, available: bool) {
        self.offline.store(!available, Ordering::SeqCst);
    }

    /// Make lookups of `user_id` fail or stall; other users are unaffected
    pub async fn set_user_fault(&self, user_id: &str, fault: UserFault) {
        self.user_faults
            .write()
            .await
            .insert(user_id.to_string(), fault);
    }

    pub fn review_query_count(&self) -> usize {
        self.review_queries.load(Ordering::SeqCst)
    }

    pub fn user_lookup_count(&self) -> usize {
        self.user_lookups.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> ShelfResult<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(ShelfError::DataUnavailable(
                "memory store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn query_reviews_by_actors(
        &self,
        actor_ids: &[String],
        limit: usize,
    ) -> ShelfResult<Vec<RawReview>> {
        self.review_queries.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;

        let reviews = self.reviews.read().await;
        let mut matching: Vec<RawReview> = reviews
            .iter()
            .filter(|review| actor_ids.contains(&review.actor_id))
            .cloned()
            .collect();

        // Undated reviews sort last, as an indexed query would leave them out
        matching.sort_by_key(|review| {
            Reverse(review.created_at.as_ref().and_then(|t| t.to_datetime()))
        });
        matching.truncate(limit);

        Ok(matching)
    }

    async fn get_user(&self, actor_id: &str) -> ShelfResult<Option<UserRecord>> {
        self.user_lookups.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;

        let fault = self.user_faults.read().await.get(actor_id).copied();
        match fault {
            Some(UserFault::Fail) => {
                return Err(ShelfError::Internal(format!(
                    "lookup of {} failed",
                    actor_id
                )))
            }
            Some(UserFault::Delay(delay)) => tokio::time::sleep(delay).await,
            None => {}
        }

        Ok(self.users.read().await.get(actor_id).cloned())
    }

    async fn put_user(&self, user: UserRecord) -> ShelfResult<()> {
        self.enter().await?;

        self.users.write().await.insert(user.id.clone(), user);
        Ok(())
    }

    async fn put_review(&self, review: RawReview) -> ShelfResult<()> {
        if review.id.is_empty() {
            return Err(ShelfError::Validation("Review id cannot be empty".to_string()));
        }
        self.enter().await?;

        let mut reviews = self.reviews.write().await;
        match reviews.iter_mut().find(|existing| existing.id == review.id) {
            Some(existing) => *existing = review,
            None => reviews.push(review),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::timestamp::RawTimestamp;

    fn review(id: &str, actor: &str, created_at: Option<&str>) -> RawReview {
        RawReview {
            id: id.to_string(),
            actor_id: actor.to_string(),
            actor_display_name: String::new(),
            subject_id: "g1".to_string(),
            subject_name: "Portal".to_string(),
            rating: 3,
            body: String::new(),
            contains_spoilers: false,
            created_at: created_at.map(RawTimestamp::from),
        }
    }

    #[tokio::test]
    async fn test_reviews_filtered_ordered_and_bounded() {
        let store = MemoryStore::new();
        store.put_review(review("a", "u1", Some("2024-01-01T00:00:00Z"))).await.unwrap();
        store.put_review(review("b", "u2", Some("2024-01-03T00:00:00Z"))).await.unwrap();
        store.put_review(review("c", "u3", Some("2024-01-04T00:00:00Z"))).await.unwrap();
        store.put_review(review("d", "u1", None)).await.unwrap();
        store.put_review(review("e", "u1", Some("2024-01-02T00:00:00Z"))).await.unwrap();

        let actors = vec!["u1".to_string(), "u2".to_string()];
        let found = store.query_reviews_by_actors(&actors, 3).await.unwrap();
        let ids: Vec<&str> = found.iter().map(|r| r.id.as_str()).collect();

        assert_eq!(ids, vec!["b", "e", "a"]);
        assert_eq!(store.review_query_count(), 1);
    }

    #[tokio::test]
    async fn test_put_review_replaces_by_id() {
        let store = MemoryStore::new();
        store.put_review(review("a", "u1", None)).await.unwrap();
        let mut updated = review("a", "u1", None);
        updated.rating = 5;
        store.put_review(updated).await.unwrap();

        let found = store
            .query_reviews_by_actors(&["u1".to_string()], 10)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rating, 5);
    }

    #[tokio::test]
    async fn test_review_without_id_rejected() {
        let store = MemoryStore::new();
        let result = store.put_review(review("", "u1", None)).await;
        assert!(matches!(result, Err(ShelfError::Validation(_))));

        let found = store
            .query_reviews_by_actors(&["u1".to_string()], 10)
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_user_fault_only_affects_that_user() {
        let store = MemoryStore::new();
        for id in ["u1", "u2"] {
            store
                .put_user(UserRecord {
                    id: id.to_string(),
                    display_name: id.to_uppercase(),
                    liked_games: Vec::new(),
                    following: Vec::new(),
                })
                .await
                .unwrap();
        }
        store.set_user_fault("u2", UserFault::Fail).await;

        assert!(store.get_user("u1").await.unwrap().is_some());
        assert!(matches!(store.get_user("u2").await, Err(ShelfError::Internal(_))));
    }

    #[tokio::test]
    async fn test_get_user() {
        let store = MemoryStore::new();
        store
            .put_user(UserRecord {
                id: "u1".to_string(),
                display_name: "One".to_string(),
                liked_games: Vec::new(),
                following: vec!["u2".to_string()],
            })
            .await
            .unwrap();

        let user = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(user.following, vec!["u2".to_string()]);
        assert!(store.get_user("nobody").await.unwrap().is_none());
        assert_eq!(store.user_lookup_count(), 2);
    }

    #[tokio::test]
    async fn test_offline_store_fails() {
        let store = MemoryStore::new();
        store.set_available(false);

        let result = store.get_user("u1").await;
        assert!(matches!(result, Err(ShelfError::DataUnavailable(_))));

        store.set_available(true);
        assert!(store.get_user("u1").await.is_ok());
    }
}
