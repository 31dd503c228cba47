/// Event source adapter
///
/// Gathers raw review documents and per-actor liked-games lists for a set
/// of actors. Reviews come from one bounded query; liked games are read from
/// each actor's user document with the lookups fanned out concurrently.
/// Actors without a user document, or whose lookup fails, contribute no
/// likes; only a failed review query fails the whole fetch.
use crate::{
    error::{ShelfError, ShelfResult},
    feed::types::{LikedGameMembership, RawReview},
    store::DataStore,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Raw events for one feed build
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFeedEvents {
    pub reviews: Vec<RawReview>,
    /// One per resolved actor, in the order the actors were requested
    pub memberships: Vec<LikedGameMembership>,
    /// Actors that have no user document
    pub missing_actors: Vec<String>,
}

#[derive(Clone)]
pub struct FeedSource {
    store: Arc<dyn DataStore>,
    fetch_timeout: Duration,
}

impl FeedSource {
    pub fn new(store: Arc<dyn DataStore>, fetch_timeout: Duration) -> Self {
        Self {
            store,
            fetch_timeout,
        }
    }

    /// Fetch raw events for `actor_ids`. Dropping the returned future aborts
    /// any lookups still in flight.
    pub async fn fetch(&self, actor_ids: &[String], limit: usize) -> ShelfResult<RawFeedEvents> {
        let actor_ids = dedupe(actor_ids);
        if actor_ids.is_empty() {
            return Ok(RawFeedEvents::default());
        }

        if limit == 0 {
            return Err(ShelfError::Validation(
                "Feed limit must be positive".to_string(),
            ));
        }

        debug!("Fetching feed events for {} actor(s), limit {}", actor_ids.len(), limit);

        let (reviews, (memberships, missing_actors)) = futures::future::join(
            self.fetch_reviews(&actor_ids, limit),
            self.fetch_memberships(&actor_ids),
        )
        .await;

        Ok(RawFeedEvents {
            reviews: reviews?,
            memberships,
            missing_actors,
        })
    }

    async fn fetch_reviews(&self, actor_ids: &[String], limit: usize) -> ShelfResult<Vec<RawReview>> {
        match tokio::time::timeout(
            self.fetch_timeout,
            self.store.query_reviews_by_actors(actor_ids, limit),
        )
        .await
        {
            Ok(Ok(reviews)) => Ok(reviews),
            Ok(Err(e)) if e.is_unavailable() => Err(ShelfError::DataUnavailable(e.to_string())),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ShelfError::DataUnavailable(format!(
                "review query timed out after {:?}",
                self.fetch_timeout
            ))),
        }
    }

    async fn fetch_memberships(
        &self,
        actor_ids: &[String],
    ) -> (Vec<LikedGameMembership>, Vec<String>) {
        let mut tasks = JoinSet::new();

        for (index, actor_id) in actor_ids.iter().enumerate() {
            let store = Arc::clone(&self.store);
            let actor_id = actor_id.clone();
            let fetch_timeout = self.fetch_timeout;

            tasks.spawn(async move {
                let result = fetch_membership(store.as_ref(), &actor_id, fetch_timeout).await;
                (index, actor_id, result)
            });
        }

        let mut resolved = Vec::with_capacity(actor_ids.len());
        let mut missing = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, _, Ok(membership))) => resolved.push((index, membership)),
                Ok((index, actor_id, Err(ShelfError::PartialUserNotFound(_)))) => {
                    warn!("No user record for actor {}, skipping likes", actor_id);
                    missing.push((index, actor_id));
                }
                Ok((_, actor_id, Err(e))) => {
                    warn!("Liked games lookup failed for {}: {}", actor_id, e)
                }
                Err(e) => warn!("Task join error: {}", e),
            }
        }

        resolved.sort_by_key(|(index, _)| *index);
        missing.sort_by_key(|(index, _)| *index);

        (
            resolved.into_iter().map(|(_, membership)| membership).collect(),
            missing.into_iter().map(|(_, actor_id)| actor_id).collect(),
        )
    }
}

async fn fetch_membership(
    store: &dyn DataStore,
    actor_id: &str,
    fetch_timeout: Duration,
) -> ShelfResult<LikedGameMembership> {
    let user = tokio::time::timeout(fetch_timeout, store.get_user(actor_id))
        .await
        .map_err(|_| {
            ShelfError::DataUnavailable(format!("user lookup for {} timed out", actor_id))
        })??
        .ok_or_else(|| ShelfError::PartialUserNotFound(actor_id.to_string()))?;

    Ok(LikedGameMembership {
        actor_id: actor_id.to_string(),
        actor_display_name: user.display_name,
        liked_games: user.liked_games,
    })
}

fn dedupe(actor_ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    actor_ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
