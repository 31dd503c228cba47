/// Feed service: fetch, merge, and stamp a feed for a set of actors or for
/// a signed-in user's follow list.
use crate::{
    config::FeedConfig,
    error::{ShelfError, ShelfResult},
    feed::merger::build_feed,
    feed::source::FeedSource,
    feed::timestamp::Clock,
    feed::types::{FeedEntry, FeedView},
    store::DataStore,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// A built feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub entries: Vec<FeedEntry>,
    /// Actors whose user record could not be found; they contribute no likes
    pub missing_actors: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn DataStore>,
    source: FeedSource,
    clock: Arc<dyn Clock>,
    config: FeedConfig,
}

impl FeedService {
    pub fn new(store: Arc<dyn DataStore>, clock: Arc<dyn Clock>, config: FeedConfig) -> Self {
        Self {
            source: FeedSource::new(Arc::clone(&store), config.fetch_timeout()),
            store,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Feed of events produced by `actor_ids`, at most `limit` entries
    /// (clamped to the configured maximum).
    pub async fn build_for_actors(&self, actor_ids: &[String], limit: usize) -> ShelfResult<Feed> {
        if limit == 0 {
            return Err(ShelfError::Validation(
                "Feed limit must be positive".to_string(),
            ));
        }
        let limit = limit.min(self.config.max_limit);

        let events = self.source.fetch(actor_ids, limit).await?;
        let entries = build_feed(
            &events.reviews,
            &events.memberships,
            limit,
            self.clock.as_ref(),
        );

        debug!(
            "Built feed: {} entries from {} review(s) and {} like list(s)",
            entries.len(),
            events.reviews.len(),
            events.memberships.len()
        );

        Ok(Feed {
            entries,
            missing_actors: events.missing_actors,
            generated_at: self.clock.now(),
        })
    }

    /// Feed for `user_id`: the users they follow, plus themselves when
    /// `include_self` is set, limited by `view`.
    pub async fn build_for_user(&self, user_id: &str, view: FeedView) -> ShelfResult<Feed> {
        let viewer = tokio::time::timeout(self.config.fetch_timeout(), self.store.get_user(user_id))
            .await
            .map_err(|_| {
                ShelfError::DataUnavailable(format!("user lookup for {} timed out", user_id))
            })?
            .map_err(|e| {
                if e.is_unavailable() {
                    ShelfError::DataUnavailable(e.to_string())
                } else {
                    e
                }
            })?
            .ok_or_else(|| ShelfError::NotFound(format!("User {}", user_id)))?;

        let mut actor_ids = viewer.following;
        if self.config.include_self {
            actor_ids.push(viewer.id);
        }

        info!(
            "Building {} feed for {} over {} actor(s)",
            view.as_str(),
            user_id,
            actor_ids.len()
        );

        self.build_for_actors(&actor_ids, view.limit()).await
    }
}
