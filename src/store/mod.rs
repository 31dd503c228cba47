/// Data store collaborator
///
/// The feed never talks to a database directly; it goes through `DataStore`,
/// which hands back raw review documents and user documents carrying the
/// denormalized liked-games list.

pub mod memory;
pub mod sqlite;

pub use memory::{MemoryStore, UserFault};
pub use sqlite::SqliteStore;

use crate::error::ShelfResult;
use crate::feed::types::{RawLikedGame, RawReview};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Stored user document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    #[serde(default, alias = "username")]
    pub display_name: String,
    #[serde(default)]
    pub liked_games: Vec<RawLikedGame>,
    /// Ids of the users this user follows
    #[serde(default)]
    pub following: Vec<String>,
}

#[async_trait]
pub trait DataStore: Send + Sync {
    /// Reviews written by any of `actor_ids`, newest first, at most `limit`
    async fn query_reviews_by_actors(
        &self,
        actor_ids: &[String],
        limit: usize,
    ) -> ShelfResult<Vec<RawReview>>;

    /// User document, or `None` if the id has no record
    async fn get_user(&self, actor_id: &str) -> ShelfResult<Option<UserRecord>>;

    /// Insert or replace a user document
    async fn put_user(&self, user: UserRecord) -> ShelfResult<()>;

    /// Insert or replace a review document
    async fn put_review(&self, review: RawReview) -> ShelfResult<()>;
}
