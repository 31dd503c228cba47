/// SQLite-backed data store
///
/// Keeps the document shape of the managed store: user rows carry their
/// liked games and follows as JSON arrays, and review timestamps are stored
/// in whatever shape they were written with.
use crate::{
    error::{ShelfError, ShelfResult},
    feed::timestamp::RawTimestamp,
    feed::types::RawReview,
    store::{DataStore, UserRecord},
};
use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::cmp::Reverse;
use tracing::debug;

/// Actor ids bound per review query, well under SQLite's variable limit
const REVIEW_QUERY_CHUNK: usize = 500;

#[derive(Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    /// One bounded query over at most `REVIEW_QUERY_CHUNK` actors, returning
    /// each review with its normalized creation time
    async fn query_review_chunk(
        &self,
        actor_ids: &[String],
        limit: usize,
    ) -> ShelfResult<Vec<(Option<i64>, RawReview)>> {
        let placeholders = vec!["?"; actor_ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT id, actor_id, actor_display_name, subject_id, subject_name,
                   rating, body, contains_spoilers, created_at, created_at_ms
            FROM reviews
            WHERE actor_id IN ({})
            ORDER BY created_at_ms IS NULL, created_at_ms DESC
            LIMIT ?
            "#,
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for actor_id in actor_ids {
            query = query.bind(actor_id);
        }
        let rows = query
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.db)
            .await?;

        rows.iter()
            .map(|row| -> ShelfResult<(Option<i64>, RawReview)> {
                let created_at_ms: Option<i64> = row.try_get("created_at_ms")?;
                Ok((created_at_ms, Self::review_from_row(row)?))
            })
            .collect()
    }

    fn review_from_row(row: &SqliteRow) -> ShelfResult<RawReview> {
        let created_at: Option<String> = row.try_get("created_at")?;
        let created_at = match created_at {
            Some(json) => serde_json::from_str::<Option<RawTimestamp>>(&json)?,
            None => None,
        };
        let rating: i64 = row.try_get("rating")?;

        Ok(RawReview {
            id: row.try_get("id")?,
            actor_id: row.try_get("actor_id")?,
            actor_display_name: row.try_get("actor_display_name")?,
            subject_id: row.try_get("subject_id")?,
            subject_name: row.try_get("subject_name")?,
            rating: rating.clamp(0, u8::MAX as i64) as u8,
            body: row.try_get("body")?,
            contains_spoilers: row.try_get::<i64, _>("contains_spoilers")? != 0,
            created_at,
        })
    }
}

#[async_trait]
impl DataStore for SqliteStore {
    async fn query_reviews_by_actors(
        &self,
        actor_ids: &[String],
        limit: usize,
    ) -> ShelfResult<Vec<RawReview>> {
        if actor_ids.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        debug!("Review query for {} actor(s), limit {}", actor_ids.len(), limit);

        let mut rows = Vec::new();
        for chunk in actor_ids.chunks(REVIEW_QUERY_CHUNK) {
            rows.extend(self.query_review_chunk(chunk, limit).await?);
        }

        // Each chunk is already bounded; merge them in the same order
        if actor_ids.len() > REVIEW_QUERY_CHUNK {
            rows.sort_by_key(|(created_at_ms, _)| Reverse(*created_at_ms));
            rows.truncate(limit);
        }

        Ok(rows.into_iter().map(|(_, review)| review).collect())
    }

    async fn get_user(&self, actor_id: &str) -> ShelfResult<Option<UserRecord>> {
        let result = sqlx::query(
            r#"
            SELECT id, display_name, liked_games, following
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(actor_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(row) = result else {
            return Ok(None);
        };

        let liked_games: String = row.try_get("liked_games")?;
        let following: String = row.try_get("following")?;

        Ok(Some(UserRecord {
            id: row.try_get("id")?,
            display_name: row.try_get("display_name")?,
            liked_games: serde_json::from_str(&liked_games)?,
            following: serde_json::from_str(&following)?,
        }))
    }

    async fn put_user(&self, user: UserRecord) -> ShelfResult<()> {
        let liked_games = serde_json::to_string(&user.liked_games)?;
        let following = serde_json::to_string(&user.following)?;

        sqlx::query(
            r#"
            INSERT INTO users (id, display_name, liked_games, following)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                display_name = excluded.display_name,
                liked_games = excluded.liked_games,
                following = excluded.following
            "#,
        )
        .bind(&user.id)
        .bind(&user.display_name)
        .bind(&liked_games)
        .bind(&following)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn put_review(&self, review: RawReview) -> ShelfResult<()> {
        if review.id.is_empty() {
            return Err(ShelfError::Validation("Review id cannot be empty".to_string()));
        }

        let created_at = match &review.created_at {
            Some(raw) => Some(serde_json::to_string(raw)?),
            None => None,
        };
        let created_at_ms = review
            .created_at
            .as_ref()
            .and_then(RawTimestamp::to_datetime)
            .map(|date| date.timestamp_millis());

        sqlx::query(
            r#"
            INSERT INTO reviews (
                id, actor_id, actor_display_name, subject_id, subject_name,
                rating, body, contains_spoilers, created_at, created_at_ms
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                actor_id = excluded.actor_id,
                actor_display_name = excluded.actor_display_name,
                subject_id = excluded.subject_id,
                subject_name = excluded.subject_name,
                rating = excluded.rating,
                body = excluded.body,
                contains_spoilers = excluded.contains_spoilers,
                created_at = excluded.created_at,
                created_at_ms = excluded.created_at_ms
            "#,
        )
        .bind(&review.id)
        .bind(&review.actor_id)
        .bind(&review.actor_display_name)
        .bind(&review.subject_id)
        .bind(&review.subject_name)
        .bind(review.rating as i64)
        .bind(&review.body)
        .bind(review.contains_spoilers as i64)
        .bind(created_at)
        .bind(created_at_ms)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
