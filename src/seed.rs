/// Seed fixtures
///
/// Loads a JSON document of the form `{ "users": [...], "reviews": [...] }`
/// into a data store. Every record is validated before anything is written.
use crate::{
    error::ShelfResult,
    feed::types::RawReview,
    store::{DataStore, UserRecord},
    validation::{self, RecordValidator},
};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
struct SeedDocument {
    #[serde(default)]
    users: Vec<Value>,
    #[serde(default)]
    reviews: Vec<Value>,
}

/// Counts of what a seed wrote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedSummary {
    pub users: usize,
    pub reviews: usize,
}

/// Read and apply a seed file
pub async fn load_seed(path: &Path, store: &dyn DataStore) -> ShelfResult<SeedSummary> {
    let contents = tokio::fs::read_to_string(path).await?;
    let summary = apply_seed(&contents, store).await?;

    info!(
        "Seeded {} user(s) and {} review(s) from {}",
        summary.users,
        summary.reviews,
        path.display()
    );
    Ok(summary)
}

/// Validate and write a seed document given as JSON text
pub async fn apply_seed(contents: &str, store: &dyn DataStore) -> ShelfResult<SeedSummary> {
    let document: SeedDocument = serde_json::from_str(contents)?;
    let validator = RecordValidator::new();

    let mut users = Vec::with_capacity(document.users.len());
    for value in document.users {
        validator
            .validate(validation::USER, &value)
            .map_err(|errors| validation::into_shelf_error(validation::USER, errors))?;
        users.push(serde_json::from_value::<UserRecord>(value)?);
    }

    let mut reviews = Vec::with_capacity(document.reviews.len());
    for value in document.reviews {
        validator
            .validate(validation::REVIEW, &value)
            .map_err(|errors| validation::into_shelf_error(validation::REVIEW, errors))?;
        let mut review: RawReview = serde_json::from_value(value)?;
        if review.id.is_empty() {
            review.id = Uuid::new_v4().to_string();
        }
        reviews.push(review);
    }

    let summary = SeedSummary {
        users: users.len(),
        reviews: reviews.len(),
    };

    for user in users {
        store.put_user(user).await?;
    }
    for review in reviews {
        store.put_review(review).await?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShelfError;
    use crate::store::MemoryStore;
    use std::io::Write;

    const SEED: &str = r#"{
        "users": [
            { "id": "u1", "displayName": "One", "following": ["u2"],
              "likedGames": [{ "id": "g1", "name": "Celeste", "likedAt": "2024-01-01T00:00:00Z" }] },
            { "id": "u2", "username": "Two",
              "likedGames": [{ "gameId": "g2", "name": "Hades", "likedAt": { "seconds": 1704412800 } }] }
        ],
        "reviews": [
            { "actorId": "u1", "subjectName": "Portal", "rating": 5, "createdAt": "2024-01-03T00:00:00Z" }
        ]
    }"#;

    #[tokio::test]
    async fn test_load_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();

        let store = MemoryStore::new();
        let summary = load_seed(file.path(), &store).await.unwrap();

        assert_eq!(summary, SeedSummary { users: 2, reviews: 1 });
        let two = store.get_user("u2").await.unwrap().unwrap();
        assert_eq!(two.display_name, "Two");
        assert_eq!(two.liked_games[0].id, "g2");

        let reviews = store
            .query_reviews_by_actors(&["u1".to_string()], 10)
            .await
            .unwrap();
        assert_eq!(reviews.len(), 1);
        assert!(!reviews[0].id.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_record_writes_nothing() {
        let store = MemoryStore::new();
        let seed = r#"{
            "users": [{ "id": "u1" }],
            "reviews": [{ "actorId": "u1", "rating": 9 }]
        }"#;

        let result = apply_seed(seed, &store).await;

        assert!(matches!(result, Err(ShelfError::Validation(_))));
        assert!(store.get_user("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_review_with_both_actor_names_is_validation_error() {
        let store = MemoryStore::new();
        let seed = r#"{
            "reviews": [{ "id": "r1", "actorId": "u1", "userId": "u2", "rating": 3 }]
        }"#;

        let result = apply_seed(seed, &store).await;

        assert!(matches!(result, Err(ShelfError::Validation(_))));
        let reviews = store
            .query_reviews_by_actors(&["u1".to_string(), "u2".to_string()], 10)
            .await
            .unwrap();
        assert!(reviews.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let store = MemoryStore::new();
        let result = load_seed(Path::new("/nonexistent/seed.json"), &store).await;
        assert!(matches!(result, Err(ShelfError::Io(_))));
    }
}
