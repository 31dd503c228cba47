/// Raw records read from the store and the typed feed events built from them
use crate::error::ShelfError;
use crate::feed::timestamp::RawTimestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Stored review document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReview {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "userId")]
    pub actor_id: String,
    #[serde(default, alias = "username")]
    pub actor_display_name: String,
    #[serde(default, alias = "gameId")]
    pub subject_id: String,
    #[serde(default, alias = "gameName")]
    pub subject_name: String,
    #[serde(default)]
    pub rating: u8,
    #[serde(default, alias = "text")]
    pub body: String,
    #[serde(default)]
    pub contains_spoilers: bool,
    #[serde(default)]
    pub created_at: Option<RawTimestamp>,
}

/// One item of a user's liked-games list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLikedGame {
    #[serde(default, alias = "gameId")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub liked_at: Option<RawTimestamp>,
}

/// A user's full liked-games list, tagged with who owns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedGameMembership {
    pub actor_id: String,
    #[serde(default)]
    pub actor_display_name: String,
    #[serde(default)]
    pub liked_games: Vec<RawLikedGame>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    pub id: String,
    pub actor_id: String,
    pub actor_display_name: String,
    pub subject_id: String,
    pub subject_name: String,
    pub rating: u8,
    pub body: String,
    pub contains_spoilers: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeEvent {
    pub actor_id: String,
    pub actor_display_name: String,
    pub subject_id: String,
    pub subject_name: String,
    pub liked_at: DateTime<Utc>,
}

/// One item of a merged activity timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FeedEntry {
    Review(ReviewEvent),
    Like(LikeEvent),
}

impl FeedEntry {
    /// Ordering key; never persisted
    pub fn sort_key(&self) -> DateTime<Utc> {
        match self {
            FeedEntry::Review(review) => review.created_at,
            FeedEntry::Like(like) => like.liked_at,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FeedEntry::Review(_) => "review",
            FeedEntry::Like(_) => "like",
        }
    }

    pub fn actor_id(&self) -> &str {
        match self {
            FeedEntry::Review(review) => &review.actor_id,
            FeedEntry::Like(like) => &like.actor_id,
        }
    }

    pub fn subject_name(&self) -> &str {
        match self {
            FeedEntry::Review(review) => &review.subject_name,
            FeedEntry::Like(like) => &like.subject_name,
        }
    }
}

/// Places a feed is rendered, each with its own display limit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedView {
    Landing,
    #[default]
    Home,
    Journal,
    Activity,
}

impl FeedView {
    pub fn limit(&self) -> usize {
        match self {
            FeedView::Landing => 6,
            FeedView::Home => 10,
            FeedView::Journal => 25,
            FeedView::Activity => 50,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedView::Landing => "landing",
            FeedView::Home => "home",
            FeedView::Journal => "journal",
            FeedView::Activity => "activity",
        }
    }
}

impl FromStr for FeedView {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "landing" => Ok(FeedView::Landing),
            "home" => Ok(FeedView::Home),
            "journal" => Ok(FeedView::Journal),
            "activity" => Ok(FeedView::Activity),
            other => Err(ShelfError::Validation(format!("Unknown feed view: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_raw_review_accepts_sparse_document() {
        let review: RawReview = serde_json::from_value(json!({
            "actorId": "u1",
            "subjectName": "Portal",
            "rating": 5,
            "createdAt": "2024-01-03T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(review.actor_id, "u1");
        assert_eq!(review.subject_name, "Portal");
        assert!(review.id.is_empty());
        assert!(!review.contains_spoilers);
        assert!(review.created_at.is_some());
    }

    #[test]
    fn test_raw_review_aliases() {
        let review: RawReview = serde_json::from_value(json!({
            "id": "r1",
            "userId": "u9",
            "username": "nine",
            "gameId": "g1",
            "gameName": "Celeste",
            "text": "hard",
        }))
        .unwrap();
        assert_eq!(review.actor_id, "u9");
        assert_eq!(review.actor_display_name, "nine");
        assert_eq!(review.subject_id, "g1");
        assert_eq!(review.body, "hard");
        assert!(review.created_at.is_none());
    }

    #[test]
    fn test_feed_entry_tagged_by_kind() {
        let entry = FeedEntry::Like(LikeEvent {
            actor_id: "u1".into(),
            actor_display_name: "One".into(),
            subject_id: "g1".into(),
            subject_name: "Hades".into(),
            liked_at: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
        });
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["kind"], "like");
        assert_eq!(value["subjectName"], "Hades");
        assert_eq!(entry.kind(), "like");
        assert_eq!(entry.actor_id(), "u1");
    }

    #[test]
    fn test_feed_view_limits() {
        assert_eq!(FeedView::Landing.limit(), 6);
        assert_eq!(FeedView::Home.limit(), 10);
        assert_eq!(FeedView::Journal.limit(), 25);
        assert_eq!(FeedView::Activity.limit(), 50);
    }

    #[test]
    fn test_feed_view_parse() {
        assert_eq!("Journal".parse::<FeedView>().unwrap(), FeedView::Journal);
        assert!("sidebar".parse::<FeedView>().is_err());
    }

    #[test]
    fn test_feed_view_default_is_home() {
        assert_eq!(FeedView::default(), FeedView::Home);
        assert_eq!(FeedView::default().limit(), 10);
    }
}
