/// Presentation boundary for merged feeds
use crate::feed::types::{FeedEntry, LikeEvent, ReviewEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Turns feed entries into whatever the caller renders. Returning `None`
/// from either hook leaves that entry out.
pub trait FeedPresenter {
    type Item;

    fn present_review(&self, review: &ReviewEvent) -> Option<Self::Item>;

    fn present_like(&self, like: &LikeEvent) -> Option<Self::Item>;

    fn present(&self, entries: &[FeedEntry]) -> Vec<Self::Item> {
        entries
            .iter()
            .filter_map(|entry| match entry {
                FeedEntry::Review(review) => self.present_review(review),
                FeedEntry::Like(like) => self.present_like(like),
            })
            .collect()
    }
}

/// Display-ready feed item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedCard {
    pub kind: String,
    pub actor_id: String,
    pub actor_display_name: String,
    pub subject_id: String,
    pub subject_name: String,
    pub headline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub spoiler_hidden: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Renders entries as `FeedCard`s
#[derive(Debug, Clone, Copy, Default)]
pub struct CardPresenter {
    /// Show review bodies even when flagged as containing spoilers
    pub reveal_spoilers: bool,
}

impl CardPresenter {
    pub fn new(reveal_spoilers: bool) -> Self {
        Self { reveal_spoilers }
    }
}

fn display_name(name: &str, fallback: &str) -> String {
    if name.trim().is_empty() {
        fallback.to_string()
    } else {
        name.to_string()
    }
}

impl FeedPresenter for CardPresenter {
    type Item = FeedCard;

    fn present_review(&self, review: &ReviewEvent) -> Option<FeedCard> {
        let actor = display_name(&review.actor_display_name, &review.actor_id);
        let spoiler_hidden = review.contains_spoilers && !self.reveal_spoilers;
        let body = if spoiler_hidden || review.body.is_empty() {
            None
        } else {
            Some(review.body.clone())
        };

        Some(FeedCard {
            kind: "review".to_string(),
            actor_id: review.actor_id.clone(),
            actor_display_name: actor.clone(),
            subject_id: review.subject_id.clone(),
            subject_name: review.subject_name.clone(),
            headline: format!("{} reviewed {}", actor, review.subject_name),
            rating: Some(review.rating),
            body,
            spoiler_hidden,
            occurred_at: review.created_at,
        })
    }

    fn present_like(&self, like: &LikeEvent) -> Option<FeedCard> {
        let actor = display_name(&like.actor_display_name, &like.actor_id);

        Some(FeedCard {
            kind: "like".to_string(),
            actor_id: like.actor_id.clone(),
            actor_display_name: actor.clone(),
            subject_id: like.subject_id.clone(),
            subject_name: like.subject_name.clone(),
            headline: format!("{} liked {}", actor, like.subject_name),
            rating: None,
            body: None,
            spoiler_hidden: false,
            occurred_at: like.liked_at,
        })
    }
}

/// Decode serialized feed entries, dropping any whose `kind` is unknown or
/// whose fields don't match their kind.
pub fn decode_entries(values: &[serde_json::Value]) -> Vec<FeedEntry> {
    values
        .iter()
        .filter_map(|value| match serde_json::from_value::<FeedEntry>(value.clone()) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(
                    "Dropping feed entry of kind {}: {}",
                    value.get("kind").unwrap_or(&serde_json::Value::Null),
                    e
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn review(spoilers: bool) -> ReviewEvent {
        ReviewEvent {
            id: "r1".to_string(),
            actor_id: "u1".to_string(),
            actor_display_name: "Ana".to_string(),
            subject_id: "g1".to_string(),
            subject_name: "Outer Wilds".to_string(),
            rating: 5,
            body: "The sun explodes".to_string(),
            contains_spoilers: spoilers,
            created_at: Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(),
        }
    }

    fn like(display_name: &str) -> LikeEvent {
        LikeEvent {
            actor_id: "u2".to_string(),
            actor_display_name: display_name.to_string(),
            subject_id: "g2".to_string(),
            subject_name: "Hades".to_string(),
            liked_at: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_cards_keep_entry_order() {
        let entries = vec![FeedEntry::Like(like("Bo")), FeedEntry::Review(review(false))];
        let cards = CardPresenter::default().present(&entries);

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].headline, "Bo liked Hades");
        assert_eq!(cards[1].headline, "Ana reviewed Outer Wilds");
        assert_eq!(cards[1].rating, Some(5));
        assert_eq!(cards[1].body.as_deref(), Some("The sun explodes"));
    }

    #[test]
    fn test_spoilers_hidden_unless_revealed() {
        let entries = vec![FeedEntry::Review(review(true))];

        let hidden = CardPresenter::new(false).present(&entries);
        assert!(hidden[0].spoiler_hidden);
        assert!(hidden[0].body.is_none());

        let revealed = CardPresenter::new(true).present(&entries);
        assert!(!revealed[0].spoiler_hidden);
        assert!(revealed[0].body.is_some());
    }

    #[test]
    fn test_blank_display_name_falls_back_to_id() {
        let cards = CardPresenter::default().present(&[FeedEntry::Like(like(" "))]);
        assert_eq!(cards[0].actor_display_name, "u2");
    }

    #[test]
    fn test_unknown_kind_renders_nothing() {
        let known = serde_json::to_value(FeedEntry::Like(like("Bo"))).unwrap();
        let values = vec![
            json!({ "kind": "follow", "actorId": "u1" }),
            known,
            json!({ "kind": "review", "actorId": "u1" }),
            json!("not an object"),
        ];

        let entries = decode_entries(&values);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind(), "like");
    }
}
