/// Feed merger: turns raw reviews and liked-game lists into one
/// descending timeline.
use crate::feed::timestamp::{normalize_timestamp, Clock};
use crate::feed::types::{FeedEntry, LikeEvent, LikedGameMembership, RawReview, ReviewEvent};

/// Merge reviews and likes, newest first, truncated to `limit`.
///
/// Undated or malformed timestamps take the clock's current time, sampled
/// once per call. Entries with equal timestamps keep input order: reviews
/// before likes, each in the order given.
pub fn build_feed(
    raw_reviews: &[RawReview],
    memberships: &[LikedGameMembership],
    limit: usize,
    clock: &dyn Clock,
) -> Vec<FeedEntry> {
    let now = clock.now();

    let reviews = raw_reviews.iter().map(|raw| {
        FeedEntry::Review(ReviewEvent {
            id: raw.id.clone(),
            actor_id: raw.actor_id.clone(),
            actor_display_name: raw.actor_display_name.clone(),
            subject_id: raw.subject_id.clone(),
            subject_name: raw.subject_name.clone(),
            rating: raw.rating,
            body: raw.body.clone(),
            contains_spoilers: raw.contains_spoilers,
            created_at: normalize_timestamp(raw.created_at.as_ref(), now),
        })
    });

    let likes = memberships.iter().flat_map(|membership| {
        membership.liked_games.iter().map(move |game| {
            FeedEntry::Like(LikeEvent {
                actor_id: membership.actor_id.clone(),
                actor_display_name: membership.actor_display_name.clone(),
                subject_id: game.id.clone(),
                subject_name: game.name.clone(),
                liked_at: normalize_timestamp(game.liked_at.as_ref(), now),
            })
        })
    });

    let mut entries: Vec<FeedEntry> = reviews.chain(likes).collect();

    // sort_by is stable
    entries.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
    entries.truncate(limit);
    entries
}
