/// Activity feed
///
/// Reviews and liked games from a set of actors are fetched through the
/// event source, merged into one timeline newest first, truncated to the
/// caller's limit, and handed to a presenter.

pub mod merger;
pub mod presenter;
pub mod service;
pub mod source;
pub mod timestamp;
pub mod types;

pub use merger::build_feed;
pub use presenter::{decode_entries, CardPresenter, FeedCard, FeedPresenter};
pub use service::{Feed, FeedService};
pub use source::{FeedSource, RawFeedEvents};
pub use timestamp::{normalize_timestamp, Clock, FixedClock, RawTimestamp, SystemClock};
pub use types::{
    FeedEntry, FeedView, LikeEvent, LikedGameMembership, RawLikedGame, RawReview, ReviewEvent,
};
