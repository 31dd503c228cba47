/// Feed API endpoints
use crate::{
    context::AppContext,
    error::{ShelfError, ShelfResult},
    feed::{CardPresenter, FeedCard, FeedEntry, FeedPresenter, FeedView},
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GET /feed/:user_id
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFeedParams {
    #[serde(default)]
    pub view: Option<String>,
    #[serde(default, alias = "reveal_spoilers")]
    pub reveal_spoilers: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFeedResponse {
    pub view: FeedView,
    pub entries: Vec<FeedCard>,
    pub missing_actors: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

pub async fn user_feed(
    State(ctx): State<AppContext>,
    Path(user_id): Path<String>,
    Query(params): Query<UserFeedParams>,
) -> ShelfResult<Json<UserFeedResponse>> {
    let view = match params.view.as_deref() {
        Some(view) => view.parse::<FeedView>()?,
        None => FeedView::default(),
    };

    let feed = ctx.feed.build_for_user(&user_id, view).await?;
    let presenter = CardPresenter::new(params.reveal_spoilers);

    Ok(Json(UserFeedResponse {
        view,
        entries: presenter.present(&feed.entries),
        missing_actors: feed.missing_actors,
        generated_at: feed.generated_at,
    }))
}

/// POST /feed
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorFeedRequest {
    pub actor_ids: Vec<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorFeedResponse {
    pub entries: Vec<FeedEntry>,
    pub missing_actors: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

pub async fn actor_feed(
    State(ctx): State<AppContext>,
    Json(req): Json<ActorFeedRequest>,
) -> ShelfResult<Json<ActorFeedResponse>> {
    if req.actor_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(ShelfError::Validation(
            "Actor ids cannot be empty".to_string(),
        ));
    }

    let limit = req.limit.unwrap_or_else(|| FeedView::default().limit());
    let feed = ctx.feed.build_for_actors(&req.actor_ids, limit).await?;

    Ok(Json(ActorFeedResponse {
        entries: feed.entries,
        missing_actors: feed.missing_actors,
        generated_at: feed.generated_at,
    }))
}

/// Build feed routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/feed", post(actor_feed))
        .route("/feed/:user_id", get(user_feed))
}
