/// Signed-in session context
///
/// Holds who is signed in for a client and hands out guards that go stale
/// when that session ends or is replaced, so feed results fetched for an
/// old session are dropped instead of applied.
use crate::{
    error::ShelfResult,
    feed::{Feed, FeedService, FeedView},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    pub signed_in_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct SessionContext {
    session: RwLock<Option<Session>>,
    // Bumped on every sign-in and sign-out
    generation: Arc<AtomicU64>,
}

/// Ties a piece of work to the session that started it
#[derive(Debug, Clone)]
pub struct SessionGuard {
    pub user_id: String,
    generation: u64,
    current: Arc<AtomicU64>,
}

impl SessionGuard {
    pub fn is_live(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session, replacing any existing one
    pub async fn sign_in(&self, user_id: &str, display_name: &str) -> SessionGuard {
        let mut session = self.session.write().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        *session = Some(Session {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            signed_in_at: Utc::now(),
        });
        info!("Signed in {}", user_id);

        SessionGuard {
            user_id: user_id.to_string(),
            generation,
            current: Arc::clone(&self.generation),
        }
    }

    /// End the current session, returning it
    pub async fn sign_out(&self) -> Option<Session> {
        let mut session = self.session.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);

        let ended = session.take();
        if let Some(ended) = &ended {
            info!("Signed out {}", ended.user_id);
        }
        ended
    }

    pub async fn current(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Guard for the current session, `None` when signed out
    pub async fn guard(&self) -> Option<SessionGuard> {
        let session = self.session.read().await;
        session.as_ref().map(|s| SessionGuard {
            user_id: s.user_id.clone(),
            generation: self.generation.load(Ordering::SeqCst),
            current: Arc::clone(&self.generation),
        })
    }
}

/// Loads feeds for whoever is signed in
#[derive(Clone)]
pub struct FeedLoader {
    service: FeedService,
}

impl FeedLoader {
    pub fn new(service: FeedService) -> Self {
        Self { service }
    }

    /// Build the signed-in user's feed. `Ok(None)` when nobody is signed in
    /// or the session changed before the feed was ready.
    pub async fn load(&self, ctx: &SessionContext, view: FeedView) -> ShelfResult<Option<Feed>> {
        let Some(guard) = ctx.guard().await else {
            return Ok(None);
        };

        let result = self.service.build_for_user(&guard.user_id, view).await;

        if !guard.is_live() {
            debug!("Discarding {} feed for stale session of {}", view.as_str(), guard.user_id);
            return Ok(None);
        }

        result.map(Some)
    }
}
