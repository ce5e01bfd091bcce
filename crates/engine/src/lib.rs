pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod ingest;
pub mod interests;
pub mod recorder;

pub use config::EngineConfig;
pub use context::CallContext;
pub use error::EngineError;
pub use recorder::LikeCounter;

use bluefeed_core::{
    EventKind, SnowflakeGenerator, User, UserId, Video, VideoId, interests::compute_deltas,
};
use bluefeed_storage::{BlobStore, DocumentStore, FsBlobStore, SqliteStore};
use tracing::warn;

/// Result of a like or watch whose event row was recorded.
///
/// The follow-up steps are best effort; their fate is reported here instead of
/// failing the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementOutcome {
    pub kind: EventKind,
    pub interests_updated: bool,
    pub like_counter: LikeCounter,
}

impl EngagementOutcome {
    /// Every step went through. A saturated counter counts as complete.
    pub fn is_complete(&self) -> bool {
        self.interests_updated && self.like_counter != LikeCounter::Failed
    }
}

/// Engagement engine over a document store and a blob store.
///
/// The engine holds no per-user or per-video state between calls; everything
/// lives in the stores.
pub struct Engine<S = SqliteStore, B = FsBlobStore> {
    store: S,
    blobs: B,
    ids: SnowflakeGenerator,
}

impl Engine<SqliteStore, FsBlobStore> {
    pub fn open(config: &EngineConfig) -> Result<Self, EngineError> {
        let store = SqliteStore::open(&config.database_path)?;
        let blobs = FsBlobStore::open(&config.blob_dir)?;
        let ids = SnowflakeGenerator::new(config.node_id)?;
        Ok(Self::new(store, blobs, ids))
    }
}

impl<S: DocumentStore, B: BlobStore> Engine<S, B> {
    pub fn new(store: S, blobs: B, ids: SnowflakeGenerator) -> Self {
        Self { store, blobs, ids }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    // ========================================================================
    // Identity resolution
    // ========================================================================

    pub fn get_user(&self, ctx: &CallContext, user_id: UserId) -> Result<User, EngineError> {
        ctx.check()?;
        self.store
            .find_user(user_id)?
            .ok_or(EngineError::UserNotFound(user_id))
    }

    pub fn get_video(&self, ctx: &CallContext, video_id: VideoId) -> Result<Video, EngineError> {
        ctx.check()?;
        self.store
            .find_video(video_id)?
            .ok_or(EngineError::VideoNotFound(video_id))
    }

    // ========================================================================
    // Event guard
    // ========================================================================

    pub fn has_liked(&self, ctx: &CallContext, user_id: UserId, video_id: VideoId) -> bool {
        guard::has_event(ctx, &self.store, EventKind::Like, user_id, video_id)
    }

    pub fn has_watched(&self, ctx: &CallContext, user_id: UserId, video_id: VideoId) -> bool {
        guard::has_event(ctx, &self.store, EventKind::Watch, user_id, video_id)
    }

    // ========================================================================
    // Engagement
    // ========================================================================

    /// Record a like: event row, +11 per tag occurrence, like counter.
    ///
    /// Fails only if the event row cannot be written, in which case nothing
    /// else is touched. `user` and `video` are updated in place to match what
    /// was persisted.
    pub fn like(
        &mut self,
        ctx: &CallContext,
        user: &mut User,
        video: &mut Video,
    ) -> Result<EngagementOutcome, EngineError> {
        recorder::record_event(ctx, &mut self.store, EventKind::Like, user, video)?;
        let interests_updated = self.apply_interests(ctx, EventKind::Like, user, video);
        let like_counter = recorder::bump_like_counter(ctx, &mut self.store, video);
        Ok(EngagementOutcome {
            kind: EventKind::Like,
            interests_updated,
            like_counter,
        })
    }

    /// Record a watch: event row, then -1 per tag occurrence.
    pub fn watch(
        &mut self,
        ctx: &CallContext,
        user: &mut User,
        video: &Video,
    ) -> Result<EngagementOutcome, EngineError> {
        recorder::record_event(ctx, &mut self.store, EventKind::Watch, user, video)?;
        let interests_updated = self.apply_interests(ctx, EventKind::Watch, user, video);
        Ok(EngagementOutcome {
            kind: EventKind::Watch,
            interests_updated,
            like_counter: LikeCounter::NotApplicable,
        })
    }

    /// Guard, resolve and like in one call, the way a request handler would.
    /// A positive guard is reported as [`EngineError::AlreadyRecorded`].
    pub fn like_by_id(
        &mut self,
        ctx: &CallContext,
        user_id: UserId,
        video_id: VideoId,
    ) -> Result<EngagementOutcome, EngineError> {
        if self.has_liked(ctx, user_id, video_id) {
            return Err(EngineError::AlreadyRecorded {
                kind: EventKind::Like,
                user_id,
                video_id,
            });
        }
        let mut user = self.get_user(ctx, user_id)?;
        let mut video = self.get_video(ctx, video_id)?;
        self.like(ctx, &mut user, &mut video)
    }

    pub fn watch_by_id(
        &mut self,
        ctx: &CallContext,
        user_id: UserId,
        video_id: VideoId,
    ) -> Result<EngagementOutcome, EngineError> {
        if self.has_watched(ctx, user_id, video_id) {
            return Err(EngineError::AlreadyRecorded {
                kind: EventKind::Watch,
                user_id,
                video_id,
            });
        }
        let mut user = self.get_user(ctx, user_id)?;
        let video = self.get_video(ctx, video_id)?;
        self.watch(ctx, &mut user, &video)
    }

    fn apply_interests(
        &mut self,
        ctx: &CallContext,
        kind: EventKind,
        user: &mut User,
        video: &Video,
    ) -> bool {
        let deltas = compute_deltas(&video.tags, kind.weight());
        match interests::merge_and_persist(ctx, &mut self.store, user, &deltas) {
            Ok(()) => true,
            Err(error) => {
                warn!(
                    %kind,
                    user_id = %user.id,
                    video_id = %video.id,
                    %error,
                    "failed to update interests"
                );
                false
            }
        }
    }
}
