use bluefeed_core::{EventKind, EventRecord, MAX_LIKES, User, Video};
use bluefeed_storage::{CounterUpdate, DocumentStore, StorageError};
use tracing::{debug, info, warn};

use crate::context::CallContext;
use crate::error::EngineError;

/// What happened to a video's like counter during an engagement call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeCounter {
    Incremented,
    /// Already at [`MAX_LIKES`]; left unchanged.
    Saturated,
    /// The store rejected the update; the failure was logged.
    Failed,
    /// Watches have no counter.
    NotApplicable,
}

/// Insert the event row. A duplicate pair becomes
/// [`EngineError::AlreadyRecorded`]; any other failure is propagated as-is.
pub fn record_event<S: DocumentStore>(
    ctx: &CallContext,
    store: &mut S,
    kind: EventKind,
    user: &User,
    video: &Video,
) -> Result<(), EngineError> {
    ctx.check()?;
    let event = EventRecord {
        video_id: video.id,
        user_id: user.id,
    };
    store.insert_event(kind, &event).map_err(|e| match e {
        StorageError::Duplicate { .. } => EngineError::AlreadyRecorded {
            kind,
            user_id: user.id,
            video_id: video.id,
        },
        other => EngineError::Storage(other),
    })?;
    debug!(%kind, user_id = %user.id, video_id = %video.id, "recorded event");
    Ok(())
}

/// Add one like to the video, unless it is saturated.
///
/// Saturation is checked against the caller's copy first and again by the
/// store inside the update. Failures are logged and reported, never raised.
pub fn bump_like_counter<S: DocumentStore>(
    ctx: &CallContext,
    store: &mut S,
    video: &mut Video,
) -> LikeCounter {
    if video.is_saturated() {
        info!(video_id = %video.id, likes = video.likes, "max likes on video");
        return LikeCounter::Saturated;
    }

    let update = ctx.check().and_then(|()| {
        store
            .increment_video_likes(video.id, 1, MAX_LIKES)
            .map_err(EngineError::from)
    });

    match update {
        Ok(CounterUpdate::Applied) => {
            video.likes += 1;
            LikeCounter::Incremented
        }
        Ok(CounterUpdate::Saturated) => {
            info!(video_id = %video.id, "max likes on video");
            LikeCounter::Saturated
        }
        Err(error) => {
            warn!(video_id = %video.id, %error, "failed to increment like count");
            LikeCounter::Failed
        }
    }
}
