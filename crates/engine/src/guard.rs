//! Duplicate-event guard.
//!
//! The guard is advisory: callers ask it before recording a like or watch and
//! reject the request when it answers `true`. The store's uniqueness
//! constraint on (user, video) backs it up for calls that race past it.

use bluefeed_core::{EventKind, UserId, VideoId};
use bluefeed_storage::DocumentStore;
use tracing::warn;

use crate::context::CallContext;
use crate::error::EngineError;

/// Whether `user_id` already has a `kind` event on `video_id`.
///
/// Never fails. If the lookup cannot be completed the answer is `true`, so an
/// ambiguous read can only ever block a write, not let a duplicate through.
pub fn has_event<S: DocumentStore>(
    ctx: &CallContext,
    store: &S,
    kind: EventKind,
    user_id: UserId,
    video_id: VideoId,
) -> bool {
    let lookup = ctx.check().and_then(|()| {
        store
            .count_events(kind, user_id, video_id, 1)
            .map_err(EngineError::from)
    });

    match lookup {
        Ok(count) => count >= 1,
        Err(error) => {
            warn!(
                %kind,
                %user_id,
                %video_id,
                %error,
                "event lookup failed, treating as already recorded"
            );
            true
        }
    }
}
