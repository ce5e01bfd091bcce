use bluefeed_core::{CoreError, EventKind, UserId, VideoId};
use bluefeed_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("user not found: {0}")]
    UserNotFound(UserId),

    #[error("video not found: {0}")]
    VideoNotFound(VideoId),

    #[error("user {user_id} has already recorded a {kind} on video {video_id}")]
    AlreadyRecorded {
        kind: EventKind,
        user_id: UserId,
        video_id: VideoId,
    },

    #[error("call cancelled")]
    Cancelled,

    #[error("call deadline exceeded")]
    DeadlineExceeded,

    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// Errors the transport should report as a rejected request rather than a
    /// server fault.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyRecorded { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::VideoNotFound(_))
    }
}
