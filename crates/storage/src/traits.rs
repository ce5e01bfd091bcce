use bluefeed_core::{EventKind, EventRecord, Interests, StorageKey, User, UserId, Video, VideoId};

use crate::error::StorageError;

/// The four logical collections the engine reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    VideoMetadata,
    Users,
    LikedVideos,
    WatchedVideos,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VideoMetadata => "video_metadata",
            Self::Users => "users",
            Self::LikedVideos => "liked_videos",
            Self::WatchedVideos => "watched_videos",
        }
    }

    pub fn for_events(kind: EventKind) -> Self {
        match kind {
            EventKind::Like => Self::LikedVideos,
            EventKind::Watch => Self::WatchedVideos,
        }
    }
}

/// Result of a guarded counter increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterUpdate {
    Applied,
    /// Applying the increment would pass the ceiling; nothing changed.
    Saturated,
}

pub trait DocumentStore {
    fn find_user(&self, user_id: UserId) -> Result<Option<User>, StorageError>;

    fn find_video(&self, video_id: VideoId) -> Result<Option<Video>, StorageError>;

    fn insert_user(&mut self, user: &User) -> Result<(), StorageError>;

    fn insert_video(&mut self, video: &Video) -> Result<(), StorageError>;

    /// Fails with [`StorageError::Duplicate`] if the pair is already recorded.
    fn insert_event(&mut self, kind: EventKind, event: &EventRecord) -> Result<(), StorageError>;

    /// Number of matching event rows, capped at `limit`.
    fn count_events(
        &self,
        kind: EventKind,
        user_id: UserId,
        video_id: VideoId,
        limit: u64,
    ) -> Result<u64, StorageError>;

    /// Replace the whole `interests` field of a user.
    fn set_user_interests(
        &mut self,
        user_id: UserId,
        interests: &Interests,
    ) -> Result<(), StorageError>;

    /// Atomically add `by` (> 0) to a video's like count unless the result
    /// would exceed `ceiling`.
    fn increment_video_likes(
        &mut self,
        video_id: VideoId,
        by: i64,
        ceiling: i64,
    ) -> Result<CounterUpdate, StorageError>;
}

/// Content-addressed storage for raw upload bytes.
pub trait BlobStore {
    /// Store `bytes` and return their content key. Writing the same bytes
    /// twice is a no-op returning the same key.
    fn put(&mut self, bytes: &[u8]) -> Result<StorageKey, StorageError>;

    fn get(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, StorageError>;

    fn contains(&self, key: &StorageKey) -> Result<bool, StorageError>;
}
