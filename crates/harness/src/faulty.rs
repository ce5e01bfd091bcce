use std::io;

use bluefeed_core::{EventKind, EventRecord, Interests, User, UserId, Video, VideoId};
use bluefeed_storage::{CounterUpdate, DocumentStore, SqliteStore, StorageError};

/// Which store calls should fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    pub count_events: bool,
    pub insert_event: bool,
    pub set_user_interests: bool,
    pub increment_video_likes: bool,
}

/// A [`SqliteStore`] that can be told to fail individual operations.
pub struct FaultyStore {
    inner: SqliteStore,
    pub faults: Faults,
}

impl FaultyStore {
    pub fn new() -> Result<Self, StorageError> {
        Ok(Self {
            inner: SqliteStore::open_in_memory()?,
            faults: Faults::default(),
        })
    }
}

fn injected(op: &str) -> StorageError {
    StorageError::Io(io::Error::other(format!("injected failure: {op}")))
}

impl DocumentStore for FaultyStore {
    fn find_user(&self, user_id: UserId) -> Result<Option<User>, StorageError> {
        self.inner.find_user(user_id)
    }

    fn find_video(&self, video_id: VideoId) -> Result<Option<Video>, StorageError> {
        self.inner.find_video(video_id)
    }

    fn insert_user(&mut self, user: &User) -> Result<(), StorageError> {
        self.inner.insert_user(user)
    }

    fn insert_video(&mut self, video: &Video) -> Result<(), StorageError> {
        self.inner.insert_video(video)
    }

    fn insert_event(&mut self, kind: EventKind, event: &EventRecord) -> Result<(), StorageError> {
        if self.faults.insert_event {
            return Err(injected("insert_event"));
        }
        self.inner.insert_event(kind, event)
    }

    fn count_events(
        &self,
        kind: EventKind,
        user_id: UserId,
        video_id: VideoId,
        limit: u64,
    ) -> Result<u64, StorageError> {
        if self.faults.count_events {
            return Err(injected("count_events"));
        }
        self.inner.count_events(kind, user_id, video_id, limit)
    }

    fn set_user_interests(
        &mut self,
        user_id: UserId,
        interests: &Interests,
    ) -> Result<(), StorageError> {
        if self.faults.set_user_interests {
            return Err(injected("set_user_interests"));
        }
        self.inner.set_user_interests(user_id, interests)
    }

    fn increment_video_likes(
        &mut self,
        video_id: VideoId,
        by: i64,
        ceiling: i64,
    ) -> Result<CounterUpdate, StorageError> {
        if self.faults.increment_video_likes {
            return Err(injected("increment_video_likes"));
        }
        self.inner.increment_video_likes(video_id, by, ceiling)
    }
}
