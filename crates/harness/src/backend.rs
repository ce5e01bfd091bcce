use bluefeed_core::{
    EventKind, SnowflakeGenerator, StorageKey, User, UserId, Video, VideoId,
};
use bluefeed_engine::{CallContext, Engine};
use bluefeed_storage::{DocumentStore, FsBlobStore, SqliteStore, StorageError};
use tempfile::TempDir;

use crate::faulty::FaultyStore;

/// An engine over an in-memory store and a throwaway blob directory.
pub struct TestBackend<S = SqliteStore> {
    pub engine: Engine<S, FsBlobStore>,
    pub ctx: CallContext,
    _blob_dir: TempDir,
}

impl TestBackend<SqliteStore> {
    pub fn new() -> Result<Self, StorageError> {
        Self::with_store(SqliteStore::open_in_memory()?)
    }
}

impl TestBackend<FaultyStore> {
    pub fn with_faults() -> Result<Self, StorageError> {
        Self::with_store(FaultyStore::new()?)
    }
}

impl<S: DocumentStore> TestBackend<S> {
    pub fn with_store(store: S) -> Result<Self, StorageError> {
        crate::init_tracing();
        let blob_dir = tempfile::tempdir()?;
        let blobs = FsBlobStore::open(blob_dir.path())?;
        Ok(Self {
            engine: Engine::new(store, blobs, SnowflakeGenerator::new(1)?),
            ctx: CallContext::background(),
            _blob_dir: blob_dir,
        })
    }

    /// Insert a user with the given starting interests.
    pub fn create_user(
        &mut self,
        id: i64,
        interests: &[(&str, i64)],
    ) -> Result<User, StorageError> {
        let mut user = User::new(UserId::new(id));
        for (tag, score) in interests {
            user.interests.insert(tag.to_string(), *score);
        }
        self.engine.store_mut().insert_user(&user)?;
        Ok(user)
    }

    /// Insert a video document directly, bypassing ingestion.
    pub fn create_video(
        &mut self,
        id: i64,
        tags: &[&str],
        likes: i64,
    ) -> Result<Video, StorageError> {
        let video = Video {
            id: VideoId::new(id),
            creator_id: UserId::new(0),
            description: tags
                .iter()
                .map(|t| format!("#{t}"))
                .collect::<Vec<_>>()
                .join(" "),
            series: String::new(),
            public: true,
            likes,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            modifiers: Vec::new(),
            storage_key: StorageKey::for_content(&id.to_be_bytes()),
        };
        self.engine.store_mut().insert_video(&video)?;
        Ok(video)
    }

    /// Re-read a user from the store.
    pub fn stored_user(&self, id: i64) -> Result<User, StorageError> {
        self.engine
            .store()
            .find_user(UserId::new(id))?
            .ok_or_else(|| StorageError::NotFound(format!("user {id}")))
    }

    /// Re-read a video from the store.
    pub fn stored_video(&self, id: i64) -> Result<Video, StorageError> {
        self.engine
            .store()
            .find_video(VideoId::new(id))?
            .ok_or_else(|| StorageError::NotFound(format!("video {id}")))
    }

    /// Event rows for the pair, counted without a meaningful limit.
    pub fn event_count(
        &self,
        kind: EventKind,
        user_id: i64,
        video_id: i64,
    ) -> Result<u64, StorageError> {
        self.engine
            .store()
            .count_events(kind, UserId::new(user_id), VideoId::new(video_id), u64::MAX)
    }
}
