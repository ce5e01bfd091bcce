use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use serde::de::DeserializeOwned;

use bluefeed_core::{
    EventKind, EventRecord, Interests, StorageKey, User, UserId, Video, VideoId,
};

use crate::error::StorageError;
use crate::traits::{Collection, CounterUpdate, DocumentStore};

fn to_msgpack<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, StorageError> {
    rmp_serde::to_vec(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn from_msgpack<T: DeserializeOwned>(bytes: &[u8], label: &str) -> Result<T, StorageError> {
    rmp_serde::from_slice(bytes)
        .map_err(|e| StorageError::Serialization(format!("invalid {label}: {e}")))
}

/// Map a unique/primary-key violation to [`StorageError::Duplicate`]; every
/// other failure passes through untouched.
fn map_insert_error(err: rusqlite::Error, collection: Collection, key: String) -> StorageError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            StorageError::Duplicate {
                collection: collection.as_str(),
                key,
            }
        }
        _ => StorageError::Sqlite(err),
    }
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn video_exists(&self, video_id: VideoId) -> Result<bool, StorageError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM video_metadata WHERE id = ?1)",
            rusqlite::params![video_id.get()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

impl DocumentStore for SqliteStore {
    fn find_user(&self, user_id: UserId) -> Result<Option<User>, StorageError> {
        let interests_bytes: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT interests FROM users WHERE id = ?1",
                rusqlite::params![user_id.get()],
                |row| row.get(0),
            )
            .optional()?;

        match interests_bytes {
            Some(bytes) => Ok(Some(User {
                id: user_id,
                interests: from_msgpack(&bytes, "interests")?,
            })),
            None => Ok(None),
        }
    }

    fn find_video(&self, video_id: VideoId) -> Result<Option<Video>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT creator_id, description, series, public, likes, tags, modifiers, storage_key FROM video_metadata WHERE id = ?1",
                rusqlite::params![video_id.get()],
                |row| {
                    let creator_id: i64 = row.get(0)?;
                    let description: String = row.get(1)?;
                    let series: String = row.get(2)?;
                    let public: bool = row.get(3)?;
                    let likes: i64 = row.get(4)?;
                    let tags: Vec<u8> = row.get(5)?;
                    let modifiers: Vec<u8> = row.get(6)?;
                    let storage_key: String = row.get(7)?;
                    Ok((
                        creator_id,
                        description,
                        series,
                        public,
                        likes,
                        tags,
                        modifiers,
                        storage_key,
                    ))
                },
            )
            .optional()?;

        let Some((creator_id, description, series, public, likes, tags, modifiers, storage_key)) =
            row
        else {
            return Ok(None);
        };

        Ok(Some(Video {
            id: video_id,
            creator_id: UserId::new(creator_id),
            description,
            series,
            public,
            likes,
            tags: from_msgpack(&tags, "tags")?,
            modifiers: from_msgpack(&modifiers, "modifiers")?,
            storage_key: StorageKey::parse(&storage_key)?,
        }))
    }

    fn insert_user(&mut self, user: &User) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO users (id, interests) VALUES (?1, ?2)",
                rusqlite::params![user.id.get(), to_msgpack(&user.interests)?],
            )
            .map_err(|e| map_insert_error(e, Collection::Users, user.id.to_string()))?;
        Ok(())
    }

    fn insert_video(&mut self, video: &Video) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO video_metadata (id, creator_id, description, series, public, likes, tags, modifiers, storage_key) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    video.id.get(),
                    video.creator_id.get(),
                    video.description,
                    video.series,
                    video.public,
                    video.likes,
                    to_msgpack(&video.tags)?,
                    to_msgpack(&video.modifiers)?,
                    video.storage_key.as_str(),
                ],
            )
            .map_err(|e| map_insert_error(e, Collection::VideoMetadata, video.id.to_string()))?;
        Ok(())
    }

    fn insert_event(&mut self, kind: EventKind, event: &EventRecord) -> Result<(), StorageError> {
        let collection = Collection::for_events(kind);
        let sql = format!(
            "INSERT INTO {} (user_id, video_id) VALUES (?1, ?2)",
            collection.as_str()
        );
        self.conn
            .execute(
                &sql,
                rusqlite::params![event.user_id.get(), event.video_id.get()],
            )
            .map_err(|e| {
                map_insert_error(
                    e,
                    collection,
                    format!("user {} / video {}", event.user_id, event.video_id),
                )
            })?;
        Ok(())
    }

    fn count_events(
        &self,
        kind: EventKind,
        user_id: UserId,
        video_id: VideoId,
        limit: u64,
    ) -> Result<u64, StorageError> {
        let sql = format!(
            "SELECT COUNT(*) FROM (SELECT 1 FROM {} WHERE user_id = ?1 AND video_id = ?2 LIMIT ?3)",
            Collection::for_events(kind).as_str()
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let count: i64 = self.conn.query_row(
            &sql,
            rusqlite::params![user_id.get(), video_id.get(), limit],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn set_user_interests(
        &mut self,
        user_id: UserId,
        interests: &Interests,
    ) -> Result<(), StorageError> {
        let updated = self.conn.execute(
            "UPDATE users SET interests = ?1 WHERE id = ?2",
            rusqlite::params![to_msgpack(interests)?, user_id.get()],
        )?;
        if updated == 0 {
            return Err(StorageError::NotFound(format!("user {user_id}")));
        }
        Ok(())
    }

    fn increment_video_likes(
        &mut self,
        video_id: VideoId,
        by: i64,
        ceiling: i64,
    ) -> Result<CounterUpdate, StorageError> {
        if by <= 0 {
            return Err(StorageError::InvalidArgument(format!(
                "like increment must be positive, got {by}"
            )));
        }
        let updated = self.conn.execute(
            "UPDATE video_metadata SET likes = likes + ?1 WHERE id = ?2 AND likes <= ?3",
            rusqlite::params![by, video_id.get(), ceiling.saturating_sub(by)],
        )?;
        if updated > 0 {
            return Ok(CounterUpdate::Applied);
        }
        if self.video_exists(video_id)? {
            Ok(CounterUpdate::Saturated)
        } else {
            Err(StorageError::NotFound(format!("video {video_id}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bluefeed_core::MAX_LIKES;

    fn video(id: i64, tags: &[&str], likes: i64) -> Video {
        Video {
            id: VideoId::new(id),
            creator_id: UserId::new(1),
            description: tags.iter().map(|t| format!("#{t}")).collect::<Vec<_>>().join(" "),
            series: String::new(),
            public: true,
            likes,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            modifiers: Vec::new(),
            storage_key: StorageKey::for_content(&id.to_le_bytes()),
        }
    }

    #[test]
    fn user_roundtrip_with_interests() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut user = User::new(UserId::new(10));
        user.interests.insert("cats".into(), 11);
        user.interests.insert("funny".into(), -4);
        store.insert_user(&user).unwrap();

        assert_eq!(store.find_user(UserId::new(10)).unwrap(), Some(user));
        assert_eq!(store.find_user(UserId::new(11)).unwrap(), None);
    }

    #[test]
    fn video_roundtrip_keeps_tag_order() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let v = video(5, &["b", "a", "b"], 3);
        store.insert_video(&v).unwrap();

        let loaded = store.find_video(VideoId::new(5)).unwrap().unwrap();
        assert_eq!(loaded, v);
        assert_eq!(loaded.tags, vec!["b", "a", "b"]);
    }

    #[test]
    fn duplicate_identity_is_reported() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.insert_user(&User::new(UserId::new(1))).unwrap();
        let err = store.insert_user(&User::new(UserId::new(1))).unwrap_err();
        assert!(err.is_duplicate(), "got {err:?}");
    }

    #[test]
    fn event_pair_is_unique_per_collection() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let event = EventRecord {
            video_id: VideoId::new(2),
            user_id: UserId::new(1),
        };
        store.insert_event(EventKind::Like, &event).unwrap();

        let err = store.insert_event(EventKind::Like, &event).unwrap_err();
        match err {
            StorageError::Duplicate { collection, .. } => assert_eq!(collection, "liked_videos"),
            other => panic!("expected Duplicate, got {other:?}"),
        }

        // Same pair in the other collection is fine.
        store.insert_event(EventKind::Watch, &event).unwrap();
    }

    #[test]
    fn count_events_respects_limit_and_filter() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let (u, v) = (UserId::new(1), VideoId::new(2));
        assert_eq!(store.count_events(EventKind::Watch, u, v, 1).unwrap(), 0);

        store
            .insert_event(EventKind::Watch, &EventRecord { video_id: v, user_id: u })
            .unwrap();
        assert_eq!(store.count_events(EventKind::Watch, u, v, 1).unwrap(), 1);
        assert_eq!(store.count_events(EventKind::Watch, u, v, 0).unwrap(), 0);
        assert_eq!(store.count_events(EventKind::Like, u, v, 1).unwrap(), 0);
        assert_eq!(
            store.count_events(EventKind::Watch, UserId::new(9), v, 1).unwrap(),
            0
        );
    }

    #[test]
    fn set_interests_replaces_field() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut user = User::new(UserId::new(3));
        user.interests.insert("old".into(), 1);
        store.insert_user(&user).unwrap();

        let mut next = Interests::new();
        next.insert("new".into(), 22);
        store.set_user_interests(user.id, &next).unwrap();

        assert_eq!(store.find_user(user.id).unwrap().unwrap().interests, next);
    }

    #[test]
    fn set_interests_on_missing_user_fails() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let err = store
            .set_user_interests(UserId::new(404), &Interests::new())
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn increment_stops_at_ceiling() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.insert_video(&video(1, &[], MAX_LIKES - 1)).unwrap();

        assert_eq!(
            store.increment_video_likes(VideoId::new(1), 1, MAX_LIKES).unwrap(),
            CounterUpdate::Applied
        );
        assert_eq!(store.find_video(VideoId::new(1)).unwrap().unwrap().likes, MAX_LIKES);

        assert_eq!(
            store.increment_video_likes(VideoId::new(1), 1, MAX_LIKES).unwrap(),
            CounterUpdate::Saturated
        );
        assert_eq!(store.find_video(VideoId::new(1)).unwrap().unwrap().likes, MAX_LIKES);
    }

    #[test]
    fn increment_missing_video_fails() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let err = store
            .increment_video_likes(VideoId::new(77), 1, MAX_LIKES)
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn non_positive_increment_is_rejected() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.insert_video(&video(1, &[], 3)).unwrap();

        for by in [0, -1] {
            let err = store
                .increment_video_likes(VideoId::new(1), by, MAX_LIKES)
                .unwrap_err();
            assert!(matches!(err, StorageError::InvalidArgument(_)), "got {err:?}");
        }
        assert_eq!(store.find_video(VideoId::new(1)).unwrap().unwrap().likes, 3);
    }

    #[test]
    fn reopen_file_keeps_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bluefeed.db");
        let path = path.to_str().unwrap();
        {
            let mut store = SqliteStore::open(path).unwrap();
            store.insert_video(&video(8, &["cats"], 0)).unwrap();
            store.increment_video_likes(VideoId::new(8), 1, MAX_LIKES).unwrap();
        }
        let store = SqliteStore::open(path).unwrap();
        assert_eq!(store.find_video(VideoId::new(8)).unwrap().unwrap().likes, 1);

        let versions: Vec<i32> = store
            .conn
            .prepare("SELECT version FROM schema_version")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(versions, vec![crate::schema::SCHEMA_VERSION]);
    }
}
