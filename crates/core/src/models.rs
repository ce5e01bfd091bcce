use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{StorageKey, UserId, VideoId};
use crate::interests::{LIKE_WEIGHT, WATCH_WEIGHT};

/// Like counters stop here instead of wrapping.
pub const MAX_LIKES: i64 = i64::MAX - 1;

/// Tag -> accumulated affinity score.
pub type Interests = BTreeMap<String, i64>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub interests: Interests,
}

impl User {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            interests: Interests::new(),
        }
    }

    pub fn interest(&self, tag: &str) -> i64 {
        self.interests.get(tag).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: VideoId,
    pub creator_id: UserId,
    pub description: String,
    pub series: String,
    pub public: bool,
    pub likes: i64,
    pub tags: Vec<String>,
    pub modifiers: Vec<String>,
    pub storage_key: StorageKey,
}

impl Video {
    pub fn is_saturated(&self) -> bool {
        self.likes >= MAX_LIKES
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Like,
    Watch,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Watch => "watch",
        }
    }

    /// Interest contribution of one occurrence of a tag.
    pub fn weight(&self) -> i64 {
        match self {
            Self::Like => LIKE_WEIGHT,
            Self::Watch => WATCH_WEIGHT,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A like or watch fact. Which one it is depends on the collection it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventRecord {
    pub video_id: VideoId,
    pub user_id: UserId,
}

/// Raw upload handed over by the transport layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoUpload {
    pub description: String,
    pub series: String,
    #[serde(rename = "video_data")]
    pub data: Vec<u8>,
}
