use std::time::{SystemTime, UNIX_EPOCH};

use crate::CoreError;
use crate::ids::VideoId;

/// 2020-01-01T00:00:00Z in milliseconds since the Unix epoch.
pub const EPOCH_MS: u64 = 1_577_836_800_000;

const NODE_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
pub const MAX_NODE_ID: u16 = (1 << NODE_BITS) - 1;
const MAX_SEQUENCE: u16 = (1 << SEQUENCE_BITS) - 1;

/// Returns the current wall-clock time as milliseconds since Unix epoch.
pub fn physical_now() -> Result<u64, CoreError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .map_err(|_| CoreError::Clock("system clock before epoch".into()))
}

/// Generates 64-bit ids laid out as 41 bits of milliseconds since [`EPOCH_MS`],
/// 10 bits of node id and 12 bits of per-millisecond sequence.
///
/// Ids from one generator are strictly increasing. When the sequence runs out
/// within a millisecond, or the wall clock steps backwards, the generator keeps
/// counting on its own logical millisecond rather than waiting.
pub struct SnowflakeGenerator {
    node_id: u16,
    last_ms: u64,
    sequence: u16,
}

impl SnowflakeGenerator {
    pub fn new(node_id: u16) -> Result<Self, CoreError> {
        if node_id > MAX_NODE_ID {
            return Err(CoreError::InvalidData(format!(
                "node id {node_id} exceeds {MAX_NODE_ID}"
            )));
        }
        Ok(Self {
            node_id,
            last_ms: 0,
            sequence: 0,
        })
    }

    pub fn next_id(&mut self) -> Result<i64, CoreError> {
        let now = physical_now()?;
        if now < EPOCH_MS {
            return Err(CoreError::Clock("system clock before 2020-01-01".into()));
        }
        let now = now - EPOCH_MS;

        if now > self.last_ms {
            self.last_ms = now;
            self.sequence = 0;
        } else if self.sequence < MAX_SEQUENCE {
            self.sequence += 1;
        } else {
            self.last_ms += 1;
            self.sequence = 0;
        }

        let raw = (self.last_ms << (NODE_BITS + SEQUENCE_BITS))
            | ((self.node_id as u64) << SEQUENCE_BITS)
            | self.sequence as u64;
        Ok(raw as i64)
    }

    pub fn next_video_id(&mut self) -> Result<VideoId, CoreError> {
        self.next_id().map(VideoId::new)
    }
}

/// Split an id back into (milliseconds since [`EPOCH_MS`], node id, sequence).
pub fn decompose(id: i64) -> (u64, u16, u16) {
    let raw = id as u64;
    let ms = raw >> (NODE_BITS + SEQUENCE_BITS);
    let node = ((raw >> SEQUENCE_BITS) & MAX_NODE_ID as u64) as u16;
    let seq = (raw & MAX_SEQUENCE as u64) as u16;
    (ms, node, seq)
}
