use std::collections::HashMap;

use bluefeed_core::{User, UserId, VideoUpload};
use bluefeed_engine::config::{BLOB_DIR_VAR, DATABASE_PATH_VAR, NODE_ID_VAR};
use bluefeed_engine::{CallContext, Engine, EngineConfig, LikeCounter};
use bluefeed_storage::{BlobStore, DocumentStore};

fn config_in(dir: &std::path::Path) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let db = dir.join("bluefeed.db");
    let blobs = dir.join("blobs");
    let vars: HashMap<&str, String> = HashMap::from([
        (DATABASE_PATH_VAR, db.to_str().ok_or("non-utf8 temp path")?.to_string()),
        (BLOB_DIR_VAR, blobs.to_str().ok_or("non-utf8 temp path")?.to_string()),
        (NODE_ID_VAR, "7".to_string()),
    ]);
    Ok(EngineConfig::from_lookup(|key| vars.get(key).cloned())?)
}

#[test]
fn opened_engine_persists_across_restart() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = config_in(dir.path())?;
    let ctx = CallContext::background();

    let video = {
        let mut engine = Engine::open(&config)?;
        engine.store_mut().insert_user(&User::new(UserId::new(1)))?;

        let video = engine.ingest_upload(
            &ctx,
            UserId::new(2),
            VideoUpload {
                description: "#cats nap".to_string(),
                series: String::new(),
                data: b"clip".to_vec(),
            },
        )?;
        let outcome = engine.like_by_id(&ctx, UserId::new(1), video.id)?;
        assert_eq!(outcome.like_counter, LikeCounter::Incremented);
        video
    };

    let engine = Engine::open(&config)?;
    let stored = engine.get_video(&ctx, video.id)?;
    assert_eq!(stored.likes, 1);
    assert_eq!(engine.get_user(&ctx, UserId::new(1))?.interest("cats"), 11);
    assert!(engine.has_liked(&ctx, UserId::new(1), video.id));
    assert_eq!(
        engine.blobs().get(&stored.storage_key)?.as_deref(),
        Some(&b"clip"[..])
    );
    Ok(())
}
