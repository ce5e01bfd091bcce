use bluefeed_core::{
    UserId, Video, VideoUpload,
    tags::{extract_tags, validate_description},
};
use bluefeed_storage::{BlobStore, DocumentStore};
use tracing::debug;

use crate::Engine;
use crate::context::CallContext;
use crate::error::EngineError;

impl<S: DocumentStore, B: BlobStore> Engine<S, B> {
    /// Store an uploaded video's bytes and create its metadata document.
    ///
    /// The description is validated before anything is written. If the blob
    /// write succeeds but the metadata insert fails, the blob stays behind;
    /// the next upload of the same bytes reuses it.
    pub fn ingest_upload(
        &mut self,
        ctx: &CallContext,
        creator_id: UserId,
        upload: VideoUpload,
    ) -> Result<Video, EngineError> {
        validate_description(&upload.description)?;
        let tags = extract_tags(&upload.description);

        ctx.check()?;
        let storage_key = self.blobs.put(&upload.data)?;

        let video = Video {
            id: self.ids.next_video_id()?,
            creator_id,
            description: upload.description,
            series: upload.series,
            public: true,
            likes: 0,
            tags,
            modifiers: Vec::new(),
            storage_key,
        };

        ctx.check()?;
        self.store.insert_video(&video)?;

        debug!(
            video_id = %video.id,
            creator_id = %creator_id,
            tags = video.tags.len(),
            key = %video.storage_key,
            "ingested upload"
        );
        Ok(video)
    }
}
