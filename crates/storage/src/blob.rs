use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bluefeed_core::StorageKey;
use tracing::debug;

use crate::error::StorageError;
use crate::traits::BlobStore;

/// Blobs on the local filesystem, laid out as `<root>/<first two hex chars>/<key>`.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &StorageKey) -> PathBuf {
        let hex = key.as_str();
        self.root.join(&hex[..2]).join(hex)
    }
}

impl BlobStore for FsBlobStore {
    fn put(&mut self, bytes: &[u8]) -> Result<StorageKey, StorageError> {
        let key = StorageKey::for_content(bytes);
        let path = self.path_for(&key);
        if path.is_file() {
            return Ok(key);
        }

        let shard = path
            .parent()
            .ok_or_else(|| StorageError::NotFound(format!("shard directory for {key}")))?;
        fs::create_dir_all(shard)?;

        // Write-then-rename so readers never observe a partial blob.
        let tmp = shard.join(format!("{}.tmp", key.as_str()));
        if let Err(e) = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::Io(e));
        }

        debug!(key = %key, size = bytes.len(), "stored blob");
        Ok(key)
    }

    fn get(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn contains(&self, key: &StorageKey) -> Result<bool, StorageError> {
        Ok(self.path_for(key).is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let mut blobs = FsBlobStore::open(dir.path()).unwrap();

        let key = blobs.put(b"frame data").unwrap();
        assert_eq!(key, StorageKey::for_content(b"frame data"));
        assert!(blobs.contains(&key).unwrap());
        assert_eq!(blobs.get(&key).unwrap().as_deref(), Some(&b"frame data"[..]));
    }

    #[test]
    fn same_content_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut blobs = FsBlobStore::open(dir.path()).unwrap();

        let a = blobs.put(b"clip").unwrap();
        let b = blobs.put(b"clip").unwrap();
        assert_eq!(a, b);

        let shard = dir.path().join(&a.as_str()[..2]);
        assert_eq!(fs::read_dir(shard).unwrap().count(), 1);
    }

    #[test]
    fn failed_put_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut blobs = FsBlobStore::open(dir.path()).unwrap();
        let key = StorageKey::for_content(b"blocked");
        let shard = dir.path().join(&key.as_str()[..2]);

        // A non-empty directory squatting on the blob path makes the rename fail.
        fs::create_dir_all(shard.join(key.as_str()).join("occupant")).unwrap();

        let err = blobs.put(b"blocked").unwrap_err();
        assert!(matches!(err, StorageError::Io(_)), "got {err:?}");
        assert!(!shard.join(format!("{}.tmp", key.as_str())).exists());
        assert!(!blobs.contains(&key).unwrap());
    }

    #[test]
    fn missing_blob_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = FsBlobStore::open(dir.path().join("nested")).unwrap();
        let key = StorageKey::for_content(b"never stored");
        assert_eq!(blobs.get(&key).unwrap(), None);
        assert!(!blobs.contains(&key).unwrap());
    }
}
