//! Blob storage for page images.
//!
//! Files live in named buckets and are served publicly at
//! `{base}/storage/v1/object/public/{bucket}/{path}`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// URL path prefix under which buckets are publicly served.
pub const PUBLIC_OBJECT_PREFIX: &str = "/storage/v1/object/public";

/// Errors from a blob store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A store of files grouped into buckets.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write a file, replacing any existing content.
    async fn put(&self, bucket: &str, path: &str, content: &[u8]) -> Result<(), StorageError>;

    /// All file paths in a bucket, `/`-separated and sorted.
    async fn list(&self, bucket: &str) -> Result<Vec<String>, StorageError>;

    /// Remove a file.
    async fn delete(&self, bucket: &str, path: &str) -> Result<(), StorageError>;

    /// Public URL of a file.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Blob store backed by one directory per bucket.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Root directory holding the buckets.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a bucket. A bucket is a single plain path component.
    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf, StorageError> {
        let mut components = Path::new(bucket).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(bucket)),
            _ => Err(StorageError::InvalidPath(bucket.to_string())),
        }
    }

    /// Resolve an object to a path on disk, rejecting traversal.
    fn object_path(&self, bucket: &str, path: &str) -> Result<PathBuf, StorageError> {
        let bucket_dir = self.bucket_dir(bucket)?;
        let relative = Path::new(path.trim_start_matches('/'));
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || path.trim_matches('/').is_empty() {
            return Err(StorageError::InvalidPath(format!("{bucket}/{path}")));
        }
        Ok(bucket_dir.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, bucket: &str, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let target = self.object_path(bucket, path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, content).await?;
        Ok(())
    }

    async fn list(&self, bucket: &str) -> Result<Vec<String>, StorageError> {
        let bucket_dir = self.bucket_dir(bucket)?;
        if !tokio::fs::try_exists(&bucket_dir).await? {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut pending = vec![bucket_dir.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&bucket_dir) {
                    let parts: Vec<String> = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect();
                    files.push(parts.join("/"));
                }
            }
        }
        files.sort();
        Ok(files)
    }

    async fn delete(&self, bucket: &str, path: &str) -> Result<(), StorageError> {
        let target = self.object_path(bucket, path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(format!("{bucket}/{path}")))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        let encoded: Vec<String> = path
            .trim_start_matches('/')
            .split('/')
            .map(|part| urlencoding::encode(part).into_owned())
            .collect();
        format!(
            "{}{}/{}/{}",
            self.public_base_url,
            PUBLIC_OBJECT_PREFIX,
            bucket,
            encoded.join("/")
        )
    }
}
