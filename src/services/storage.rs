use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Backend holding the raw artifact bytes for updates. Keys are opaque to
/// callers; concurrent reads of the same key must be safe. Reads hand back
/// an async reader so downloads stream instead of buffering whole artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put(&self, key: &str, content: Bytes) -> Result<()>;
    async fn open(&self, key: &str) -> Result<Box<dyn AsyncRead + Send + Unpin>>;
    async fn exists(&self, key: &str) -> Result<bool>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Filesystem-backed store. Keys may contain `/` separators; everything
/// lives under one base directory.
pub struct FilesystemStore {
    base_path: PathBuf,
}

impl FilesystemStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn key_to_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }
}

#[async_trait]
impl ArtifactStore for FilesystemStore {
    async fn put(&self, key: &str, content: Bytes) -> Result<()> {
        let path = self.key_to_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path).await?;
        file.write_all(&content).await?;
        file.sync_all().await?;
        Ok(())
    }

    async fn open(&self, key: &str) -> Result<Box<dyn AsyncRead + Send + Unpin>> {
        let path = self.key_to_path(key);
        let file = fs::File::open(&path)
            .await
            .with_context(|| format!("Failed to open artifact {key}"))?;
        Ok(Box::new(file))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.key_to_path(key).exists())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        fs::remove_file(self.key_to_path(key))
            .await
            .with_context(|| format!("Failed to delete artifact {key}"))?;
        Ok(())
    }
}

/// S3-compatible object store (MinIO in deployments).
pub struct S3ArtifactStore {
    client: Client,
    bucket: String,
}

impl S3ArtifactStore {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put(&self, key: &str, content: Bytes) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(content))
            .send()
            .await?;
        Ok(())
    }

    async fn open(&self, key: &str) -> Result<Box<dyn AsyncRead + Send + Unpin>> {
        let res = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;
        Ok(Box::new(res.body.into_async_read()))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let res = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match res {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(anyhow::anyhow!(service_error))
                }
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    async fn read_all(store: &FilesystemStore, key: &str) -> Vec<u8> {
        let mut reader = store.open(key).await.unwrap();
        let mut content = Vec::new();
        reader.read_to_end(&mut content).await.unwrap();
        content
    }

    #[tokio::test]
    async fn test_filesystem_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path());

        let key = "42/some-artifact";
        store
            .put(key, Bytes::from_static(b"hello world"))
            .await
            .unwrap();
        assert!(store.exists(key).await.unwrap());
        assert_eq!(read_all(&store, key).await, b"hello world");

        store.delete(key).await.unwrap();
        assert!(!store.exists(key).await.unwrap());
    }

    #[tokio::test]
    async fn test_filesystem_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path());
        assert!(store.open("no/such/key").await.is_err());
        assert!(!store.exists("no/such/key").await.unwrap());
    }
}
