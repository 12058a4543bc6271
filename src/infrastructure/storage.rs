use anyhow::Context;

use crate::config::ArchiveConfig;
use crate::services::storage::{ArtifactStore, FilesystemStore, S3ArtifactStore};
use aws_sdk_s3::config::Region;
use std::env;
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &ArchiveConfig) -> anyhow::Result<Arc<dyn ArtifactStore>> {
    match config.storage_backend.as_str() {
        "s3" => setup_s3().await,
        _ => {
            info!("📁 Artifact store: filesystem ({})", config.storage_root);
            tokio::fs::create_dir_all(&config.storage_root).await?;
            Ok(Arc::new(FilesystemStore::new(&config.storage_root)))
        }
    }
}

async fn setup_s3() -> anyhow::Result<Arc<dyn ArtifactStore>> {
    let endpoint_url = env::var("S3_ENDPOINT").context("S3_ENDPOINT must be set")?;
    let access_key = env::var("S3_ACCESS_KEY").context("S3_ACCESS_KEY must be set")?;
    let secret_key = env::var("S3_SECRET_KEY").context("S3_SECRET_KEY must be set")?;
    let bucket = env::var("S3_BUCKET").context("S3_BUCKET must be set")?;

    info!("☁️  Artifact store: S3 {} (Bucket: {})", endpoint_url, bucket);

    let aws_config = aws_config::from_env()
        .endpoint_url(&endpoint_url)
        .region(Region::new("us-east-1"))
        .credentials_provider(aws_sdk_s3::config::Credentials::new(
            access_key, secret_key, None, None, "static",
        ))
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(true)
        .build();

    let client = aws_sdk_s3::Client::from_conf(s3_config);
    Ok(Arc::new(S3ArtifactStore::new(client, bucket)))
}
