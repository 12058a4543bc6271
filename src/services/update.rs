use crate::api::error::{RestError, RestErrorCode};
use crate::entities::updates;
use crate::models::{CreateUpdateRequest, EVersions};
use crate::repositories::{ResourceRepository, UpdateRepository};
use crate::services::account::AccountService;
use crate::services::storage::ArtifactStore;
use bytes::Bytes;
use chrono::Utc;
use sea_orm::Set;
use std::sync::Arc;
use tokio::io::AsyncRead;
use uuid::Uuid;

/// An artifact handed back to the download handler: a streaming reader over
/// the stored bytes, the filename the uploader originally sent and the
/// stored size.
pub struct FileReturn {
    pub content: Box<dyn AsyncRead + Send + Unpin>,
    pub real_name: String,
    pub size: i64,
}

/// Creates versioned updates (artifact + row) and serves downloads. Upload
/// authorization is enforced here, not in the handler.
pub struct ResourceUpdateService {
    accounts: AccountService,
    resources: ResourceRepository,
    updates: UpdateRepository,
    storage: Arc<dyn ArtifactStore>,
}

impl ResourceUpdateService {
    pub fn new(
        accounts: AccountService,
        resources: ResourceRepository,
        updates: UpdateRepository,
        storage: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            accounts,
            resources,
            updates,
            storage,
        }
    }

    pub async fn create_update(
        &self,
        token: &str,
        real_name: &str,
        content: Bytes,
        request: CreateUpdateRequest,
    ) -> Result<updates::Model, RestError> {
        if !self.accounts.has_permission_to_upload(token).await? {
            return Err(RestError::not_authorized());
        }

        self.resources
            .find_by_id(request.resource_id)
            .await?
            .ok_or_else(|| RestError::resource_not_found(request.resource_id))?;

        if request.versions.is_empty() {
            return Err(RestError::new(
                RestErrorCode::InvalidVersion,
                "At least one game version is required",
            ));
        }
        if let Some(unknown) = request
            .versions
            .iter()
            .find(|label| !EVersions::is_known(label))
        {
            return Err(RestError::new(
                RestErrorCode::InvalidVersion,
                format!("Unknown game version '{unknown}'"),
            ));
        }

        let artifact_key = format!("{}/{}", request.resource_id, Uuid::new_v4());
        let size = content.len() as i64;
        self.storage.put(&artifact_key, content).await?;

        let row = updates::ActiveModel {
            resource_id: Set(request.resource_id),
            title: Set(request.title.clone()),
            versions: Set(serde_json::to_string(&request.versions)
                .map_err(|e| RestError::malformed_body(e))?),
            changelog: Set(request.changelog.clone()),
            artifact_key: Set(artifact_key.clone()),
            real_name: Set(real_name.to_string()),
            size: Set(size),
            download_count: Set(0),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        };

        match self.updates.insert(row).await {
            Ok(update) => {
                tracing::info!(
                    update_id = update.id,
                    resource_id = update.resource_id,
                    size,
                    "Update stored"
                );
                Ok(update)
            }
            Err(err) => {
                // Orphaned artifacts are worse than a lost upload.
                if let Err(cleanup) = self.storage.delete(&artifact_key).await {
                    tracing::warn!("Failed to clean up artifact {artifact_key}: {cleanup:?}");
                }
                Err(err.into())
            }
        }
    }

    /// Opens the artifact for an update and bumps its download counter.
    pub async fn get_download(&self, update_id: i32) -> Result<FileReturn, RestError> {
        let update = self
            .updates
            .find_by_id(update_id)
            .await?
            .ok_or_else(|| RestError::update_not_found(update_id))?;

        let content = self.storage.open(&update.artifact_key).await?;
        self.updates.increment_download_count(update.id).await?;

        Ok(FileReturn {
            content,
            real_name: update.real_name,
            size: update.size,
        })
    }
}
