use crate::api::error::{RestError, RestErrorCode};
use crate::api::pageable::Pageable;
use crate::entities::resources;
use crate::models::{
    CreateResourceRequest, ECategory, EditResourceRequest, PageDto, ResourceDto, SimpleResourceDto,
};
use crate::repositories::filter::ResourceFilter;
use crate::repositories::{ResourceRepository, UpdateRepository};

/// Lookup key accepted by the fetch and edit paths: resources resolve both
/// by numeric id and by slug.
#[derive(Debug, Clone)]
pub enum ResourceKey {
    Id(i32),
    Slug(String),
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKey::Id(id) => write!(f, "{id}"),
            ResourceKey::Slug(slug) => write!(f, "{slug}"),
        }
    }
}

pub struct ResourceService {
    resources: ResourceRepository,
    updates: UpdateRepository,
}

impl ResourceService {
    pub fn new(resources: ResourceRepository, updates: UpdateRepository) -> Self {
        Self { resources, updates }
    }

    pub async fn search_resources(
        &self,
        category: ECategory,
        pageable: &Pageable,
        filter: &ResourceFilter,
    ) -> Result<PageDto, RestError> {
        let (content, totals) = self.resources.search(category, pageable, filter).await?;

        Ok(PageDto {
            content: content.iter().map(SimpleResourceDto::from_model).collect(),
            number: pageable.page,
            size: pageable.size,
            total_elements: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }

    pub async fn get_resource(
        &self,
        key: &ResourceKey,
    ) -> Result<Option<resources::Model>, RestError> {
        let resource = match key {
            ResourceKey::Id(id) => self.resources.find_by_id(*id).await?,
            ResourceKey::Slug(slug) => self.resources.find_by_slug(slug).await?,
        };
        Ok(resource)
    }

    /// Full view with the download total folded in; `None` when the key
    /// resolves to nothing.
    pub async fn get_resource_dto(
        &self,
        key: &ResourceKey,
    ) -> Result<Option<ResourceDto>, RestError> {
        let Some(resource) = self.get_resource(key).await? else {
            return Ok(None);
        };
        let total_downloads = self.updates.total_downloads(resource.id).await?.unwrap_or(0);
        Ok(Some(ResourceDto::create(resource, total_downloads)))
    }

    pub async fn create_resource(
        &self,
        request: CreateResourceRequest,
        author: i32,
    ) -> Result<resources::Model, RestError> {
        if request.slug.trim().is_empty() || request.name.trim().is_empty() {
            return Err(RestError::new(
                RestErrorCode::MalformedBody,
                "Resource name and slug must not be empty",
            ));
        }
        if self.resources.slug_taken(&request.slug).await? {
            return Err(RestError::new(
                RestErrorCode::DuplicateSlug,
                format!("Slug '{}' is already taken", request.slug),
            ));
        }

        let resource = self.resources.insert(&request, author).await?;
        tracing::info!(
            resource_id = resource.id,
            slug = %resource.slug,
            "Resource created"
        );
        Ok(resource)
    }

    pub async fn update_resource(
        &self,
        key: &ResourceKey,
        request: &EditResourceRequest,
    ) -> Result<(), RestError> {
        let resource = self
            .get_resource(key)
            .await?
            .ok_or_else(|| RestError::resource_not_found(key))?;
        self.resources.apply_edit(resource, request).await?;
        Ok(())
    }

    /// Soft delete; succeeds whether or not the id exists.
    pub async fn delete_resource(&self, id: i32) -> Result<(), RestError> {
        self.resources.mark_removed(id).await?;
        Ok(())
    }
}
