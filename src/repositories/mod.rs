pub mod filter;

use crate::api::pageable::Pageable;
use crate::entities::{prelude::*, resources, updates};
use crate::models::{CreateResourceRequest, ECategory, EditResourceRequest};
use chrono::Utc;
use filter::ResourceFilter;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ItemsAndPagesNumber,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

/// Query interface over the `resources` table. Soft-deleted rows are
/// invisible to every read path here.
#[derive(Clone)]
pub struct ResourceRepository {
    db: DatabaseConnection,
}

impl ResourceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<resources::Model>, DbErr> {
        Resources::find_by_id(id)
            .filter(resources::Column::Status.ne(resources::STATUS_REMOVED))
            .one(&self.db)
            .await
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<resources::Model>, DbErr> {
        Resources::find()
            .filter(resources::Column::Slug.eq(slug))
            .filter(resources::Column::Status.ne(resources::STATUS_REMOVED))
            .one(&self.db)
            .await
    }

    pub async fn slug_taken(&self, slug: &str) -> Result<bool, DbErr> {
        // Includes removed rows: a retired slug stays reserved.
        Ok(Resources::find()
            .filter(resources::Column::Slug.eq(slug))
            .count(&self.db)
            .await?
            > 0)
    }

    /// One page of active resources in the given category, narrowed by the
    /// caller's filter conjunction.
    pub async fn search(
        &self,
        category: ECategory,
        pageable: &Pageable,
        filter: &ResourceFilter,
    ) -> Result<(Vec<resources::Model>, ItemsAndPagesNumber), DbErr> {
        let paginator = Resources::find()
            .filter(resources::Column::Category.eq(category.as_str()))
            .filter(resources::Column::Status.ne(resources::STATUS_REMOVED))
            .filter(filter.condition())
            .order_by(pageable.sort.column(), pageable.dir.order())
            .paginate(&self.db, pageable.size);

        let totals = paginator.num_items_and_pages().await?;
        let content = paginator.fetch_page(pageable.page).await?;
        Ok((content, totals))
    }

    pub async fn insert(
        &self,
        request: &CreateResourceRequest,
        author: i32,
    ) -> Result<resources::Model, DbErr> {
        let now = Utc::now();
        resources::ActiveModel {
            slug: Set(request.slug.clone()),
            name: Set(request.name.clone()),
            category: Set(request.category.as_str().to_string()),
            author: Set(author),
            tagline: Set(request.tagline.clone()),
            description: Set(request.description.clone()),
            status: Set(resources::STATUS_ACTIVE.to_string()),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.db)
        .await
    }

    pub async fn apply_edit(
        &self,
        resource: resources::Model,
        request: &EditResourceRequest,
    ) -> Result<(), DbErr> {
        let mut active: resources::ActiveModel = resource.into();
        if let Some(name) = &request.name {
            active.name = Set(name.clone());
        }
        if let Some(tagline) = &request.tagline {
            active.tagline = Set(Some(tagline.clone()));
        }
        if let Some(description) = &request.description {
            active.description = Set(Some(description.clone()));
        }
        active.updated_at = Set(Some(Utc::now()));
        active.update(&self.db).await?;
        Ok(())
    }

    /// Soft delete: flips status to "removed". Missing ids are a no-op.
    pub async fn mark_removed(&self, id: i32) -> Result<(), DbErr> {
        if let Some(resource) = Resources::find_by_id(id).one(&self.db).await? {
            let mut active: resources::ActiveModel = resource.into();
            active.status = Set(resources::STATUS_REMOVED.to_string());
            active.updated_at = Set(Some(Utc::now()));
            active.update(&self.db).await?;
        }
        Ok(())
    }
}

/// Query interface over the `updates` table.
#[derive(Clone)]
pub struct UpdateRepository {
    db: DatabaseConnection,
}

impl UpdateRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<updates::Model>, DbErr> {
        Updates::find_by_id(id).one(&self.db).await
    }

    pub async fn insert(&self, update: updates::ActiveModel) -> Result<updates::Model, DbErr> {
        update.insert(&self.db).await
    }

    /// SUM of `download_count` across a resource's updates; `None` when the
    /// resource has no updates yet.
    pub async fn total_downloads(&self, resource_id: i32) -> Result<Option<i64>, DbErr> {
        let total: Option<Option<i64>> = Updates::find()
            .select_only()
            .column_as(updates::Column::DownloadCount.sum(), "total")
            .filter(updates::Column::ResourceId.eq(resource_id))
            .into_tuple()
            .one(&self.db)
            .await?;
        Ok(total.flatten())
    }

    /// Bumps the counter for one served download. Uses a column expression
    /// so concurrent downloads never lose an increment.
    pub async fn increment_download_count(&self, update_id: i32) -> Result<(), DbErr> {
        Updates::update_many()
            .col_expr(
                updates::Column::DownloadCount,
                Expr::col(updates::Column::DownloadCount).add(1),
            )
            .filter(updates::Column::Id.eq(update_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
