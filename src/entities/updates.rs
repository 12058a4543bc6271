use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One versioned release of a resource, owning exactly one stored artifact.
///
/// `versions` holds the supported game-version labels as a JSON-encoded
/// string array so the column stays LIKE-filterable on every backend.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "updates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub resource_id: i32,
    pub title: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub versions: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub changelog: Option<String>,
    pub artifact_key: String,
    pub real_name: String,
    pub size: i64,
    pub download_count: i32,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::resources::Entity",
        from = "Column::ResourceId",
        to = "super::resources::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Resources,
}

impl Related<super::resources::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resources.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
