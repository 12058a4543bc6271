use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog entry for a downloadable add-on (mod, plugin or server software).
///
/// `status` is "active" for visible rows; deletion flips it to "removed"
/// instead of dropping the row, so update history stays intact.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    pub category: String,
    pub author: i32,
    pub tagline: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status: String,
    pub created_at: Option<DateTimeUtc>,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::updates::Entity")]
    Updates,
}

impl Related<super::updates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Updates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Visible, searchable rows carry this status.
pub const STATUS_ACTIVE: &str = "active";
/// Soft-deleted rows; hidden from search and direct fetch.
pub const STATUS_REMOVED: &str = "removed";
