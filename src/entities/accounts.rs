use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Uploader account, identified by an opaque token. Token issuance and
/// session management happen outside this service; the handler layer only
/// ever resolves a token to a row and reads `can_upload`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub token: String,
    pub can_upload: bool,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
