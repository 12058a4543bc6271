use crate::entities::{accounts, prelude::*};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

/// Token-to-account resolution. Token issuance lives outside this service;
/// all the handler layer ever asks is whether a token may upload.
#[derive(Clone)]
pub struct AccountService {
    db: DatabaseConnection,
}

impl AccountService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<accounts::Model>, DbErr> {
        if token.is_empty() {
            return Ok(None);
        }
        Accounts::find()
            .filter(accounts::Column::Token.eq(token))
            .one(&self.db)
            .await
    }

    /// False for unknown or empty tokens.
    pub async fn has_permission_to_upload(&self, token: &str) -> Result<bool, DbErr> {
        Ok(self
            .find_by_token(token)
            .await?
            .map(|account| account.can_upload)
            .unwrap_or(false))
    }
}
