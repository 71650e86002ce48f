//! User entity - One row per messaging-platform account.
//!
//! Users are keyed externally by `telegram_id`; the surrogate `id` is never
//! exposed to the bot. Rows are created on first contact and only the
//! preferred `language` changes afterwards.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Language stored when none is supplied on insert.
pub const DEFAULT_LANGUAGE: &str = "uz";

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Surrogate identifier, assigned by the database
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Telegram account id; unique across all users
    #[sea_orm(unique)]
    pub telegram_id: i64,
    /// Preferred locale code (e.g. `"uz"`, `"ru"`, `"en"`)
    pub language: String,
    /// When the row was inserted
    pub created_at: DateTimeUtc,
}

/// Users are related to transactions by `telegram_id` only; no declared relation.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
