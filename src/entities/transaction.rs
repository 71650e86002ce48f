//! Transaction entity - An immutable record of one financial event.
//!
//! Each transaction has a random `id`, the owning `telegram_id`, a `type`
//! (`expense`, `income` or `debt`), a non-negative integer `amount` in the
//! smallest currency unit, a `category_key`, optional free-text fields, an
//! optional attributed `tx_date` and the capture `source`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::errors::Error;

/// Source stored when none is supplied on insert.
pub const DEFAULT_SOURCE: &str = "text";

/// Kind of financial event. Stored as its lowercase literal.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money spent
    #[default]
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Money received
    #[sea_orm(string_value = "income")]
    Income,
    /// Money lent or borrowed
    #[sea_orm(string_value = "debt")]
    Debt,
}

impl TransactionType {
    /// The literal stored in the `type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::Debt => "debt",
        }
    }

    /// Every accepted literal, in declaration order.
    #[must_use]
    pub const fn literals() -> [&'static str; 3] {
        ["expense", "income", "debt"]
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            "debt" => Ok(Self::Debt),
            other => Err(Error::ConstraintViolation {
                message: format!(
                    "type must be one of {}, got '{other}'",
                    Self::literals().join(", ")
                ),
            }),
        }
    }
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Random 128-bit identifier, generated on insert
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Telegram id of the owning user
    pub telegram_id: i64,
    /// Kind of event
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Amount in the smallest currency unit, never negative
    pub amount: i64,
    /// Category code, e.g. `"food"`
    pub category_key: String,
    /// Free-text note from the user
    pub description: Option<String>,
    /// Shop or counterparty, when recognized
    pub merchant: Option<String>,
    /// Calendar date the event is attributed to, if different from creation
    pub tx_date: Option<Date>,
    /// How the event was captured (`"text"`, `"voice"`, `"bot"`, ...)
    pub source: String,
    /// When the row was inserted
    pub created_at: DateTimeUtc,
}

impl Model {
    /// `tx_date` if set, otherwise the UTC calendar date of `created_at`.
    #[must_use]
    pub fn effective_date(&self) -> Date {
        self.tx_date.unwrap_or_else(|| self.created_at.date_naive())
    }
}

/// Transactions reference users by `telegram_id` without a declared foreign key.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
