//! User business logic - creation, lookup and language preference.
//!
//! Users are addressed by `telegram_id` everywhere. A plain insert enforces the
//! one-row-per-account rule and surfaces duplicates as
//! [`Error::UniquenessViolation`]; the upsert helpers resolve the conflict in the
//! database instead, which keeps concurrent first contacts from racing.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{NotSet, Set, prelude::*, sea_query::OnConflict};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::{debug, instrument};

/// Interface languages the bot ships translations for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Uzbek
    #[default]
    Uz,
    /// Russian
    Ru,
    /// English
    En,
}

impl Language {
    /// The code stored in `users.language`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uz => "uz",
            Self::Ru => "ru",
            Self::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "uz" => Ok(Self::Uz),
            "ru" => Ok(Self::Ru),
            "en" => Ok(Self::En),
            other => Err(Error::ConstraintViolation {
                message: format!("language must be one of uz, ru, en, got '{other}'"),
            }),
        }
    }
}

/// Inserts a new user row.
///
/// When `language` is `None` the column default (`"uz"`) applies.
///
/// # Errors
/// Returns [`Error::UniquenessViolation`] if a user with this `telegram_id` exists.
#[instrument(skip(db))]
pub async fn create_user(
    db: &DatabaseConnection,
    telegram_id: i64,
    language: Option<Language>,
) -> Result<user::Model> {
    let model = user::ActiveModel {
        telegram_id: Set(telegram_id),
        language: language.map_or(NotSet, |lang| Set(lang.as_str().to_string())),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    debug!(user_id = created.id, "User created");
    Ok(created)
}

/// Finds a user by platform id, returning None if the account never interacted.
pub async fn get_user_by_telegram_id(
    db: &DatabaseConnection,
    telegram_id: i64,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::TelegramId.eq(telegram_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the user for `telegram_id`, inserting one with defaults if absent.
///
/// An existing row is left untouched.
#[instrument(skip(db))]
pub async fn get_or_create_user(db: &DatabaseConnection, telegram_id: i64) -> Result<user::Model> {
    let model = user::ActiveModel {
        telegram_id: Set(telegram_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    User::insert(model)
        .on_conflict(
            OnConflict::column(user::Column::TelegramId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    fetch_existing(db, telegram_id).await
}

/// Sets the preferred language, creating the user if needed.
#[instrument(skip(db))]
pub async fn set_user_language(
    db: &DatabaseConnection,
    telegram_id: i64,
    language: Language,
) -> Result<user::Model> {
    let model = user::ActiveModel {
        telegram_id: Set(telegram_id),
        language: Set(language.as_str().to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    User::insert(model)
        .on_conflict(
            OnConflict::column(user::Column::TelegramId)
                .update_column(user::Column::Language)
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    debug!("Language set to {}", language);
    fetch_existing(db, telegram_id).await
}

/// Returns the stored language code, or `"uz"` for unknown users.
pub async fn get_user_language(db: &DatabaseConnection, telegram_id: i64) -> Result<String> {
    Ok(get_user_by_telegram_id(db, telegram_id)
        .await?
        .map_or_else(|| user::DEFAULT_LANGUAGE.to_string(), |u| u.language))
}

async fn fetch_existing(db: &DatabaseConnection, telegram_id: i64) -> Result<user::Model> {
    get_user_by_telegram_id(db, telegram_id)
        .await?
        .ok_or_else(|| {
            Error::Database(DbErr::RecordNotFound(format!(
                "user {telegram_id} missing after upsert"
            )))
        })
}
