use chrono::{DateTime, Utc};
use migration::OnConflict;
use sea_orm::{ActiveValue, ConnectionTrait, EntityTrait};

use crate::error::AppError;

/// Key/value store for small pieces of persistent bot state.
pub struct AppSettingRepository<'a, C> {
    db: &'a C,
}

impl<'a, C> AppSettingRepository<'a, C>
where
    C: ConnectionTrait,
{
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Value stored under `key`, if any.
    pub async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let setting = entity::prelude::AppSetting::find_by_id(key.to_string())
            .one(self.db)
            .await?;

        Ok(setting.map(|s| s.value))
    }

    /// Inserts or overwrites the value stored under `key`.
    pub async fn set(&self, key: &str, value: &str, now: DateTime<Utc>) -> Result<(), AppError> {
        entity::prelude::AppSetting::insert(entity::app_setting::ActiveModel {
            key: ActiveValue::Set(key.to_string()),
            value: ActiveValue::Set(value.to_string()),
            updated_at: ActiveValue::Set(now),
        })
        .on_conflict(
            OnConflict::column(entity::app_setting::Column::Key)
                .update_columns([
                    entity::app_setting::Column::Value,
                    entity::app_setting::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(self.db)
        .await?;

        Ok(())
    }
}
