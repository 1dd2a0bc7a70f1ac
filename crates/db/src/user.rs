use common::types::{Id, UserId};
use wizard::UserPatch;

use crate::{models, IgnoreNotFound};

use super::{Result, DB, USER_TABLE};

impl DB {
    /// Insert user or refresh telegram-provided data. Profile values set by
    /// the user are kept
    pub async fn save_user(&self, user: &models::User) -> Result<()> {
        log::debug!("saving user {}", user.user_id());
        sqlx::query(&format!(
            "insert into {USER_TABLE} (user_id, username, name, number_phone, is_seller, created_at)
             values (?, ?, ?, ?, ?, ?)
             on conflict (user_id) do update
             set username = excluded.username,
                 name = coalesce({USER_TABLE}.name, excluded.name)"
        ))
        .bind(user.user_id())
        .bind(user.username())
        .bind(user.name())
        .bind(user.number_phone())
        .bind(user.is_seller())
        .bind(user.created_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
    pub async fn select_user(&self, user_id: impl Into<UserId>) -> Result<Option<models::User>> {
        let user_id = user_id.into();
        log::debug!("select user {user_id}");
        let id: Id = user_id.into();
        let res = sqlx::query_as::<_, models::User>(&format!(
            "select * from {USER_TABLE}
             where user_id = ?"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await;

        Ok(res.ignore_not_found()?)
    }
    /// Returns false when there is no such user
    pub async fn save_user_profile(&self, user_id: UserId, patch: &UserPatch) -> Result<bool> {
        log::debug!("update profile of {user_id}");
        let id: Id = user_id.into();
        let (column, value) = match patch {
            UserPatch::Phone(phone) => ("number_phone", phone),
            UserPatch::Name(name) => ("name", name),
        };
        let res = sqlx::query(&format!(
            "update {USER_TABLE}
             set {column} = ?
             where user_id = ?"
        ))
        .bind(value)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }
}
