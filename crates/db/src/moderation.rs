use common::{
    types::{Id, UserId},
    DateTime, UnixDateTime,
};
use wizard::{Ban, ComplaintTarget, NewBan, NewComplaint};

use crate::{
    models::{self, fetch, target_columns},
    IgnoreNotFound,
};

use super::{Result, BAN_TABLE, COMPLAINT_TABLE, DB};

impl DB {
    pub async fn add_complaint(&self, complaint: &NewComplaint) -> Result<Id> {
        log::debug!("saving complaint about {:?}", complaint.target);
        let (user_id, service_id) = target_columns(complaint.target);
        let creator: Id = complaint.creator.into();
        let res = sqlx::query(&format!(
            "insert into {COMPLAINT_TABLE} (target_user_id, target_service_id, creator_id, text, created_at)
             values (?, ?, ?, ?, ?)"
        ))
        .bind(user_id)
        .bind(service_id)
        .bind(creator)
        .bind(&complaint.text)
        .bind(DateTime::now())
        .execute(&self.pool)
        .await?;

        Ok(res.last_insert_rowid())
    }
    pub async fn select_complaint(&self, complaint_id: Id) -> Result<Option<models::Complaint>> {
        log::debug!("select complaint {complaint_id}");
        let res = sqlx::query_as::<_, fetch::ComplaintRow>(&format!(
            "select * from {COMPLAINT_TABLE}
             where complaint_id = ?"
        ))
        .bind(complaint_id)
        .fetch_one(&self.pool)
        .await
        .ignore_not_found()?;

        res.map(TryInto::try_into).transpose()
    }
    /// Select open complaints, oldest first
    pub async fn select_complaints(&self) -> Result<Vec<models::Complaint>> {
        log::debug!("select complaints");
        sqlx::query_as::<_, fetch::ComplaintRow>(&format!(
            "select * from {COMPLAINT_TABLE}
             order by complaint_id"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
    }
    /// Returns false when the complaint is already closed
    pub async fn delete_complaint(&self, complaint_id: Id) -> Result<bool> {
        log::debug!("delete complaint {complaint_id}");
        let res = sqlx::query(&format!("delete from {COMPLAINT_TABLE} where complaint_id = ?"))
            .bind(complaint_id)
            .execute(&self.pool)
            .await?;

        Ok(res.rows_affected() > 0)
    }
}

// Bans
impl DB {
    pub async fn add_ban(&self, ban: &NewBan) -> Result<Id> {
        log::debug!("saving ban of {:?} for {}h", ban.target, ban.hours);
        let (user_id, service_id) = target_columns(ban.target);
        let admin_id: Option<Id> = ban.admin.map(Into::into);
        let res = sqlx::query(&format!(
            "insert into {BAN_TABLE}
               (target_user_id, target_service_id, admin_id, hours, permanent, reason, created_at)
             values (?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(user_id)
        .bind(service_id)
        .bind(admin_id)
        .bind(ban.hours)
        .bind(ban.permanent)
        .bind(&ban.reason)
        .bind(DateTime::now())
        .execute(&self.pool)
        .await?;

        Ok(res.last_insert_rowid())
    }
    /// Select the latest ban of a target, still in effect now
    pub async fn select_active_ban(&self, target: ComplaintTarget) -> Result<Option<Ban>> {
        self.select_active_ban_at(target, DateTime::now()).await
    }
    pub(crate) async fn select_active_ban_at(&self, target: ComplaintTarget, now: UnixDateTime) -> Result<Option<Ban>> {
        log::debug!("select active ban of {target:?}");
        let (user_id, service_id) = target_columns(target);
        let res = sqlx::query_as::<_, fetch::BanRow>(&format!(
            "select * from {BAN_TABLE}
             where target_user_id is ?
               and target_service_id is ?
               and (permanent = true or created_at + hours * 3600 > ?)
             order by permanent desc, created_at + hours * 3600 desc
             limit 1"
        ))
        .bind(user_id)
        .bind(service_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .ignore_not_found()?;

        res.map(TryInto::try_into).transpose()
    }
    /// Whether user is banned right now
    pub async fn is_user_banned(&self, user_id: UserId) -> Result<bool> {
        Ok(self.select_active_ban(ComplaintTarget::User(user_id)).await?.is_some())
    }
}
