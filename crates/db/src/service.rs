use common::{
    types::{Id, UserId},
    DateTime,
};
use wizard::{NewService, Service, ServicePatch, ServiceStatus};

use crate::{models::fetch, IgnoreNotFound};

use super::{Result, DB, SERVICE_TABLE, USER_TABLE};

impl DB {
    /// Save service and mark its owner as a seller
    pub async fn add_service(&self, service: &NewService) -> Result<Id> {
        log::debug!("saving service {} of {}", service.title, service.owner);
        let owner: Id = service.owner.into();
        let custom_fields = serde_json::to_string(&service.custom_fields)?;
        let now = DateTime::now();

        let mut tx = self.pool.begin().await?;
        let res = sqlx::query(&format!(
            "insert into {SERVICE_TABLE}
               (owner_id, service_type_id, title, price, city, district, street, house,
                number_phone, photo_id, custom_fields, status, created_at)
             values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(owner)
        .bind(service.service_type_id)
        .bind(&service.title)
        .bind(service.price)
        .bind(&service.city)
        .bind(&service.district)
        .bind(&service.street)
        .bind(&service.house)
        .bind(&service.number_phone)
        .bind(&service.photo)
        .bind(custom_fields)
        .bind(ServiceStatus::Active.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            "insert into {USER_TABLE} (user_id, is_seller, created_at)
             values (?, true, ?)
             on conflict (user_id) do update set is_seller = true"
        ))
        .bind(owner)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(res.last_insert_rowid())
    }
    pub async fn select_service(&self, service_id: Id) -> Result<Option<Service>> {
        log::debug!("select service {service_id}");
        let res = sqlx::query_as::<_, fetch::ServiceRow>(&format!(
            "select * from {SERVICE_TABLE}
             where service_id = ?"
        ))
        .bind(service_id)
        .fetch_one(&self.pool)
        .await
        .ignore_not_found()?;

        res.map(TryInto::try_into).transpose()
    }
    /// Select active services of one type, newest first
    pub async fn select_services(&self, service_type_id: Id) -> Result<Vec<Service>> {
        log::debug!("select services of type {service_type_id}");
        sqlx::query_as::<_, fetch::ServiceRow>(&format!(
            "select * from {SERVICE_TABLE}
             where service_type_id = ?
               and status = ?
             order by created_at desc, service_id desc"
        ))
        .bind(service_type_id)
        .bind(ServiceStatus::Active.as_str())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
    }
    /// Select all services of a user except deleted ones
    pub async fn select_user_services(&self, owner: UserId) -> Result<Vec<Service>> {
        log::debug!("select services of {owner}");
        let owner: Id = owner.into();
        sqlx::query_as::<_, fetch::ServiceRow>(&format!(
            "select * from {SERVICE_TABLE}
             where owner_id = ?
               and status <> ?
             order by service_id"
        ))
        .bind(owner)
        .bind(ServiceStatus::Deleted.as_str())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
    }
    /// Returns false when there is no such service
    pub async fn save_service(&self, service_id: Id, patch: &ServicePatch) -> Result<bool> {
        log::debug!("update service {service_id}: {patch:?}");
        let sql = format!(
            "update {SERVICE_TABLE}
             set {}
             where service_id = ?",
            assignment(patch)
        );

        let query = sqlx::query(&sql);
        let query = match patch {
            ServicePatch::Price(price) => query.bind(*price),
            ServicePatch::City(value)
            | ServicePatch::District(value)
            | ServicePatch::Street(value)
            | ServicePatch::Phone(value)
            | ServicePatch::Photo(value) => query.bind(value),
            ServicePatch::House(house) => query.bind(house),
            ServicePatch::Custom { name, value: Some(value) } => {
                query.bind(json_path(name)).bind(serde_json::to_string(value)?)
            }
            ServicePatch::Custom { name, value: None } => query.bind(json_path(name)),
            ServicePatch::Status(status) => query.bind(status.as_str()),
        };
        let res = query.bind(service_id).execute(&self.pool).await?;

        Ok(res.rows_affected() > 0)
    }
}

fn assignment(patch: &ServicePatch) -> &'static str {
    match patch {
        ServicePatch::Price(_) => "price = ?",
        ServicePatch::City(_) => "city = ?",
        ServicePatch::District(_) => "district = ?",
        ServicePatch::Street(_) => "street = ?",
        ServicePatch::House(_) => "house = ?",
        ServicePatch::Phone(_) => "number_phone = ?",
        ServicePatch::Photo(_) => "photo_id = ?",
        ServicePatch::Custom { value: Some(_), .. } => "custom_fields = json_set(custom_fields, ?, json(?))",
        ServicePatch::Custom { value: None, .. } => "custom_fields = json_remove(custom_fields, ?)",
        ServicePatch::Status(_) => "status = ?",
    }
}

fn json_path(name: &str) -> String {
    format!("$.\"{name}\"")
}
