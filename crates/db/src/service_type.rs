use common::{
    types::{Id, UserId},
    DateTime,
};
use wizard::{FieldDefinition, PriceTier, ServiceType};

use crate::{models::fetch, IgnoreNotFound};

use super::{Result, DB, FIELD_TABLE, SERVICE_TYPE_TABLE};

impl DB {
    pub async fn add_service_type(&self, name: &str, price_tier: PriceTier, created_by: UserId) -> Result<Id> {
        log::debug!("saving service type {name}");
        let created_by: Id = created_by.into();
        let res = sqlx::query(&format!(
            "insert into {SERVICE_TYPE_TABLE} (name, name_key, created_by, price_tier, created_at)
             values (?, ?, ?, ?, ?)"
        ))
        .bind(name)
        .bind(name.to_lowercase())
        .bind(created_by)
        .bind(i64::from(price_tier))
        .bind(DateTime::now())
        .execute(&self.pool)
        .await?;

        Ok(res.last_insert_rowid())
    }
    pub async fn select_service_type(&self, service_type_id: Id) -> Result<Option<ServiceType>> {
        log::debug!("select service type {service_type_id}");
        let res = sqlx::query_as::<_, fetch::ServiceTypeRow>(&format!(
            "select * from {SERVICE_TYPE_TABLE}
             where service_type_id = ?"
        ))
        .bind(service_type_id)
        .fetch_one(&self.pool)
        .await
        .ignore_not_found()?;

        res.map(TryInto::try_into).transpose()
    }
    /// Case-insensitive
    pub async fn select_service_type_by_name(&self, name: &str) -> Result<Option<ServiceType>> {
        log::debug!("select service type by name {name}");
        let res = sqlx::query_as::<_, fetch::ServiceTypeRow>(&format!(
            "select * from {SERVICE_TYPE_TABLE}
             where name_key = ?"
        ))
        .bind(name.to_lowercase())
        .fetch_one(&self.pool)
        .await
        .ignore_not_found()?;

        res.map(TryInto::try_into).transpose()
    }
    /// Select active service types ordered by name
    pub async fn select_service_types(&self) -> Result<Vec<ServiceType>> {
        log::debug!("select active service types");
        sqlx::query_as::<_, fetch::ServiceTypeRow>(&format!(
            "select * from {SERVICE_TYPE_TABLE}
             where is_active = true
             order by name_key"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
    }
    /// Returns false when there is no such type
    pub async fn save_service_type_inactive(&self, service_type_id: Id) -> Result<bool> {
        log::debug!("deactivate service type {service_type_id}");
        let res = sqlx::query(&format!(
            "update {SERVICE_TYPE_TABLE}
             set is_active = false
             where service_type_id = ?"
        ))
        .bind(service_type_id)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }
}

// Fields
impl DB {
    /// Returns false when there is no such service type
    pub async fn add_field(&self, service_type_id: Id, field: &FieldDefinition, order_position: i64) -> Result<bool> {
        log::debug!("saving field {} for service type {service_type_id}", field.name);
        let options = if field.options.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&field.options)?)
        };
        let res = sqlx::query(&format!(
            "insert into {FIELD_TABLE}
               (service_type_id, name, label, field_type, description, required, options, order_position)
             select ?, ?, ?, ?, ?, ?, ?, ?
             where exists (
               select 1 from {SERVICE_TYPE_TABLE}
               where service_type_id = ?
             )"
        ))
        .bind(service_type_id)
        .bind(&field.name)
        .bind(&field.label)
        .bind(field.field_type.as_str())
        .bind(&field.description)
        .bind(field.required)
        .bind(options)
        .bind(order_position)
        .bind(service_type_id)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }
    /// Returns false when the type has no fields
    pub async fn delete_last_field(&self, service_type_id: Id) -> Result<bool> {
        log::debug!("delete last field of service type {service_type_id}");
        let res = sqlx::query(&format!(
            "delete from {FIELD_TABLE}
             where field_id = (
               select field_id from {FIELD_TABLE}
               where service_type_id = ?
               order by order_position desc, field_id desc
               limit 1
             )"
        ))
        .bind(service_type_id)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }
    pub async fn select_fields(&self, service_type_id: Id) -> Result<Vec<FieldDefinition>> {
        log::debug!("select fields of service type {service_type_id}");
        sqlx::query_as::<_, fetch::FieldRow>(&format!(
            "select * from {FIELD_TABLE}
             where service_type_id = ?
             order by order_position, field_id"
        ))
        .bind(service_type_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
    }
}
