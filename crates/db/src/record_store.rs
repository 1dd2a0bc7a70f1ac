use async_trait::async_trait;

use common::types::{Id, UserId};
use wizard::{
    Ban, ComplaintTarget, FieldDefinition, NewBan, NewComplaint, NewService, PriceTier, RecordStore, Service,
    ServicePatch, ServiceType, StoreError, StoreResult, UserPatch,
};

use crate::{Result, DB};

trait FoundOr<T> {
    fn found(self) -> StoreResult<T>;
}

impl<T> FoundOr<T> for Result<Option<T>> {
    fn found(self) -> StoreResult<T> {
        self?.ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl RecordStore for DB {
    async fn create_service_type(&self, name: &str, price_tier: PriceTier, created_by: UserId) -> StoreResult<Id> {
        Ok(self.add_service_type(name, price_tier, created_by).await?)
    }
    async fn service_type(&self, id: Id) -> StoreResult<ServiceType> {
        self.select_service_type(id).await.found()
    }
    async fn service_type_by_name(&self, name: &str) -> StoreResult<ServiceType> {
        self.select_service_type_by_name(name).await.found()
    }
    async fn list_service_types(&self) -> StoreResult<Vec<ServiceType>> {
        Ok(self.select_service_types().await?)
    }
    async fn deactivate_service_type(&self, id: Id) -> StoreResult<bool> {
        Ok(self.save_service_type_inactive(id).await?)
    }

    async fn append_field(&self, service_type_id: Id, field: &FieldDefinition, order_position: i64) -> StoreResult<bool> {
        Ok(self.add_field(service_type_id, field, order_position).await?)
    }
    async fn remove_last_field(&self, service_type_id: Id) -> StoreResult<bool> {
        Ok(self.delete_last_field(service_type_id).await?)
    }
    async fn list_fields(&self, service_type_id: Id) -> StoreResult<Vec<FieldDefinition>> {
        Ok(self.select_fields(service_type_id).await?)
    }

    async fn create_service(&self, service: &NewService) -> StoreResult<Id> {
        Ok(self.add_service(service).await?)
    }
    async fn service(&self, id: Id) -> StoreResult<Service> {
        self.select_service(id).await.found()
    }
    async fn update_service(&self, id: Id, patch: &ServicePatch) -> StoreResult<bool> {
        Ok(self.save_service(id, patch).await?)
    }

    async fn create_complaint(&self, complaint: &NewComplaint) -> StoreResult<Id> {
        Ok(self.add_complaint(complaint).await?)
    }
    async fn delete_complaint(&self, id: Id) -> StoreResult<bool> {
        Ok(DB::delete_complaint(self, id).await?)
    }
    async fn ban(&self, ban: &NewBan) -> StoreResult<Id> {
        Ok(self.add_ban(ban).await?)
    }
    async fn active_ban(&self, target: ComplaintTarget) -> StoreResult<Option<Ban>> {
        Ok(self.select_active_ban(target).await?)
    }

    async fn update_user(&self, user: UserId, patch: &UserPatch) -> StoreResult<bool> {
        Ok(self.save_user_profile(user, patch).await?)
    }
}
