use async_trait::async_trait;

use common::types::{Id, UserId};

use crate::{
    Ban, ComplaintTarget, FieldDefinition, NewBan, NewComplaint, NewService, PriceTier, Service,
    ServicePatch, ServiceType, StoreError, UserPatch,
};

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence used by wizards. Lookups of a single missing record return
/// [`StoreError::NotFound`], updates of a missing record return `false`
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// [`StoreError::Conflict`] when the name is taken
    async fn create_service_type(
        &self,
        name: &str,
        price_tier: PriceTier,
        created_by: UserId,
    ) -> StoreResult<Id>;
    async fn service_type(&self, id: Id) -> StoreResult<ServiceType>;
    /// Case-insensitive, inactive types included
    async fn service_type_by_name(&self, name: &str) -> StoreResult<ServiceType>;
    /// Active types only
    async fn list_service_types(&self) -> StoreResult<Vec<ServiceType>>;
    async fn deactivate_service_type(&self, id: Id) -> StoreResult<bool>;

    async fn append_field(
        &self,
        service_type_id: Id,
        field: &FieldDefinition,
        order_position: i64,
    ) -> StoreResult<bool>;
    async fn remove_last_field(&self, service_type_id: Id) -> StoreResult<bool>;
    /// Ordered by position
    async fn list_fields(&self, service_type_id: Id) -> StoreResult<Vec<FieldDefinition>>;

    async fn create_service(&self, service: &NewService) -> StoreResult<Id>;
    async fn service(&self, id: Id) -> StoreResult<Service>;
    async fn update_service(&self, id: Id, patch: &ServicePatch) -> StoreResult<bool>;

    async fn create_complaint(&self, complaint: &NewComplaint) -> StoreResult<Id>;
    async fn delete_complaint(&self, id: Id) -> StoreResult<bool>;
    async fn ban(&self, ban: &NewBan) -> StoreResult<Id>;
    async fn active_ban(&self, target: ComplaintTarget) -> StoreResult<Option<Ban>>;

    async fn update_user(&self, user: UserId, patch: &UserPatch) -> StoreResult<bool>;
}
