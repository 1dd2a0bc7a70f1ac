use common::{
    types::{Id, UserId},
    DateTime, UnixDateTime,
};
use wizard::{
    Answers, Ban, ComplaintTarget, FieldDefinition, FieldType, PriceTier, Service, ServiceStatus, ServiceType,
};

use crate::Error;

#[derive(Debug, Default, Clone, PartialEq, sqlx::FromRow, bon::Builder)]
pub struct User {
    /// User ID
    user_id: Id,

    /// Username
    username: Option<String>,

    /// First name + last name
    name: Option<String>,

    /// Contact phone, filled in profile
    number_phone: Option<String>,

    /// Has posted at least one service
    #[builder(default)]
    is_seller: bool,

    #[builder(default = DateTime::now())]
    created_at: UnixDateTime,
}

impl User {
    pub fn new(user_id: UserId) -> Self {
        Self::builder().user_id(user_id.into()).build()
    }
    pub fn user_id(&self) -> Id {
        self.user_id
    }
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    pub fn number_phone(&self) -> Option<&str> {
        self.number_phone.as_deref()
    }
    pub fn is_seller(&self) -> bool {
        self.is_seller
    }
    pub fn created_at(&self) -> UnixDateTime {
        self.created_at
    }
    pub fn display(&self) -> String {
        match (&self.username, &self.name) {
            (Some(username), Some(name)) => format!("@{username} ({name})"),
            (Some(username), None) => format!("@{username}"),
            (None, Some(name)) => name.clone(),
            (None, None) => self.user_id.to_string(),
        }
    }
}

/// Complaint waiting for moderation
#[derive(Debug, Clone, PartialEq)]
pub struct Complaint {
    pub id: Id,
    pub target: ComplaintTarget,
    pub creator: UserId,
    pub text: String,
    pub created_at: UnixDateTime,
}

#[derive(Debug)]
pub struct Stats {
    pub users: u32,
    pub sellers: u32,
    pub service_types: u32,
    pub services: u32,
    pub complaints: u32,
}

pub(crate) fn target_columns(target: ComplaintTarget) -> (Option<Id>, Option<Id>) {
    match target {
        ComplaintTarget::User(user) => (Some(user.into()), None),
        ComplaintTarget::Service(service) => (None, Some(service)),
    }
}

fn target_from_columns(user: Option<Id>, service: Option<Id>) -> Result<ComplaintTarget, Error> {
    match (user, service) {
        (Some(user), None) => Ok(ComplaintTarget::User(user_id("target_user_id", user)?)),
        (None, Some(service)) => Ok(ComplaintTarget::Service(service)),
        _ => Err(Error::InvalidValue {
            column: "target",
            value: format!("{user:?}/{service:?}"),
        }),
    }
}

fn user_id(column: &'static str, value: Id) -> Result<UserId, Error> {
    UserId::try_from(value).map_err(|_| invalid(column, value))
}

fn invalid(column: &'static str, value: impl ToString) -> Error {
    Error::InvalidValue {
        column,
        value: value.to_string(),
    }
}

/// Rows as stored, converted into wizard types
pub(crate) mod fetch {
    use super::*;

    #[derive(sqlx::FromRow)]
    pub(crate) struct Count {
        pub count: u32,
    }

    #[derive(sqlx::FromRow)]
    pub(crate) struct ServiceTypeRow {
        service_type_id: Id,
        name: String,
        created_by: Id,
        price_tier: i64,
        is_active: bool,
    }

    impl TryFrom<ServiceTypeRow> for ServiceType {
        type Error = Error;

        fn try_from(row: ServiceTypeRow) -> Result<Self, Self::Error> {
            Ok(Self {
                id: row.service_type_id,
                name: row.name,
                created_by: user_id("created_by", row.created_by)?,
                price_tier: PriceTier::try_from(row.price_tier).map_err(|_| invalid("price_tier", row.price_tier))?,
                is_active: row.is_active,
            })
        }
    }

    #[derive(sqlx::FromRow)]
    pub(crate) struct FieldRow {
        name: String,
        label: String,
        field_type: String,
        description: Option<String>,
        required: bool,
        options: Option<String>,
    }

    impl TryFrom<FieldRow> for FieldDefinition {
        type Error = Error;

        fn try_from(row: FieldRow) -> Result<Self, Self::Error> {
            let field_type: FieldType = row.field_type.parse().map_err(|_| invalid("field_type", &row.field_type))?;
            let options = match row.options {
                Some(options) => serde_json::from_str(&options)?,
                None => vec![],
            };
            Ok(Self::builder()
                .name(row.name)
                .label(row.label)
                .field_type(field_type)
                .maybe_description(row.description)
                .required(row.required)
                .options(options)
                .build())
        }
    }

    #[derive(sqlx::FromRow)]
    pub(crate) struct ServiceRow {
        service_id: Id,
        owner_id: Id,
        service_type_id: Id,
        title: String,
        price: f64,
        city: String,
        district: String,
        street: String,
        house: Option<String>,
        number_phone: String,
        photo_id: String,
        custom_fields: String,
        status: String,
    }

    impl TryFrom<ServiceRow> for Service {
        type Error = Error;

        fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
            let custom_fields: Answers = serde_json::from_str(&row.custom_fields)?;
            let status = ServiceStatus::parse(&row.status).ok_or_else(|| invalid("status", &row.status))?;
            Ok(Self {
                id: row.service_id,
                owner: user_id("owner_id", row.owner_id)?,
                service_type_id: row.service_type_id,
                title: row.title,
                price: row.price,
                city: row.city,
                district: row.district,
                street: row.street,
                house: row.house,
                number_phone: row.number_phone,
                photo: row.photo_id,
                custom_fields,
                status,
            })
        }
    }

    #[derive(sqlx::FromRow)]
    pub(crate) struct ComplaintRow {
        complaint_id: Id,
        target_user_id: Option<Id>,
        target_service_id: Option<Id>,
        creator_id: Id,
        text: String,
        created_at: UnixDateTime,
    }

    impl TryFrom<ComplaintRow> for Complaint {
        type Error = Error;

        fn try_from(row: ComplaintRow) -> Result<Self, Self::Error> {
            Ok(Self {
                id: row.complaint_id,
                target: target_from_columns(row.target_user_id, row.target_service_id)?,
                creator: user_id("creator_id", row.creator_id)?,
                text: row.text,
                created_at: row.created_at,
            })
        }
    }

    #[derive(sqlx::FromRow)]
    pub(crate) struct BanRow {
        ban_id: Id,
        target_user_id: Option<Id>,
        target_service_id: Option<Id>,
        admin_id: Option<Id>,
        hours: u32,
        permanent: bool,
        reason: String,
        created_at: UnixDateTime,
    }

    impl TryFrom<BanRow> for Ban {
        type Error = Error;

        fn try_from(row: BanRow) -> Result<Self, Self::Error> {
            Ok(Self {
                id: row.ban_id,
                target: target_from_columns(row.target_user_id, row.target_service_id)?,
                admin: row.admin_id.map(|id| user_id("admin_id", id)).transpose()?,
                hours: row.hours,
                permanent: row.permanent,
                reason: row.reason,
                created_at: row.created_at,
            })
        }
    }
}
