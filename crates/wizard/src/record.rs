use common::{
    types::{Id, UserId},
    DateTime, UnixDateTime,
};

use crate::{Answer, Answers};

/// Who a complaint or a ban is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplaintTarget {
    User(UserId),
    Service(Id),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceStatus {
    #[default]
    Active,
    Blocked,
    Deleted,
}

impl ServiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Blocked => "blocked",
            Self::Deleted => "deleted",
        }
    }
    pub fn parse(s: &str) -> Option<Self> {
        [Self::Active, Self::Blocked, Self::Deleted]
            .into_iter()
            .find(|status| status.as_str() == s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewService {
    pub owner: UserId,
    pub service_type_id: Id,
    /// Name of the service type
    pub title: String,
    pub price: f64,
    pub city: String,
    pub district: String,
    pub street: String,
    pub house: Option<String>,
    pub number_phone: String,
    pub photo: String,
    /// Keyed by [`crate::FieldDefinition::name`]
    pub custom_fields: Answers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub id: Id,
    pub owner: UserId,
    pub service_type_id: Id,
    pub title: String,
    pub price: f64,
    pub city: String,
    pub district: String,
    pub street: String,
    pub house: Option<String>,
    pub number_phone: String,
    pub photo: String,
    pub custom_fields: Answers,
    pub status: ServiceStatus,
}

/// Change of one attribute of a service
#[derive(Debug, Clone, PartialEq)]
pub enum ServicePatch {
    Price(f64),
    City(String),
    District(String),
    Street(String),
    House(Option<String>),
    Phone(String),
    Photo(String),
    /// `None` removes the value
    Custom { name: String, value: Option<Answer> },
    Status(ServiceStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComplaint {
    pub target: ComplaintTarget,
    pub creator: UserId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBan {
    pub target: ComplaintTarget,
    /// `None` for bans issued by the bot itself
    pub admin: Option<UserId>,
    pub hours: u32,
    pub permanent: bool,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ban {
    pub id: Id,
    pub target: ComplaintTarget,
    pub admin: Option<UserId>,
    pub hours: u32,
    pub permanent: bool,
    pub reason: String,
    pub created_at: UnixDateTime,
}

impl Ban {
    pub fn expires_at(&self) -> Option<UnixDateTime> {
        (!self.permanent).then(|| self.created_at + DateTime::hours(self.hours))
    }
    pub fn is_active_at(&self, now: UnixDateTime) -> bool {
        self.expires_at().is_none_or(|expires| now < expires)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileAttribute {
    Phone,
    Name,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserPatch {
    Phone(String),
    Name(String),
}

/// What was written by a committed wizard
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    ServiceType(Id),
    Field { service_type_id: Id, order_position: i64 },
    Service(Id),
    ServiceUpdated(Id),
    Complaint(Id),
    Ban { id: Id, ban: NewBan },
    /// Complaint closed with a warning, nothing else written
    Warning { complaint_id: Id, target: ComplaintTarget },
    Profile(UserPatch),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ban_is_active() {
        let mut ban = Ban {
            id: 1,
            target: ComplaintTarget::User(UserId(1)),
            admin: None,
            hours: 2,
            permanent: false,
            reason: "r".to_string(),
            created_at: 1000,
        };
        assert!(ban.is_active_at(1000));
        assert!(ban.is_active_at(1000 + 2 * 3600 - 1));
        assert!(!ban.is_active_at(1000 + 2 * 3600));

        ban.permanent = true;
        assert_eq!(ban.expires_at(), None);
        assert!(ban.is_active_at(i64::MAX));
    }

    #[test]
    fn test_service_status_parse() {
        for status in [ServiceStatus::Active, ServiceStatus::Blocked, ServiceStatus::Deleted] {
            assert_eq!(ServiceStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ServiceStatus::parse("hidden"), None);
    }
}
