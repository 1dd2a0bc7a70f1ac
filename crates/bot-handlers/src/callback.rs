use common::types::{Id, UserId};
use wizard::ComplaintTarget;

use crate::payload::{make_payload, parse_payload, PayloadData, PayloadParseError, SEP};

// flag is at the start of payload: {version}:{flag}:{data}
const WIZARD_FLAG: &str = "wz";
const BROWSE_FLAG: &str = "browse";
const COMPLAIN_FLAG: &str = "complain";
const EDIT_FLAG: &str = "edit";
const DELETE_FLAG: &str = "delete";
const REVIEW_FLAG: &str = "review";
const MANAGE_FLAG: &str = "manage";
const DEACTIVATE_FLAG: &str = "deactivate";

// complaint targets: {complain-flag}:{target-token}:{id}
const USER_TOKEN: &str = "u";
const SERVICE_TOKEN: &str = "s";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Callback {
    /// Button of a wizard prompt, data is passed to the wizard as is
    Wizard(String),
    /// Show active services of a type
    Browse { service_type_id: Id },
    Complain { target: ComplaintTarget },
    EditService { service_id: Id },
    DeleteService { service_id: Id },
    /// Admin starts moderation of a complaint
    Review { complaint_id: Id },
    Manage { service_type_id: Id },
    Deactivate { service_type_id: Id },
}

impl PayloadData for Callback {
    type Error = PayloadParseError;

    fn to_payload(&self) -> String {
        match self {
            Self::Wizard(data) => make_payload(WIZARD_FLAG, data),
            Self::Browse { service_type_id } => make_payload(BROWSE_FLAG, &service_type_id.to_string()),
            Self::Complain { target } => {
                let (token, id) = match target {
                    ComplaintTarget::User(user) => (USER_TOKEN, Id::from(*user)),
                    ComplaintTarget::Service(id) => (SERVICE_TOKEN, *id),
                };
                make_payload(COMPLAIN_FLAG, &format!("{token}{SEP}{id}"))
            }
            Self::EditService { service_id } => make_payload(EDIT_FLAG, &service_id.to_string()),
            Self::DeleteService { service_id } => make_payload(DELETE_FLAG, &service_id.to_string()),
            Self::Review { complaint_id } => make_payload(REVIEW_FLAG, &complaint_id.to_string()),
            Self::Manage { service_type_id } => make_payload(MANAGE_FLAG, &service_type_id.to_string()),
            Self::Deactivate { service_type_id } => make_payload(DEACTIVATE_FLAG, &service_type_id.to_string()),
        }
    }

    fn try_from_payload(payload: &str) -> Result<Self, Self::Error> {
        let (flag, data) = parse_payload(payload)?;
        let id = || {
            data.parse::<Id>()
                .map_err(|_| PayloadParseError::InvalidData(data.to_string()))
        };

        let res = match flag {
            WIZARD_FLAG => Self::Wizard(data.to_string()),
            BROWSE_FLAG => Self::Browse { service_type_id: id()? },
            COMPLAIN_FLAG => {
                let invalid = || PayloadParseError::InvalidData(data.to_string());
                let (token, id) = data.split_once(SEP).ok_or_else(invalid)?;
                let target = match token {
                    USER_TOKEN => ComplaintTarget::User(UserId(id.parse().map_err(|_| invalid())?)),
                    SERVICE_TOKEN => ComplaintTarget::Service(id.parse().map_err(|_| invalid())?),
                    _ => return Err(invalid()),
                };
                Self::Complain { target }
            }
            EDIT_FLAG => Self::EditService { service_id: id()? },
            DELETE_FLAG => Self::DeleteService { service_id: id()? },
            REVIEW_FLAG => Self::Review { complaint_id: id()? },
            MANAGE_FLAG => Self::Manage { service_type_id: id()? },
            DEACTIVATE_FLAG => Self::Deactivate { service_type_id: id()? },
            flag => return Err(PayloadParseError::UnknownFlag(flag.to_string())),
        };
        Ok(res)
    }
}

impl Callback {
    /// Only admins can press these
    pub(crate) fn is_admin_only(&self) -> bool {
        matches!(
            self,
            Self::Review { .. } | Self::Manage { .. } | Self::Deactivate { .. }
        )
    }
}
