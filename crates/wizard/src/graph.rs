//! Declarative step graph for every wizard kind.

use common::types::Id;

use crate::{Answer, ComplaintTarget, FieldType, ProfileAttribute, WizardSession};

/// Keys of answers in a session
pub mod key {
    pub const NAME: &str = "name";
    pub const PRICE_TIER: &str = "price_tier";
    pub const TYPE: &str = "type";
    pub const LABEL: &str = "label";
    pub const DESCRIPTION: &str = "description";
    pub const REQUIRED: &str = "required";
    pub const OPTIONS: &str = "options";

    pub const SERVICE_TYPE_ID: &str = "service_type_id";
    pub const PRICE: &str = "price";
    pub const CITY: &str = "city";
    pub const DISTRICT: &str = "district";
    pub const STREET: &str = "street";
    pub const HOUSE: &str = "house";
    pub const PHONE: &str = "number_phone";
    pub const PHOTO: &str = "photo";

    pub const ATTRIBUTE: &str = "attribute";
    pub const VALUE: &str = "value";

    pub const REASON: &str = "reason";
    pub const TEXT: &str = "text";
    pub const ACTION: &str = "action";
    pub const DURATION: &str = "duration";

    /// Base attributes of a service which can be edited
    pub const EDITABLE: [&str; 7] = [PRICE, CITY, DISTRICT, STREET, HOUSE, PHONE, PHOTO];
}

/// Values of button answers
pub mod choice {
    pub const NO_ANSWER: &str = "no_answer";
    pub const CUSTOM: &str = "custom";

    pub const WARNING: &str = "warning";
    pub const TEMP_BAN: &str = "temp_ban";
    pub const PERM_BAN: &str = "perm_ban";

    pub const ADD_FIELD: &str = "add_field";
    pub const DELETE_LAST: &str = "delete_last";

    pub const CONFIRM: &str = "confirm";
    pub const DISCARD: &str = "discard";

    pub const SKIP: &str = "skip";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardKind {
    CreateServiceType,
    /// Hub for editing fields of a type
    ManageServiceType { service_type_id: Id },
    /// Sub-wizard of [`WizardKind::ManageServiceType`]
    AddField { service_type_id: Id },
    PostService,
    EditService { service_id: Id },
    Complaint { target: ComplaintTarget },
    EditProfile { attribute: ProfileAttribute },
    IssueBan { complaint_id: Id, target: ComplaintTarget },
}

impl WizardKind {
    pub fn entry(self) -> Step {
        match self {
            Self::CreateServiceType => Step::TypeName,
            Self::ManageServiceType { .. } => Step::Management,
            Self::AddField { .. } => Step::FieldName,
            Self::PostService => Step::ServiceType,
            Self::EditService { .. } => Step::EditTarget,
            Self::Complaint { .. } => Step::ComplaintReason,
            Self::EditProfile { .. } => Step::ProfileValue,
            Self::IssueBan { .. } => Step::BanAction,
        }
    }
    /// Wizard to resume after this one ends
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::AddField { service_type_id } => Some(Self::ManageServiceType { service_type_id }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    // service type
    TypeName,
    PriceTier,
    Management,

    // field definition
    FieldName,
    FieldType,
    FieldLabel,
    FieldDescription,
    FieldRequired,
    FieldOptions,

    // service
    ServiceType,
    Price,
    City,
    District,
    Street,
    House,
    /// Index into [`WizardSession::fields`]
    Custom(usize),
    Phone,
    Photo,

    // editing
    EditTarget,
    EditValue,
    ProfileValue,

    // moderation
    ComplaintReason,
    ComplaintText,
    BanAction,
    BanDuration,
    BanReason,

    Confirm,
}

impl Step {
    /// Answer key of this step, `None` for steps without answer
    pub fn key(self, session: &WizardSession) -> Option<&str> {
        let key = match self {
            Self::TypeName | Self::FieldName => key::NAME,
            Self::PriceTier => key::PRICE_TIER,
            Self::FieldType => key::TYPE,
            Self::FieldLabel => key::LABEL,
            Self::FieldDescription => key::DESCRIPTION,
            Self::FieldRequired => key::REQUIRED,
            Self::FieldOptions => key::OPTIONS,
            Self::ServiceType => key::SERVICE_TYPE_ID,
            Self::Price => key::PRICE,
            Self::City => key::CITY,
            Self::District => key::DISTRICT,
            Self::Street => key::STREET,
            Self::House => key::HOUSE,
            Self::Custom(i) => return session.fields.get(i).map(|f| f.name.as_str()),
            Self::Phone => key::PHONE,
            Self::Photo => key::PHOTO,
            Self::EditTarget => key::ATTRIBUTE,
            Self::EditValue | Self::ProfileValue => key::VALUE,
            Self::ComplaintReason | Self::BanReason => key::REASON,
            Self::ComplaintText => key::TEXT,
            Self::BanAction => key::ACTION,
            Self::BanDuration => key::DURATION,
            Self::Management | Self::Confirm => return None,
        };
        Some(key)
    }
}

/// Step after `from`, computed from answers already stored in session
pub fn next(session: &WizardSession, from: Step) -> Step {
    let text = |key: &str| session.answers.get(key).and_then(Answer::as_str);

    match from {
        Step::TypeName => Step::PriceTier,
        Step::PriceTier => Step::Confirm,

        Step::FieldName => Step::FieldType,
        Step::FieldType => Step::FieldLabel,
        Step::FieldLabel => Step::FieldDescription,
        Step::FieldDescription => Step::FieldRequired,
        Step::FieldRequired => {
            if text(key::TYPE) == Some(FieldType::Select.as_str()) {
                Step::FieldOptions
            } else {
                Step::Confirm
            }
        }
        Step::FieldOptions => Step::Confirm,

        Step::ServiceType => Step::Price,
        Step::Price => Step::City,
        Step::City => Step::District,
        Step::District => Step::Street,
        Step::Street => Step::House,
        Step::House => custom_or_contacts(session, 0),
        Step::Custom(i) => custom_or_contacts(session, i + 1),
        Step::Phone => Step::Photo,
        Step::Photo => Step::Confirm,

        Step::EditTarget => Step::EditValue,
        Step::EditValue | Step::ProfileValue => Step::Confirm,

        Step::ComplaintReason => match text(key::REASON) {
            Some(choice::CUSTOM) => Step::ComplaintText,
            _ => Step::Confirm,
        },
        Step::ComplaintText => Step::Confirm,

        Step::BanAction => match text(key::ACTION) {
            Some(choice::TEMP_BAN) => Step::BanDuration,
            Some(choice::PERM_BAN) => Step::BanReason,
            _ => Step::Confirm,
        },
        Step::BanDuration => Step::BanReason,
        Step::BanReason => Step::Confirm,

        Step::Management | Step::Confirm => from,
    }
}

fn custom_or_contacts(session: &WizardSession, i: usize) -> Step {
    if i < session.fields.len() {
        Step::Custom(i)
    } else if session.seeded.contains(key::PHONE) {
        Step::Photo
    } else {
        Step::Phone
    }
}

#[cfg(test)]
mod tests {
    use common::types::UserId;

    use super::*;
    use crate::{Answers, FieldDefinition};

    fn session(kind: WizardKind, answers: &[(&str, Answer)]) -> WizardSession {
        let mut session = WizardSession::new(UserId(1), kind, Answers::new());
        for (key, value) in answers {
            session.answers.insert(key.to_string(), value.clone());
        }
        session
    }

    #[test]
    fn test_field_required_branches_on_type() {
        let kind = WizardKind::AddField { service_type_id: 1 };
        let table = [
            ("select", Step::FieldOptions),
            ("text", Step::Confirm),
            ("number", Step::Confirm),
            ("date", Step::Confirm),
            ("image", Step::Confirm),
        ];
        for (i, (field_type, expected)) in table.into_iter().enumerate() {
            let s = session(kind, &[(key::TYPE, Answer::Text(field_type.to_string()))]);
            assert_eq!(next(&s, Step::FieldRequired), expected, "test table[{i}]");
        }
    }

    #[test]
    fn test_post_service_walks_custom_fields() {
        let mut s = session(WizardKind::PostService, &[]);
        s.fields = ["experience", "skills"]
            .into_iter()
            .map(|name| {
                FieldDefinition::builder()
                    .name(name)
                    .label(name)
                    .field_type(FieldType::Text)
                    .build()
            })
            .collect();

        assert_eq!(next(&s, Step::House), Step::Custom(0));
        assert_eq!(next(&s, Step::Custom(0)), Step::Custom(1));
        assert_eq!(next(&s, Step::Custom(1)), Step::Phone);
        assert_eq!(Step::Custom(1).key(&s), Some("skills"));
        assert_eq!(Step::Custom(2).key(&s), None);

        s.seeded.insert(key::PHONE.to_string());
        assert_eq!(next(&s, Step::Custom(1)), Step::Photo);

        s.fields.clear();
        assert_eq!(next(&s, Step::House), Step::Photo);
    }

    #[test]
    fn test_moderation_branches() {
        let target = ComplaintTarget::User(UserId(2));
        let table = [
            (
                session(WizardKind::Complaint { target }, &[(key::REASON, Answer::from("custom"))]),
                Step::ComplaintReason,
                Step::ComplaintText,
            ),
            (
                session(WizardKind::Complaint { target }, &[(key::REASON, Answer::from("no_answer"))]),
                Step::ComplaintReason,
                Step::Confirm,
            ),
            (
                session(
                    WizardKind::IssueBan { complaint_id: 1, target },
                    &[(key::ACTION, Answer::from("temp_ban"))],
                ),
                Step::BanAction,
                Step::BanDuration,
            ),
            (
                session(
                    WizardKind::IssueBan { complaint_id: 1, target },
                    &[(key::ACTION, Answer::from("perm_ban"))],
                ),
                Step::BanAction,
                Step::BanReason,
            ),
            (
                session(
                    WizardKind::IssueBan { complaint_id: 1, target },
                    &[(key::ACTION, Answer::from("warning"))],
                ),
                Step::BanAction,
                Step::Confirm,
            ),
        ];
        for (i, (s, from, expected)) in table.iter().enumerate() {
            assert_eq!(next(s, *from), *expected, "test table[{i}]");
        }
    }

    #[test]
    fn test_add_field_returns_to_hub() {
        let kind = WizardKind::AddField { service_type_id: 7 };
        assert_eq!(kind.entry(), Step::FieldName);
        assert_eq!(
            kind.parent(),
            Some(WizardKind::ManageServiceType { service_type_id: 7 })
        );
        assert_eq!(WizardKind::CreateServiceType.parent(), None);
    }
}
