//! Plain text for wizard prompts and outcomes.

use db::models::{Complaint, Stats};
use wizard::{
    attribute_caption, choice, key, Answer, ComplaintTarget, FieldDefinition, FieldType, Outcome, PriceTier,
    ProfileAttribute, Prompt, Record, Service, Step, WizardKind,
};

use crate::keyboards::{KeyboardBuilder, Keyboards};

pub(crate) const HELP_MSG: &str = "Commands:

/services - browse services
/post - post a service
/my - your services
/profile - your profile
/phone - change contact phone
/name - change name
/complain <user id> - complain about a user
/cancel - stop current dialog
/help - display this text

While filling a form: /back - previous step, /skip - leave optional value empty";

pub(crate) const ADMIN_HELP_MSG: &str = "Admin commands:

/newtype - create service type
/types - manage service types
/complaints - open complaints
/stats - statistics";

/// Message to send in response to a wizard turn
pub(crate) struct Reply {
    pub(crate) text: String,
    pub(crate) keyboard: Option<KeyboardBuilder>,
}

impl Reply {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }
    fn prompt(header: Option<String>, prompt: &Prompt) -> Self {
        let text = match header {
            Some(header) => format!("{header}\n\n{}", prompt_text(prompt)),
            None => prompt_text(prompt),
        };
        Self {
            text,
            keyboard: Some(Keyboards::prompt(prompt)),
        }
    }
}

pub(crate) fn outcome_reply(outcome: &Outcome) -> Reply {
    match outcome {
        Outcome::Prompt(prompt) => Reply::prompt(None, prompt),
        Outcome::Rejected { error, prompt } => Reply::prompt(Some(error.to_string()), prompt),
        Outcome::Refused(refusal) => Reply::text(refusal.to_string()),
        Outcome::Committed { record, next } => {
            let header = record_text(record);
            match next {
                Some(prompt) => Reply::prompt(Some(header), prompt),
                None => Reply::text(header),
            }
        }
        Outcome::Cancelled { resumed } => {
            let header = "Cancelled".to_string();
            match resumed {
                Some(prompt) => Reply::prompt(Some(header), prompt),
                None => Reply::text(header),
            }
        }
        Outcome::Finished => Reply::text("✅ Done"),
        Outcome::Menu => Reply::text(HELP_MSG),
    }
}

fn record_text(record: &Record) -> String {
    match record {
        Record::ServiceType(_) => "✅ Service type created. Now add its fields".to_string(),
        Record::Field { order_position, .. } => format!("✅ Field added at position {order_position}"),
        Record::Service(_) => "✅ Service published".to_string(),
        Record::ServiceUpdated(_) => "✅ Service updated".to_string(),
        Record::Complaint(_) => "✅ Complaint sent to moderators".to_string(),
        Record::Ban { ban, .. } if ban.admin.is_none() => {
            format!("✅ Service is hidden for {} h", ban.hours)
        }
        Record::Ban { ban, .. } if ban.permanent => "✅ Banned permanently".to_string(),
        Record::Ban { ban, .. } => format!("✅ Banned for {} h", ban.hours),
        Record::Warning { .. } => "✅ Warning issued, complaint closed".to_string(),
        Record::Profile(_) => "✅ Profile updated".to_string(),
    }
}

fn prompt_text(prompt: &Prompt) -> String {
    let mut text = match prompt.step {
        Step::TypeName => "Enter name of the new service type".to_string(),
        Step::PriceTier => "Choose price tier".to_string(),
        Step::Management => management_text(prompt),

        Step::FieldName => "Enter field name: lowercase latin letters, digits and _".to_string(),
        Step::FieldType => "Choose field type".to_string(),
        Step::FieldLabel => "Enter field label shown to users".to_string(),
        Step::FieldDescription => "Enter field description".to_string(),
        Step::FieldRequired => "Is the field required?".to_string(),
        Step::FieldOptions => "Enter options separated by commas".to_string(),

        Step::ServiceType => "Choose service type".to_string(),
        Step::Price => "Enter price".to_string(),
        Step::City => "Enter city".to_string(),
        Step::District => "Enter district".to_string(),
        Step::Street => "Enter street".to_string(),
        Step::House => "Enter house number".to_string(),
        Step::Custom(_) | Step::EditValue if prompt.field.is_some() => {
            prompt.field.as_ref().map(field_text).unwrap_or_default()
        }
        Step::Custom(_) => String::new(),
        Step::Phone => "Enter contact phone number, like +79991234567".to_string(),
        Step::Photo => "Send a photo of your service".to_string(),

        Step::EditTarget => "What do you want to change?".to_string(),
        Step::EditValue => {
            let attribute = prompt.answers.get(key::ATTRIBUTE).and_then(Answer::as_str);
            match attribute {
                Some(key::PHOTO) => "Send a new photo".to_string(),
                Some(attribute) => format!(
                    "Enter new value: {}",
                    attribute_caption(attribute).unwrap_or(attribute)
                ),
                None => "Enter new value".to_string(),
            }
        }
        Step::ProfileValue => match prompt.kind {
            WizardKind::EditProfile {
                attribute: ProfileAttribute::Phone,
            } => "Enter your phone number, like +79991234567".to_string(),
            _ => "Enter your name".to_string(),
        },

        Step::ComplaintReason => "Choose complaint reason".to_string(),
        Step::ComplaintText => "Describe the problem".to_string(),
        Step::BanAction => "Choose action".to_string(),
        Step::BanDuration => "Choose ban duration".to_string(),
        Step::BanReason => "Enter ban reason".to_string(),

        Step::Confirm => format!("{}\n\nConfirm?", summary(prompt)),
    };
    if prompt.can_skip {
        text += "\n\n/skip to leave empty";
    }
    text
}

fn field_text(field: &FieldDefinition) -> String {
    let mut text = field.label.clone();
    if let Some(description) = &field.description {
        text += &format!("\n{description}");
    }
    let hint = match field.field_type {
        FieldType::Text | FieldType::Select => None,
        FieldType::Number => Some("number"),
        FieldType::Date => Some("dd.mm.yyyy"),
        FieldType::Image => Some("send a photo"),
    };
    if let Some(hint) = hint {
        text += &format!("\n({hint})");
    }
    text
}

fn field_line(i: usize, field: &FieldDefinition) -> String {
    let required = if field.required { ", required" } else { "" };
    format!(
        "{}. {} ({}, {}{required})",
        i + 1,
        field.label,
        field.name,
        field.field_type.caption()
    )
}

fn management_text(prompt: &Prompt) -> String {
    let name = prompt.answers.get(key::NAME).map(ToString::to_string).unwrap_or_default();
    let fields = if prompt.fields.is_empty() {
        "No fields yet".to_string()
    } else {
        prompt
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| field_line(i, f))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!("Service type «{name}»\n\nFields:\n{fields}")
}

/// Order of answers in summary, custom fields go after house
const SUMMARY_KEYS: [&str; 19] = [
    key::NAME,
    key::PRICE_TIER,
    key::TYPE,
    key::LABEL,
    key::DESCRIPTION,
    key::REQUIRED,
    key::OPTIONS,
    key::PRICE,
    key::CITY,
    key::DISTRICT,
    key::STREET,
    key::HOUSE,
    key::PHONE,
    key::PHOTO,
    key::ATTRIBUTE,
    key::VALUE,
    key::ACTION,
    key::DURATION,
    key::REASON,
];

fn summary(prompt: &Prompt) -> String {
    let line = |key: &str| -> Option<String> {
        let value = prompt.answers.get(key)?;
        let caption = summary_caption(key)?;
        Some(format!("{caption}: {}", summary_value(prompt, key, value)))
    };

    let (head, tail) = SUMMARY_KEYS.split_at(12);
    let custom = prompt.fields.iter().filter_map(|f| {
        let value = prompt.answers.get(&f.name)?;
        Some(format!("{}: {value}", f.label))
    });

    let mut lines: Vec<String> = head.iter().filter_map(|k| line(k)).collect();
    if !matches!(prompt.kind, WizardKind::EditService { .. }) {
        lines.extend(custom);
    }
    lines.extend(tail.iter().filter_map(|k| line(k)));
    if let Some(text) = prompt.answers.get(key::TEXT) {
        lines.push(format!("Text: {text}"));
    }
    lines.join("\n")
}

fn summary_caption(key: &str) -> Option<&'static str> {
    let caption = match key {
        key::NAME => "Name",
        key::PRICE_TIER => "Price tier",
        key::TYPE => "Type",
        key::LABEL => "Label",
        key::DESCRIPTION => "Description",
        key::REQUIRED => "Required",
        key::OPTIONS => "Options",
        key::ATTRIBUTE => "Change",
        key::VALUE => "New value",
        key::ACTION => "Action",
        key::DURATION => "Duration, h",
        key::REASON => "Reason",
        key => attribute_caption(key)?,
    };
    Some(caption)
}

fn summary_value(prompt: &Prompt, key: &str, value: &Answer) -> String {
    match key {
        key::PRICE_TIER => value
            .as_int()
            .and_then(|tier| PriceTier::try_from(tier).ok())
            .map(|tier| tier.caption().to_string()),
        key::TYPE => value
            .as_str()
            .and_then(|t| t.parse::<FieldType>().ok())
            .map(|t| t.caption().to_string()),
        key::PHOTO => Some("attached".to_string()),
        key::REASON | key::ACTION => value.as_str().and_then(choice_caption).map(ToString::to_string),
        key::ATTRIBUTE => value.as_str().map(|attribute| {
            attribute_caption(attribute)
                .map(ToString::to_string)
                .or_else(|| {
                    prompt
                        .fields
                        .iter()
                        .find(|f| f.name == attribute)
                        .map(|f| f.label.clone())
                })
                .unwrap_or_else(|| attribute.to_string())
        }),
        _ => None,
    }
    .unwrap_or_else(|| value.to_string())
}

fn choice_caption(payload: &str) -> Option<&'static str> {
    let caption = match payload {
        choice::NO_ANSWER => "Does not answer calls",
        choice::CUSTOM => "Other reason",
        choice::WARNING => "Warning",
        choice::TEMP_BAN => "Temporary ban",
        choice::PERM_BAN => "Permanent ban",
        _ => return None,
    };
    Some(caption)
}

pub(crate) fn service_text(service: &Service, fields: &[FieldDefinition]) -> String {
    let mut lines = vec![
        format!("{}: {} ₽", service.title, service.price),
        format!(
            "{}, {}, {}{}",
            service.city,
            service.district,
            service.street,
            service.house.as_ref().map(|h| format!(" {h}")).unwrap_or_default()
        ),
    ];
    for field in fields {
        if let Some(value) = service.custom_fields.get(&field.name) {
            if field.field_type != FieldType::Image {
                lines.push(format!("{}: {value}", field.label));
            }
        }
    }
    lines.push(format!("📞 {}", service.number_phone));
    lines.join("\n")
}

pub(crate) fn complaint_text(complaint: &Complaint) -> String {
    let target = match complaint.target {
        ComplaintTarget::User(user) => format!("user {user}"),
        ComplaintTarget::Service(id) => format!("service #{id}"),
    };
    format!(
        "Complaint #{} about {target} from {}\n\n{}",
        complaint.id, complaint.creator, complaint.text
    )
}

pub(crate) fn stats_text(stats: &Stats) -> String {
    [
        "Statistics".to_string(),
        String::new(),
        [
            (stats.users, "Users"),
            (stats.sellers, "Sellers"),
            (stats.service_types, "Service types"),
            (stats.services, "Active services"),
            (stats.complaints, "Open complaints"),
        ]
        .into_iter()
        .map(|(value, caption)| format!("{caption}: {value}"))
        .collect::<Vec<_>>()
        .join("\n"),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use common::types::UserId;
    use wizard::{Answers, NewBan, ValidationError};

    use super::*;

    fn prompt(kind: WizardKind, step: Step, answers: Answers) -> Prompt {
        Prompt {
            kind,
            step,
            choices: vec![],
            can_skip: false,
            can_finish: false,
            answers,
            fields: vec![],
            field: None,
        }
    }

    #[test]
    fn test_field_confirmation_summary() {
        let answers: Answers = [
            (key::NAME, Answer::from("experience")),
            (key::TYPE, Answer::from("select")),
            (key::LABEL, Answer::from("Experience")),
            (key::REQUIRED, Answer::Flag(true)),
            (key::OPTIONS, Answer::List(vec!["1-3".to_string(), "3+".to_string()])),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        let prompt = prompt(WizardKind::AddField { service_type_id: 1 }, Step::Confirm, answers);

        similar_asserts::assert_eq!(
            prompt_text(&prompt),
            "Name: experience
Type: Choice from list
Label: Experience
Required: yes
Options: 1-3, 3+

Confirm?"
        );
    }

    #[test]
    fn test_rejected_shows_error_and_prompt() {
        let mut p = prompt(WizardKind::PostService, Step::House, Answers::new());
        p.can_skip = true;
        let reply = outcome_reply(&Outcome::Rejected {
            error: ValidationError::TooLong { max: 500 },
            prompt: p,
        });
        assert_eq!(
            reply.text,
            "❌ Must be at most 500 characters\n\nEnter house number\n\n/skip to leave empty"
        );
        assert!(reply.keyboard.is_some());
    }

    #[test]
    fn test_committed_without_next() {
        let ban = NewBan {
            target: ComplaintTarget::Service(1),
            admin: None,
            hours: 2,
            permanent: false,
            reason: "no answer".to_string(),
        };
        let reply = outcome_reply(&Outcome::Committed {
            record: Record::Ban { id: 1, ban },
            next: None,
        });
        assert_eq!(reply.text, "✅ Service is hidden for 2 h");
        assert!(reply.keyboard.is_none());

        let reply = outcome_reply(&Outcome::Committed {
            record: Record::Ban {
                id: 2,
                ban: NewBan {
                    target: ComplaintTarget::User(UserId(2)),
                    admin: Some(UserId(1)),
                    hours: 0,
                    permanent: true,
                    reason: "spam".to_string(),
                },
            },
            next: None,
        });
        assert_eq!(reply.text, "✅ Banned permanently");
    }
}
