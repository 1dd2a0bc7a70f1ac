use crate::{
    graph::{choice, key},
    rule, Answer, Answers, ComplaintTarget, FieldDefinition, FieldType, Policy, PriceTier,
    ServiceType, Step, WizardKind, WizardSession, BAN_DURATIONS,
};

/// Button offered at a step
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub label: String,
    pub payload: String,
    /// Answer stored when chosen
    pub value: Answer,
}

impl Choice {
    fn new(label: impl Into<String>, payload: impl Into<String>, value: Answer) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
            value,
        }
    }
    /// Choice which stores its own payload
    fn action(label: impl Into<String>, payload: &str) -> Self {
        Self::new(label, payload, Answer::from(payload))
    }
    pub(crate) fn service_type(service_type: &ServiceType) -> Self {
        Self::new(
            service_type.name.clone(),
            service_type.id.to_string(),
            Answer::Int(service_type.id),
        )
    }
}

/// What to ask the user at the current step
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub kind: WizardKind,
    pub step: Step,
    pub choices: Vec<Choice>,
    pub can_skip: bool,
    pub can_finish: bool,
    pub answers: Answers,
    pub fields: Vec<FieldDefinition>,
    /// Custom field asked at this step
    pub field: Option<FieldDefinition>,
}

impl Prompt {
    pub(crate) fn new(session: &WizardSession, policy: &Policy, choices: Vec<Choice>) -> Self {
        Self {
            kind: session.kind,
            step: session.current_step,
            choices,
            can_skip: rule::can_skip(session, policy),
            can_finish: matches!(session.current_step, Step::Management | Step::Confirm),
            answers: session.answers.clone(),
            fields: session.fields.clone(),
            field: session.current_field().cloned(),
        }
    }
}

pub fn attribute_caption(attribute: &str) -> Option<&'static str> {
    let caption = match attribute {
        key::PRICE => "Price",
        key::CITY => "City",
        key::DISTRICT => "District",
        key::STREET => "Street",
        key::HOUSE => "House",
        key::PHONE => "Phone number",
        key::PHOTO => "Photo",
        _ => return None,
    };
    Some(caption)
}

pub(crate) fn option_choices(field: &FieldDefinition) -> Vec<Choice> {
    field
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| Choice::new(option.clone(), i.to_string(), Answer::from(option.as_str())))
        .collect()
}

/// Choices which don't depend on the record store
pub(crate) fn choices(session: &WizardSession, policy: &Policy) -> Vec<Choice> {
    match session.current_step {
        Step::PriceTier => PriceTier::ALL
            .into_iter()
            .map(|tier| {
                let value = i64::from(tier);
                Choice::new(tier.caption(), value.to_string(), Answer::Int(value))
            })
            .collect(),
        Step::FieldType => FieldType::ALL
            .into_iter()
            .map(|t| Choice::action(t.caption(), t.as_str()))
            .collect(),
        Step::FieldRequired => vec![
            Choice::new("Yes", "yes", Answer::Flag(true)),
            Choice::new("No", "no", Answer::Flag(false)),
        ],
        Step::Custom(_) | Step::EditValue => match session.current_field() {
            Some(field) if field.field_type == FieldType::Select => option_choices(field),
            _ => vec![],
        },
        Step::EditTarget => {
            let base = key::EDITABLE
                .into_iter()
                .filter_map(|attr| Some(Choice::action(attribute_caption(attr)?, attr)));
            let custom = session
                .fields
                .iter()
                .map(|f| Choice::action(f.label.clone(), &f.name));
            base.chain(custom).collect()
        }
        Step::ComplaintReason => {
            let mut choices = vec![];
            if let WizardKind::Complaint {
                target: ComplaintTarget::Service(_),
            } = session.kind
            {
                choices.push(Choice::action("Does not answer calls", choice::NO_ANSWER));
            }
            choices.push(Choice::action("Other reason", choice::CUSTOM));
            choices
        }
        Step::BanAction => vec![
            Choice::action("Warning", choice::WARNING),
            Choice::action("Temporary ban", choice::TEMP_BAN),
            Choice::action("Permanent ban", choice::PERM_BAN),
        ],
        Step::BanDuration => BAN_DURATIONS
            .into_iter()
            .map(|hours| Choice::new(format!("{hours} h"), hours.to_string(), Answer::Int(hours.into())))
            .collect(),
        Step::Management => {
            let mut choices = vec![];
            if session.fields.len() < policy.max_fields_per_type {
                choices.push(Choice::action("Add field", choice::ADD_FIELD));
            }
            if !session.fields.is_empty() {
                choices.push(Choice::action("Delete last field", choice::DELETE_LAST));
            }
            choices
        }
        Step::Confirm => vec![
            Choice::action("Confirm", choice::CONFIRM),
            Choice::action("Discard", choice::DISCARD),
        ],
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use common::types::UserId;

    use super::*;

    fn field(name: &str) -> FieldDefinition {
        FieldDefinition::builder()
            .name(name)
            .label(name.to_uppercase())
            .field_type(FieldType::Text)
            .build()
    }

    #[test]
    fn test_management_choices_follow_field_count() {
        let policy = Policy::builder().max_fields_per_type(2).build();
        let mut session = WizardSession::new(
            UserId(1),
            WizardKind::ManageServiceType { service_type_id: 1 },
            Answers::new(),
        );
        let payloads = |s: &WizardSession| {
            choices(s, &policy)
                .into_iter()
                .map(|c| c.payload)
                .collect::<Vec<_>>()
        };

        assert_eq!(payloads(&session), ["add_field"]);
        session.fields.push(field("a"));
        assert_eq!(payloads(&session), ["add_field", "delete_last"]);
        session.fields.push(field("b"));
        assert_eq!(payloads(&session), ["delete_last"]);
    }

    #[test]
    fn test_no_answer_only_for_services() {
        let policy = Policy::default();
        let table = [
            (ComplaintTarget::Service(1), vec!["no_answer", "custom"]),
            (ComplaintTarget::User(UserId(2)), vec!["custom"]),
        ];
        for (i, (target, expected)) in table.into_iter().enumerate() {
            let session = WizardSession::new(UserId(1), WizardKind::Complaint { target }, Answers::new());
            let payloads: Vec<_> = choices(&session, &policy).into_iter().map(|c| c.payload).collect();
            assert_eq!(payloads, expected, "test table[{i}]");
        }
    }

    #[test]
    fn test_edit_target_lists_custom_fields() {
        let mut session = WizardSession::new(
            UserId(1),
            WizardKind::EditService { service_id: 1 },
            Answers::new(),
        );
        session.fields.push(field("experience"));
        let choices = choices(&session, &Policy::default());
        assert_eq!(choices.len(), key::EDITABLE.len() + 1);
        let last = choices.last().unwrap();
        assert_eq!(last.label, "EXPERIENCE");
        assert_eq!(last.value, Answer::from("experience"));
    }
}
