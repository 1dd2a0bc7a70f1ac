//! Which validation rule applies at each step.

use crate::{
    graph::{choice, key},
    prompt::{self, Choice},
    validation::*,
    Answer, Event, EventKind, FieldDefinition, FieldType, Policy, ProfileAttribute, Step,
    ValidationError, WizardKind, WizardSession,
};

type Result<T, E = ValidationError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Accepted {
    Value(Answer),
    /// Optional step left empty, drops the previous answer
    Skip,
}

impl From<Answer> for Accepted {
    fn from(value: Answer) -> Self {
        Self::Value(value)
    }
}

impl From<String> for Accepted {
    fn from(value: String) -> Self {
        Self::Value(Answer::Text(value))
    }
}

pub(crate) fn is_skip(event: &Event) -> bool {
    match event.kind {
        EventKind::Button => event.payload == choice::SKIP,
        EventKind::Text => event.payload.trim() == "/skip",
        EventKind::Media => false,
    }
}

pub(crate) fn can_skip(session: &WizardSession, policy: &Policy) -> bool {
    match session.current_step {
        Step::House => true,
        Step::FieldDescription => policy.min_description_len == 0,
        Step::Custom(_) => session.current_field().is_some_and(|f| !f.required),
        Step::EditValue => match session.optional_text(key::ATTRIBUTE) {
            Some(key::HOUSE) => true,
            _ => session.current_field().is_some_and(|f| !f.required),
        },
        _ => false,
    }
}

fn text(event: &Event) -> Result<&str> {
    event.as_text().ok_or(ValidationError::ExpectedText)
}

fn media(event: &Event) -> Result<String> {
    match event.kind {
        EventKind::Media => Ok(event.payload.clone()),
        _ => Err(ValidationError::ExpectedMedia),
    }
}

/// Match a button payload, or typed label of a choice. Payloads may be
/// positions, so typed text never matches them
pub(crate) fn choose(choices: &[Choice], event: &Event) -> Result<Answer> {
    let found = match event.kind {
        EventKind::Button => choices.iter().find(|c| c.payload == event.payload),
        EventKind::Text => {
            let typed = event.payload.trim().to_lowercase();
            choices.iter().find(|c| c.label.to_lowercase() == typed)
        }
        EventKind::Media => None,
    };
    found
        .map(|c| c.value.clone())
        .ok_or(ValidationError::UnknownChoice)
}

fn field_value(field: &FieldDefinition, event: &Event) -> Result<Answer> {
    let value = match field.field_type {
        FieldType::Text => validate_text(text(event)?)?.into(),
        FieldType::Number => Answer::Number(validate_number(text(event)?)?),
        FieldType::Select => choose(&prompt::option_choices(field), event)?,
        FieldType::Date => validate_date(text(event)?)?.into(),
        FieldType::Image => media(event)?.into(),
    };
    Ok(value)
}

fn edit_value(session: &WizardSession, event: &Event) -> Result<Answer> {
    let attribute = session
        .optional_text(key::ATTRIBUTE)
        .ok_or(ValidationError::UnknownChoice)?;
    let value = match attribute {
        key::PRICE => Answer::Number(validate_price(text(event)?)?),
        key::CITY | key::DISTRICT | key::STREET | key::HOUSE => validate_text(text(event)?)?.into(),
        key::PHONE => validate_phone(text(event)?)?.into(),
        key::PHOTO => media(event)?.into(),
        _ => match session.current_field() {
            Some(field) => field_value(field, event)?,
            None => return Err(ValidationError::UnknownChoice),
        },
    };
    Ok(value)
}

/// Validate input at the current step. Steps checked against the record
/// store are handled by the engine
pub(crate) fn check(session: &WizardSession, event: &Event, policy: &Policy) -> Result<Accepted> {
    if is_skip(event) {
        return if can_skip(session, policy) {
            Ok(Accepted::Skip)
        } else {
            Err(ValidationError::Required)
        };
    }

    let accepted = match session.current_step {
        Step::PriceTier
        | Step::FieldType
        | Step::FieldRequired
        | Step::EditTarget
        | Step::ComplaintReason
        | Step::BanAction
        | Step::BanDuration => choose(&prompt::choices(session, policy), event)?.into(),

        Step::FieldName => {
            let name = validate_field_name(text(event)?, policy)?;
            if session.fields.iter().any(|f| f.name == name) {
                return Err(ValidationError::DuplicateFieldName);
            }
            name.into()
        }
        Step::FieldLabel => validate_label(text(event)?, policy)?.into(),
        Step::FieldDescription => match validate_description(text(event)?, policy)? {
            Some(description) => description.into(),
            None => Accepted::Skip,
        },
        Step::FieldOptions => Answer::List(parse_select_options(text(event)?, policy)?).into(),

        Step::Price => Answer::Number(validate_price(text(event)?)?).into(),
        Step::City | Step::District | Step::Street | Step::House | Step::BanReason => {
            validate_text(text(event)?)?.into()
        }
        Step::Custom(_) => match session.current_field() {
            Some(field) => field_value(field, event)?.into(),
            None => return Err(ValidationError::UnknownChoice),
        },
        Step::Phone => validate_phone(text(event)?)?.into(),
        Step::Photo => media(event)?.into(),

        Step::EditValue => edit_value(session, event)?.into(),
        Step::ProfileValue => match session.kind {
            WizardKind::EditProfile {
                attribute: ProfileAttribute::Phone,
            } => validate_phone(text(event)?)?.into(),
            WizardKind::EditProfile {
                attribute: ProfileAttribute::Name,
            } => validate_person_name(text(event)?)?.into(),
            _ => return Err(ValidationError::UnknownChoice),
        },
        Step::ComplaintText => validate_complaint_text(text(event)?)?.into(),

        Step::TypeName | Step::ServiceType | Step::Management | Step::Confirm => {
            return Err(ValidationError::UnknownChoice)
        }
    };
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use common::types::UserId;

    use super::*;
    use crate::Answers;

    const USER: UserId = UserId(1);

    fn at(kind: WizardKind, step: Step) -> WizardSession {
        let mut session = WizardSession::new(USER, kind, Answers::new());
        session.current_step = step;
        session
    }

    #[test]
    fn test_choose_by_button_or_label() {
        let session = at(WizardKind::AddField { service_type_id: 1 }, Step::FieldRequired);
        let policy = Policy::default();
        let table = [
            (Event::button(USER, "yes"), Ok(Accepted::Value(Answer::Flag(true)))),
            (Event::text(USER, "no"), Ok(Accepted::Value(Answer::Flag(false)))),
            (Event::text(USER, " YES "), Ok(Accepted::Value(Answer::Flag(true)))),
            (Event::button(USER, "maybe"), Err(ValidationError::UnknownChoice)),
            (Event::media(USER, "file"), Err(ValidationError::UnknownChoice)),
        ];
        for (i, (event, expected)) in table.iter().enumerate() {
            assert_eq!(&check(&session, event, &policy), expected, "test table[{i}]");
        }
    }

    #[test]
    fn test_skip_only_optional_steps() {
        let policy = Policy::default();
        let mut session = at(WizardKind::PostService, Step::Custom(0));
        session.fields = vec![
            FieldDefinition::builder()
                .name("experience")
                .label("Experience")
                .field_type(FieldType::Text)
                .required(true)
                .build(),
            FieldDefinition::builder()
                .name("hobby")
                .label("Hobby")
                .field_type(FieldType::Text)
                .build(),
        ];
        let skip = Event::button(USER, "skip");

        assert_eq!(check(&session, &skip, &policy), Err(ValidationError::Required));
        session.current_step = Step::Custom(1);
        assert_eq!(check(&session, &skip, &policy), Ok(Accepted::Skip));
        session.current_step = Step::House;
        assert_eq!(check(&session, &Event::text(USER, "/skip"), &policy), Ok(Accepted::Skip));
        session.current_step = Step::City;
        assert_eq!(check(&session, &skip, &policy), Err(ValidationError::Required));
    }

    #[test]
    fn test_custom_field_types() {
        let policy = Policy::default();
        let mut session = at(WizardKind::PostService, Step::Custom(0));
        let table = [
            (FieldType::Number, Event::text(USER, "12"), Ok(Answer::Number(12.0))),
            (FieldType::Number, Event::text(USER, "twelve"), Err(ValidationError::Number)),
            (FieldType::Date, Event::text(USER, "01.02.2024"), Ok(Answer::from("01.02.2024"))),
            (FieldType::Image, Event::media(USER, "file-1"), Ok(Answer::from("file-1"))),
            (FieldType::Image, Event::text(USER, "file-1"), Err(ValidationError::ExpectedMedia)),
            (FieldType::Select, Event::button(USER, "1"), Ok(Answer::from("3-5 лет"))),
            (FieldType::Select, Event::text(USER, "5+ лет"), Ok(Answer::from("5+ лет"))),
            (FieldType::Select, Event::text(USER, "10 лет"), Err(ValidationError::UnknownChoice)),
            (FieldType::Select, Event::text(USER, "1"), Err(ValidationError::UnknownChoice)),
            (FieldType::Text, Event::media(USER, "file-1"), Err(ValidationError::ExpectedText)),
        ];
        for (i, (field_type, event, expected)) in table.into_iter().enumerate() {
            session.fields = vec![FieldDefinition::builder()
                .name("f")
                .label("F")
                .field_type(field_type)
                .options(vec!["1-3 года".into(), "3-5 лет".into(), "5+ лет".into()])
                .build()];
            let expected = expected.map(Accepted::Value);
            assert_eq!(check(&session, &event, &policy), expected, "test table[{i}]");
        }
    }

    #[test]
    fn test_typed_option_is_not_position() {
        let policy = Policy::default();
        let mut session = at(WizardKind::PostService, Step::Custom(0));
        session.fields = vec![FieldDefinition::builder()
            .name("years")
            .label("Years")
            .field_type(FieldType::Select)
            .options(vec!["5".into(), "10".into()])
            .build()];
        let table = [
            (Event::text(USER, "1"), Err(ValidationError::UnknownChoice)),
            (Event::text(USER, "0"), Err(ValidationError::UnknownChoice)),
            (Event::text(USER, "10"), Ok(Answer::from("10"))),
            (Event::button(USER, "1"), Ok(Answer::from("10"))),
        ];
        for (i, (event, expected)) in table.into_iter().enumerate() {
            let expected = expected.map(Accepted::Value);
            assert_eq!(check(&session, &event, &policy), expected, "test table[{i}]");
        }
    }

    #[test]
    fn test_duplicate_field_name() {
        let policy = Policy::default();
        let mut session = at(WizardKind::AddField { service_type_id: 1 }, Step::FieldName);
        session.fields = vec![FieldDefinition::builder()
            .name("experience")
            .label("Experience")
            .field_type(FieldType::Text)
            .build()];
        assert_eq!(
            check(&session, &Event::text(USER, "experience"), &policy),
            Err(ValidationError::DuplicateFieldName)
        );
        assert_eq!(
            check(&session, &Event::text(USER, "skills"), &policy),
            Ok(Accepted::Value(Answer::from("skills")))
        );
    }

    #[test]
    fn test_edit_value_follows_attribute() {
        let policy = Policy::default();
        let mut session = at(WizardKind::EditService { service_id: 1 }, Step::EditValue);
        let table = [
            (key::PRICE, Event::text(USER, "100"), Ok(Accepted::Value(Answer::Number(100.0)))),
            (key::PHONE, Event::text(USER, "123"), Err(ValidationError::Phone)),
            (key::PHOTO, Event::media(USER, "p"), Ok(Accepted::Value(Answer::from("p")))),
            (key::HOUSE, Event::button(USER, "skip"), Ok(Accepted::Skip)),
            (key::CITY, Event::button(USER, "skip"), Err(ValidationError::Required)),
            ("unknown", Event::text(USER, "x"), Err(ValidationError::UnknownChoice)),
        ];
        for (i, (attribute, event, expected)) in table.into_iter().enumerate() {
            session.answers.insert(key::ATTRIBUTE.to_string(), Answer::from(attribute));
            assert_eq!(check(&session, &event, &policy), expected, "test table[{i}]");
        }
    }
}
