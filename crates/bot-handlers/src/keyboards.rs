use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ReplyMarkup};

use common::types::UserId;
use db::models::Complaint;
use wizard::{ComplaintTarget, Navigation, Prompt, Service, ServiceType, Step};

use crate::{callback::Callback, payload::PayloadData};

const BACK_MSG: &str = "⬅️ Back";
const CANCEL_MSG: &str = "✖️ Cancel";
const SKIP_MSG: &str = "Skip";
const FINISH_MSG: &str = "✅ Finish";

/// Payload of skip button, understood by wizard
const SKIP_PAYLOAD: &str = "skip";

#[derive(Debug, Default)]
pub(crate) struct KeyboardBuilder {
    rows: Vec<Vec<InlineKeyboardButton>>,
    keys: Vec<InlineKeyboardButton>,
    columns: usize,
}

impl KeyboardBuilder {
    fn with_layout(rows_capacity: usize, columns: usize) -> Self {
        Self {
            rows: Vec::with_capacity(rows_capacity),
            keys: Vec::with_capacity(columns),
            columns: columns.max(1),
        }
    }
    fn callback<T>(mut self, text: T, callback: Callback) -> Self
    where
        T: Into<String>,
    {
        self.keys
            .push(InlineKeyboardButton::callback(text, callback.to_payload()));
        self
    }
    /// Start new row, next keys use given number of columns
    fn row(mut self, columns: usize) -> Self {
        self.flush();
        self.columns = columns.max(1);
        self
    }
    fn flush(&mut self) {
        let keys = std::mem::take(&mut self.keys);
        self.rows
            .extend(keys.chunks(self.columns).map(|row| row.to_owned()));
    }
}

impl From<KeyboardBuilder> for ReplyMarkup {
    fn from(value: KeyboardBuilder) -> Self {
        Self::InlineKeyboard(value.into())
    }
}

impl From<KeyboardBuilder> for InlineKeyboardMarkup {
    fn from(mut value: KeyboardBuilder) -> Self {
        value.flush();
        Self::new(value.rows)
    }
}

fn wizard(data: impl Into<String>) -> Callback {
    Callback::Wizard(data.into())
}

pub(crate) struct Keyboards;

impl Keyboards {
    /// Choices of a prompt followed by navigation buttons
    pub(crate) fn prompt(prompt: &Prompt) -> KeyboardBuilder {
        // long labels, like field labels, look better in one column
        let columns = if prompt.choices.iter().all(|c| c.label.chars().count() <= 16) {
            2
        } else {
            1
        };
        let mut keyboard = KeyboardBuilder::with_layout(prompt.choices.len() / columns + 2, columns);
        for choice in &prompt.choices {
            keyboard = keyboard.callback(&choice.label, wizard(&choice.payload));
        }

        keyboard = keyboard.row(3);
        if prompt.can_skip {
            keyboard = keyboard.callback(SKIP_MSG, wizard(SKIP_PAYLOAD));
        }
        if prompt.can_finish && prompt.step == Step::Management {
            keyboard = keyboard.callback(FINISH_MSG, wizard(Navigation::Finish.payload()));
        }
        if prompt.step != Step::Management {
            keyboard = keyboard.callback(BACK_MSG, wizard(Navigation::Back.payload()));
        }
        keyboard.callback(CANCEL_MSG, wizard(Navigation::Cancel.payload()))
    }
    pub(crate) fn service_types(service_types: &[ServiceType]) -> KeyboardBuilder {
        let mut keyboard = KeyboardBuilder::with_layout(service_types.len() / 2 + 1, 2);
        for service_type in service_types {
            keyboard = keyboard.callback(
                &service_type.name,
                Callback::Browse {
                    service_type_id: service_type.id,
                },
            );
        }
        keyboard
    }
    /// Owner edits the service, others can complain
    pub(crate) fn service(service: &Service, viewer: UserId) -> KeyboardBuilder {
        let service_id = service.id;
        if service.owner == viewer {
            KeyboardBuilder::with_layout(1, 2)
                .callback("✏️ Edit", Callback::EditService { service_id })
                .callback("🗑 Delete", Callback::DeleteService { service_id })
        } else {
            KeyboardBuilder::with_layout(1, 2)
                .callback(
                    "⚠️ Complain about service",
                    Callback::Complain {
                        target: ComplaintTarget::Service(service_id),
                    },
                )
                .callback(
                    "⚠️ Complain about seller",
                    Callback::Complain {
                        target: ComplaintTarget::User(service.owner),
                    },
                )
        }
    }
    pub(crate) fn manage_types(service_types: &[ServiceType]) -> KeyboardBuilder {
        let mut keyboard = KeyboardBuilder::with_layout(service_types.len(), 2);
        for service_type in service_types {
            let service_type_id = service_type.id;
            keyboard = keyboard
                .callback(&service_type.name, Callback::Manage { service_type_id })
                .callback("Deactivate", Callback::Deactivate { service_type_id });
        }
        keyboard
    }
    pub(crate) fn complaint(complaint: &Complaint) -> KeyboardBuilder {
        KeyboardBuilder::with_layout(1, 1).callback(
            "Review",
            Callback::Review {
                complaint_id: complaint.id,
            },
        )
    }
}
