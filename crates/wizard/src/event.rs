use common::types::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Free text message
    Text,
    /// Inline keyboard button, payload is the button data
    Button,
    /// Photo or other media, payload is the media reference
    Media,
}

/// Inbound user input, already stripped from transport details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub subject_id: UserId,
    pub kind: EventKind,
    pub payload: String,
}

impl Event {
    pub fn text(subject_id: UserId, text: impl Into<String>) -> Self {
        Self::new(subject_id, EventKind::Text, text)
    }
    pub fn button(subject_id: UserId, data: impl Into<String>) -> Self {
        Self::new(subject_id, EventKind::Button, data)
    }
    pub fn media(subject_id: UserId, reference: impl Into<String>) -> Self {
        Self::new(subject_id, EventKind::Media, reference)
    }
    fn new(subject_id: UserId, kind: EventKind, payload: impl Into<String>) -> Self {
        Self {
            subject_id,
            kind,
            payload: payload.into(),
        }
    }
    pub fn as_text(&self) -> Option<&str> {
        (self.kind == EventKind::Text).then_some(self.payload.as_str())
    }
}
