use crate::{Event, EventKind};

const BUTTON_PREFIX: &str = "nav:";

/// Meta-inputs, recognized on every step before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Back,
    Cancel,
    Menu,
    /// Only at the management hub and at confirmation
    Finish,
}

impl Navigation {
    pub const ALL: [Self; 4] = [Self::Back, Self::Cancel, Self::Menu, Self::Finish];

    fn name(self) -> &'static str {
        match self {
            Self::Back => "back",
            Self::Cancel => "cancel",
            Self::Menu => "menu",
            Self::Finish => "finish",
        }
    }
    /// Button data
    pub fn payload(self) -> String {
        format!("{BUTTON_PREFIX}{}", self.name())
    }
    /// Text command
    pub fn command(self) -> String {
        format!("/{}", self.name())
    }
    pub fn parse(event: &Event) -> Option<Self> {
        let name = match event.kind {
            EventKind::Button => event.payload.strip_prefix(BUTTON_PREFIX)?,
            EventKind::Text => event.payload.trim().strip_prefix('/')?,
            EventKind::Media => return None,
        };
        Self::ALL.into_iter().find(|nav| nav.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use common::types::UserId;

    use super::*;

    #[test]
    fn test_parse_navigation() {
        let user = UserId(1);
        let table = [
            (Event::button(user, "nav:back"), Some(Navigation::Back)),
            (Event::button(user, "nav:finish"), Some(Navigation::Finish)),
            (Event::text(user, "/cancel"), Some(Navigation::Cancel)),
            (Event::text(user, " /menu "), Some(Navigation::Menu)),
            (Event::text(user, "back"), None),
            (Event::text(user, "/unknown"), None),
            (Event::button(user, "back"), None),
            (Event::media(user, "nav:back"), None),
        ];
        for (i, (event, expected)) in table.iter().enumerate() {
            assert_eq!(Navigation::parse(event), *expected, "test table[{i}]");
        }
    }

    #[test]
    fn test_payload_parses_back() {
        for nav in Navigation::ALL {
            assert_eq!(Navigation::parse(&Event::button(UserId(1), nav.payload())), Some(nav));
            assert_eq!(Navigation::parse(&Event::text(UserId(1), nav.command())), Some(nav));
        }
    }
}
