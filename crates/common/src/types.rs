use teloxide::types::{ChatId as TgChatId, Recipient, UserId as TgUserId};

/// Row id in db
pub type Id = i64;

/// Telegram user, the subject of a conversation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u64);

macro_rules! cast {
    ($($from:ty => $to:ty : $value:ident => $convert:expr),* $(,)?) => {
        $(impl From<$from> for $to {
            fn from($value: $from) -> Self {
                $convert
            }
        })*
    };
}

cast!(
    u64 => UserId: v => Self(v),

    UserId => Recipient: v => Recipient::Id(v.into()),

    UserId => TgUserId: v => Self(v.0),
    TgUserId => UserId: v => Self(v.0),

    UserId => TgChatId: v => Self(v.0 as _),
    TgChatId => UserId: v => Self(v.0 as _),

    UserId => Id: v => v.0 as _,
);

/// Negative row values are not user ids
impl TryFrom<Id> for UserId {
    type Error = std::num::TryFromIntError;

    fn try_from(v: Id) -> Result<Self, Self::Error> {
        u64::try_from(v).map(Self)
    }
}

/// Simple [`std::fmt::Display`] implementation
macro_rules! display {
    ($($from:ty : $self:ident => $value:expr),* $(,)?) => {
        $(impl ::std::fmt::Display for $from {
            fn fmt(&$self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                $value.fmt(f)
            }
        })*
    };
}

display!(
    UserId: self => self.0,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_from_row() {
        let table = [(0, Some(UserId(0))), (42, Some(UserId(42))), (-1, None), (Id::MIN, None)];
        for (i, (id, expected)) in table.into_iter().enumerate() {
            assert_eq!(UserId::try_from(id).ok(), expected, "test table[{i}]");
        }
    }
}
