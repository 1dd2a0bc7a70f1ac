use teloxide::types::{ChatKind, ChatPrivate, Message};

use common::types::UserId;
use db::models::User;

/// User as seen in a private chat, `None` for other chats
pub(crate) fn user_from_message(msg: &Message) -> Option<User> {
    let ChatKind::Private(chat) = &msg.chat.kind else {
        return None;
    };
    let user_id: UserId = msg.chat.id.into();
    Some(
        User::builder()
            .user_id(user_id.into())
            .maybe_username(chat.username.clone())
            .maybe_name(get_chat_name(chat))
            .build(),
    )
}

fn get_chat_name(chat: &ChatPrivate) -> Option<String> {
    match (&chat.first_name, &chat.last_name) {
        (Some(first), Some(last)) => Some(format!("{first} {last}")),
        (Some(name), None) | (None, Some(name)) => Some(name.to_owned()),
        (None, None) => None,
    }
}
