use std::sync::Arc;

use teloxide::types::Message;

use common::Config;
use db::DB;
use wizard::Wizard;

mod bot_admin_messages;
mod bot_callback;
mod bot_messages;
mod callback;
mod keyboards;
mod payload;
mod render;
mod user;

pub use bot_admin_messages::{admin_command_handler, AdminCommand};
pub use bot_callback::callback_handler;
pub use bot_messages::{command_handler, message_handler, Command};
pub use payload::CALLBACK_VERSION;

/// Wizards of all users, shared between handlers
pub type BotWizard = Arc<Wizard<DB>>;

pub type HandlerResult = Result<(), HandlerError>;

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Request(#[from] teloxide::RequestError),
    #[error(transparent)]
    Db(#[from] db::Error),
    #[error(transparent)]
    Wizard(#[from] wizard::WizardError),
}

/// Filter for admin-only branches of dispatcher
pub fn is_admin(msg: Message, config: Arc<Config>) -> bool {
    config.is_admin(msg.chat.id.0)
}
