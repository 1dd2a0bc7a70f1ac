use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::InputFile,
    utils::command::BotCommands,
};

use common::{
    types::{self, Id},
    Config, LogError,
};
use db::DB;
use wizard::{
    key, Answer, Answers, ComplaintTarget, Event, Outcome, ProfileAttribute, Record, Service, WizardError,
    WizardKind,
};

use crate::{
    keyboards::Keyboards,
    render::{self, outcome_reply, Reply, ADMIN_HELP_MSG, HELP_MSG},
    user::user_from_message,
    BotWizard, HandlerResult,
};

const WELCOME_MSG: &str = "Hi! Here you can find local services or offer your own.";
const UNKNOWN_MSG: &str = "I don't understand. See /help";
const UNSUPPORTED_MSG: &str = "Send text or a photo";
const PRIVATE_ONLY_MSG: &str = "This bot works only in private chat";
const INVALID_USER_ID_MSG: &str = "❌ Invalid user id";
const SOMETHING_WRONG_MSG: &str = "Something went wrong, try again later";

#[derive(BotCommands, Clone, Copy)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "off")]
    Start,
    #[command(description = "Browse services")]
    Services,
    #[command(description = "Post a service")]
    Post,
    #[command(description = "Your services")]
    My,
    #[command(description = "Your profile")]
    Profile,
    #[command(description = "Change contact phone")]
    Phone,
    #[command(description = "Change name")]
    Name,
    #[command(description = "Complain about a user")]
    Complain(i64),
    #[command(description = "Stop current dialog")]
    Cancel,
    #[command(description = "Display this text")]
    Help,
}

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    db: DB,
    wizard: BotWizard,
    config: Arc<Config>,
) -> HandlerResult {
    let chat_id = msg.chat.id;
    if !msg.chat.is_private() {
        bot.send_message(chat_id, PRIVATE_ONLY_MSG).await?;
        return Ok(());
    }
    let subject_id: types::UserId = chat_id.into();

    match cmd {
        Command::Start => {
            match user_from_message(&msg) {
                Some(user) => {
                    db.save_user(&user).await?;
                    log::debug!("user {chat_id} saved");
                }
                None => log::error!("handler for command /start called not in private chat"),
            }
            bot.send_message(chat_id, format!("{WELCOME_MSG}\n\n{HELP_MSG}"))
                .await?;
        }
        Command::Help => {
            let text = if config.is_admin(chat_id.0) {
                format!("{HELP_MSG}\n\n{ADMIN_HELP_MSG}")
            } else {
                HELP_MSG.to_string()
            };
            bot.send_message(chat_id, text).await?;
        }
        Command::Services => {
            let service_types = db.select_service_types().await?;
            if service_types.is_empty() {
                bot.send_message(chat_id, "There are no services yet").await?;
            } else {
                bot.send_message(chat_id, "Choose service type")
                    .reply_markup(Keyboards::service_types(&service_types))
                    .await?;
            }
        }
        Command::Post => {
            // phone from profile is not asked again
            let mut seed = Answers::new();
            if let Some(phone) = db.select_user(subject_id).await?.as_ref().and_then(|u| u.number_phone()) {
                seed.insert(key::PHONE.to_string(), Answer::from(phone));
            }
            let outcome = wizard
                .begin(subject_id, WizardKind::PostService, seed)
                .await
                .log_error_msg(format!("failed to start posting for {subject_id}"));
            send_outcome(&bot, &db, &config, chat_id, outcome).await?;
        }
        Command::My => {
            let services = db.select_user_services(subject_id).await?;
            if services.is_empty() {
                bot.send_message(chat_id, "You have no services. Post one with /post")
                    .await?;
            }
            for service in services {
                send_service(&bot, &db, chat_id, &service, subject_id).await?;
            }
        }
        Command::Profile => {
            let user = db.select_user(subject_id).await?;
            let text = match user {
                Some(user) => format!(
                    "Name: {}\nPhone: {}\n\n/name - change name\n/phone - change phone",
                    user.name().unwrap_or("-"),
                    user.number_phone().unwrap_or("-"),
                ),
                None => "Press /start first".to_string(),
            };
            bot.send_message(chat_id, text).await?;
        }
        Command::Phone | Command::Name => {
            let attribute = match cmd {
                Command::Phone => ProfileAttribute::Phone,
                _ => ProfileAttribute::Name,
            };
            let outcome = wizard
                .start_wizard(WizardKind::EditProfile { attribute }, subject_id)
                .await;
            send_outcome(&bot, &db, &config, chat_id, outcome).await?;
        }
        Command::Complain(user_id) => {
            let Some(target) = user_complaint_target(user_id) else {
                bot.send_message(chat_id, INVALID_USER_ID_MSG).await?;
                return Ok(());
            };
            let outcome = wizard
                .start_wizard(WizardKind::Complaint { target }, subject_id)
                .await;
            send_outcome(&bot, &db, &config, chat_id, outcome).await?;
        }
        Command::Cancel => {
            let outcome = wizard.cancel(subject_id);
            send_outcome(&bot, &db, &config, chat_id, Ok(outcome)).await?;
        }
    };

    Ok(())
}

/// Telegram user ids are never negative
fn user_complaint_target(user_id: i64) -> Option<ComplaintTarget> {
    let user_id = u64::try_from(user_id).ok()?;
    Some(ComplaintTarget::User(types::UserId(user_id)))
}

/// Answers of active wizards, and everything else
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    db: DB,
    wizard: BotWizard,
    config: Arc<Config>,
) -> HandlerResult {
    let chat_id = msg.chat.id;
    if !msg.chat.is_private() {
        return Ok(());
    }

    let Some(event) = event_from_message(&msg) else {
        bot.send_message(chat_id, UNSUPPORTED_MSG).await?;
        return Ok(());
    };
    let outcome = wizard.handle_reply(event).await;
    send_outcome(&bot, &db, &config, chat_id, outcome).await
}

pub(crate) fn event_from_message(msg: &Message) -> Option<Event> {
    let subject_id: types::UserId = msg.chat.id.into();
    if let Some(text) = msg.text() {
        return Some(Event::text(subject_id, text));
    }
    // the last one is the largest
    let photo = msg.photo()?.last()?;
    Some(Event::media(subject_id, photo.file.id.to_string()))
}

/// Reply to a wizard turn and notify other users about committed records
pub(crate) async fn send_outcome(
    bot: &Bot,
    db: &DB,
    config: &Config,
    chat_id: ChatId,
    outcome: Result<Outcome, WizardError>,
) -> HandlerResult {
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            bot.send_message(chat_id, error_text(&e)).await?;
            return Ok(());
        }
    };

    send_reply(bot, chat_id, outcome_reply(&outcome)).await?;
    if let Outcome::Committed { record, .. } = &outcome {
        notify_about_record(bot, db, config, record).await;
    }
    Ok(())
}

pub(crate) async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> ResponseResult<Message> {
    let req = bot.send_message(chat_id, reply.text);
    match reply.keyboard {
        Some(keyboard) => req.reply_markup(keyboard).await,
        None => req.await,
    }
}

fn error_text(e: &WizardError) -> String {
    match e {
        WizardError::NoActiveWizard => UNKNOWN_MSG.to_string(),
        WizardError::NotFound(what) => format!("❌ This {what} no longer exists"),
        WizardError::NameTaken => "❌ Service type with this name already exists".to_string(),
        WizardError::Incomplete(_) | WizardError::NotAtConfirmation | WizardError::Persistence(_) => {
            SOMETHING_WRONG_MSG.to_string()
        }
    }
}

pub(crate) async fn send_service(
    bot: &Bot,
    db: &DB,
    chat_id: ChatId,
    service: &Service,
    viewer: types::UserId,
) -> HandlerResult {
    let fields = db.select_fields(service.service_type_id).await?;
    bot.send_photo(chat_id, InputFile::file_id(service.photo.clone()))
        .caption(render::service_text(service, &fields))
        .reply_markup(Keyboards::service(service, viewer))
        .await?;
    Ok(())
}

/// Tell admins about new complaints and targets about moderation results.
/// Failures are only logged, the record is already saved
async fn notify_about_record(bot: &Bot, db: &DB, config: &Config, record: &Record) {
    match record {
        Record::Complaint(id) => {
            log::info!(tg = true; "new complaint #{id}");
            for &admin in &config.admin_ids {
                bot.send_message(ChatId(admin), format!("New complaint #{id}, see /complaints"))
                    .await
                    .ok_or_log("failed to notify admin");
            }
        }
        Record::Warning { target, .. } => {
            let text = "⚠️ Moderators issued a warning to you after a complaint".to_string();
            notify_target(bot, db, *target, text).await;
        }
        Record::Ban { ban, .. } if ban.admin.is_some() => {
            let text = if ban.permanent {
                format!("⛔ You are banned permanently: {}", ban.reason)
            } else {
                format!("⛔ You are banned for {} h: {}", ban.hours, ban.reason)
            };
            notify_target(bot, db, ban.target, text).await;
        }
        Record::Ban { ban, .. } => {
            let text = format!(
                "⛔ Your service is hidden for {} h: {}",
                ban.hours, ban.reason
            );
            notify_target(bot, db, ban.target, text).await;
        }
        _ => {}
    }
}

async fn notify_target(bot: &Bot, db: &DB, target: ComplaintTarget, text: String) {
    let user = match target {
        ComplaintTarget::User(user) => Some(user),
        ComplaintTarget::Service(id) => service_owner(db, id).await,
    };
    if let Some(user) = user {
        bot.send_message(user, text)
            .await
            .ok_or_log(format!("failed to notify {user}"));
    }
}

async fn service_owner(db: &DB, service_id: Id) -> Option<types::UserId> {
    db.select_service(service_id)
        .await
        .ok_or_log(format!("failed to select service {service_id}"))
        .flatten()
        .map(|s| s.owner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_complaint_target() {
        let table = [
            (42, Some(ComplaintTarget::User(types::UserId(42)))),
            (0, Some(ComplaintTarget::User(types::UserId(0)))),
            (-42, None),
        ];
        for (i, (user_id, expected)) in table.into_iter().enumerate() {
            assert_eq!(user_complaint_target(user_id), expected, "test table[{i}]");
        }
    }
}
