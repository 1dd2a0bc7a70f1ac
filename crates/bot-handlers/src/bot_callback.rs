use std::sync::Arc;

use teloxide::prelude::*;

use common::{types, Config};
use db::DB;
use wizard::{Event, RecordStore, ServicePatch, ServiceStatus, WizardError, WizardKind};

use crate::{
    bot_messages::{send_outcome, send_service},
    callback::Callback,
    payload::PayloadData,
    BotWizard, HandlerResult,
};

const INVALID_CALLBACK_MSG: &str = "Something is wrong with this button";
const ADMIN_ONLY_MSG: &str = "Only for admins";

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    db: DB,
    wizard: BotWizard,
    config: Arc<Config>,
) -> HandlerResult {
    let answer_err = bot.answer_callback_query(&q.id).show_alert(true);
    let chat_id = ChatId::from(q.from.id);
    let subject_id: types::UserId = q.from.id.into();

    let Some(data) = q.data else {
        log::error!("got empty callback {} from user {}", q.id, chat_id);
        answer_err.text(INVALID_CALLBACK_MSG).await?;
        return Ok(());
    };
    log::debug!("got callback: {data:?}");

    let callback = match Callback::try_from_payload(&data) {
        Ok(callback) => callback,
        Err(e) => {
            log::error!("invalid callback {data:?}: {e}");
            answer_err.text(INVALID_CALLBACK_MSG).await?;
            return Ok(());
        }
    };
    if callback.is_admin_only() && !config.is_admin(chat_id.0) {
        log::warn!("{chat_id} pressed admin button {data:?}");
        answer_err.text(ADMIN_ONLY_MSG).await?;
        return Ok(());
    }
    bot.answer_callback_query(&q.id).await?;

    let kind = match callback {
        Callback::Wizard(data) => {
            let outcome = wizard.handle_reply(Event::button(subject_id, data)).await;
            return send_outcome(&bot, &db, &config, chat_id, outcome).await;
        }
        Callback::Browse { service_type_id } => {
            let services = db.select_services(service_type_id).await?;
            if services.is_empty() {
                bot.send_message(chat_id, "No services of this type yet").await?;
            }
            for service in services {
                send_service(&bot, &db, chat_id, &service, subject_id).await?;
            }
            return Ok(());
        }
        Callback::DeleteService { service_id } => {
            let text = match db.select_service(service_id).await? {
                Some(service) if service.owner == subject_id => {
                    db.save_service(service_id, &ServicePatch::Status(ServiceStatus::Deleted))
                        .await?;
                    log::info!("{subject_id} deleted service {service_id}");
                    "🗑 Service deleted"
                }
                Some(_) => "❌ It's not your service",
                None => "❌ Service not found",
            };
            bot.send_message(chat_id, text).await?;
            return Ok(());
        }
        Callback::Deactivate { service_type_id } => {
            let deactivated = wizard
                .store()
                .deactivate_service_type(service_type_id)
                .await
                .map_err(WizardError::from)?;
            let text = if deactivated {
                "Service type deactivated"
            } else {
                "❌ Service type not found"
            };
            bot.send_message(chat_id, text).await?;
            return Ok(());
        }
        Callback::Review { complaint_id } => match db.select_complaint(complaint_id).await? {
            Some(complaint) => WizardKind::IssueBan {
                complaint_id,
                target: complaint.target,
            },
            None => {
                bot.send_message(chat_id, "Complaint is already closed").await?;
                return Ok(());
            }
        },
        Callback::Complain { target } => WizardKind::Complaint { target },
        Callback::EditService { service_id } => WizardKind::EditService { service_id },
        Callback::Manage { service_type_id } => WizardKind::ManageServiceType { service_type_id },
    };

    let outcome = wizard.start_wizard(kind, subject_id).await;
    send_outcome(&bot, &db, &config, chat_id, outcome).await
}
