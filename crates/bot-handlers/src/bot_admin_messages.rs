use std::sync::Arc;

use teloxide::{prelude::*, utils::command::BotCommands};

use common::{types, Config};
use db::DB;
use wizard::WizardKind;

use crate::{
    bot_messages::send_outcome,
    keyboards::Keyboards,
    render::{complaint_text, stats_text},
    BotWizard, HandlerResult,
};

#[derive(BotCommands, Clone, Copy)]
#[command(rename_rule = "lowercase")]
pub enum AdminCommand {
    #[command(description = "Create service type")]
    NewType,
    #[command(description = "Manage service types")]
    Types,
    #[command(description = "Open complaints")]
    Complaints,
    #[command(description = "Statistics")]
    Stats,
}

pub async fn admin_command_handler(
    bot: Bot,
    msg: Message,
    cmd: AdminCommand,
    db: DB,
    wizard: BotWizard,
    config: Arc<Config>,
) -> HandlerResult {
    let chat_id = msg.chat.id;
    let subject_id: types::UserId = chat_id.into();

    match cmd {
        AdminCommand::NewType => {
            let outcome = wizard
                .start_wizard(WizardKind::CreateServiceType, subject_id)
                .await;
            send_outcome(&bot, &db, &config, chat_id, outcome).await?;
        }
        AdminCommand::Types => {
            let service_types = db.select_service_types().await?;
            if service_types.is_empty() {
                bot.send_message(chat_id, "No service types yet, create one with /newtype")
                    .await?;
            } else {
                bot.send_message(chat_id, "Service types")
                    .reply_markup(Keyboards::manage_types(&service_types))
                    .await?;
            }
        }
        AdminCommand::Complaints => {
            let complaints = db.select_complaints().await?;
            if complaints.is_empty() {
                bot.send_message(chat_id, "No open complaints").await?;
            }
            for complaint in complaints {
                bot.send_message(chat_id, complaint_text(&complaint))
                    .reply_markup(Keyboards::complaint(&complaint))
                    .await?;
            }
        }
        AdminCommand::Stats => match db.load_stats().await {
            Ok(stats) => {
                bot.send_message(chat_id, stats_text(&stats)).await?;
            }
            Err(e) => log::error!("failed to get stats: {e}"),
        },
    }

    Ok(())
}
