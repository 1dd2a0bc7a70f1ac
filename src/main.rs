use std::{sync::Arc, time::Duration};

use anyhow::Result;
use reqwest::Client;
use simplelog::LevelFilter;
use teloxide::{prelude::*, utils::command::BotCommands};
use tokio::{
    signal,
    sync::mpsc::{self, Sender},
    task::JoinSet,
};
use tokio_util::sync::CancellationToken;

use bot_handlers::{
    admin_command_handler, callback_handler, command_handler, is_admin, message_handler, AdminCommand,
    BotWizard, Command,
};
use common::{spawn_with_token, Config, IS_PROD};
use db::DB;
use wizard::{Policy, Wizard};

use crate::handlers::tg_logs::{start_tg_logs_job, LogMessage};
use crate::logger::TgLogger;

mod handlers;
mod logger;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

const LOG_LEVEL: LevelFilter = if IS_PROD {
    LevelFilter::Info
} else {
    LevelFilter::Debug
};
const TG_LOG_IGNORE: &[&str] = &["ConnectionReset", "TerminatedByOtherGetUpdates"];

#[tokio::main]
async fn main() -> Result<()> {
    let tg_logs_chan = mpsc::channel(100);
    init_logger(tg_logs_chan.0);

    let config = Config::from_env()?;
    log::debug!("opening db at {}", config.db_url);
    let db = DB::init(&config.db_url).await?;

    let wizard: BotWizard = Arc::new(Wizard::new(db.clone(), Policy::default(), config.session_ttl));

    let bot = Bot::with_client(
        &config.bot_token,
        Client::builder().timeout(REQUEST_TIMEOUT).build()?,
    );
    bot.set_my_commands(Command::bot_commands()).await?;

    let cancel_token = CancellationToken::new();

    let mut jobs = JoinSet::new();
    if let Some(log_chat_id) = config.log_chat_id {
        jobs.spawn(spawn_with_token(
            "tg logs",
            cancel_token.clone(),
            start_tg_logs_job(bot.clone(), ChatId(log_chat_id), tg_logs_chan.1),
        ));
    } else {
        log::warn!("LOG_CHAT_ID env not set, skip starting tg logs job")
    }
    jobs.spawn(spawn_with_token(
        "session sweep",
        cancel_token.clone(),
        start_session_sweep_job(wizard.clone()),
    ));
    jobs.spawn(spawn_with_token(
        "bot",
        cancel_token.clone(),
        start_bot(bot, db, wizard, config),
    ));

    jobs.spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("failed to listen for SIGINT: {e}");
        }
        cancel_token.cancel();
    });

    while (jobs.join_next().await).is_some() {}

    Ok(())
}

fn init_logger(sender: Sender<LogMessage>) {
    use simplelog::*;

    let term_config = if IS_PROD {
        simplelog::Config::default()
    } else {
        ConfigBuilder::new()
            .add_filter_ignore_str("h2")
            .add_filter_ignore_str("hyper")
            .add_filter_ignore_str("reqwest")
            .add_filter_ignore_str("rustls")
            .add_filter_ignore_str("sqlx")
            .build()
    };

    let res = CombinedLogger::init(vec![
        TermLogger::new(
            LOG_LEVEL,
            term_config,
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        TgLogger::new(sender, TG_LOG_IGNORE),
    ]);
    if let Err(e) = res {
        eprintln!("failed to init logger: {e}");
    }
}

/// Drop wizard sessions abandoned by users
async fn start_session_sweep_job(wizard: BotWizard) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        let purged = wizard.sessions().purge_expired();
        if purged > 0 {
            log::debug!("purged {purged} expired sessions");
        }
    }
}

async fn start_bot(bot: Bot, db: DB, wizard: BotWizard, config: Config) {
    log::debug!("starting bot");
    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::filter(is_admin)
                        .filter_command::<AdminCommand>()
                        .endpoint(admin_command_handler),
                )
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(command_handler),
                )
                .branch(dptree::endpoint(message_handler)),
        )
        .branch(Update::filter_callback_query().endpoint(callback_handler));
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![db, wizard, Arc::new(config)])
        .default_handler(|_update| async move { log::error!("unhandled update") })
        .error_handler(LoggingErrorHandler::with_custom_text("error in dispatcher"))
        .build()
        .dispatch()
        .await;
}
