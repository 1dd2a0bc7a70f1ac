use std::fmt::Display;

use log::Level;
use teloxide::{
    payloads::SendMessageSetters,
    requests::Requester,
    types::{ChatId, ParseMode},
    utils::markdown::code_block_with_lang,
    Bot,
};
use tokio::sync::mpsc::Receiver;

use common::LogError;

pub(crate) async fn start_tg_logs_job(bot: Bot, chat_id: ChatId, mut rx: Receiver<LogMessage>) {
    while let Some(msg) = rx.recv().await {
        let req = bot.send_message(chat_id, msg.to_string());
        let res = match msg {
            LogMessage::Code(_) => req.parse_mode(ParseMode::MarkdownV2).await,
            LogMessage::Plain(_) => req.await,
        };
        res.ok_or_log("failed to send log");
    }
}

#[derive(Debug)]
pub(crate) enum LogMessage {
    /// Sent as code block
    Code(String),
    Plain(String),
}

impl LogMessage {
    pub(crate) fn log_error(s: impl Into<String>, target: &str, file: Option<&str>, line: Option<u32>) -> Self {
        let mut msg = format!("[ERROR] {}\n        at {target}", s.into());
        if let Some(file) = file {
            msg += &format!(": {file}");
            if let Some(line) = line {
                msg += &format!(":{line}");
            }
        }
        Self::Code(msg)
    }
    pub(crate) fn simple_with_level(s: impl Into<String>, level: Level) -> Self {
        Self::Plain(format!("{}: {}", level_to_string(level), s.into()))
    }
}

impl Display for LogMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogMessage::Code(s) => code_block_with_lang(s, "log").fmt(f),
            LogMessage::Plain(s) => s.fmt(f),
        }
    }
}

fn level_to_string(level: Level) -> &'static str {
    match level {
        Level::Error => "Error",
        Level::Warn => "Warning",
        Level::Info => "Info",
        Level::Debug => "Debug",
        Level::Trace => "Trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_error_location() {
        let table = [
            (None, None, "[ERROR] boom\n        at db"),
            (Some("src/lib.rs"), None, "[ERROR] boom\n        at db: src/lib.rs"),
            (Some("src/lib.rs"), Some(7), "[ERROR] boom\n        at db: src/lib.rs:7"),
        ];
        for (i, (file, line, expected)) in table.into_iter().enumerate() {
            let LogMessage::Code(msg) = LogMessage::log_error("boom", "db", file, line) else {
                panic!("test table[{i}]: expected code message");
            };
            assert_eq!(msg, expected, "test table[{i}]");
        }
    }
}
