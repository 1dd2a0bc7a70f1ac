use log::{kv::Key, Level, LevelFilter, Metadata, Record};
use simplelog::SharedLogger;
use tokio::sync::mpsc::Sender;

use crate::handlers::tg_logs::LogMessage;

/// Key of a log record which forces sending it to telegram, e.g.
/// `log::info!(tg = true; "...")`
const TG_KEY: &str = "tg";

#[derive(Debug)]
pub(crate) struct TgLogger {
    sender: Sender<LogMessage>,
    /// Errors containing any of these are not sent
    ignore: &'static [&'static str],
}

impl TgLogger {
    pub(crate) fn new(sender: Sender<LogMessage>, ignore: &'static [&'static str]) -> Box<Self> {
        Box::new(Self { sender, ignore })
    }
}

fn is_forced(record: &Record) -> bool {
    record
        .key_values()
        .get(Key::from_str(TG_KEY))
        .and_then(|v| v.to_bool())
        .unwrap_or(false)
}

impl log::Log for TgLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let text = record.args().to_string();
        let msg = if record.level() == Level::Error {
            if self.ignore.iter().any(|s| text.contains(s)) {
                return;
            }
            LogMessage::log_error(text, record.target(), record.file(), record.line())
        } else if is_forced(record) {
            LogMessage::simple_with_level(text, record.level())
        } else {
            return;
        };

        // channel is full when telegram is unreachable, nothing to do here
        if let Err(e) = self.sender.try_send(msg) {
            eprintln!("failed to send log to telegram: {e}");
        }
    }

    fn flush(&self) {}
}

impl SharedLogger for TgLogger {
    fn level(&self) -> LevelFilter {
        LevelFilter::Info
    }

    fn config(&self) -> Option<&simplelog::Config> {
        None
    }

    fn as_log(self: Box<Self>) -> Box<dyn log::Log> {
        Box::new(*self)
    }
}
