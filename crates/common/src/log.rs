use std::fmt::Display;

pub trait LogError<T> {
    fn log_error(self) -> Self;
    fn log_error_msg(self, msg: impl Display) -> Self;
    /// Log error and drop it
    fn ok_or_log(self, msg: impl Display) -> Option<T>;
}

impl<T, E> LogError<T> for Result<T, E>
where
    E: Display,
{
    fn log_error(self) -> Self {
        if let Err(e) = &self {
            log::error!("{e}")
        }
        self
    }
    fn log_error_msg(self, msg: impl Display) -> Self {
        if let Err(e) = &self {
            log::error!("{msg}: {e}")
        }
        self
    }
    fn ok_or_log(self, msg: impl Display) -> Option<T> {
        self.log_error_msg(msg).ok()
    }
}
