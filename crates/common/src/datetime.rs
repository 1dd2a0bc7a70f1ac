use chrono::Utc;

/// Seconds since unix epoch, the way timestamps are stored in db
pub type UnixDateTime = i64;

pub struct DateTime;

impl DateTime {
    pub fn now() -> UnixDateTime {
        Utc::now().timestamp()
    }
    pub fn hours(hours: u32) -> UnixDateTime {
        i64::from(hours) * 60 * 60
    }
}
