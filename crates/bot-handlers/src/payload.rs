pub const CALLBACK_VERSION: u8 = 1;

pub(crate) const SEP: char = ':';

/// Telegram limit for callback data
const MAX_PAYLOAD_LEN: usize = 64;

pub(crate) trait PayloadData {
    type Error;

    fn to_payload(&self) -> String;
    fn try_from_payload(payload: &str) -> Result<Self, Self::Error>
    where
        Self: Sized;
}

/// Callback data layout: `{version}:{flag}:{data}`, data may contain separator
pub(crate) fn make_payload(flag: &str, data: &str) -> String {
    let payload = format!("{CALLBACK_VERSION}{SEP}{flag}{SEP}{data}");
    if payload.len() > MAX_PAYLOAD_LEN {
        log::error!("callback payload is too long: {payload}");
    }
    payload
}

/// Split payload into flag and data
pub(crate) fn parse_payload(payload: &str) -> Result<(&str, &str), PayloadParseError> {
    let mut parts = payload.splitn(3, SEP);

    let version = parts.next().unwrap_or_default();
    if version != CALLBACK_VERSION.to_string() {
        return Err(PayloadParseError::UnsupportedVersion(version.to_string()));
    }
    match (parts.next(), parts.next()) {
        (Some(flag), Some(data)) if !flag.is_empty() => Ok((flag, data)),
        _ => Err(PayloadParseError::InvalidSize),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadParseError {
    #[error("invalid payload size")]
    InvalidSize,
    #[error("unsupported payload version {0}")]
    UnsupportedVersion(String),
    #[error("invalid payload data: {0}")]
    InvalidData(String),
    #[error("unknown payload flag: {0}")]
    UnknownFlag(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    use PayloadParseError::*;

    #[test]
    fn test_parse_payload() {
        // version is added in loop
        let table: &[(_, Result<(&str, &str), PayloadParseError>)] = &[
            ("", Err(InvalidSize)),
            ("wz", Err(InvalidSize)),
            (":data", Err(InvalidSize)),
            ("wz:", Ok(("wz", ""))),
            ("wz:nav:back", Ok(("wz", "nav:back"))),
            ("svc:1:2", Ok(("svc", "1:2"))),
        ];
        for (i, (input, expected)) in table.iter().enumerate() {
            let input = format!("{CALLBACK_VERSION}:{input}");
            assert_eq!(parse_payload(&input), *expected, "test table[{i}]");
        }

        assert_eq!(
            parse_payload("0:wz:nav:back"),
            Err(UnsupportedVersion("0".to_string()))
        );
        assert_eq!(parse_payload(""), Err(UnsupportedVersion("".to_string())));
    }

    #[test]
    fn test_make_payload() {
        let payload = make_payload("wz", "nav:back");
        assert_eq!(payload, format!("{CALLBACK_VERSION}:wz:nav:back"));
        assert_eq!(parse_payload(&payload), Ok(("wz", "nav:back")));
    }
}
