//! Pure checks of raw user input. Every function trims input and returns
//! the normalized value, or the message to show to user.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::{
    policy::{COMPLAINT_TEXT_MIN_LEN, MAX_TEXT_LEN, PERSON_NAME_LEN, SERVICE_TYPE_NAME_LEN},
    Policy, ValidationError,
};

type Result<T, E = ValidationError> = std::result::Result<T, E>;

static FIELD_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-z][a-z0-9_]*$").expect("invalid field name regex"));
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+7\d{10}$").expect("invalid phone regex"));

/// Answer keys used by the wizards themselves, can't be custom field names
const SYSTEM_NAMES: [&str; 1] = ["service_type_id"];

pub const DATE_FORMAT: &str = "%d.%m.%Y";

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn check_len(s: &str, min: usize, max: usize) -> Result<()> {
    let len = char_len(s);
    if len > max {
        Err(ValidationError::TooLong { max })
    } else if len < min {
        Err(ValidationError::TooShort { min })
    } else {
        Ok(())
    }
}

fn non_empty(raw: &str) -> Result<&str> {
    let s = raw.trim();
    if s.is_empty() {
        Err(ValidationError::Empty)
    } else {
        Ok(s)
    }
}

/// Technical name of custom field
pub fn validate_field_name(raw: &str, policy: &Policy) -> Result<String> {
    let name = non_empty(raw)?;
    let lower = name.to_lowercase();
    if policy.reserved_names.contains(&lower) || SYSTEM_NAMES.contains(&lower.as_str()) {
        return Err(ValidationError::Reserved);
    }
    if char_len(name) > policy.max_field_name_len {
        return Err(ValidationError::TooLong {
            max: policy.max_field_name_len,
        });
    }
    if !FIELD_NAME_RE.is_match(name) {
        return Err(ValidationError::FieldNameCharset);
    }
    Ok(name.to_string())
}

pub fn validate_label(raw: &str, policy: &Policy) -> Result<String> {
    let label = non_empty(raw)?;
    check_len(label, policy.min_label_len, policy.max_label_len)?;
    Ok(label.to_string())
}

/// Empty description is `None`, unless policy requires some minimum
pub fn validate_description(raw: &str, policy: &Policy) -> Result<Option<String>> {
    let description = raw.trim();
    if description.is_empty() && policy.min_description_len == 0 {
        return Ok(None);
    }
    check_len(description, policy.min_description_len, policy.max_description_len)?;
    Ok(Some(description.to_string()))
}

/// Split comma separated options, dropping empty ones
pub fn parse_select_options(raw: &str, policy: &Policy) -> Result<Vec<String>> {
    let options: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    if options.len() < policy.min_select_options || options.len() > policy.max_select_options {
        return Err(ValidationError::OptionCount {
            min: policy.min_select_options,
            max: policy.max_select_options,
        });
    }
    Ok(options)
}

pub fn validate_phone(raw: &str) -> Result<String> {
    let phone = raw.trim();
    if PHONE_RE.is_match(phone) {
        Ok(phone.to_string())
    } else {
        Err(ValidationError::Phone)
    }
}

pub fn validate_price(raw: &str) -> Result<f64> {
    match raw.trim().replace(' ', "").parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(price),
        _ => Err(ValidationError::Price),
    }
}

pub fn validate_number(raw: &str) -> Result<f64> {
    match raw.trim().replace(',', ".").parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(ValidationError::Number),
    }
}

/// Date in `dd.mm.yyyy`, returned normalized
pub fn validate_date(raw: &str) -> Result<String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .map_err(|_| ValidationError::Date)
}

pub fn validate_service_type_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    let (min, max) = SERVICE_TYPE_NAME_LEN;
    check_len(name, min, max)?;
    Ok(name.to_string())
}

pub fn validate_person_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    let (min, max) = PERSON_NAME_LEN;
    check_len(name, min, max)?;
    Ok(name.to_string())
}

pub fn validate_complaint_text(raw: &str) -> Result<String> {
    let text = raw.trim();
    check_len(text, COMPLAINT_TEXT_MIN_LEN, MAX_TEXT_LEN)?;
    Ok(text.to_string())
}

/// Free text: non-empty, limited length
pub fn validate_text(raw: &str) -> Result<String> {
    let text = non_empty(raw)?;
    check_len(text, 1, MAX_TEXT_LEN)?;
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use ValidationError::*;

    #[test]
    fn test_validate_field_name() {
        let policy = Policy::default();
        let table = [
            ("experience", Ok("experience")),
            ("  skills_2 ", Ok("skills_2")),
            ("a", Ok("a")),
            ("", Err(Empty)),
            ("   ", Err(Empty)),
            ("price", Err(Reserved)),
            ("photo", Err(Reserved)),
            ("Price", Err(Reserved)),
            ("service_type_id", Err(Reserved)),
            ("1abc", Err(FieldNameCharset)),
            ("_abc", Err(FieldNameCharset)),
            ("Abc", Err(FieldNameCharset)),
            ("опыт", Err(FieldNameCharset)),
            ("with space", Err(FieldNameCharset)),
        ];
        for (i, (input, expected)) in table.into_iter().enumerate() {
            let expected = expected.map(ToOwned::to_owned);
            assert_eq!(validate_field_name(input, &policy), expected, "test table[{i}]");
        }
    }

    #[test]
    fn test_field_name_length() {
        let policy = Policy::default();
        assert!(validate_field_name(&"a".repeat(50), &policy).is_ok());
        assert_eq!(
            validate_field_name(&"a".repeat(51), &policy),
            Err(TooLong { max: 50 })
        );
    }

    #[test]
    fn test_all_reserved_names_rejected() {
        let policy = Policy::default();
        for name in &policy.reserved_names {
            assert_eq!(validate_field_name(name, &policy), Err(Reserved), "{name}");
        }
    }

    #[test]
    fn test_reserved_names_are_configurable() {
        let policy = Policy::builder()
            .reserved_names(["adress".to_string()].into())
            .build();
        assert!(validate_field_name("address", &policy).is_ok());
        assert_eq!(validate_field_name("adress", &policy), Err(Reserved));
    }

    #[test]
    fn test_validate_label() {
        let policy = Policy::default();
        assert_eq!(validate_label(" Опыт работы ", &policy), Ok("Опыт работы".to_string()));
        // counted in chars, not bytes
        assert!(validate_label(&"я".repeat(100), &policy).is_ok());
        assert_eq!(validate_label(&"я".repeat(101), &policy), Err(TooLong { max: 100 }));
        assert_eq!(validate_label("", &policy), Err(Empty));

        let strict = Policy::builder().min_label_len(3).build();
        assert_eq!(validate_label("ab", &strict), Err(TooShort { min: 3 }));
    }

    #[test]
    fn test_validate_description() {
        let policy = Policy::default();
        assert_eq!(validate_description("", &policy), Ok(None));
        assert_eq!(validate_description("  ", &policy), Ok(None));
        assert_eq!(validate_description(" some ", &policy), Ok(Some("some".to_string())));
        assert_eq!(
            validate_description(&"x".repeat(501), &policy),
            Err(TooLong { max: 500 })
        );

        let detailed = Policy::builder().min_description_len(10).build();
        assert_eq!(validate_description("", &detailed), Err(TooShort { min: 10 }));
        assert_eq!(validate_description("short", &detailed), Err(TooShort { min: 10 }));
        assert!(validate_description("long enough text", &detailed).is_ok());
    }

    #[test]
    fn test_parse_select_options() {
        let policy = Policy::default();
        assert_eq!(
            parse_select_options("1-3 года, 3-5 лет, 5+ лет", &policy),
            Ok(vec!["1-3 года".to_string(), "3-5 лет".to_string(), "5+ лет".to_string()])
        );
        assert_eq!(
            parse_select_options(" a ,, b ,", &policy),
            Ok(vec!["a".to_string(), "b".to_string()])
        );
        let count_err = Err(OptionCount { min: 2, max: 20 });
        assert_eq!(parse_select_options("single", &policy), count_err);
        assert_eq!(parse_select_options(", ,", &policy), count_err);
        let many = (0..21).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
        assert_eq!(parse_select_options(&many, &policy), count_err);

        let lenient = Policy::builder().min_select_options(0).build();
        assert_eq!(parse_select_options("single", &lenient), Ok(vec!["single".to_string()]));
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone(" +79991234567 "), Ok("+79991234567".to_string()));
        for bad in ["89991234567", "+7999123456", "+799912345678", "+7999123456a", "+19991234567", ""] {
            assert_eq!(validate_phone(bad), Err(Phone), "{bad}");
        }
    }

    #[test]
    fn test_validate_price() {
        assert_eq!(validate_price("1500"), Ok(1500.0));
        assert_eq!(validate_price("1 500"), Ok(1500.0));
        assert_eq!(validate_price("0"), Ok(0.0));
        assert_eq!(validate_price("99.5"), Ok(99.5));
        for bad in ["-1", "abc", "", "inf", "NaN"] {
            assert_eq!(validate_price(bad), Err(Price), "{bad}");
        }
    }

    #[test]
    fn test_validate_number_and_date() {
        assert_eq!(validate_number("-2,5"), Ok(-2.5));
        assert_eq!(validate_number("x"), Err(Number));
        assert_eq!(validate_date("1.2.2024"), Ok("01.02.2024".to_string()));
        assert_eq!(validate_date("31.02.2024"), Err(Date));
        assert_eq!(validate_date("2024-02-01"), Err(Date));
    }

    #[test]
    fn test_length_bounded_texts() {
        assert_eq!(validate_service_type_name("ab"), Err(TooShort { min: 3 }));
        assert!(validate_service_type_name("Фотограф").is_ok());
        assert_eq!(validate_person_name("Я"), Err(TooShort { min: 2 }));
        assert_eq!(validate_complaint_text("too short"), Err(TooShort { min: 10 }));
        assert!(validate_complaint_text("never answers the phone").is_ok());
        assert_eq!(validate_text(" "), Err(Empty));
    }
}
