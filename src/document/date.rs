//! Strict `YYYY-MM-DD` serde format for wire dates.

use chrono::NaiveDate;
use serde::de::{self, Deserialize as _, Deserializer};
use serde::ser::Serializer;

const FORMAT: &str = "%Y-%m-%d";

pub(crate) fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&date.format(FORMAT))
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse(&s).ok_or_else(|| de::Error::invalid_value(de::Unexpected::Str(&s), &"a YYYY-MM-DD date"))
}

/// Parses exactly four year digits, two month digits and two day digits.
///
/// `NaiveDate`'s own parser tolerates signs, whitespace and missing padding.
fn parse(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(s, FORMAT).ok()
}
