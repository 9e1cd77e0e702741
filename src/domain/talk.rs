//! Talk facts and the year-month value they are dated with.

use chrono::{Month, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// A calendar month, stored canonically as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(0..=9999).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Parses the human form used by CSV sources: full English month name, a
    /// single space and a four-digit year (`January 2023`).
    ///
    /// Month names are matched case-sensitively and abbreviations are rejected.
    pub fn parse_month_year(raw: &str) -> Option<Self> {
        let (name, year) = raw.split_once(' ')?;
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let month = (1..=12u8)
            .filter_map(|n| Month::try_from(n).ok())
            .find(|m| m.name() == name)?;
        Self::new(year.parse().ok()?, month.number_from_month())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseYearMonthError(String);

impl fmt::Display for ParseYearMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a YYYY-MM month", self.0)
    }
}

impl std::error::Error for ParseYearMonthError {}

impl FromStr for YearMonth {
    type Err = ParseYearMonthError;

    /// Strict `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseYearMonthError(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(err());
        }
        let (year, month) = (&s[..4], &s[5..]);
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A persisted talk. `(title, speaker_id, date)` is its natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Talk {
    pub id: i64,
    pub title: String,
    #[schema(value_type = String, example = "2023-01")]
    pub date: YearMonth,
    pub views: i64,
    pub likes: i64,
    pub link: Option<String>,
    pub speaker_id: i64,
}

/// A talk as listed through the API, joined with its speaker's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TalkView {
    pub id: i64,
    pub title: String,
    #[schema(value_type = String, example = "2023-01")]
    pub date: YearMonth,
    pub views: i64,
    pub likes: i64,
    pub link: Option<String>,
    pub speaker_id: i64,
    pub speaker_name: String,
}

/// Values for a talk row that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTalk {
    pub title: String,
    pub date: YearMonth,
    pub views: i64,
    pub likes: i64,
    pub link: Option<String>,
    pub speaker_id: i64,
}

/// Result of a write-if-absent on the natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted { id: i64 },
    AlreadyExisted,
}

/// Body of an explicit talk creation. `speaker_id` wins over `speaker_name`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTalk {
    pub title: String,
    /// Month in `YYYY-MM` form.
    #[schema(example = "2023-01")]
    pub date: String,
    pub views: i64,
    pub likes: i64,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub speaker_id: Option<i64>,
    #[serde(default)]
    pub speaker_name: Option<String>,
}

/// Body of a talk update. Every field is replaced.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTalk {
    pub title: String,
    #[schema(example = "2023-01")]
    pub date: String,
    pub views: i64,
    pub likes: i64,
    #[serde(default)]
    pub link: Option<String>,
    pub speaker_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_month_name_and_year() {
        let ym = YearMonth::parse_month_year("January 2023").unwrap();
        assert_eq!(ym.year(), 2023);
        assert_eq!(ym.month(), 1);
        assert_eq!(ym.to_string(), "2023-01");

        let ym = YearMonth::parse_month_year("December 1999").unwrap();
        assert_eq!(ym.to_string(), "1999-12");
    }

    #[test]
    fn rejects_other_human_shapes() {
        for raw in [
            "Jan 2023",
            "january 2023",
            "January  2023",
            "January 23",
            "January 2023 ",
            "2023-01-01",
            "invalid date",
            "January",
            "",
        ] {
            assert!(YearMonth::parse_month_year(raw).is_none(), "{raw:?} should not parse");
        }
    }

    #[test]
    fn canonical_form_round_trips() {
        let ym: YearMonth = "2021-07".parse().unwrap();
        assert_eq!(ym, YearMonth::new(2021, 7).unwrap());
        assert_eq!(ym.to_string(), "2021-07");
    }

    #[test]
    fn canonical_form_is_strict() {
        for raw in ["2021-7", "2021-13", "2021-00", "21-07", "2021/07", "July 2021", "2021-07-01"] {
            assert!(raw.parse::<YearMonth>().is_err(), "{raw:?} should not parse");
        }
    }

    #[test]
    fn serializes_as_canonical_string() {
        let ym = YearMonth::new(2020, 3).unwrap();
        assert_eq!(serde_json::to_string(&ym).unwrap(), "\"2020-03\"");
        let back: YearMonth = serde_json::from_str("\"2020-03\"").unwrap();
        assert_eq!(back, ym);
    }
}
