use crate::errors::{AppError, AppResult};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const NULL_TOKEN: &str = "null";

/// Unix seconds of `0001-01-01T00:00:00Z`, the "never set" value older files carry.
const LEGACY_ZERO_UNIX: i64 = -62_135_596_800;

#[derive(Debug, Clone, Copy)]
enum Layout {
    Rfc3339,
    Offset(&'static str),
    Local(&'static str),
    LocalDate(&'static str),
}

/// Tried in order; the first layout that parses wins.
const LAYOUTS: &[Layout] = &[
    Layout::Rfc3339,
    Layout::Offset("%Y-%m-%dT%H:%M:%S%z"),
    Layout::Local("%Y-%m-%dT%H:%M:%S%.f"),
    Layout::Local("%Y-%m-%d %H:%M:%S"),
    Layout::LocalDate("%Y-%m-%d"),
];

/// A point in time that may be unset.
///
/// Reads every timestamp shape the ledger has ever written and always writes
/// RFC 3339 with the stored offset. Unset values sort before any set value and
/// serialize as JSON `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Option<DateTime<FixedOffset>>);

impl Timestamp {
    pub const UNSET: Self = Self(None);

    pub fn now() -> Self {
        Self(Some(Local::now().fixed_offset()))
    }

    pub fn is_unset(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_datetime(&self) -> Option<DateTime<FixedOffset>> {
        self.0
    }

    pub fn parse(input: &str) -> AppResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == NULL_TOKEN {
            return Ok(Self::UNSET);
        }

        let mut last_error = String::from("no layout attempted");
        for layout in LAYOUTS {
            match parse_layout(trimmed, *layout) {
                Ok(value) if value.timestamp() == LEGACY_ZERO_UNIX => return Ok(Self::UNSET),
                Ok(value) => return Ok(Self(Some(value))),
                Err(reason) => last_error = reason,
            }
        }

        Err(AppError::MalformedTimestamp {
            input: input.to_string(),
            reason: last_error,
        })
    }

    /// Canonical text form, `None` when unset.
    pub fn to_canonical(&self) -> Option<String> {
        self.0
            .map(|value| value.to_rfc3339_opts(SecondsFormat::AutoSi, false))
    }
}

fn parse_layout(input: &str, layout: Layout) -> Result<DateTime<FixedOffset>, String> {
    match layout {
        Layout::Rfc3339 => DateTime::parse_from_rfc3339(input).map_err(|error| error.to_string()),
        Layout::Offset(format) => {
            DateTime::parse_from_str(input, format).map_err(|error| error.to_string())
        }
        Layout::Local(format) => {
            let naive = NaiveDateTime::parse_from_str(input, format).map_err(|error| error.to_string())?;
            resolve_local(naive)
        }
        Layout::LocalDate(format) => {
            let date = NaiveDate::parse_from_str(input, format).map_err(|error| error.to_string())?;
            let naive = date
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| format!("midnight does not exist on {date}"))?;
            resolve_local(naive)
        }
    }
}

fn resolve_local(naive: NaiveDateTime) -> Result<DateTime<FixedOffset>, String> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|value| value.fixed_offset())
        .ok_or_else(|| format!("{naive} does not exist in the local time zone"))
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(value: DateTime<Tz>) -> Self {
        Self(Some(value.fixed_offset()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_canonical() {
            Some(text) => f.write_str(&text),
            None => f.write_str(NULL_TOKEN),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_canonical() {
            Some(text) => serializer.serialize_str(&text),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(text) => Timestamp::parse(&text).map_err(D::Error::custom),
            None => Ok(Timestamp::UNSET),
        }
    }
}
