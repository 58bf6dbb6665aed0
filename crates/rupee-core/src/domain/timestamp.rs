use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, Month, OffsetDateTime, UtcOffset};

use crate::ValidationError;

/// UTC timestamp with microsecond precision.
///
/// Precision matches the observation store, so a value survives a
/// write/read cycle unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(truncate_to_micros(OffsetDateTime::now_utc()))
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let parsed = OffsetDateTime::parse(input, &Rfc3339).map_err(|_| {
            ValidationError::TimestampNotUtc {
                value: input.to_owned(),
            }
        })?;

        Self::from_offset_datetime(parsed).map_err(|_| ValidationError::TimestampNotUtc {
            value: input.to_owned(),
        })
    }

    pub fn from_offset_datetime(value: OffsetDateTime) -> Result<Self, ValidationError> {
        if value.offset() != UtcOffset::UTC {
            return Err(ValidationError::TimestampNotUtc {
                value: value
                    .format(&Rfc3339)
                    .unwrap_or_else(|_| String::from("<unformattable>")),
            });
        }

        Ok(Self(truncate_to_micros(value)))
    }

    pub fn from_unix_micros(micros: i64) -> Result<Self, ValidationError> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(micros) * 1_000)
            .map(Self)
            .map_err(|_| ValidationError::TimestampOutOfRange { micros })
    }

    pub fn unix_micros(self) -> i64 {
        let micros = self.0.unix_timestamp_nanos() / 1_000;
        i64::try_from(micros).unwrap_or(if micros < 0 { i64::MIN } else { i64::MAX })
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn saturating_sub_days(self, days: i64) -> Self {
        Self(self.0.saturating_sub(Duration::days(days)))
    }

    /// Same wall-clock time `months` calendar months earlier. The day of
    /// month is clamped to the target month's length (31 Mar -> 28/29 Feb).
    pub fn months_before(self, months: u32) -> Self {
        let current = self.0;
        let index = current.year() * 12 + i32::from(u8::from(current.month())) - 1;
        let target = index - i32::try_from(months).unwrap_or(i32::MAX);
        let year = target.div_euclid(12);
        let month = Month::January.nth_next(u8::try_from(target.rem_euclid(12)).unwrap_or(0));
        let day = current.day().min(month.length(year));

        Date::from_calendar_date(year, month, day)
            .map(|date| Self(current.replace_date(date)))
            .unwrap_or(self)
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.0.unix_timestamp().to_string())
    }
}

fn truncate_to_micros(value: OffsetDateTime) -> OffsetDateTime {
    let nanos = value.nanosecond();
    value
        .replace_nanosecond(nanos - nanos % 1_000)
        .unwrap_or(value)
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}
