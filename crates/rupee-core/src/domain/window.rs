use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::UtcDateTime;

/// Named history period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Week,
    Month,
    Year,
}

impl Period {
    pub const ALL: [Self; 3] = [Self::Week, Self::Month, Self::Year];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Resolve a caller-supplied period name. Missing or unrecognised names
    /// select [`Period::Week`].
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            Some("month") => Self::Month,
            Some("year") => Self::Year,
            _ => Self::Week,
        }
    }

    pub const fn max_results(self) -> usize {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 52,
        }
    }

    /// The window ending at `now`.
    pub fn window_ending(self, now: UtcDateTime) -> QueryWindow {
        let start = match self {
            Self::Week => now.saturating_sub_days(7),
            Self::Month => now.months_before(1),
            Self::Year => now.months_before(12),
        };
        QueryWindow {
            start,
            max_results: self.max_results(),
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive lower time bound plus a result cap for history reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: UtcDateTime,
    pub max_results: usize,
}
