use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// USD buying rate in LKR. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rate(f64);

impl Rate {
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteRate);
        }
        if value <= 0.0 {
            return Err(ValidationError::NonPositiveRate {
                value: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    /// Parse a rate as banks publish it: surrounding whitespace and
    /// thousands separators are ignored (`" 1,234.50 "`).
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let cleaned = text.trim().replace(',', "");
        let value = cleaned
            .parse::<f64>()
            .map_err(|_| ValidationError::UnparsableRate {
                value: text.trim().to_owned(),
            })?;
        Self::new(value)
    }

    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Display for Rate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Rate {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rate> for f64 {
    fn from(value: Rate) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_published_number_formats() {
        assert_eq!(Rate::parse("301.25").expect("plain").value(), 301.25);
        assert_eq!(Rate::parse(" 1,234.50 ").expect("grouped").value(), 1234.5);
    }

    #[test]
    fn inner_whitespace_is_not_a_separator() {
        assert_eq!(
            Rate::parse("29 8.50"),
            Err(ValidationError::UnparsableRate {
                value: String::from("29 8.50"),
            })
        );
    }

    #[test]
    fn rejects_zero_negative_and_garbage() {
        assert!(matches!(
            Rate::parse("0"),
            Err(ValidationError::NonPositiveRate { .. })
        ));
        assert!(matches!(
            Rate::new(-1.0),
            Err(ValidationError::NonPositiveRate { .. })
        ));
        assert!(matches!(
            Rate::parse("N/A"),
            Err(ValidationError::UnparsableRate { .. })
        ));
        assert_eq!(Rate::new(f64::INFINITY), Err(ValidationError::NonFiniteRate));
    }

    #[test]
    fn deserialization_enforces_positivity() {
        let err = serde_json::from_str::<Rate>("-3.5");
        assert!(err.is_err());
    }
}
