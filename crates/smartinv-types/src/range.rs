//! History range tokens (`24h`, `7d`, ...).

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ParseError, ParseResult};

/// Unit of a [`HistoryRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeUnit {
    Hours,
    Days,
}

impl RangeUnit {
    fn suffix(self) -> char {
        match self {
            RangeUnit::Hours => 'h',
            RangeUnit::Days => 'd',
        }
    }
}

/// How far back an item history request reaches.
///
/// The service accepts `<amount><unit>` where unit is `h` or `d`.
///
/// # Examples
///
/// ```
/// use smartinv_types::HistoryRange;
///
/// let range: HistoryRange = "24h".parse().unwrap();
/// assert_eq!(range.to_string(), "24h");
/// assert_eq!(HistoryRange::default().to_string(), "7d");
/// assert!("7w".parse::<HistoryRange>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryRange {
    amount: u32,
    unit: RangeUnit,
}

impl HistoryRange {
    /// Range of `amount` hours.
    pub const fn hours(amount: u32) -> Self {
        Self {
            amount,
            unit: RangeUnit::Hours,
        }
    }

    /// Range of `amount` days.
    pub const fn days(amount: u32) -> Self {
        Self {
            amount,
            unit: RangeUnit::Days,
        }
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn unit(&self) -> RangeUnit {
        self.unit
    }

    /// Total span.
    pub fn as_duration(&self) -> time::Duration {
        match self.unit {
            RangeUnit::Hours => time::Duration::hours(i64::from(self.amount)),
            RangeUnit::Days => time::Duration::days(i64::from(self.amount)),
        }
    }
}

impl Default for HistoryRange {
    fn default() -> Self {
        Self::days(7)
    }
}

impl fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

impl FromStr for HistoryRange {
    type Err = ParseError;

    fn from_str(s: &str) -> ParseResult<Self> {
        let invalid = |reason| ParseError::InvalidRange {
            value: s.to_string(),
            reason,
        };

        let token = s.trim();
        let Some(last) = token.chars().last() else {
            return Err(invalid("range cannot be empty"));
        };
        let unit = match last {
            'h' => RangeUnit::Hours,
            'd' => RangeUnit::Days,
            _ => return Err(invalid("unit must be 'h' or 'd'")),
        };
        let digits = &token[..token.len() - 1];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("amount must be a positive integer"));
        }
        let amount: u32 = digits
            .parse()
            .map_err(|_| invalid("amount is too large"))?;
        if amount == 0 {
            return Err(invalid("amount must be greater than zero"));
        }

        Ok(Self { amount, unit })
    }
}

impl Serialize for HistoryRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HistoryRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
