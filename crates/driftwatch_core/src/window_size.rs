//! Human-readable window size parsing.

use chrono::Duration;
use driftwatch_error::{ConfigError, ConfigErrorKind};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A validated comparison window duration.
///
/// Parses compact forms like `"7d"`, `"24h"`, `"2w"` and spelled-out forms
/// like `"7 days"` or `"1 week"`.
///
/// # Examples
///
/// ```
/// use driftwatch_core::WindowSize;
///
/// let window: WindowSize = "7d".parse().unwrap();
/// assert_eq!(window.as_duration().num_days(), 7);
///
/// assert!("7 fortnights".parse::<WindowSize>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WindowSize {
    hours: i64,
}

impl WindowSize {
    /// A window spanning whole days.
    pub fn days(days: i64) -> Self {
        Self { hours: days * 24 }
    }

    /// A window spanning whole hours.
    pub fn hours(hours: i64) -> Self {
        Self { hours }
    }

    /// The window as a chrono duration.
    pub fn as_duration(&self) -> Duration {
        Duration::hours(self.hours)
    }

    /// The window length in fractional days, for diagnostics.
    pub fn as_days_f64(&self) -> f64 {
        self.hours as f64 / 24.0
    }
}

impl FromStr for WindowSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
        let unit = trimmed[digits.len()..].trim().trim_end_matches('s');

        let amount: i64 = digits
            .parse()
            .map_err(|_| ConfigError::new(ConfigErrorKind::InvalidWindowSize(s.to_string())))?;
        if amount <= 0 {
            return Err(ConfigError::new(ConfigErrorKind::InvalidWindowSize(
                s.to_string(),
            )));
        }

        match unit {
            "h" | "hour" => Ok(Self::hours(amount)),
            "d" | "day" => Ok(Self::days(amount)),
            "w" | "week" => Ok(Self::days(amount * 7)),
            _ => Err(ConfigError::new(ConfigErrorKind::InvalidWindowSize(
                s.to_string(),
            ))),
        }
    }
}

impl std::fmt::Display for WindowSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.hours % 24 == 0 {
            write!(f, "{}d", self.hours / 24)
        } else {
            write!(f, "{}h", self.hours)
        }
    }
}

impl TryFrom<String> for WindowSize {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<WindowSize> for String {
    fn from(w: WindowSize) -> Self {
        w.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_forms() {
        assert_eq!("24h".parse::<WindowSize>().unwrap(), WindowSize::hours(24));
        assert_eq!("7d".parse::<WindowSize>().unwrap(), WindowSize::days(7));
        assert_eq!("2w".parse::<WindowSize>().unwrap(), WindowSize::days(14));
    }

    #[test]
    fn test_spelled_out_forms() {
        assert_eq!(
            "1 day".parse::<WindowSize>().unwrap(),
            WindowSize::days(1)
        );
        assert_eq!(
            "7 days".parse::<WindowSize>().unwrap(),
            WindowSize::days(7)
        );
        assert_eq!(
            "1 week".parse::<WindowSize>().unwrap(),
            WindowSize::days(7)
        );
    }

    #[test]
    fn test_invalid_forms() {
        assert!("".parse::<WindowSize>().is_err());
        assert!("7".parse::<WindowSize>().is_err());
        assert!("0d".parse::<WindowSize>().is_err());
        assert!("-3d".parse::<WindowSize>().is_err());
        assert!("7 months".parse::<WindowSize>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["7d", "36h", "14d"] {
            let window: WindowSize = s.parse().unwrap();
            assert_eq!(window.to_string(), s);
        }
    }
}
