use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar quarter used to pick rotating bonus categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Period {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Q1, Period::Q2, Period::Q3, Period::Q4];

    /// Quarter that contains the given month (1-12)
    pub fn from_month(month: u32) -> Self {
        match month {
            1..=3 => Period::Q1,
            4..=6 => Period::Q2,
            7..=9 => Period::Q3,
            _ => Period::Q4,
        }
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self::from_month(date.month())
    }

    /// Quarter of today's date (UTC)
    pub fn current() -> Self {
        Self::containing(Utc::now().date_naive())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Q1 => "Q1",
            Period::Q2 => "Q2",
            Period::Q3 => "Q3",
            Period::Q4 => "Q4",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid period label: {0} (expected Q1, Q2, Q3 or Q4)")]
pub struct ParsePeriodError(pub String);

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParsePeriodError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_boundaries() {
        assert_eq!(Period::from_month(1), Period::Q1);
        assert_eq!(Period::from_month(3), Period::Q1);
        assert_eq!(Period::from_month(4), Period::Q2);
        assert_eq!(Period::from_month(9), Period::Q3);
        assert_eq!(Period::from_month(10), Period::Q4);
        assert_eq!(Period::from_month(12), Period::Q4);

        let date = NaiveDate::from_ymd_opt(2026, 8, 15).unwrap();
        assert_eq!(Period::containing(date), Period::Q3);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("q2".parse::<Period>().unwrap(), Period::Q2);
        assert_eq!(" Q4 ".parse::<Period>().unwrap(), Period::Q4);
        assert!("Q5".parse::<Period>().is_err());
        assert!("".parse::<Period>().is_err());
    }
}
