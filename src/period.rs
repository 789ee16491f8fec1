//! Trailing time periods used for trend comparison

use crate::config::PeriodLayout;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One of the four consecutive trailing windows, oldest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "period_1")]
    P1,
    #[serde(rename = "period_2")]
    P2,
    #[serde(rename = "period_3")]
    P3,
    #[serde(rename = "period_4")]
    P4,
}

impl Period {
    /// All periods, oldest to most recent
    pub const ALL: [Period; 4] = [Period::P1, Period::P2, Period::P3, Period::P4];

    /// Key used for this period in `*_by_period` objects
    pub fn key(self) -> &'static str {
        match self {
            Self::P1 => "period_1",
            Self::P2 => "period_2",
            Self::P3 => "period_3",
            Self::P4 => "period_4",
        }
    }

    /// Human label for the default six-month layout
    pub fn label(self) -> &'static str {
        match self {
            Self::P1 => "18-24 months ago",
            Self::P2 => "12-18 months ago",
            Self::P3 => "6-12 months ago",
            Self::P4 => "0-6 months ago",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::P1 => 0,
            Self::P2 => 1,
            Self::P3 => 2,
            Self::P4 => 3,
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A metric family recorded once per period.
///
/// Serializes as an object with exactly the keys `period_1`..`period_4`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ByPeriod<T> {
    pub period_1: T,
    pub period_2: T,
    pub period_3: T,
    pub period_4: T,
}

impl<T> ByPeriod<T> {
    pub fn get(&self, period: Period) -> &T {
        match period {
            Period::P1 => &self.period_1,
            Period::P2 => &self.period_2,
            Period::P3 => &self.period_3,
            Period::P4 => &self.period_4,
        }
    }

    /// The most recent window (0-6 months ago)
    pub fn latest(&self) -> &T {
        &self.period_4
    }

    /// The window immediately before the most recent one
    pub fn previous(&self) -> &T {
        &self.period_3
    }

    /// The historical baseline (18-24 months ago)
    pub fn baseline(&self) -> &T {
        &self.period_1
    }
}

impl<T: Clone> ByPeriod<T> {
    /// Same value in every period
    pub fn uniform(value: T) -> Self {
        Self {
            period_1: value.clone(),
            period_2: value.clone(),
            period_3: value.clone(),
            period_4: value,
        }
    }
}

/// Calendar range covered by a period relative to an evaluation instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub period: Period,
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Compute the four trailing windows ending at `now`
pub fn period_windows(now: DateTime<Utc>, layout: &PeriodLayout) -> Vec<PeriodWindow> {
    Period::ALL
        .iter()
        .map(|&period| {
            let i = period.index();
            let start_days = layout.start_offset_days[i];
            let end_days = layout.start_offset_days.get(i + 1).copied().unwrap_or(0);
            PeriodWindow {
                period,
                label: period.label().to_string(),
                start: now - Duration::days(start_days),
                end: now - Duration::days(end_days),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_windows_are_contiguous_and_end_now() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let windows = period_windows(now, &PeriodLayout::default());

        assert_eq!(windows.len(), 4);
        assert_eq!(windows[0].start, now - Duration::days(730));
        assert_eq!(windows[3].end, now);
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_period_keys_match_serde_names() {
        for period in Period::ALL {
            let json = serde_json::to_string(&period).unwrap();
            assert_eq!(json, format!("\"{}\"", period.key()));
        }
    }

    #[test]
    fn test_by_period_rejects_extra_periods() {
        let json = r#"{"period_1": 1, "period_2": 2, "period_3": 3, "period_4": 4, "period_5": 5}"#;
        assert!(serde_json::from_str::<ByPeriod<u64>>(json).is_err());

        let json = r#"{"period_1": 1, "period_2": 2, "period_3": 3, "period_4": 4}"#;
        assert_eq!(serde_json::from_str::<ByPeriod<u64>>(json).unwrap().period_4, 4);
    }

    #[test]
    fn test_by_period_accessors() {
        let periods = ByPeriod {
            period_1: 1,
            period_2: 2,
            period_3: 3,
            period_4: 4,
        };
        assert_eq!(*periods.baseline(), 1);
        assert_eq!(*periods.previous(), 3);
        assert_eq!(*periods.latest(), 4);
        assert_eq!(*periods.get(Period::P2), 2);
    }
}
