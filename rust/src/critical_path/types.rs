//! Types for critical path calculation.

use chrono::{Duration, NaiveDateTime};

use crate::models::TaskMetrics;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days in a span, rounded up (a partial day counts as a full one).
pub fn ceil_days(span: Duration) -> i64 {
    let millis = span.num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) > 0 {
        days + 1
    } else {
        days
    }
}

/// Whole days in a span, rounded to nearest with halves going up.
pub fn round_days(span: Duration) -> i64 {
    (span.num_milliseconds() + MILLIS_PER_DAY / 2).div_euclid(MILLIS_PER_DAY)
}

/// Shift a timestamp by a number of whole days.
///
/// Returns `None` if the result falls outside chrono's representable range.
pub fn shift_days(at: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    Duration::try_days(days).and_then(|d| at.checked_add_signed(d))
}

/// Per-task timing information for critical path calculation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskTiming {
    /// Earliest possible start time (from forward pass).
    pub early_start: NaiveDateTime,
    /// Earliest possible finish time (from forward pass).
    pub early_finish: NaiveDateTime,
    /// Latest allowable start time (from backward pass).
    pub late_start: NaiveDateTime,
    /// Latest allowable finish time (from backward pass).
    pub late_finish: NaiveDateTime,
}

impl TaskTiming {
    /// Timing after the forward pass; late dates mirror the early ones
    /// until the backward pass fills them in.
    pub fn from_early(early_start: NaiveDateTime, early_finish: NaiveDateTime) -> Self {
        Self {
            early_start,
            early_finish,
            late_start: early_start,
            late_finish: early_finish,
        }
    }

    /// Total float in whole days.
    pub fn total_float(&self) -> i64 {
        round_days(self.late_start - self.early_start)
    }

    pub fn is_critical(&self) -> bool {
        self.total_float() == 0
    }

    pub fn to_metrics(&self) -> TaskMetrics {
        let total_float = self.total_float();
        TaskMetrics {
            early_start: self.early_start,
            early_finish: self.early_finish,
            late_start: self.late_start,
            late_finish: self.late_finish,
            total_float,
            is_critical: total_float == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_ceil_days() {
        assert_eq!(ceil_days(Duration::zero()), 0);
        assert_eq!(ceil_days(Duration::days(4)), 4);
        assert_eq!(ceil_days(Duration::hours(1)), 1);
        assert_eq!(ceil_days(Duration::hours(25)), 2);
        assert_eq!(ceil_days(Duration::hours(-12)), 0);
        assert_eq!(ceil_days(Duration::hours(-36)), -1);
    }

    #[test]
    fn test_round_days() {
        assert_eq!(round_days(Duration::hours(11)), 0);
        assert_eq!(round_days(Duration::hours(12)), 1);
        assert_eq!(round_days(Duration::hours(60)), 3);
        assert_eq!(round_days(Duration::hours(-60)), -2);
        assert_eq!(round_days(Duration::days(-3)), -3);
    }

    #[test]
    fn test_shift_days() {
        assert_eq!(shift_days(at(1, 8), 3), Some(at(4, 8)));
        assert_eq!(shift_days(at(4, 8), -3), Some(at(1, 8)));
        assert_eq!(shift_days(NaiveDateTime::MAX, 1), None);
    }

    #[test]
    fn test_task_timing_critical() {
        let timing = TaskTiming {
            early_start: at(1, 0),
            early_finish: at(6, 0),
            late_start: at(1, 0),
            late_finish: at(6, 0),
        };
        assert!(timing.is_critical());
        assert_eq!(timing.total_float(), 0);

        let timing_with_float = TaskTiming {
            early_start: at(1, 0),
            early_finish: at(6, 0),
            late_start: at(3, 0),
            late_finish: at(8, 0),
        };
        assert!(!timing_with_float.is_critical());
        let metrics = timing_with_float.to_metrics();
        assert_eq!(metrics.total_float, 2);
        assert!(!metrics.is_critical);
        assert_eq!(metrics.late_finish, at(8, 0));
    }

    #[test]
    fn test_sub_day_gap_rounds_to_zero_float() {
        let timing = TaskTiming::from_early(at(1, 9), at(2, 9));
        let shifted = TaskTiming {
            late_start: at(1, 17),
            ..timing
        };
        assert_eq!(shifted.total_float(), 0);
        assert!(shifted.is_critical());
    }
}
