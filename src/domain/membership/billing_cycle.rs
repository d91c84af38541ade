//! Billing cycle date arithmetic.
//!
//! Computes the next charge instant for a monthly plan anchored to a
//! billing day. Deterministic and stateless; the caller supplies the
//! reference instant.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};

/// Billing days above this are clamped down to sidestep end-of-month
/// ambiguity (February has 28 days in common years).
const MAX_BILLING_DAY: u8 = 28;

/// Computes the next charge instant for `billing_day`, seen from `from`.
///
/// The billing day is clamped into 1..=28. The charge lands on that day of
/// `from`'s month if that date is still ahead; a date on or before `from`'s
/// own date rolls to the next month (clamped to that month's length). The
/// result keeps `from`'s time-of-day and UTC offset, and its date is always
/// strictly after `from`'s date.
pub fn next_charge_at(billing_day: u8, from: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let from_date = from.date_naive();
    let day = u32::from(billing_day.clamp(1, MAX_BILLING_DAY));

    // Day <= 28 exists in every month; the fallback covers the arithmetic
    // identity rather than a reachable case.
    let candidate = from_date
        .with_day(day)
        .unwrap_or_else(|| last_day_of_month(from_date.year(), from_date.month()));

    // Same-day counts as already passed.
    let charge_date = if candidate <= from_date {
        let (next_year, next_month) = month_after(candidate.year(), candidate.month());
        let month_len = last_day_of_month(next_year, next_month).day();
        NaiveDate::from_ymd_opt(next_year, next_month, day.min(month_len)).unwrap()
    } else {
        candidate
    };

    charge_date
        .and_time(from.time())
        .and_local_timezone(*from.offset())
        .unwrap()
}

fn month_after(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = month_after(year, month);
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .pred_opt()
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Timelike};
    use proptest::prelude::*;

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    #[test]
    fn day_31_clamps_to_28_within_same_month() {
        let next = next_charge_at(31, at("2024-01-15T10:30:00Z"));
        assert_eq!(next.to_rfc3339(), "2024-01-28T10:30:00+00:00");
    }

    #[test]
    fn passed_day_rolls_to_next_month() {
        let next = next_charge_at(5, at("2024-01-10T08:00:00Z"));
        assert_eq!(next.to_rfc3339(), "2024-02-05T08:00:00+00:00");
    }

    #[test]
    fn day_30_in_february_lands_on_the_28th() {
        let next = next_charge_at(30, at("2024-02-10T12:00:00Z"));
        assert_eq!(next.to_rfc3339(), "2024-02-28T12:00:00+00:00");
    }

    #[test]
    fn same_day_counts_as_already_passed() {
        let next = next_charge_at(15, at("2024-01-15T00:00:00Z"));
        assert_eq!(next.to_rfc3339(), "2024-02-15T00:00:00+00:00");
    }

    #[test]
    fn december_rolls_into_next_year() {
        let next = next_charge_at(1, at("2024-12-25T09:15:00Z"));
        assert_eq!(next.to_rfc3339(), "2025-01-01T09:15:00+00:00");
    }

    #[test]
    fn result_inherits_offset_and_time_of_day() {
        let from = at("2024-03-20T23:45:30-05:00");
        let next = next_charge_at(10, from);
        assert_eq!(next.offset(), from.offset());
        assert_eq!(next.time(), NaiveTime::from_hms_opt(23, 45, 30).unwrap());
        assert_eq!(next.to_rfc3339(), "2024-04-10T23:45:30-05:00");
    }

    #[test]
    fn billing_day_zero_clamps_up_to_one() {
        let next = next_charge_at(0, at("2024-05-20T06:00:00Z"));
        assert_eq!(next.to_rfc3339(), "2024-06-01T06:00:00+00:00");
    }

    #[test]
    fn leap_february_keeps_days_within_reach() {
        // 2024 is a leap year; rolling out of January keeps day 29 valid.
        let next = next_charge_at(28, at("2024-01-30T00:00:00Z"));
        assert_eq!(next.to_rfc3339(), "2024-02-28T00:00:00+00:00");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn next_charge_is_strictly_after_reference_date(
            billing_day in 1u8..=31,
            year in 2000i32..2100,
            month in 1u32..=12,
            day in 1u32..=28,
            hour in 0u32..24,
            offset_hours in -12i32..=12,
        ) {
            let offset = FixedOffset::east_opt(offset_hours * 3600).unwrap();
            let from = NaiveDate::from_ymd_opt(year, month, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap()
                .and_local_timezone(offset)
                .unwrap();

            let next = next_charge_at(billing_day, from);

            prop_assert!(next.date_naive() > from.date_naive());
            prop_assert_eq!(next.time(), from.time());
            prop_assert_eq!(next.offset(), from.offset());
            // Never further out than one full cycle.
            prop_assert!(next.date_naive() - from.date_naive() <= chrono::Duration::days(59));
        }
    }
}
