//! Availability slots and the interval checks used when a booking is made.

use anyhow::{bail, Context};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

pub const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

pub fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAYS[weekday.num_days_from_monday() as usize]
}

/// Splits the stored comma separated day list.
pub fn split_days(days: &str) -> Vec<String> {
    days.split(',')
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}

/// Validates and normalizes a list of weekday names for storage.
pub fn join_days(days: &[String]) -> anyhow::Result<String> {
    let mut normalized: Vec<&'static str> = Vec::new();
    for day in days {
        let day = day.trim().to_lowercase();
        match WEEKDAYS.iter().find(|w| **w == day) {
            Some(w) => {
                if !normalized.contains(w) {
                    normalized.push(w);
                }
            }
            None => bail!("Invalid weekday: {}", day),
        }
    }
    normalized.sort_by_key(|d| WEEKDAYS.iter().position(|w| w == d));
    Ok(normalized.join(","))
}

pub fn parse_hour_str(s: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").context("Invalid hour format, expected HH:MM")
}

pub fn assert_hours(start: &str, end: &str) -> anyhow::Result<()> {
    let start = parse_hour_str(start)?;
    let end = parse_hour_str(end)?;
    if start >= end {
        bail!("Available hours must start before they end");
    }
    Ok(())
}

/// Whole-hour starts offered between `start` and `end`, both hours included.
pub fn time_slots(start: &str, end: &str) -> Vec<u32> {
    match (parse_hour_str(start), parse_hour_str(end)) {
        (Ok(start), Ok(end)) if start <= end => (start.hour()..=end.hour()).collect(),
        _ => Vec::new(),
    }
}

pub fn slot_label(hour: u32) -> String {
    format!("{:02}:00", hour)
}

/// A profile without listed days takes no bookings.
pub fn is_available_day(days: &[String], date: NaiveDate) -> bool {
    days.iter().any(|d| d == weekday_name(date.weekday()))
}

/// `[a, a + len)` and `[b, b + len)` share at least one instant.
pub fn overlaps(a: NaiveDateTime, b: NaiveDateTime, len: Duration) -> bool {
    a < b + len && b < a + len
}

pub fn find_conflict<'a, I>(start: NaiveDateTime, taken: I, len: Duration) -> Option<NaiveDateTime>
where
    I: IntoIterator<Item = &'a NaiveDateTime>,
{
    taken.into_iter().copied().find(|t| overlaps(start, *t, len))
}

/// Rejects a requested start that the nutritionist does not offer.
pub fn assert_bookable(
    days: &[String],
    start_hour: &str,
    end_hour: &str,
    date: NaiveDateTime,
    now: NaiveDateTime,
) -> anyhow::Result<()> {
    if date <= now {
        bail!("Booking date must be in the future");
    }
    if !is_available_day(days, date.date()) {
        bail!("Nutritionist is not available on {}", weekday_name(date.weekday()));
    }
    if date.minute() != 0 || date.second() != 0 || date.nanosecond() != 0 {
        bail!("Bookings must start on the hour");
    }
    if !time_slots(start_hour, end_hour).contains(&date.hour()) {
        bail!("Time slot outside available hours");
    }
    Ok(())
}

pub fn available_slots(
    days: &[String],
    start_hour: &str,
    end_hour: &str,
    date: NaiveDate,
    booked: &[String],
    now: NaiveDateTime,
) -> Vec<String> {
    if !is_available_day(days, date) {
        return Vec::new();
    }
    time_slots(start_hour, end_hour)
        .into_iter()
        .filter(|hour| date.and_hms(*hour, 0, 0) > now)
        .map(slot_label)
        .filter(|label| !booked.contains(label))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd(2026, 10, day).and_hms(hour, minute, 0)
    }

    #[test]
    fn slots_include_end_hour() {
        assert_eq!(time_slots("09:00", "12:00"), vec![9, 10, 11, 12]);
        assert!(time_slots("12:00", "09:00").is_empty());
        assert!(time_slots("9am", "12:00").is_empty());
    }

    #[test]
    fn overlap_is_half_open() {
        let hour = Duration::minutes(60);
        assert!(overlaps(at(20, 9, 0), at(20, 9, 30), hour));
        assert!(overlaps(at(20, 9, 30), at(20, 9, 0), hour));
        assert!(!overlaps(at(20, 9, 0), at(20, 10, 0), hour));
        assert!(!overlaps(at(20, 10, 0), at(20, 9, 0), hour));
    }

    #[test]
    fn conflict_reports_first_overlapping_booking() {
        let hour = Duration::minutes(60);
        let taken = vec![at(20, 8, 0), at(20, 10, 30), at(20, 11, 0)];
        assert_eq!(find_conflict(at(20, 10, 0), &taken, hour), Some(at(20, 10, 30)));
        assert_eq!(find_conflict(at(20, 9, 0), &taken, hour), None);
    }

    #[test]
    fn days_round_trip_through_storage() {
        let stored = join_days(&["Friday".to_string(), "monday".to_string(), "friday".to_string()])
            .unwrap();
        assert_eq!(stored, "monday,friday");
        assert_eq!(split_days(&stored), vec!["monday", "friday"]);
        assert!(join_days(&["funday".to_string()]).is_err());
    }

    #[test]
    fn bookable_checks_day_hour_and_future() {
        // 2026-10-19 is a Monday
        let days = vec!["monday".to_string()];
        let now = at(1, 0, 0);
        assert!(assert_bookable(&days, "09:00", "17:00", at(19, 9, 0), now).is_ok());
        assert!(assert_bookable(&days, "09:00", "17:00", at(20, 9, 0), now).is_err());
        assert!(assert_bookable(&days, "09:00", "17:00", at(19, 9, 30), now).is_err());
        assert!(assert_bookable(&days, "09:00", "17:00", at(19, 18, 0), now).is_err());
        assert!(assert_bookable(&days, "09:00", "17:00", at(19, 9, 0), at(19, 9, 0)).is_err());
    }

    #[test]
    fn empty_day_list_means_no_day() {
        assert!(!is_available_day(&[], NaiveDate::from_ymd(2026, 10, 18)));
        // 2026-10-18 is a Sunday
        let err = assert_bookable(&[], "09:00", "17:00", at(18, 9, 0), at(1, 0, 0)).unwrap_err();
        assert_eq!(err.to_string(), "Nutritionist is not available on sunday");
        let monday = NaiveDate::from_ymd(2026, 10, 19);
        assert!(available_slots(&[], "09:00", "17:00", monday, &[], at(1, 0, 0)).is_empty());
    }

    #[test]
    fn available_slots_skip_booked_and_past() {
        let date = NaiveDate::from_ymd(2026, 10, 19);
        let booked = vec!["10:00".to_string()];
        let slots = available_slots(
            &["monday".to_string()],
            "09:00",
            "12:00",
            date,
            &booked,
            at(19, 9, 30),
        );
        assert_eq!(slots, vec!["11:00", "12:00"]);

        let closed = available_slots(&["sunday".to_string()], "09:00", "12:00", date, &[], at(1, 0, 0));
        assert!(closed.is_empty());
    }
}
