//! Dashboard aggregation over already loaded bookings and users.
//!
//! Everything here is pure so that the admin and nutritionist scopes only
//! have to fetch rows and hand them over.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::bookings::BookingStatus;

const TOP_CUSTOMERS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsightRange {
    Week,
    Month,
    Quarter,
    All,
}

impl InsightRange {
    /// Unknown values fall back to the last seven days.
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("30d") => InsightRange::Month,
            Some("90d") => InsightRange::Quarter,
            Some("all") => InsightRange::All,
            _ => InsightRange::Week,
        }
    }

    pub fn start(&self, now: NaiveDateTime) -> NaiveDateTime {
        match self {
            InsightRange::Week => now - Duration::days(7),
            InsightRange::Month => now - Duration::days(30),
            InsightRange::Quarter => now - Duration::days(90),
            InsightRange::All => NaiveDate::from_ymd(1970, 1, 1).and_hms(0, 0, 0),
        }
    }

    /// Number of days plotted in a trend chart.
    pub fn day_count(&self) -> i64 {
        match self {
            InsightRange::Week => 7,
            InsightRange::Month => 30,
            InsightRange::Quarter => 90,
            InsightRange::All => 60,
        }
    }
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct StatusCount {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct TrendPoint {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct CustomerCount {
    pub name: String,
    pub total: u64,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct NutritionistStats {
    pub total_consultations: u64,
    pub unique_customers: u64,
    pub conversion_rate: u64,
    pub total_pending: u64,
    pub total_cancelled: u64,
}

/// What the aggregations need to know about a booking.
pub struct BookingFact<'a> {
    pub customer_id: u64,
    pub customer_name: &'a str,
    pub date: NaiveDateTime,
    pub status: BookingStatus,
}

/// Confirmed, Pending, Cancelled, in that order.
pub fn status_breakdown<I>(statuses: I) -> Vec<StatusCount>
where
    I: IntoIterator<Item = BookingStatus>,
{
    let mut counts: HashMap<BookingStatus, u64> = HashMap::new();
    for status in statuses {
        *counts.entry(status).or_insert(0) += 1;
    }
    BookingStatus::ALL
        .iter()
        .map(|status| StatusCount {
            name: status.label().to_string(),
            value: counts.get(status).copied().unwrap_or(0),
        })
        .collect()
}

/// Per-day counts for the `day_count` days ending today, oldest first.
pub fn daily_trend<I>(today: NaiveDate, day_count: i64, dates: I) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = NaiveDateTime>,
{
    let mut per_day: HashMap<NaiveDate, u64> = HashMap::new();
    for date in dates {
        *per_day.entry(date.date()).or_insert(0) += 1;
    }
    (0..day_count.max(0))
        .map(|i| {
            let day = today - Duration::days(day_count - 1 - i);
            TrendPoint {
                date: trend_label(day),
                count: per_day.get(&day).copied().unwrap_or(0),
            }
        })
        .collect()
}

pub fn trend_label(day: NaiveDate) -> String {
    day.format("%b %-d").to_string()
}

/// Customers with the most bookings. Ties keep first-seen order.
pub fn top_customers<'a, I>(names: I) -> Vec<CustomerCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for name in names {
        let name = if name.is_empty() { "Unknown" } else { name };
        let count = counts.entry(name).or_insert(0);
        if *count == 0 {
            order.push(name);
        }
        *count += 1;
    }
    let mut ranked: Vec<CustomerCount> = order
        .into_iter()
        .map(|name| CustomerCount {
            name: name.to_string(),
            total: counts[name],
        })
        .collect();
    ranked.sort_by(|a, b| b.total.cmp(&a.total));
    ranked.truncate(TOP_CUSTOMERS);
    ranked
}

/// Percentage rounded half away from zero.
pub fn conversion_rate(confirmed: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (confirmed as f64 / total as f64 * 100.0).round() as u64
}

/// Confirmed bookings per day since `start`. Empty when the nutritionist has
/// no bookings at all.
pub fn consultation_trend(
    bookings: &[BookingFact<'_>],
    start: NaiveDateTime,
    today: NaiveDate,
    day_count: i64,
) -> Vec<TrendPoint> {
    if bookings.is_empty() {
        return Vec::new();
    }
    daily_trend(
        today,
        day_count,
        bookings
            .iter()
            .filter(|b| b.date >= start && b.status == BookingStatus::Confirmed)
            .map(|b| b.date),
    )
}

pub fn nutritionist_stats(bookings: &[BookingFact<'_>], now: NaiveDateTime) -> NutritionistStats {
    if bookings.is_empty() {
        return NutritionistStats::default();
    }

    let this_month = |d: &NaiveDateTime| d.year() == now.year() && d.month() == now.month();
    let count = |status: BookingStatus| bookings.iter().filter(|b| b.status == status).count() as u64;

    let total_consultations = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Confirmed && this_month(&b.date))
        .count() as u64;
    let unique_customers = bookings
        .iter()
        .map(|b| b.customer_id)
        .collect::<HashSet<_>>()
        .len() as u64;

    NutritionistStats {
        total_consultations,
        unique_customers,
        conversion_rate: conversion_rate(count(BookingStatus::Confirmed), bookings.len() as u64),
        total_pending: count(BookingStatus::Pending),
        total_cancelled: count(BookingStatus::Cancelled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd(2026, month, day).and_hms(10, 0, 0)
    }

    fn fact(customer_id: u64, name: &str, date: NaiveDateTime, status: BookingStatus) -> BookingFact<'_> {
        BookingFact {
            customer_id,
            customer_name: name,
            date,
            status,
        }
    }

    #[test]
    fn range_parsing_and_windows() {
        let now = at(10, 16);
        assert_eq!(InsightRange::parse(None), InsightRange::Week);
        assert_eq!(InsightRange::parse(Some("bogus")), InsightRange::Week);
        assert_eq!(InsightRange::parse(Some("90d")).day_count(), 90);
        assert_eq!(InsightRange::parse(Some("all")).day_count(), 60);
        assert_eq!(InsightRange::Month.start(now), at(9, 16));
        assert_eq!(InsightRange::All.start(now).year(), 1970);
    }

    #[test]
    fn breakdown_keeps_fixed_order_and_zeroes() {
        let counts = status_breakdown(vec![BookingStatus::Pending, BookingStatus::Pending]);
        let names: Vec<_> = counts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Confirmed", "Pending", "Cancelled"]);
        assert_eq!(counts[1].value, 2);
        assert_eq!(counts[0].value, 0);
    }

    #[test]
    fn trend_covers_window_ending_today() {
        let today = NaiveDate::from_ymd(2026, 10, 16);
        let trend = daily_trend(today, 7, vec![at(10, 16), at(10, 16), at(10, 10), at(10, 9)]);
        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].date, "Oct 10");
        assert_eq!(trend[0].count, 1);
        assert_eq!(trend[6].date, "Oct 16");
        assert_eq!(trend[6].count, 2);
        assert_eq!(trend.iter().map(|p| p.count).sum::<u64>(), 3);
    }

    #[test]
    fn consultation_trend_counts_confirmed_in_range() {
        let today = NaiveDate::from_ymd(2026, 10, 16);
        let start = at(10, 10);
        let facts = vec![
            fact(1, "Ana", at(10, 15), BookingStatus::Confirmed),
            fact(1, "Ana", at(10, 15), BookingStatus::Pending),
            fact(2, "Budi", at(10, 1), BookingStatus::Confirmed),
        ];
        let trend = consultation_trend(&facts, start, today, 7);
        assert_eq!(trend.len(), 7);
        assert_eq!(trend.iter().map(|p| p.count).sum::<u64>(), 1);
        assert_eq!(trend[5], TrendPoint { date: "Oct 15".to_string(), count: 1 });
    }

    #[test]
    fn consultation_trend_is_empty_without_bookings() {
        let today = NaiveDate::from_ymd(2026, 10, 16);
        assert!(consultation_trend(&[], at(10, 10), today, 7).is_empty());
    }

    #[test]
    fn top_customers_ranked_and_capped() {
        let names = vec!["Ana", "Budi", "Ana", "Citra", "Dewi", "Eka", "Fajar", "Budi", "Ana", ""];
        let top = top_customers(names);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0], CustomerCount { name: "Ana".to_string(), total: 3 });
        assert_eq!(top[1].name, "Budi");
        assert_eq!(top[2].name, "Citra");
    }

    #[test]
    fn conversion_rate_rounds() {
        assert_eq!(conversion_rate(0, 0), 0);
        assert_eq!(conversion_rate(1, 3), 33);
        assert_eq!(conversion_rate(2, 3), 67);
        assert_eq!(conversion_rate(4, 4), 100);
    }

    #[test]
    fn stats_for_current_month() {
        let now = at(10, 16);
        let bookings = vec![
            fact(1, "Ana", at(10, 2), BookingStatus::Confirmed),
            fact(1, "Ana", at(9, 28), BookingStatus::Confirmed),
            fact(2, "Budi", at(10, 20), BookingStatus::Pending),
            fact(3, "Citra", at(10, 5), BookingStatus::Cancelled),
        ];
        let stats = nutritionist_stats(&bookings, now);
        assert_eq!(
            stats,
            NutritionistStats {
                total_consultations: 1,
                unique_customers: 3,
                conversion_rate: 50,
                total_pending: 1,
                total_cancelled: 1,
            }
        );
        assert_eq!(nutritionist_stats(&[], now), NutritionistStats::default());
    }
}
