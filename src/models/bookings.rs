use crate::schema::bookings;
use chrono::NaiveDateTime;
use std::{fmt, str::FromStr};

#[derive(Queryable, Clone)]
pub struct Booking {
    pub id: u64,
    pub customer_id: u64,
    pub nutritionist_id: u64,
    pub date: NaiveDateTime,
    pub status: String,
    pub payment_status: String,
    pub note: Option<String>,
    pub phone: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[table_name = "bookings"]
pub struct NewBooking {
    pub customer_id: u64,
    pub nutritionist_id: u64,
    pub date: NaiveDateTime,
    pub status: String,
    pub payment_status: String,
    pub note: Option<String>,
    pub phone: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 3] = [
        BookingStatus::Confirmed,
        BookingStatus::Pending,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid status"))
    }
}

pub const PAYMENT_STATUS_UNPAID: &str = "unpaid";
pub const PAYMENT_STATUS_PAID: &str = "paid";

/// Status filter value matching every booking.
pub const STATUS_FILTER_ALL: &str = "all";
