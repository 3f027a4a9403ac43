use serde::Deserialize;

use super::profile::ProfileFields;

#[derive(Deserialize)]
pub struct ViewProfileRequest {
    pub login_token: String,
}

#[derive(Deserialize)]
pub struct ModifyProfileRequest {
    pub login_token: String,
    #[serde(flatten)]
    pub fields: ProfileFields,
}

#[derive(Deserialize)]
pub struct SearchBookingRequest {
    pub login_token: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default = "search_booking_request_status_default")]
    pub status: String,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub login_token: String,
    pub booking_id: u64,
    pub status: String,
}

#[derive(Deserialize)]
pub struct BookingRequest {
    pub login_token: String,
    pub booking_id: u64,
}

#[derive(Deserialize)]
pub struct CustomerHistoryRequest {
    pub login_token: String,
    pub customer_id: u64,
}

#[derive(Deserialize)]
pub struct AddNoteRequest {
    pub login_token: String,
    pub booking_id: u64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub recommendation: String,
    pub file_url: Option<String>,
}

#[derive(Deserialize)]
pub struct StatsRequest {
    pub login_token: String,
}

#[derive(Deserialize)]
pub struct InsightsRequest {
    pub login_token: String,
    pub range: Option<String>,
}

fn search_booking_request_status_default() -> String {
    crate::models::bookings::STATUS_FILTER_ALL.to_string()
}
