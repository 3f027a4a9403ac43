use serde::Deserialize;

use crate::nutritionist::profile::ProfileFields;

#[derive(Deserialize)]
pub struct StatsRequest {
    pub login_token: String,
}

#[derive(Deserialize)]
pub struct InsightsRequest {
    pub login_token: String,
    pub range: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchUserRequest {
    pub login_token: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct UserRequest {
    pub login_token: String,
    pub user_id: u64,
}

#[derive(Deserialize)]
pub struct ModifyRoleRequest {
    pub login_token: String,
    pub user_id: u64,
    pub role: String,
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
pub struct ModifyNutritionistRequest {
    pub login_token: String,
    pub nutritionist_id: u64,
    #[serde(flatten)]
    pub fields: ProfileFields,
}

#[derive(Deserialize)]
pub struct NutritionistRequest {
    pub login_token: String,
    pub nutritionist_id: u64,
}

fn search_booking_request_status_default() -> String {
    crate::models::bookings::STATUS_FILTER_ALL.to_string()
}
