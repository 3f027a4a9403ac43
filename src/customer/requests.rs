use serde::Deserialize;

#[derive(Deserialize)]
pub struct ViewInfoRequest {
    pub login_token: String,
}

#[derive(Deserialize)]
pub struct ModifyInfoRequest {
    pub login_token: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub photo: Option<String>,
}

#[derive(Deserialize)]
pub struct BookRequest {
    pub login_token: String,
    pub nutritionist_id: u64,
    pub date: String,
    pub note: Option<String>,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct BookingRequest {
    pub login_token: String,
    pub booking_id: u64,
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
pub struct SearchNutritionistRequest {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct ViewNutritionistRequest {
    pub nutritionist_id: u64,
}

#[derive(Deserialize)]
pub struct DayRequest {
    pub nutritionist_id: Option<u64>,
    pub date: Option<String>,
}

fn search_booking_request_status_default() -> String {
    crate::models::bookings::STATUS_FILTER_ALL.to_string()
}
