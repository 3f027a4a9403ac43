use serde::Serialize;

use super::profile::AvailableHours;
use crate::{
    analytics::{CustomerCount, NutritionistStats, StatusCount, TrendPoint},
    booking::NoteItem,
    models::{nutritionists::NutritionistData, users::UserData},
};

/// Public view of a nutritionist profile.
#[derive(Default, Serialize)]
pub struct NutritionistItem {
    pub id: u64,
    pub user_id: u64,
    pub name: String,
    pub email: String,
    pub specialization: String,
    pub experience_years: i32,
    pub license: Option<String>,
    pub bio: String,
    pub contact: Option<String>,
    pub location: Option<String>,
    pub price_per_session: u64,
    pub available_days: Vec<String>,
    pub available_hours: AvailableHours,
    pub photo: Option<String>,
    pub created_at: String,
}

impl NutritionistItem {
    pub fn new(data: NutritionistData, user: UserData) -> Self {
        Self {
            available_days: data.available_days_list(),
            id: data.id,
            user_id: data.user_id,
            name: data.name,
            email: user.email,
            specialization: data.specialization,
            experience_years: data.experience_years,
            license: data.license,
            bio: data.bio,
            contact: data.contact,
            location: data.location,
            price_per_session: data.price_per_session,
            available_hours: AvailableHours {
                start: data.available_start,
                end: data.available_end,
            },
            photo: data.photo,
            created_at: crate::utils::format_time_str(&data.created_at),
        }
    }
}

#[derive(Default, Serialize)]
pub struct ViewProfileResponse {
    pub success: bool,
    pub err: String,
    pub account_name: String,
    pub account_email: String,
    pub profile: Option<NutritionistItem>,
}

#[derive(Default, Serialize)]
pub struct SearchBookingItem {
    pub id: u64,
    pub customer_id: u64,
    pub customer_name: String,
    pub customer_email: String,
    pub phone: String,
    pub date: String,
    pub status: String,
    pub payment_status: String,
    pub note: String,
    pub created_at: String,
}

#[derive(Default, Serialize)]
pub struct SearchBookingResponse {
    pub success: bool,
    pub err: String,
    pub bookings: Vec<SearchBookingItem>,
}

#[derive(Default, Serialize)]
pub struct ViewInvoiceResponse {
    pub success: bool,
    pub err: String,
    pub booking_id: u64,
    pub date: String,
    pub status: String,
    pub payment_status: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub nutritionist_name: String,
    pub specialization: String,
    pub price_per_session: u64,
}

#[derive(Default, Serialize)]
pub struct HistoryItem {
    pub id: u64,
    pub date: String,
    pub status: String,
    pub note: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Default, Serialize)]
pub struct CustomerHistoryResponse {
    pub success: bool,
    pub err: String,
    pub history: Vec<HistoryItem>,
}

#[derive(Default, Serialize)]
pub struct ViewNoteResponse {
    pub success: bool,
    pub err: String,
    pub note: Option<NoteItem>,
}

#[derive(Default, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub err: String,
    #[serde(flatten)]
    pub stats: NutritionistStats,
}

#[derive(Default, Serialize)]
pub struct InsightsResponse {
    pub success: bool,
    pub err: String,
    pub consultation_data: Vec<TrendPoint>,
    pub status_data: Vec<StatusCount>,
    pub top_customers: Vec<CustomerCount>,
}

crate::impl_err_response! {
    ViewProfileResponse,
    SearchBookingResponse,
    ViewInvoiceResponse,
    CustomerHistoryResponse,
    ViewNoteResponse,
    StatsResponse,
    InsightsResponse,
}
