use serde::Serialize;

use crate::{booking::NoteItem, nutritionist::NutritionistItem};

#[derive(Default, Serialize)]
pub struct ViewInfoResponse {
    pub success: bool,
    pub err: String,
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: String,
    pub address: String,
    pub photo: String,
}

#[derive(Default, Serialize)]
pub struct SearchBookingItem {
    pub id: u64,
    pub nutritionist_id: u64,
    pub nutritionist_name: String,
    pub specialization: String,
    pub price_per_session: u64,
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
pub struct SearchNutritionistResponse {
    pub success: bool,
    pub err: String,
    pub nutritionists: Vec<NutritionistItem>,
}

#[derive(Default, Serialize)]
pub struct ViewNutritionistResponse {
    pub success: bool,
    pub err: String,
    pub nutritionist: NutritionistItem,
}

#[derive(Default, Serialize)]
pub struct TimesResponse {
    pub success: bool,
    pub err: String,
    pub times: Vec<String>,
}

#[derive(Default, Serialize)]
pub struct ViewNoteResponse {
    pub success: bool,
    pub err: String,
    pub note: Option<NoteItem>,
}

crate::impl_err_response! {
    ViewInfoResponse,
    SearchBookingResponse,
    SearchNutritionistResponse,
    ViewNutritionistResponse,
    TimesResponse,
    ViewNoteResponse,
}
