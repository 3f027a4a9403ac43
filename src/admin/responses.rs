use serde::Serialize;

use crate::{
    analytics::{StatusCount, TrendPoint},
    booking::NoteItem,
    models::users::UserData,
};

#[derive(Default, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub err: String,
    pub total_users: i64,
    pub total_customers: i64,
    pub total_nutritionists: i64,
    pub total_bookings: i64,
    pub status_stats: Vec<StatusCount>,
}

#[derive(Default, Serialize)]
pub struct InsightsResponse {
    pub success: bool,
    pub err: String,
    pub consultation_data: Vec<TrendPoint>,
    pub status_data: Vec<StatusCount>,
    pub user_data: Vec<TrendPoint>,
}

#[derive(Default, Serialize)]
pub struct UserItem {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_blocked: bool,
    pub phone: String,
    pub created_at: String,
}

impl From<UserData> for UserItem {
    fn from(user: UserData) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            is_blocked: user.is_blocked,
            phone: user.phone.unwrap_or_default(),
            created_at: crate::utils::format_time_str(&user.created_at),
        }
    }
}

#[derive(Default, Serialize)]
pub struct SearchUserResponse {
    pub success: bool,
    pub err: String,
    pub users: Vec<UserItem>,
}

#[derive(Default, Serialize)]
pub struct BlockUserResponse {
    pub success: bool,
    pub err: String,
    pub is_blocked: bool,
    pub message: String,
}

#[derive(Default, Serialize)]
pub struct ViewUserResponse {
    pub success: bool,
    pub err: String,
    pub user: UserItem,
}

#[derive(Default, Serialize)]
pub struct SearchBookingItem {
    pub id: u64,
    pub customer_id: u64,
    pub customer_name: String,
    pub customer_email: String,
    pub nutritionist_id: u64,
    pub nutritionist_name: String,
    pub specialization: String,
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
pub struct ViewNoteResponse {
    pub success: bool,
    pub err: String,
    pub note: Option<NoteItem>,
}

crate::impl_err_response! {
    StatsResponse,
    InsightsResponse,
    SearchUserResponse,
    BlockUserResponse,
    ViewUserResponse,
    SearchBookingResponse,
    ViewNoteResponse,
}
