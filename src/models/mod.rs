pub mod bookings;
pub mod consultation_notes;
pub mod nutritionists;
pub mod users;

pub mod user_logins;
