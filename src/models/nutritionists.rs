use crate::schema::nutritionists;
use chrono::NaiveDateTime;

#[derive(Queryable)]
pub struct NutritionistData {
    pub id: u64,
    pub user_id: u64,
    pub name: String,
    pub specialization: String,
    pub experience_years: i32,
    pub license: Option<String>,
    pub bio: String,
    pub contact: Option<String>,
    pub location: Option<String>,
    pub price_per_session: u64,
    pub available_days: String,
    pub available_start: String,
    pub available_end: String,
    pub photo: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[table_name = "nutritionists"]
pub struct NewNutritionist {
    pub user_id: u64,
    pub name: String,
    pub specialization: String,
    pub experience_years: i32,
    pub license: Option<String>,
    pub bio: String,
    pub contact: Option<String>,
    pub location: Option<String>,
    pub price_per_session: u64,
    pub available_days: String,
    pub available_start: String,
    pub available_end: String,
    pub photo: Option<String>,
}

#[derive(AsChangeset, Default)]
#[table_name = "nutritionists"]
pub struct UpdateNutritionist {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub experience_years: Option<i32>,
    pub license: Option<String>,
    pub bio: Option<String>,
    pub contact: Option<String>,
    pub location: Option<String>,
    pub price_per_session: Option<u64>,
    pub available_days: Option<String>,
    pub available_start: Option<String>,
    pub available_end: Option<String>,
    pub photo: Option<String>,
}

impl UpdateNutritionist {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.specialization.is_none()
            && self.experience_years.is_none()
            && self.license.is_none()
            && self.bio.is_none()
            && self.contact.is_none()
            && self.location.is_none()
            && self.price_per_session.is_none()
            && self.available_days.is_none()
            && self.available_start.is_none()
            && self.available_end.is_none()
            && self.photo.is_none()
    }
}

impl NutritionistData {
    pub fn available_days_list(&self) -> Vec<String> {
        crate::booking::slots::split_days(&self.available_days)
    }
}
