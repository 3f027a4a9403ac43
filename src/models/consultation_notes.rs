use crate::schema::consultation_notes;
use chrono::NaiveDateTime;

#[derive(Queryable)]
pub struct ConsultationNote {
    pub id: u64,
    pub booking_id: u64,
    pub nutritionist_id: u64,
    pub notes: String,
    pub recommendation: String,
    pub file_url: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[table_name = "consultation_notes"]
pub struct NewConsultationNote {
    pub booking_id: u64,
    pub nutritionist_id: u64,
    pub notes: String,
    pub recommendation: String,
    pub file_url: String,
}
