pub mod profile;
mod requests;
mod responses;

pub use self::responses::NutritionistItem;

use crate::{
    analytics::{self, BookingFact, InsightRange},
    auth::session::require_role,
    booking::{self, Actor},
    database::{assert, get_db_conn, get_last_insert_id},
    models::{
        bookings::{Booking, BookingStatus},
        consultation_notes::NewConsultationNote,
        nutritionists::{NutritionistData, UpdateNutritionist},
        users::{Role, UserData},
    },
    protocol::{CreatedResponse, SimpleResponse},
    AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use anyhow::{bail, Context};
use chrono::Utc;
use diesel::prelude::*;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(view_profile)
        .service(modify_profile)
        .service(search_booking)
        .service(update_booking_status)
        .service(pay_booking)
        .service(view_invoice)
        .service(customer_history)
        .service(add_note)
        .service(view_note)
        .service(stats)
        .service(insights);
}

crate::post_funcs! {
    (view_profile, "/view_profile", ViewProfileRequest, ViewProfileResponse),
    (modify_profile, "/modify_profile", ModifyProfileRequest, SimpleResponse),
    (search_booking, "/search_booking", SearchBookingRequest, SearchBookingResponse),
    (update_booking_status, "/update_booking_status", UpdateBookingStatusRequest, SimpleResponse),
    (pay_booking, "/pay_booking", BookingRequest, SimpleResponse),
    (view_invoice, "/view_invoice", BookingRequest, ViewInvoiceResponse),
    (customer_history, "/customer_history", CustomerHistoryRequest, CustomerHistoryResponse),
    (add_note, "/add_note", AddNoteRequest, CreatedResponse),
    (view_note, "/view_note", BookingRequest, ViewNoteResponse),
    (stats, "/stats", StatsRequest, StatsResponse),
    (insights, "/insights", InsightsRequest, InsightsResponse),
}

/// Profile id of the nutritionist behind a token.
async fn get_profile_from_token(
    token: String,
    state: &web::Data<AppState>,
) -> anyhow::Result<NutritionistData> {
    let session = require_role(token, state, Role::Nutritionist).await?;
    assert::assert_nutritionist_of_user(state, session.user_id).await
}

async fn view_profile_impl(
    state: web::Data<AppState>,
    info: web::Json<ViewProfileRequest>,
) -> anyhow::Result<ViewProfileResponse> {
    let info = info.into_inner();
    let session = require_role(info.login_token, &state, Role::Nutritionist).await?;
    let user = assert::assert_user(&state, session.user_id).await?;
    let profile = assert::find_nutritionist_of_user(&state, session.user_id).await?;

    Ok(ViewProfileResponse {
        success: true,
        err: "".to_string(),
        account_name: user.name.clone(),
        account_email: user.email.clone(),
        profile: profile.map(|data| NutritionistItem::new(data, user)),
    })
}

async fn modify_profile_impl(
    state: web::Data<AppState>,
    info: web::Json<ModifyProfileRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::nutritionists;

    let info = info.into_inner();
    let session = require_role(info.login_token, &state, Role::Nutritionist).await?;
    let existing = assert::find_nutritionist_of_user(&state, session.user_id).await?;

    match existing {
        Some(profile) => {
            let data = profile::build_update(info.fields)?;
            apply_update(&state, profile.id, data).await?;
        }
        None => {
            let data = profile::build_new(session.user_id, info.fields)?;
            let conn = get_db_conn(&state)?;
            web::block(move || {
                diesel::insert_into(nutritionists::table)
                    .values(data)
                    .execute(&conn)
            })
            .await
            .context("DB error")?;
            tracing::info!(user_id = session.user_id, "nutritionist profile created");
        }
    }

    Ok(SimpleResponse::ok())
}

async fn search_booking_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchBookingRequest>,
) -> anyhow::Result<SearchBookingResponse> {
    use crate::schema::{bookings, users};

    let info = info.into_inner();
    let profile = get_profile_from_token(info.login_token, &state).await?;

    let (start_time, end_time) =
        crate::utils::parse_time_pair_str_opt(info.start_time, info.end_time)?;
    let (status, any_status) = booking::parse_status_filter(&info.status)?;
    let (first_index, limit) = crate::utils::get_page(info.first_index, info.limit);

    let conn = get_db_conn(&state)?;
    let nid = profile.id;
    let res = web::block(move || {
        bookings::table
            .inner_join(users::table.on(bookings::customer_id.eq(users::id)))
            .filter(bookings::nutritionist_id.eq(nid))
            .filter(bookings::status.eq(&status).or(any_status))
            .filter(bookings::date.between(start_time, end_time))
            .order(bookings::date.asc())
            .offset(first_index)
            .limit(limit)
            .get_results::<(Booking, UserData)>(&conn)
    })
    .await
    .context("DB error")?;

    let bookings = res
        .into_iter()
        .map(|(booking, customer)| SearchBookingItem {
            id: booking.id,
            customer_id: customer.id,
            customer_name: customer.name,
            customer_email: customer.email,
            phone: booking.phone.or(customer.phone).unwrap_or_default(),
            date: crate::utils::format_time_str(&booking.date),
            status: booking.status,
            payment_status: booking.payment_status,
            note: booking.note.unwrap_or_default(),
            created_at: crate::utils::format_time_str(&booking.created_at),
        })
        .collect();

    Ok(SearchBookingResponse {
        success: true,
        err: "".to_string(),
        bookings,
    })
}

async fn update_booking_status_impl(
    state: web::Data<AppState>,
    info: web::Json<UpdateBookingStatusRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    let next = match info.status.parse::<BookingStatus>()? {
        BookingStatus::Pending => bail!("Invalid status"),
        status => status,
    };
    let profile = get_profile_from_token(info.login_token, &state).await?;

    booking::update_status(&state, Actor::Nutritionist(profile.id), info.booking_id, next).await?;

    Ok(SimpleResponse::ok())
}

async fn pay_booking_impl(
    state: web::Data<AppState>,
    info: web::Json<BookingRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    let profile = get_profile_from_token(info.login_token, &state).await?;

    booking::pay(&state, Actor::Nutritionist(profile.id), info.booking_id).await?;

    Ok(SimpleResponse::ok())
}

async fn view_invoice_impl(
    state: web::Data<AppState>,
    info: web::Json<BookingRequest>,
) -> anyhow::Result<ViewInvoiceResponse> {
    let info = info.into_inner();
    let profile = get_profile_from_token(info.login_token, &state).await?;

    let booking = assert::assert_booking(&state, info.booking_id).await?;
    Actor::Nutritionist(profile.id).assert_owns(&booking)?;
    let customer = assert::assert_user(&state, booking.customer_id).await?;

    Ok(ViewInvoiceResponse {
        success: true,
        err: "".to_string(),
        booking_id: booking.id,
        date: crate::utils::format_time_str(&booking.date),
        status: booking.status,
        payment_status: booking.payment_status,
        customer_name: customer.name,
        customer_email: customer.email,
        customer_phone: booking.phone.or(customer.phone).unwrap_or_default(),
        nutritionist_name: profile.name,
        specialization: profile.specialization,
        price_per_session: profile.price_per_session,
    })
}

async fn customer_history_impl(
    state: web::Data<AppState>,
    info: web::Json<CustomerHistoryRequest>,
) -> anyhow::Result<CustomerHistoryResponse> {
    use crate::schema::bookings;

    let info = info.into_inner();
    let profile = get_profile_from_token(info.login_token, &state).await?;

    let conn = get_db_conn(&state)?;
    let nid = profile.id;
    let customer_id = info.customer_id;
    let res = web::block(move || {
        bookings::table
            .filter(bookings::customer_id.eq(customer_id))
            .filter(bookings::nutritionist_id.eq(nid))
            .filter(bookings::status.eq_any(vec![
                BookingStatus::Confirmed.as_str(),
                BookingStatus::Cancelled.as_str(),
            ]))
            .order(bookings::date.desc())
            .get_results::<Booking>(&conn)
    })
    .await
    .context("DB error")?;

    let history = res
        .into_iter()
        .map(|booking| HistoryItem {
            id: booking.id,
            date: crate::utils::format_time_str(&booking.date),
            status: booking.status,
            note: booking.note.unwrap_or_default(),
            created_at: crate::utils::format_time_str(&booking.created_at),
            updated_at: crate::utils::format_time_str(&booking.updated_at),
        })
        .collect();

    Ok(CustomerHistoryResponse {
        success: true,
        err: "".to_string(),
        history,
    })
}

/// Trimmed `notes` and `recommendation`, both required.
fn note_fields(notes: &str, recommendation: &str) -> anyhow::Result<(String, String)> {
    let notes = notes.trim();
    let recommendation = recommendation.trim();
    if notes.is_empty() || recommendation.is_empty() {
        bail!("Missing required fields");
    }
    Ok((notes.to_string(), recommendation.to_string()))
}

async fn add_note_impl(
    state: web::Data<AppState>,
    info: web::Json<AddNoteRequest>,
) -> anyhow::Result<CreatedResponse> {
    use crate::schema::{bookings, consultation_notes};

    let info = info.into_inner();
    let (notes, recommendation) = note_fields(&info.notes, &info.recommendation)?;
    let file_url = info.file_url.unwrap_or_default().trim().to_string();

    let session = require_role(info.login_token, &state, Role::Nutritionist).await?;
    let profile = assert::assert_nutritionist_of_user(&state, session.user_id).await?;

    let conn = get_db_conn(&state)?;
    let booking_id = info.booking_id;
    let note_id = web::block(move || {
        conn.transaction(|| {
            let booking = bookings::table
                .filter(bookings::id.eq(booking_id))
                .get_result::<Booking>(&conn)
                .optional()
                .context("DB error")?;
            let booking = match booking {
                Some(booking) => booking,
                None => bail!("Booking not found"),
            };
            Actor::Nutritionist(profile.id).assert_owns(&booking)?;

            let res = consultation_notes::table
                .filter(consultation_notes::booking_id.eq(booking_id))
                .count()
                .get_result::<i64>(&conn)
                .context("DB error")?;
            booking::assert_notable(&booking, res > 0)?;

            let data = NewConsultationNote {
                booking_id,
                nutritionist_id: session.user_id,
                notes,
                recommendation,
                file_url,
            };
            diesel::insert_into(consultation_notes::table)
                .values(data)
                .execute(&conn)
                .context("DB error")?;

            get_last_insert_id(&conn).context("DB error")
        })
    })
    .await?;

    tracing::info!(booking_id, note_id, "consultation note added");
    Ok(CreatedResponse::ok(note_id))
}

async fn view_note_impl(
    state: web::Data<AppState>,
    info: web::Json<BookingRequest>,
) -> anyhow::Result<ViewNoteResponse> {
    let info = info.into_inner();
    let profile = get_profile_from_token(info.login_token, &state).await?;

    let note = booking::find_note(&state, Actor::Nutritionist(profile.id), info.booking_id).await?;

    Ok(ViewNoteResponse {
        success: true,
        err: "".to_string(),
        note,
    })
}

/// Every booking of a profile with the customer's name.
async fn load_bookings_with_customers(
    state: &web::Data<AppState>,
    nutritionist_id: u64,
) -> anyhow::Result<Vec<(Booking, String)>> {
    use crate::schema::{bookings, users};

    let conn = get_db_conn(state)?;
    web::block(move || {
        bookings::table
            .inner_join(users::table.on(bookings::customer_id.eq(users::id)))
            .filter(bookings::nutritionist_id.eq(nutritionist_id))
            .select((bookings::all_columns, users::name))
            .get_results::<(Booking, String)>(&conn)
    })
    .await
    .context("DB error")
}

fn to_facts(rows: &[(Booking, String)]) -> anyhow::Result<Vec<BookingFact<'_>>> {
    let mut facts = Vec::with_capacity(rows.len());
    for (booking, customer_name) in rows {
        facts.push(BookingFact {
            customer_id: booking.customer_id,
            customer_name: customer_name.as_str(),
            date: booking.date,
            status: booking.status.parse()?,
        });
    }
    Ok(facts)
}

async fn stats_impl(
    state: web::Data<AppState>,
    info: web::Json<StatsRequest>,
) -> anyhow::Result<StatsResponse> {
    let info = info.into_inner();
    let profile = get_profile_from_token(info.login_token, &state).await?;

    let rows = load_bookings_with_customers(&state, profile.id).await?;
    let facts = to_facts(&rows)?;

    Ok(StatsResponse {
        success: true,
        err: "".to_string(),
        stats: analytics::nutritionist_stats(&facts, Utc::now().naive_utc()),
    })
}

async fn insights_impl(
    state: web::Data<AppState>,
    info: web::Json<InsightsRequest>,
) -> anyhow::Result<InsightsResponse> {
    let info = info.into_inner();
    let profile = get_profile_from_token(info.login_token, &state).await?;
    let range = InsightRange::parse(info.range.as_deref());

    let rows = load_bookings_with_customers(&state, profile.id).await?;
    let facts = to_facts(&rows)?;

    let now = Utc::now().naive_utc();
    let start = range.start(now);
    let in_range: Vec<&BookingFact<'_>> = facts.iter().filter(|f| f.date >= start).collect();

    let consultation_data =
        analytics::consultation_trend(&facts, start, now.date(), range.day_count());

    Ok(InsightsResponse {
        success: true,
        err: "".to_string(),
        consultation_data,
        status_data: analytics::status_breakdown(in_range.iter().map(|f| f.status)),
        top_customers: analytics::top_customers(in_range.iter().map(|f| f.customer_name)),
    })
}

/// Applies an admin edit to any profile.
pub(crate) async fn apply_update(
    state: &web::Data<AppState>,
    nutritionist_id: u64,
    data: UpdateNutritionist,
) -> anyhow::Result<()> {
    use crate::schema::nutritionists;

    if data.is_empty() {
        return Ok(());
    }
    let conn = get_db_conn(state)?;
    web::block(move || {
        diesel::update(nutritionists::table.filter(nutritionists::id.eq(nutritionist_id)))
            .set(&data)
            .execute(&conn)
    })
    .await
    .context("DB error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_state;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    #[test]
    fn note_fields_are_trimmed_and_required() {
        assert_eq!(
            note_fields("  Cut sugar ", "\tWalk daily\n").unwrap(),
            ("Cut sugar".to_string(), "Walk daily".to_string())
        );
        assert_eq!(
            note_fields("   ", "Walk daily").unwrap_err().to_string(),
            "Missing required fields"
        );
        assert!(note_fields("Cut sugar", "").is_err());
    }

    #[actix_rt::test]
    async fn add_note_with_blank_fields_is_rejected() {
        let mut app =
            test::init_service(App::new().app_data(test_state()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/add_note")
            .set_json(&json!({
                "login_token": "whatever",
                "booking_id": 1,
                "notes": "  ",
                "recommendation": "Drink water",
            }))
            .to_request();
        let body: Value = test::read_response_json(&mut app, req).await;

        assert_eq!(body["success"], json!(false));
        assert_eq!(body["err"], json!("Missing required fields"));
        assert_eq!(body["id"], json!(0));
    }
}
