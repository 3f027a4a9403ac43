mod requests;
mod responses;

use crate::{
    auth::session::require_role,
    booking::{self, slots, Actor},
    database::{assert, get_db_conn, get_last_insert_id},
    models::{
        bookings::{Booking, BookingStatus, NewBooking, PAYMENT_STATUS_UNPAID},
        nutritionists::NutritionistData,
        users::{Role, UpdateUser, UserData},
    },
    nutritionist::NutritionistItem,
    protocol::{CreatedResponse, SimpleResponse},
    utils::trim_opt,
    AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use anyhow::{bail, Context};
use chrono::{Duration, NaiveDateTime, Utc};
use diesel::prelude::*;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(view_info)
        .service(modify_info)
        .service(book)
        .service(cancel_booking)
        .service(search_booking)
        .service(search_nutritionist)
        .service(view_nutritionist)
        .service(booked_times)
        .service(available_slots)
        .service(view_note);
}

crate::post_funcs! {
    (view_info, "/view_info", ViewInfoRequest, ViewInfoResponse),
    (modify_info, "/modify_info", ModifyInfoRequest, SimpleResponse),
    (book, "/book", BookRequest, CreatedResponse),
    (cancel_booking, "/cancel_booking", BookingRequest, SimpleResponse),
    (search_booking, "/search_booking", SearchBookingRequest, SearchBookingResponse),
    (search_nutritionist, "/search_nutritionist", SearchNutritionistRequest, SearchNutritionistResponse),
    (view_nutritionist, "/view_nutritionist", ViewNutritionistRequest, ViewNutritionistResponse),
    (booked_times, "/booked_times", DayRequest, TimesResponse),
    (available_slots, "/available_slots", DayRequest, TimesResponse),
    (view_note, "/view_note", BookingRequest, ViewNoteResponse),
}

async fn view_info_impl(
    state: web::Data<AppState>,
    info: web::Json<ViewInfoRequest>,
) -> anyhow::Result<ViewInfoResponse> {
    let info = info.into_inner();
    let session = require_role(info.login_token, &state, Role::Customer).await?;
    let user = assert::assert_user(&state, session.user_id).await?;

    Ok(ViewInfoResponse {
        success: true,
        err: "".to_string(),
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        phone: user.phone.unwrap_or_default(),
        address: user.address.unwrap_or_default(),
        photo: user.photo.unwrap_or_default(),
    })
}

async fn modify_info_impl(
    state: web::Data<AppState>,
    info: web::Json<ModifyInfoRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::users;

    let info = info.into_inner();
    let session = require_role(info.login_token, &state, Role::Customer).await?;

    let data = UpdateUser {
        name: trim_opt(info.name),
        phone: trim_opt(info.phone),
        address: trim_opt(info.address),
        photo: trim_opt(info.photo),
    };
    if data.is_empty() {
        return Ok(SimpleResponse::ok());
    }

    let conn = get_db_conn(&state)?;
    let user_id = session.user_id;
    web::block(move || {
        diesel::update(users::table.filter(users::id.eq(user_id)))
            .set(&data)
            .execute(&conn)
    })
    .await
    .context("DB error")?;

    Ok(SimpleResponse::ok())
}

/// Bounds strictly inside which another start overlaps `[date, date + len)`.
fn booking_window(
    date: NaiveDateTime,
    len: Duration,
) -> anyhow::Result<(NaiveDateTime, NaiveDateTime)> {
    match (date.checked_sub_signed(len), date.checked_add_signed(len)) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => bail!("Booking date out of range"),
    }
}

async fn book_impl(
    state: web::Data<AppState>,
    info: web::Json<BookRequest>,
) -> anyhow::Result<CreatedResponse> {
    use crate::schema::{bookings, nutritionists, users};

    let info = info.into_inner();
    let session = require_role(info.login_token, &state, Role::Customer).await?;

    let date = crate::utils::parse_time_str(&info.date).context("Invalid format on 'date'")?;
    let len = Duration::minutes(state.config.session_minutes);
    let customer_id = session.user_id;
    let nutritionist_id = info.nutritionist_id;
    let note = trim_opt(info.note);
    let phone = trim_opt(info.phone);

    let (window_start, window_end) = booking_window(date, len)?;

    let conn = get_db_conn(&state)?;
    let booking_id = web::block(move || {
        conn.transaction(|| {
            // customer row first, then the profile row, so concurrent bookings of
            // either side queue up without lock-order deadlocks
            users::table
                .filter(users::id.eq(customer_id))
                .select(users::id)
                .for_update()
                .get_result::<u64>(&conn)
                .context("DB error")?;
            let profile = nutritionists::table
                .filter(nutritionists::id.eq(nutritionist_id))
                .for_update()
                .get_result::<NutritionistData>(&conn)
                .optional()
                .context("DB error")?;
            let profile = match profile {
                Some(profile) => profile,
                None => bail!("Nutritionist not found"),
            };

            slots::assert_bookable(
                &profile.available_days_list(),
                &profile.available_start,
                &profile.available_end,
                date,
                Utc::now().naive_utc(),
            )?;

            let taken = bookings::table
                .filter(bookings::nutritionist_id.eq(nutritionist_id))
                .filter(bookings::status.ne(BookingStatus::Cancelled.as_str()))
                .filter(bookings::date.gt(window_start))
                .filter(bookings::date.lt(window_end))
                .select(bookings::date)
                .get_results::<NaiveDateTime>(&conn)
                .context("DB error")?;
            if slots::find_conflict(date, &taken, len).is_some() {
                bail!("Time slot already booked");
            }

            let own = bookings::table
                .filter(bookings::customer_id.eq(customer_id))
                .filter(bookings::status.ne(BookingStatus::Cancelled.as_str()))
                .filter(bookings::date.gt(window_start))
                .filter(bookings::date.lt(window_end))
                .select(bookings::date)
                .get_results::<NaiveDateTime>(&conn)
                .context("DB error")?;
            if slots::find_conflict(date, &own, len).is_some() {
                bail!("You already have a booking at this time");
            }

            let data = NewBooking {
                customer_id,
                nutritionist_id,
                date,
                status: BookingStatus::Pending.as_str().to_string(),
                payment_status: PAYMENT_STATUS_UNPAID.to_string(),
                note,
                phone,
            };
            diesel::insert_into(bookings::table)
                .values(data)
                .execute(&conn)
                .context("DB error")?;

            get_last_insert_id(&conn).context("DB error")
        })
    })
    .await?;

    tracing::info!(booking_id, customer_id, nutritionist_id, "booking created");
    Ok(CreatedResponse::ok(booking_id))
}

async fn cancel_booking_impl(
    state: web::Data<AppState>,
    info: web::Json<BookingRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    let session = require_role(info.login_token, &state, Role::Customer).await?;

    booking::update_status(
        &state,
        Actor::Customer(session.user_id),
        info.booking_id,
        BookingStatus::Cancelled,
    )
    .await?;

    Ok(SimpleResponse::ok())
}

async fn search_booking_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchBookingRequest>,
) -> anyhow::Result<SearchBookingResponse> {
    use crate::schema::{bookings, nutritionists};

    let info = info.into_inner();
    let session = require_role(info.login_token, &state, Role::Customer).await?;

    let (start_time, end_time) =
        crate::utils::parse_time_pair_str_opt(info.start_time, info.end_time)?;
    let (status, any_status) = booking::parse_status_filter(&info.status)?;
    let (first_index, limit) = crate::utils::get_page(info.first_index, info.limit);

    let conn = get_db_conn(&state)?;
    let customer_id = session.user_id;
    let res = web::block(move || {
        bookings::table
            .inner_join(nutritionists::table.on(bookings::nutritionist_id.eq(nutritionists::id)))
            .filter(bookings::customer_id.eq(customer_id))
            .filter(bookings::status.eq(&status).or(any_status))
            .filter(bookings::date.between(start_time, end_time))
            .order(bookings::date.desc())
            .offset(first_index)
            .limit(limit)
            .get_results::<(Booking, NutritionistData)>(&conn)
    })
    .await
    .context("DB error")?;

    let bookings = res
        .into_iter()
        .map(|(booking, nutritionist)| SearchBookingItem {
            id: booking.id,
            nutritionist_id: nutritionist.id,
            nutritionist_name: nutritionist.name,
            specialization: nutritionist.specialization,
            price_per_session: nutritionist.price_per_session,
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

async fn search_nutritionist_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchNutritionistRequest>,
) -> anyhow::Result<SearchNutritionistResponse> {
    use crate::schema::{nutritionists, users};

    let info = info.into_inner();

    let name_pattern = crate::utils::get_str_pattern_opt(info.name);
    let specialization_pattern = crate::utils::get_str_pattern_opt(info.specialization);
    let (first_index, limit) = crate::utils::get_page(info.first_index, info.limit);

    let conn = get_db_conn(&state)?;
    let res = web::block(move || {
        nutritionists::table
            .inner_join(users::table.on(nutritionists::user_id.eq(users::id)))
            .filter(nutritionists::name.like(name_pattern))
            .filter(nutritionists::specialization.like(specialization_pattern))
            .order(nutritionists::name.asc())
            .offset(first_index)
            .limit(limit)
            .get_results::<(NutritionistData, UserData)>(&conn)
    })
    .await
    .context("DB error")?;

    Ok(SearchNutritionistResponse {
        success: true,
        err: "".to_string(),
        nutritionists: res
            .into_iter()
            .map(|(data, user)| NutritionistItem::new(data, user))
            .collect(),
    })
}

async fn view_nutritionist_impl(
    state: web::Data<AppState>,
    info: web::Json<ViewNutritionistRequest>,
) -> anyhow::Result<ViewNutritionistResponse> {
    let info = info.into_inner();
    let data = assert::assert_nutritionist(&state, info.nutritionist_id).await?;
    let user = assert::assert_user(&state, data.user_id).await?;

    Ok(ViewNutritionistResponse {
        success: true,
        err: "".to_string(),
        nutritionist: NutritionistItem::new(data, user),
    })
}

fn required_day(info: DayRequest) -> anyhow::Result<(u64, chrono::NaiveDate)> {
    match (info.nutritionist_id, info.date) {
        (Some(nutritionist_id), Some(date)) => {
            Ok((nutritionist_id, crate::utils::parse_date_str(date)?))
        }
        _ => bail!("Missing parameters"),
    }
}

async fn booked_times_impl(
    state: web::Data<AppState>,
    info: web::Json<DayRequest>,
) -> anyhow::Result<TimesResponse> {
    let (nutritionist_id, date) = required_day(info.into_inner())?;

    let times = booking::booked_hours(&state, nutritionist_id, date).await?;

    Ok(TimesResponse {
        success: true,
        err: "".to_string(),
        times,
    })
}

async fn available_slots_impl(
    state: web::Data<AppState>,
    info: web::Json<DayRequest>,
) -> anyhow::Result<TimesResponse> {
    let (nutritionist_id, date) = required_day(info.into_inner())?;

    let profile = assert::assert_nutritionist(&state, nutritionist_id).await?;
    let booked = booking::booked_hours(&state, nutritionist_id, date).await?;

    let times = slots::available_slots(
        &profile.available_days_list(),
        &profile.available_start,
        &profile.available_end,
        date,
        &booked,
        Utc::now().naive_utc(),
    );

    Ok(TimesResponse {
        success: true,
        err: "".to_string(),
        times,
    })
}

async fn view_note_impl(
    state: web::Data<AppState>,
    info: web::Json<BookingRequest>,
) -> anyhow::Result<ViewNoteResponse> {
    let info = info.into_inner();
    let session = require_role(info.login_token, &state, Role::Customer).await?;

    let note = booking::find_note(&state, Actor::Customer(session.user_id), info.booking_id).await?;

    Ok(ViewNoteResponse {
        success: true,
        err: "".to_string(),
        note,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_state;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    #[test]
    fn day_request_needs_both_parameters() {
        let missing = DayRequest {
            nutritionist_id: Some(1),
            date: None,
        };
        assert_eq!(required_day(missing).unwrap_err().to_string(), "Missing parameters");

        let bad_date = DayRequest {
            nutritionist_id: Some(1),
            date: Some("20-10-2026".to_string()),
        };
        assert!(required_day(bad_date).is_err());

        let ok = DayRequest {
            nutritionist_id: Some(1),
            date: Some("2026-10-20".to_string()),
        };
        assert_eq!(
            required_day(ok).unwrap(),
            (1, chrono::NaiveDate::from_ymd(2026, 10, 20))
        );
    }

    #[test]
    fn booking_window_spans_one_session_each_way() {
        let date = chrono::NaiveDate::from_ymd(2026, 10, 20).and_hms(9, 0, 0);
        let (start, end) = booking_window(date, Duration::minutes(60)).unwrap();
        assert_eq!(start, date - Duration::minutes(60));
        assert_eq!(end, date + Duration::minutes(60));
    }

    #[test]
    fn booking_window_rejects_dates_at_the_calendar_edge() {
        let last = chrono::naive::MAX_DATE.and_hms(23, 0, 0);
        let err = booking_window(last, Duration::minutes(60)).unwrap_err();
        assert_eq!(err.to_string(), "Booking date out of range");

        let first = chrono::naive::MIN_DATE.and_hms(0, 0, 0);
        assert!(booking_window(first, Duration::minutes(60)).is_err());
    }

    #[actix_rt::test]
    async fn booked_times_without_date_is_rejected() {
        let mut app =
            test::init_service(App::new().app_data(test_state()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/booked_times")
            .set_json(&json!({ "nutritionist_id": 3 }))
            .to_request();
        let body: Value = test::read_response_json(&mut app, req).await;

        assert_eq!(body["success"], json!(false));
        assert_eq!(body["err"], json!("Missing parameters"));
        assert_eq!(body["times"], json!([]));
    }
}
