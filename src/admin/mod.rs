mod requests;
mod responses;

use crate::{
    analytics::{self, InsightRange, StatusCount},
    auth::session::require_role,
    booking::{self, Actor},
    database::{assert, get_db_conn},
    models::{
        bookings::BookingStatus,
        bookings::Booking,
        nutritionists::NutritionistData,
        users::{Role, UserData},
    },
    nutritionist::profile,
    protocol::{MessageResponse, SimpleResponse},
    AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use anyhow::{bail, Context};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(stats)
        .service(insights)
        .service(search_user)
        .service(block_user)
        .service(modify_role)
        .service(search_booking)
        .service(update_booking_status)
        .service(pay_booking)
        .service(view_note)
        .service(modify_nutritionist)
        .service(delete_nutritionist);
}

crate::post_funcs! {
    (stats, "/stats", StatsRequest, StatsResponse),
    (insights, "/insights", InsightsRequest, InsightsResponse),
    (search_user, "/search_user", SearchUserRequest, SearchUserResponse),
    (block_user, "/block_user", UserRequest, BlockUserResponse),
    (modify_role, "/modify_role", ModifyRoleRequest, ViewUserResponse),
    (search_booking, "/search_booking", SearchBookingRequest, SearchBookingResponse),
    (update_booking_status, "/update_booking_status", UpdateBookingStatusRequest, SimpleResponse),
    (pay_booking, "/pay_booking", BookingRequest, SimpleResponse),
    (view_note, "/view_note", BookingRequest, ViewNoteResponse),
    (modify_nutritionist, "/modify_nutritionist", ModifyNutritionistRequest, SimpleResponse),
    (delete_nutritionist, "/delete_nutritionist", NutritionistRequest, MessageResponse),
}

/// Orders grouped counts as Confirmed, Pending, Cancelled.
fn status_stats(grouped: &[(String, i64)]) -> Vec<StatusCount> {
    BookingStatus::ALL
        .iter()
        .map(|status| StatusCount {
            name: status.label().to_string(),
            value: grouped
                .iter()
                .find(|(name, _)| name == status.as_str())
                .map_or(0, |(_, count)| (*count).max(0) as u64),
        })
        .collect()
}

async fn stats_impl(
    state: web::Data<AppState>,
    info: web::Json<StatsRequest>,
) -> anyhow::Result<StatsResponse> {
    use crate::schema::{bookings, users};

    let info = info.into_inner();
    require_role(info.login_token, &state, Role::Admin).await?;

    let conn = get_db_conn(&state)?;
    let (total_users, total_customers, total_nutritionists, total_bookings, grouped) =
        web::block(move || {
            let total_users = users::table.count().get_result::<i64>(&conn)?;
            let total_customers = users::table
                .filter(users::role.eq(Role::Customer.as_str()))
                .count()
                .get_result::<i64>(&conn)?;
            let total_nutritionists = users::table
                .filter(users::role.eq(Role::Nutritionist.as_str()))
                .count()
                .get_result::<i64>(&conn)?;
            let total_bookings = bookings::table.count().get_result::<i64>(&conn)?;
            let grouped = bookings::table
                .group_by(bookings::status)
                .select((bookings::status, diesel::dsl::sql::<diesel::sql_types::BigInt>("COUNT(*)")))
                .get_results::<(String, i64)>(&conn)?;
            Ok::<_, diesel::result::Error>((
                total_users,
                total_customers,
                total_nutritionists,
                total_bookings,
                grouped,
            ))
        })
        .await
        .context("DB error")?;

    Ok(StatsResponse {
        success: true,
        err: "".to_string(),
        total_users,
        total_customers,
        total_nutritionists,
        total_bookings,
        status_stats: status_stats(&grouped),
    })
}

async fn insights_impl(
    state: web::Data<AppState>,
    info: web::Json<InsightsRequest>,
) -> anyhow::Result<InsightsResponse> {
    use crate::schema::{bookings, users};

    let info = info.into_inner();
    require_role(info.login_token, &state, Role::Admin).await?;
    let range = InsightRange::parse(info.range.as_deref());

    let now = Utc::now().naive_utc();
    let start = range.start(now);

    let conn = get_db_conn(&state)?;
    let (booking_rows, user_rows) = web::block(move || {
        let booking_rows = bookings::table
            .filter(bookings::created_at.ge(start))
            .select((bookings::created_at, bookings::status))
            .get_results::<(NaiveDateTime, String)>(&conn)?;
        let user_rows = users::table
            .filter(users::created_at.ge(start))
            .select(users::created_at)
            .get_results::<NaiveDateTime>(&conn)?;
        Ok::<_, diesel::result::Error>((booking_rows, user_rows))
    })
    .await
    .context("DB error")?;

    let mut statuses = Vec::with_capacity(booking_rows.len());
    for (_, status) in &booking_rows {
        statuses.push(status.parse::<BookingStatus>()?);
    }

    Ok(InsightsResponse {
        success: true,
        err: "".to_string(),
        consultation_data: analytics::daily_trend(
            now.date(),
            range.day_count(),
            booking_rows.iter().map(|(created_at, _)| *created_at),
        ),
        status_data: analytics::status_breakdown(statuses),
        user_data: analytics::daily_trend(now.date(), range.day_count(), user_rows),
    })
}

async fn search_user_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchUserRequest>,
) -> anyhow::Result<SearchUserResponse> {
    use crate::schema::users;

    let info = info.into_inner();
    require_role(info.login_token, &state, Role::Admin).await?;

    let name_pattern = crate::utils::get_str_pattern_opt(info.name);
    let email_pattern = crate::utils::get_str_pattern_opt(info.email);
    let (role, any_role) = match info.role {
        Some(role) => (role.parse::<Role>()?.as_str().to_string(), false),
        None => (String::new(), true),
    };
    let (first_index, limit) = crate::utils::get_page(info.first_index, info.limit);

    let conn = get_db_conn(&state)?;
    let res = web::block(move || {
        users::table
            .filter(users::name.like(name_pattern))
            .filter(users::email.like(email_pattern))
            .filter(users::role.eq(&role).or(any_role))
            .order(users::created_at.desc())
            .offset(first_index)
            .limit(limit)
            .get_results::<UserData>(&conn)
    })
    .await
    .context("DB error")?;

    Ok(SearchUserResponse {
        success: true,
        err: "".to_string(),
        users: res.into_iter().map(UserItem::from).collect(),
    })
}

async fn block_user_impl(
    state: web::Data<AppState>,
    info: web::Json<UserRequest>,
) -> anyhow::Result<BlockUserResponse> {
    use crate::schema::users;

    let info = info.into_inner();
    let session = require_role(info.login_token, &state, Role::Admin).await?;
    if session.user_id == info.user_id {
        bail!("You cannot block yourself");
    }

    let conn = get_db_conn(&state)?;
    let user_id = info.user_id;
    let is_blocked = web::block(move || {
        conn.transaction(|| {
            let user = users::table
                .filter(users::id.eq(user_id))
                .get_result::<UserData>(&conn)
                .optional()
                .context("DB error")?;
            let user = match user {
                Some(user) => user,
                None => bail!("User not found"),
            };

            let is_blocked = !user.is_blocked;
            diesel::update(users::table.filter(users::id.eq(user_id)))
                .set(users::is_blocked.eq(is_blocked))
                .execute(&conn)
                .context("DB error")?;

            Ok(is_blocked)
        })
    })
    .await?;

    tracing::info!(user_id, is_blocked, admin_id = session.user_id, "user block toggled");
    Ok(BlockUserResponse {
        success: true,
        err: "".to_string(),
        is_blocked,
        message: if is_blocked {
            "User blocked".to_string()
        } else {
            "User unblocked".to_string()
        },
    })
}

async fn modify_role_impl(
    state: web::Data<AppState>,
    info: web::Json<ModifyRoleRequest>,
) -> anyhow::Result<ViewUserResponse> {
    use crate::schema::users;

    let info = info.into_inner();
    let session = require_role(info.login_token, &state, Role::Admin).await?;
    let role = info.role.parse::<Role>()?;
    if session.user_id == info.user_id {
        bail!("You cannot change your own role");
    }
    assert::assert_user(&state, info.user_id).await?;

    let conn = get_db_conn(&state)?;
    let user_id = info.user_id;
    web::block(move || {
        diesel::update(users::table.filter(users::id.eq(user_id)))
            .set(users::role.eq(role.as_str()))
            .execute(&conn)
    })
    .await
    .context("DB error")?;

    tracing::info!(user_id, role = role.as_str(), "user role changed");
    let user = assert::assert_user(&state, user_id).await?;
    Ok(ViewUserResponse {
        success: true,
        err: "".to_string(),
        user: user.into(),
    })
}

async fn search_booking_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchBookingRequest>,
) -> anyhow::Result<SearchBookingResponse> {
    use crate::schema::{bookings, nutritionists, users};

    let info = info.into_inner();
    require_role(info.login_token, &state, Role::Admin).await?;

    let (start_time, end_time) =
        crate::utils::parse_time_pair_str_opt(info.start_time, info.end_time)?;
    let (status, any_status) = booking::parse_status_filter(&info.status)?;
    let (first_index, limit) = crate::utils::get_page(info.first_index, info.limit);

    let conn = get_db_conn(&state)?;
    let res = web::block(move || {
        bookings::table
            .inner_join(users::table.on(bookings::customer_id.eq(users::id)))
            .inner_join(nutritionists::table.on(bookings::nutritionist_id.eq(nutritionists::id)))
            .filter(bookings::status.eq(&status).or(any_status))
            .filter(bookings::date.between(start_time, end_time))
            .order(bookings::date.desc())
            .offset(first_index)
            .limit(limit)
            .get_results::<(Booking, UserData, NutritionistData)>(&conn)
    })
    .await
    .context("DB error")?;

    let bookings = res
        .into_iter()
        .map(|(booking, customer, nutritionist)| SearchBookingItem {
            id: booking.id,
            customer_id: customer.id,
            customer_name: customer.name,
            customer_email: customer.email,
            nutritionist_id: nutritionist.id,
            nutritionist_name: nutritionist.name,
            specialization: nutritionist.specialization,
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
    require_role(info.login_token, &state, Role::Admin).await?;

    booking::update_status(&state, Actor::Admin, info.booking_id, next).await?;

    Ok(SimpleResponse::ok())
}

async fn pay_booking_impl(
    state: web::Data<AppState>,
    info: web::Json<BookingRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    require_role(info.login_token, &state, Role::Admin).await?;

    booking::pay(&state, Actor::Admin, info.booking_id).await?;

    Ok(SimpleResponse::ok())
}

async fn view_note_impl(
    state: web::Data<AppState>,
    info: web::Json<BookingRequest>,
) -> anyhow::Result<ViewNoteResponse> {
    let info = info.into_inner();
    require_role(info.login_token, &state, Role::Admin).await?;

    let note = booking::find_note(&state, Actor::Admin, info.booking_id).await?;

    Ok(ViewNoteResponse {
        success: true,
        err: "".to_string(),
        note,
    })
}

async fn modify_nutritionist_impl(
    state: web::Data<AppState>,
    info: web::Json<ModifyNutritionistRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    require_role(info.login_token, &state, Role::Admin).await?;
    assert::assert_nutritionist(&state, info.nutritionist_id).await?;

    let data = profile::build_update(info.fields)?;
    crate::nutritionist::apply_update(&state, info.nutritionist_id, data).await?;

    Ok(SimpleResponse::ok())
}

async fn delete_nutritionist_impl(
    state: web::Data<AppState>,
    info: web::Json<NutritionistRequest>,
) -> anyhow::Result<MessageResponse> {
    use crate::schema::{bookings, nutritionists};

    let info = info.into_inner();
    require_role(info.login_token, &state, Role::Admin).await?;
    assert::assert_nutritionist(&state, info.nutritionist_id).await?;

    let conn = get_db_conn(&state)?;
    let nutritionist_id = info.nutritionist_id;
    web::block(move || {
        conn.transaction(|| {
            let active = bookings::table
                .filter(bookings::nutritionist_id.eq(nutritionist_id))
                .filter(bookings::status.ne(BookingStatus::Cancelled.as_str()))
                .count()
                .get_result::<i64>(&conn)
                .context("DB error")?;
            if active > 0 {
                bail!("Nutritionist still has active bookings");
            }

            diesel::delete(bookings::table.filter(bookings::nutritionist_id.eq(nutritionist_id)))
                .execute(&conn)
                .context("DB error")?;
            diesel::delete(nutritionists::table.filter(nutritionists::id.eq(nutritionist_id)))
                .execute(&conn)
                .context("DB error")?;

            Ok(())
        })
    })
    .await?;

    tracing::info!(nutritionist_id, "nutritionist profile deleted");
    Ok(MessageResponse::ok("Deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_counts_fill_missing_statuses() {
        let grouped = vec![("cancelled".to_string(), 2), ("confirmed".to_string(), 5)];
        let stats_out = status_stats(&grouped);
        assert_eq!(
            stats_out,
            vec![
                StatusCount {
                    name: "Confirmed".to_string(),
                    value: 5
                },
                StatusCount {
                    name: "Pending".to_string(),
                    value: 0
                },
                StatusCount {
                    name: "Cancelled".to_string(),
                    value: 2
                },
            ]
        );
    }
}
