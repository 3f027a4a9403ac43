use actix_web::web;
use anyhow::{bail, Context};
use diesel::prelude::*;

use crate::{
    database::get_db_conn,
    models::{bookings::Booking, nutritionists::NutritionistData, users::UserData},
    AppState,
};

pub async fn assert_user(state: &web::Data<AppState>, user_id: u64) -> anyhow::Result<UserData> {
    use crate::schema::users;

    let conn = get_db_conn(state)?;
    let res = web::block(move || {
        users::table
            .filter(users::id.eq(user_id))
            .get_result::<UserData>(&conn)
            .optional()
    })
    .await
    .context("DB error")?;

    match res {
        Some(user) => Ok(user),
        None => bail!("User not found"),
    }
}

pub async fn assert_nutritionist(
    state: &web::Data<AppState>,
    nutritionist_id: u64,
) -> anyhow::Result<NutritionistData> {
    use crate::schema::nutritionists;

    let conn = get_db_conn(state)?;
    let res = web::block(move || {
        nutritionists::table
            .filter(nutritionists::id.eq(nutritionist_id))
            .get_result::<NutritionistData>(&conn)
            .optional()
    })
    .await
    .context("DB error")?;

    match res {
        Some(data) => Ok(data),
        None => bail!("Nutritionist not found"),
    }
}

/// Profile owned by a nutritionist account.
pub async fn assert_nutritionist_of_user(
    state: &web::Data<AppState>,
    user_id: u64,
) -> anyhow::Result<NutritionistData> {
    match find_nutritionist_of_user(state, user_id).await? {
        Some(data) => Ok(data),
        None => bail!("Nutritionist profile not found"),
    }
}

pub async fn find_nutritionist_of_user(
    state: &web::Data<AppState>,
    user_id: u64,
) -> anyhow::Result<Option<NutritionistData>> {
    use crate::schema::nutritionists;

    let conn = get_db_conn(state)?;
    web::block(move || {
        nutritionists::table
            .filter(nutritionists::user_id.eq(user_id))
            .get_result::<NutritionistData>(&conn)
            .optional()
    })
    .await
    .context("DB error")
}

pub async fn assert_booking(state: &web::Data<AppState>, booking_id: u64) -> anyhow::Result<Booking> {
    use crate::schema::bookings;

    let conn = get_db_conn(state)?;
    let res = web::block(move || {
        bookings::table
            .filter(bookings::id.eq(booking_id))
            .get_result::<Booking>(&conn)
            .optional()
    })
    .await
    .context("DB error")?;

    match res {
        Some(booking) => Ok(booking),
        None => bail!("Booking not found"),
    }
}
