//! Booking rules shared by the customer, nutritionist and admin scopes.

pub mod slots;
pub mod status;

use actix_web::web;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use diesel::prelude::*;
use serde::Serialize;

use crate::{
    database::get_db_conn,
    error::ServiceError,
    models::{
        bookings::{Booking, BookingStatus, PAYMENT_STATUS_PAID, STATUS_FILTER_ALL},
        consultation_notes::ConsultationNote,
        users::UserData,
    },
    AppState,
};

/// Who is acting on a booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Actor {
    Customer(u64),
    /// Holds the nutritionist profile id.
    Nutritionist(u64),
    Admin,
}

impl Actor {
    pub fn assert_owns(&self, booking: &Booking) -> Result<(), ServiceError> {
        let owns = match self {
            Actor::Customer(uid) => booking.customer_id == *uid,
            Actor::Nutritionist(nid) => booking.nutritionist_id == *nid,
            Actor::Admin => true,
        };
        if owns {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }
}

#[derive(Default, Serialize)]
pub struct NoteItem {
    pub id: u64,
    pub booking_id: u64,
    pub nutritionist_id: u64,
    pub nutritionist_name: String,
    pub nutritionist_email: String,
    pub notes: String,
    pub recommendation: String,
    pub file_url: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Turns a status filter into a value and a match-everything flag for diesel.
pub fn parse_status_filter(status: &str) -> anyhow::Result<(String, bool)> {
    if status == STATUS_FILTER_ALL {
        return Ok((status.to_string(), true));
    }
    let status = status.parse::<BookingStatus>()?;
    Ok((status.as_str().to_string(), false))
}

pub fn assert_payable(booking: &Booking) -> anyhow::Result<()> {
    if booking.status == BookingStatus::Cancelled.as_str() {
        bail!("Cancelled bookings cannot be paid");
    }
    if booking.payment_status == PAYMENT_STATUS_PAID {
        bail!("Booking already paid");
    }
    Ok(())
}

/// Notes go on confirmed bookings only, one per booking.
pub fn assert_notable(booking: &Booking, has_note: bool) -> anyhow::Result<()> {
    if booking.status != BookingStatus::Confirmed.as_str() {
        bail!("Notes can only be added to confirmed bookings");
    }
    if has_note {
        bail!("Booking already has a consultation note");
    }
    Ok(())
}

/// `"HH:00"` labels of the non-cancelled bookings a nutritionist has that day.
pub async fn booked_hours(
    state: &web::Data<AppState>,
    nutritionist_id: u64,
    date: NaiveDate,
) -> anyhow::Result<Vec<String>> {
    use crate::schema::bookings;
    use chrono::Timelike;

    let (start_of_day, end_of_day) = crate::utils::day_bounds(date);
    let conn = get_db_conn(state)?;
    let dates = web::block(move || {
        bookings::table
            .filter(bookings::nutritionist_id.eq(nutritionist_id))
            .filter(bookings::date.between(start_of_day, end_of_day))
            .filter(bookings::status.ne(BookingStatus::Cancelled.as_str()))
            .select(bookings::date)
            .order(bookings::date.asc())
            .get_results::<chrono::NaiveDateTime>(&conn)
    })
    .await
    .context("DB error")?;

    Ok(dates
        .into_iter()
        .map(|d| slots::slot_label(d.hour()))
        .collect())
}

pub async fn update_status(
    state: &web::Data<AppState>,
    actor: Actor,
    booking_id: u64,
    next: BookingStatus,
) -> anyhow::Result<()> {
    use crate::schema::bookings;

    let conn = get_db_conn(state)?;
    web::block(move || {
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
            actor.assert_owns(&booking)?;

            let current = booking.status.parse::<BookingStatus>()?;
            status::assert_transition(current, next)?;

            diesel::update(bookings::table.filter(bookings::id.eq(booking_id)))
                .set(bookings::status.eq(next.as_str()))
                .execute(&conn)
                .context("DB error")?;

            Ok(())
        })
    })
    .await?;

    tracing::info!(booking_id, status = next.as_str(), ?actor, "booking status updated");
    Ok(())
}

pub async fn pay(state: &web::Data<AppState>, actor: Actor, booking_id: u64) -> anyhow::Result<()> {
    use crate::schema::bookings;

    if let Actor::Customer(_) = actor {
        bail!(ServiceError::Forbidden);
    }

    let conn = get_db_conn(state)?;
    web::block(move || {
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
            actor.assert_owns(&booking)?;
            assert_payable(&booking)?;

            diesel::update(bookings::table.filter(bookings::id.eq(booking_id)))
                .set(bookings::payment_status.eq(PAYMENT_STATUS_PAID))
                .execute(&conn)
                .context("DB error")?;

            Ok(())
        })
    })
    .await?;

    tracing::info!(booking_id, ?actor, "booking paid");
    Ok(())
}

/// The note attached to a booking, if any, after checking the actor may see it.
pub async fn find_note(
    state: &web::Data<AppState>,
    actor: Actor,
    booking_id: u64,
) -> anyhow::Result<Option<NoteItem>> {
    use crate::schema::{consultation_notes, users};

    let booking = crate::database::assert::assert_booking(state, booking_id).await?;
    actor.assert_owns(&booking)?;

    let conn = get_db_conn(state)?;
    let res = web::block(move || {
        consultation_notes::table
            .filter(consultation_notes::booking_id.eq(booking_id))
            .inner_join(users::table.on(consultation_notes::nutritionist_id.eq(users::id)))
            .get_result::<(ConsultationNote, UserData)>(&conn)
            .optional()
    })
    .await
    .context("DB error")?;

    Ok(res.map(|(note, user)| NoteItem {
        id: note.id,
        booking_id: note.booking_id,
        nutritionist_id: note.nutritionist_id,
        nutritionist_name: user.name,
        nutritionist_email: user.email,
        notes: note.notes,
        recommendation: note.recommendation,
        file_url: note.file_url,
        created_at: crate::utils::format_time_str(&note.created_at),
        updated_at: crate::utils::format_time_str(&note.updated_at),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_state;
    use chrono::NaiveDate;

    fn booking(customer_id: u64, nutritionist_id: u64) -> Booking {
        let t = NaiveDate::from_ymd(2026, 10, 20).and_hms(9, 0, 0);
        Booking {
            id: 1,
            customer_id,
            nutritionist_id,
            date: t,
            status: "pending".to_string(),
            payment_status: "unpaid".to_string(),
            note: None,
            phone: None,
            created_at: t,
            updated_at: t,
        }
    }

    #[test]
    fn status_filter_values() {
        assert_eq!(parse_status_filter("all").unwrap(), ("all".to_string(), true));
        assert_eq!(
            parse_status_filter("confirmed").unwrap(),
            ("confirmed".to_string(), false)
        );
        assert!(parse_status_filter("done").is_err());
    }

    #[test]
    fn ownership_by_actor() {
        let b = booking(7, 3);
        assert!(Actor::Customer(7).assert_owns(&b).is_ok());
        assert_eq!(Actor::Customer(8).assert_owns(&b), Err(ServiceError::Forbidden));
        assert!(Actor::Nutritionist(3).assert_owns(&b).is_ok());
        assert_eq!(Actor::Nutritionist(7).assert_owns(&b), Err(ServiceError::Forbidden));
        assert!(Actor::Admin.assert_owns(&b).is_ok());
    }

    #[test]
    fn payment_rules() {
        let mut b = booking(7, 3);
        assert!(assert_payable(&b).is_ok());

        b.payment_status = PAYMENT_STATUS_PAID.to_string();
        assert_eq!(assert_payable(&b).unwrap_err().to_string(), "Booking already paid");

        b.payment_status = "unpaid".to_string();
        b.status = "cancelled".to_string();
        assert_eq!(
            assert_payable(&b).unwrap_err().to_string(),
            "Cancelled bookings cannot be paid"
        );
    }

    #[test]
    fn note_rules() {
        let mut b = booking(7, 3);
        assert_eq!(
            assert_notable(&b, false).unwrap_err().to_string(),
            "Notes can only be added to confirmed bookings"
        );

        b.status = "confirmed".to_string();
        assert!(assert_notable(&b, false).is_ok());
        assert_eq!(
            assert_notable(&b, true).unwrap_err().to_string(),
            "Booking already has a consultation note"
        );

        b.status = "cancelled".to_string();
        assert!(assert_notable(&b, false).is_err());
    }

    #[actix_rt::test]
    async fn customers_cannot_pay() {
        let err = pay(&test_state(), Actor::Customer(1), 1).await.unwrap_err();
        assert_eq!(err.downcast_ref::<ServiceError>(), Some(&ServiceError::Forbidden));
        assert_eq!(err.to_string(), "Access denied");
    }
}
