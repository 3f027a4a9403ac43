use anyhow::bail;

use crate::models::bookings::BookingStatus;

/// Checks that a booking may move from `current` to `next`.
pub fn assert_transition(current: BookingStatus, next: BookingStatus) -> anyhow::Result<()> {
    use BookingStatus::*;

    match (current, next) {
        (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled) => Ok(()),
        (Cancelled, _) => bail!("Booking already cancelled"),
        (Confirmed, Confirmed) => bail!("Booking already confirmed"),
        (_, Pending) => bail!("Invalid status"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    #[test]
    fn allowed_transitions() {
        assert!(assert_transition(Pending, Confirmed).is_ok());
        assert!(assert_transition(Pending, Cancelled).is_ok());
        assert!(assert_transition(Confirmed, Cancelled).is_ok());
    }

    #[test]
    fn cancelled_is_terminal() {
        for next in BookingStatus::ALL.iter().copied() {
            assert!(assert_transition(Cancelled, next).is_err());
        }
    }

    #[test]
    fn cannot_go_back_to_pending() {
        assert!(assert_transition(Confirmed, Pending).is_err());
        assert!(assert_transition(Pending, Pending).is_err());
        assert!(assert_transition(Confirmed, Confirmed).is_err());
    }
}
