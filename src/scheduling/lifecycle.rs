//! Status lifecycle rules.
//!
//! `pending` is the sole initial state; `completed` and `cancelled` are
//! terminal. Clients may only cancel their own future, non-terminal
//! appointments. Admins may set any valid status in any direction,
//! bounded only by terminality (re-applying the same terminal value is a
//! permitted no-op).

use chrono::{DateTime, Utc};

use crate::scheduling::error::SchedulingError;
use crate::scheduling::model::{Appointment, AppointmentStatus, Principal, Role};

/// Check whether `caller` may move `appointment` to `next` at instant `now`.
pub fn authorize_transition(
    appointment: &Appointment,
    next: AppointmentStatus,
    caller: &Principal,
    now: DateTime<Utc>,
) -> Result<(), SchedulingError> {
    match caller.role {
        Role::Admin => {
            if appointment.status.is_terminal() && next != appointment.status {
                tracing::warn!(
                    appointment = %appointment.appointment_id,
                    from = %appointment.status,
                    to = %next,
                    "transition out of terminal state refused"
                );
                return Err(SchedulingError::TerminalState(appointment.status));
            }
            Ok(())
        }
        Role::Client => {
            if appointment.client_id != caller.id {
                return Err(SchedulingError::Forbidden(
                    "you are not allowed to modify this appointment",
                ));
            }
            if next != AppointmentStatus::Cancelled {
                return Err(SchedulingError::Forbidden(
                    "clients may only cancel appointments",
                ));
            }
            if appointment.status.is_terminal() {
                return Err(SchedulingError::TerminalState(appointment.status));
            }
            if appointment.starts_at() <= now {
                return Err(SchedulingError::PastStartTime);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::scheduling::testsupport::{admin, appointment_on, client};

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn future_appointment(status: AppointmentStatus, owner: Uuid) -> Appointment {
        let mut a = appointment_on(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(), "09:00", "10:00");
        a.status = status;
        a.client_id = owner;
        a
    }

    // The day before the appointment above.
    const BEFORE: &str = "2025-03-09T12:00:00Z";

    #[test]
    fn admin_transition_table() {
        let who = admin();
        for from in AppointmentStatus::ALL {
            for to in AppointmentStatus::ALL {
                let appointment = future_appointment(from, Uuid::new_v4());
                let result = authorize_transition(&appointment, to, &who, at(BEFORE));
                if from.is_terminal() && to != from {
                    assert_eq!(
                        result,
                        Err(SchedulingError::TerminalState(from)),
                        "{from} -> {to} should be refused"
                    );
                } else {
                    assert!(result.is_ok(), "{from} -> {to} should be allowed for admin");
                }
            }
        }
    }

    #[test]
    fn client_transition_table() {
        let who = client();
        for from in AppointmentStatus::ALL {
            for to in AppointmentStatus::ALL {
                let appointment = future_appointment(from, who.id);
                let result = authorize_transition(&appointment, to, &who, at(BEFORE));
                if to != AppointmentStatus::Cancelled {
                    assert!(
                        matches!(result, Err(SchedulingError::Forbidden(_))),
                        "{from} -> {to} should be forbidden for clients"
                    );
                } else if from.is_terminal() {
                    assert_eq!(result, Err(SchedulingError::TerminalState(from)));
                } else {
                    assert!(result.is_ok(), "{from} -> cancelled should be allowed");
                }
            }
        }
    }

    #[test]
    fn owner_cannot_cancel_once_started() {
        let who = client();
        let appointment = future_appointment(AppointmentStatus::Confirmed, who.id);

        // Exactly at the start instant counts as started.
        assert_eq!(
            authorize_transition(
                &appointment,
                AppointmentStatus::Cancelled,
                &who,
                at("2025-03-10T09:00:00Z")
            ),
            Err(SchedulingError::PastStartTime)
        );
        assert!(authorize_transition(
            &appointment,
            AppointmentStatus::Cancelled,
            &who,
            at("2025-03-10T08:59:00Z")
        )
        .is_ok());
    }

    #[test]
    fn admin_may_cancel_past_appointments() {
        let appointment = future_appointment(AppointmentStatus::Confirmed, Uuid::new_v4());
        assert!(authorize_transition(
            &appointment,
            AppointmentStatus::Cancelled,
            &admin(),
            at("2025-03-11T00:00:00Z")
        )
        .is_ok());
    }

    #[test]
    fn non_owner_client_is_forbidden() {
        let appointment = future_appointment(AppointmentStatus::Pending, Uuid::new_v4());
        let stranger = client();
        assert!(matches!(
            authorize_transition(
                &appointment,
                AppointmentStatus::Cancelled,
                &stranger,
                at(BEFORE)
            ),
            Err(SchedulingError::Forbidden(_))
        ));
    }
}
