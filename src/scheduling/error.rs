use crate::scheduling::model::AppointmentStatus;
use crate::scheduling::time_of_day::ParseTimeError;

/// Failures the scheduling engine can report. The HTTP layer maps these
/// onto status codes in `crate::error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulingError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error(transparent)]
    InvalidTime(#[from] ParseTimeError),

    #[error("end time must be after start time")]
    InvalidInterval,

    #[error("appointment date cannot be in the past")]
    PastDate,

    #[error("start time must be in the future")]
    PastStartTime,

    #[error("this time slot is already booked")]
    SlotConflict,

    #[error("formula not found")]
    FormulaNotFound,

    #[error("appointment not found")]
    AppointmentNotFound,

    #[error("invalid status `{0}`")]
    InvalidStatus(String),

    #[error("appointment is already {0}")]
    TerminalState(AppointmentStatus),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("storage error: {0}")]
    Storage(String),
}
