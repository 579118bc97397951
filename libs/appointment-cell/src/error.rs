use thiserror::Error;
use uuid::Uuid;

use shared_database::into_app_error;
use shared_models::error::AppError;

use crate::models::AppointmentStatus;

/// Why the wizard refused to leave a step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error("Please select a clinic to proceed")]
    ClinicRequired,

    #[error("Please select both date and time for your appointment")]
    DateTimeRequired,

    #[error("Step {0} does not exist; steps run from 1 to 5")]
    OutOfRange(u8),
}

/// Rejected changes to the booking draft.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("No doctor selected for this booking")]
    NoDoctor,

    #[error("Branch {0} is not one of the doctor's clinics")]
    UnknownBranch(Uuid),

    #[error("Please select a clinic before choosing a time")]
    NoBranch,

    #[error("Slot {slot_id} belongs to a different clinic")]
    SlotBranchMismatch { slot_id: Uuid },

    #[error("Slot {0} is no longer available")]
    SlotUnavailable(Uuid),

    #[error("Clinic details do not match the selected clinic")]
    StaleDoctorClinic,
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Booking session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Booking session is closed")]
    SessionClosed,

    #[error(transparent)]
    Step(#[from] StepError),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("Bookings can only be submitted from the payment step")]
    NotAtPaymentStep,

    #[error("Booking is incomplete: {0}")]
    Incomplete(StepError),

    #[error("Family member not found: {0}")]
    FamilyMemberNotFound(Uuid),

    #[error("Slot not found for the selected clinic and date: {0}")]
    SlotNotFound(Uuid),

    #[error("Failed to load family members: {0}")]
    FamilyLookupFailed(String),

    #[error("Booking submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Booking was not accepted: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Cancellation must be confirmed before it is sent")]
    CancellationNotConfirmed,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::SessionNotFound(_)
            | BookingError::FamilyMemberNotFound(_)
            | BookingError::SlotNotFound(_) => AppError::NotFound(err.to_string()),
            BookingError::SessionClosed
            | BookingError::NotAtPaymentStep
            | BookingError::Rejected(_) => AppError::Conflict(err.to_string()),
            BookingError::Step(_)
            | BookingError::Draft(_)
            | BookingError::Incomplete(_) => AppError::ValidationError(err.to_string()),
            BookingError::FamilyLookupFailed(_)
            | BookingError::SubmissionFailed(_) => AppError::ExternalService(err.to_string()),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::InvalidStatusTransition { .. } => AppError::Conflict(err.to_string()),
            AppointmentError::CancellationNotConfirmed => AppError::BadRequest(err.to_string()),
            AppointmentError::Backend(inner) => into_app_error(inner),
        }
    }
}
