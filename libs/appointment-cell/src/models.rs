// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{NaiveDate, NaiveTime};
use std::fmt;

use doctor_cell::models::{PriceQuote, SlotQuery};

// ==============================================================================
// BOOKING WIZARD
// ==============================================================================

/// The five wizard steps, numbered from 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    ClinicSelect = 1,
    DateTime = 2,
    PatientSelect = 3,
    Review = 4,
    Payment = 5,
}

impl BookingStep {
    pub const FIRST: BookingStep = BookingStep::ClinicSelect;
    pub const LAST: BookingStep = BookingStep::Payment;

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(BookingStep::ClinicSelect),
            2 => Some(BookingStep::DateTime),
            3 => Some(BookingStep::PatientSelect),
            4 => Some(BookingStep::Review),
            5 => Some(BookingStep::Payment),
            _ => None,
        }
    }

    /// The following step, saturating at the last one.
    pub fn next(self) -> Self {
        Self::from_number(self.number() + 1).unwrap_or(Self::LAST)
    }

    /// The preceding step, saturating at the first one.
    pub fn prev(self) -> Self {
        Self::from_number(self.number().saturating_sub(1)).unwrap_or(Self::FIRST)
    }
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStep::ClinicSelect => write!(f, "Select Clinic"),
            BookingStep::DateTime => write!(f, "Date & Time"),
            BookingStep::PatientSelect => write!(f, "Patient Details"),
            BookingStep::Review => write!(f, "Review"),
            BookingStep::Payment => write!(f, "Payment"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    PayAtClinic,
    Online,
}

// ==============================================================================
// APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub branch_id: Uuid,
    pub family_member_id: Option<Uuid>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Rejected,
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Rejected => write!(f, "rejected"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

/// Decision taken by clinic staff on an appointment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdminDecision {
    Approve,
    Reject,
    Complete,
    NoShow,
}

impl AdminDecision {
    pub fn target_status(self) -> AppointmentStatus {
        match self {
            AdminDecision::Approve => AppointmentStatus::Confirmed,
            AdminDecision::Reject => AppointmentStatus::Rejected,
            AdminDecision::Complete => AppointmentStatus::Completed,
            AdminDecision::NoShow => AppointmentStatus::NoShow,
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Payload posted to the booking endpoint when the wizard is submitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub branch_id: Uuid,
    pub doctor_clinic_id: Option<Uuid>,
    pub slot_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub family_member_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingReceipt {
    pub status: bool,
    pub id: Option<Uuid>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Display-only summary shown once a booking succeeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingConfirmation {
    pub appointment_id: Option<Uuid>,
    pub doctor_name: String,
    pub clinic_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub patient: String,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    #[serde(default)]
    pub confirmed: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessAppointmentRequest {
    pub decision: AdminDecision,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartBookingRequest {
    pub doctor_id: Uuid,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectBranchRequest {
    pub branch_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectDateRequest {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectSlotRequest {
    pub slot_id: Uuid,
}

/// `member_id: null` books for the account holder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectFamilyMemberRequest {
    pub member_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectPaymentMethodRequest {
    pub payment_method: PaymentMethod,
}

/// Result of the lookups a draft change kicked off.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LookupSummary {
    pub slot_query: Option<SlotQuery>,
    pub slots_applied: bool,
    pub slot_fetch_error: Option<String>,
    pub doctor_clinic_resolved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub confirmation: BookingConfirmation,
    pub quote: Option<PriceQuote>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_numbers_round_trip() {
        for number in 1..=5 {
            let step = BookingStep::from_number(number).unwrap();
            assert_eq!(step.number(), number);
        }
        assert_eq!(BookingStep::from_number(0), None);
        assert_eq!(BookingStep::from_number(6), None);
    }

    #[test]
    fn test_step_navigation_saturates() {
        assert_eq!(BookingStep::Payment.next(), BookingStep::Payment);
        assert_eq!(BookingStep::ClinicSelect.prev(), BookingStep::ClinicSelect);
        assert_eq!(BookingStep::DateTime.next(), BookingStep::PatientSelect);
        assert_eq!(BookingStep::Review.prev(), BookingStep::PatientSelect);
    }

    #[test]
    fn test_admin_decisions_map_to_statuses() {
        assert_eq!(AdminDecision::Approve.target_status(), AppointmentStatus::Confirmed);
        assert_eq!(AdminDecision::Reject.target_status(), AppointmentStatus::Rejected);
        assert_eq!(AdminDecision::NoShow.target_status(), AppointmentStatus::NoShow);
    }

    #[test]
    fn test_payment_method_defaults_to_clinic() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::PayAtClinic);
    }
}
