use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use doctor_cell::models::{Branch, Doctor, DoctorClinic, Slot, SlotQuery};
use patient_cell::models::FamilyMember;

use crate::error::DraftError;
use crate::models::{AppointmentStatus, BookAppointmentRequest, BookingConfirmation, PaymentMethod};

/// In-progress appointment assembled by the booking wizard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookingDraft {
    pub doctor: Option<Doctor>,
    pub branch: Option<Branch>,
    pub date: Option<NaiveDate>,
    pub slot: Option<Slot>,
    /// `None` books for the account holder.
    pub family_member: Option<FamilyMember>,
    pub doctor_clinic: Option<DoctorClinic>,
    pub payment_method: PaymentMethod,
    pub id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DraftAction {
    SelectBranch(Branch),
    SelectDate(NaiveDate),
    SelectSlot(Slot),
    SelectFamilyMember(Option<FamilyMember>),
    SelectPaymentMethod(PaymentMethod),
    SetDoctorClinic(DoctorClinic),
    Reset,
}

impl BookingDraft {
    pub fn for_doctor(doctor: Doctor, date: NaiveDate) -> Self {
        Self {
            doctor: Some(doctor),
            date: Some(date),
            ..Self::default()
        }
    }

    /// Apply one action. Returns the slot board the change requires, if any.
    pub fn apply(&mut self, action: DraftAction) -> Result<Option<SlotQuery>, DraftError> {
        match action {
            DraftAction::SelectBranch(branch) => {
                let doctor = self.doctor.as_ref().ok_or(DraftError::NoDoctor)?;
                if doctor.branch(branch.id).is_none() {
                    return Err(DraftError::UnknownBranch(branch.id));
                }

                let changed = self.branch.as_ref().map(|b| b.id) != Some(branch.id);
                if changed {
                    if self.slot.take().is_some() {
                        debug!("Cleared slot bound to previous branch");
                    }
                    self.doctor_clinic = None;
                }
                self.branch = Some(branch);
                Ok(self.slot_query())
            }
            DraftAction::SelectDate(date) => {
                if self.slot.as_ref().is_some_and(|slot| slot.date != date) {
                    self.slot = None;
                }
                self.date = Some(date);
                Ok(self.slot_query())
            }
            DraftAction::SelectSlot(slot) => {
                let branch = self.branch.as_ref().ok_or(DraftError::NoBranch)?;
                if slot.branch_id != branch.id {
                    return Err(DraftError::SlotBranchMismatch { slot_id: slot.id });
                }
                if !slot.available {
                    return Err(DraftError::SlotUnavailable(slot.id));
                }
                debug!("Selected slot {} at branch {}", slot.label(), branch.name);
                self.date = Some(slot.date);
                self.slot = Some(slot);
                Ok(None)
            }
            DraftAction::SelectFamilyMember(member) => {
                self.family_member = member;
                Ok(None)
            }
            DraftAction::SelectPaymentMethod(method) => {
                self.payment_method = method;
                Ok(None)
            }
            DraftAction::SetDoctorClinic(doctor_clinic) => {
                let matches_branch = self.branch.as_ref().map(|b| b.id) == Some(doctor_clinic.branch_id);
                let matches_doctor = self.doctor.as_ref().map(|d| d.id) == Some(doctor_clinic.doctor_id);
                if !matches_branch || !matches_doctor {
                    return Err(DraftError::StaleDoctorClinic);
                }
                self.doctor_clinic = Some(doctor_clinic);
                Ok(None)
            }
            DraftAction::Reset => {
                *self = Self::default();
                Ok(None)
            }
        }
    }

    /// The board matching the current doctor, branch and date.
    pub fn slot_query(&self) -> Option<SlotQuery> {
        Some(SlotQuery {
            doctor_id: self.doctor.as_ref()?.id,
            branch_id: self.branch.as_ref()?.id,
            date: self.date?,
        })
    }

    pub fn patient_label(&self) -> String {
        self.family_member
            .as_ref()
            .map(|member| member.full_name.clone())
            .unwrap_or_else(|| "Self".to_string())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Payload for the booking endpoint, once doctor, branch and slot are set.
    pub fn to_request(&self) -> Option<BookAppointmentRequest> {
        let doctor = self.doctor.as_ref()?;
        let branch = self.branch.as_ref()?;
        let slot = self.slot.as_ref()?;

        Some(BookAppointmentRequest {
            doctor_id: doctor.id,
            branch_id: branch.id,
            doctor_clinic_id: self.doctor_clinic.as_ref().map(|dc| dc.id),
            slot_id: slot.id,
            date: slot.date,
            start_time: slot.start_time,
            family_member_id: self.family_member.as_ref().map(|m| m.id),
            payment_method: self.payment_method,
        })
    }

    pub fn summary(&self, appointment_id: Option<Uuid>) -> Option<BookingConfirmation> {
        let doctor = self.doctor.as_ref()?;
        let branch = self.branch.as_ref()?;
        let slot = self.slot.as_ref()?;

        Some(BookingConfirmation {
            appointment_id,
            doctor_name: doctor.full_name.clone(),
            clinic_name: branch.name.clone(),
            date: slot.date,
            start_time: slot.start_time,
            patient: self.patient_label(),
            payment_method: self.payment_method,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveTime;

    fn branch(name: &str) -> Branch {
        Branch { id: Uuid::new_v4(), name: name.to_string(), address: None, city: None }
    }

    fn doctor_with(branches: Vec<Branch>) -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            full_name: "Dr. Iyer".to_string(),
            specialization: "Pediatrics".to_string(),
            languages: vec!["English".to_string()],
            branches,
        }
    }

    fn slot_at(branch: &Branch, date: NaiveDate) -> Slot {
        Slot {
            id: Uuid::new_v4(),
            branch_id: branch.id,
            date,
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 15, 0).unwrap(),
            available: true,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn test_select_branch_requests_slot_board() {
        let b1 = branch("Indiranagar");
        let doctor = doctor_with(vec![b1.clone()]);
        let doctor_id = doctor.id;
        let mut draft = BookingDraft::for_doctor(doctor, today());

        let query = draft.apply(DraftAction::SelectBranch(b1.clone())).unwrap();

        assert_eq!(query, Some(SlotQuery { doctor_id, branch_id: b1.id, date: today() }));
        assert_eq!(draft.branch, Some(b1));
    }

    #[test]
    fn test_branch_change_clears_slot_and_clinic() {
        let b1 = branch("Indiranagar");
        let b2 = branch("Koramangala");
        let doctor = doctor_with(vec![b1.clone(), b2.clone()]);
        let doctor_id = doctor.id;
        let mut draft = BookingDraft::for_doctor(doctor, today());

        draft.apply(DraftAction::SelectBranch(b1.clone())).unwrap();
        draft.apply(DraftAction::SelectSlot(slot_at(&b1, today()))).unwrap();
        draft.apply(DraftAction::SetDoctorClinic(DoctorClinic {
            id: Uuid::new_v4(),
            doctor_id,
            branch_id: b1.id,
            consultation_fee: 400.0,
        })).unwrap();

        draft.apply(DraftAction::SelectBranch(b2)).unwrap();

        assert!(draft.slot.is_none());
        assert!(draft.doctor_clinic.is_none());
    }

    #[test]
    fn test_reselecting_same_branch_keeps_slot() {
        let b1 = branch("Indiranagar");
        let mut draft = BookingDraft::for_doctor(doctor_with(vec![b1.clone()]), today());

        draft.apply(DraftAction::SelectBranch(b1.clone())).unwrap();
        let slot = slot_at(&b1, today());
        draft.apply(DraftAction::SelectSlot(slot.clone())).unwrap();
        let query = draft.apply(DraftAction::SelectBranch(b1)).unwrap();

        assert!(query.is_some());
        assert_eq!(draft.slot, Some(slot));
    }

    #[test]
    fn test_unknown_branch_is_rejected() {
        let mut draft = BookingDraft::for_doctor(doctor_with(vec![branch("A")]), today());
        let stranger = branch("Elsewhere");

        assert_eq!(
            draft.apply(DraftAction::SelectBranch(stranger.clone())),
            Err(DraftError::UnknownBranch(stranger.id))
        );
    }

    #[test]
    fn test_slot_from_other_branch_is_rejected() {
        let b1 = branch("A");
        let b2 = branch("B");
        let mut draft = BookingDraft::for_doctor(doctor_with(vec![b1.clone(), b2.clone()]), today());
        draft.apply(DraftAction::SelectBranch(b1)).unwrap();

        let foreign = slot_at(&b2, today());
        assert_matches!(
            draft.apply(DraftAction::SelectSlot(foreign)),
            Err(DraftError::SlotBranchMismatch { .. })
        );
        assert!(draft.slot.is_none());
    }

    #[test]
    fn test_slot_requires_branch() {
        let b1 = branch("A");
        let mut draft = BookingDraft::for_doctor(doctor_with(vec![b1.clone()]), today());

        assert_eq!(
            draft.apply(DraftAction::SelectSlot(slot_at(&b1, today()))),
            Err(DraftError::NoBranch)
        );
    }

    #[test]
    fn test_date_change_drops_slot_on_other_day() {
        let b1 = branch("A");
        let mut draft = BookingDraft::for_doctor(doctor_with(vec![b1.clone()]), today());
        draft.apply(DraftAction::SelectBranch(b1.clone())).unwrap();
        draft.apply(DraftAction::SelectSlot(slot_at(&b1, today()))).unwrap();

        let tomorrow = today().succ_opt().unwrap();
        let query = draft.apply(DraftAction::SelectDate(tomorrow)).unwrap();

        assert_eq!(query.map(|q| q.date), Some(tomorrow));
        assert!(draft.slot.is_none());
    }

    #[test]
    fn test_date_change_without_branch_fetches_nothing() {
        let mut draft = BookingDraft::for_doctor(doctor_with(vec![branch("A")]), today());
        let query = draft.apply(DraftAction::SelectDate(today().succ_opt().unwrap())).unwrap();
        assert_eq!(query, None);
    }

    #[test]
    fn test_stale_doctor_clinic_is_rejected() {
        let b1 = branch("A");
        let b2 = branch("B");
        let doctor = doctor_with(vec![b1.clone(), b2.clone()]);
        let doctor_id = doctor.id;
        let mut draft = BookingDraft::for_doctor(doctor, today());
        draft.apply(DraftAction::SelectBranch(b2)).unwrap();

        let for_b1 = DoctorClinic { id: Uuid::new_v4(), doctor_id, branch_id: b1.id, consultation_fee: 0.0 };
        assert_eq!(draft.apply(DraftAction::SetDoctorClinic(for_b1)), Err(DraftError::StaleDoctorClinic));
    }

    #[test]
    fn test_reset_empties_every_field() {
        let b1 = branch("A");
        let mut draft = BookingDraft::for_doctor(doctor_with(vec![b1.clone()]), today());
        draft.apply(DraftAction::SelectBranch(b1.clone())).unwrap();
        draft.apply(DraftAction::SelectSlot(slot_at(&b1, today()))).unwrap();
        draft.apply(DraftAction::SelectPaymentMethod(PaymentMethod::Online)).unwrap();

        draft.apply(DraftAction::Reset).unwrap();

        assert!(draft.is_empty());
        assert!(draft.doctor.is_none());
        assert!(draft.branch.is_none());
        assert!(draft.slot.is_none());
        assert!(draft.family_member.is_none());
    }

    #[test]
    fn test_patient_label_defaults_to_self() {
        let mut draft = BookingDraft::default();
        assert_eq!(draft.patient_label(), "Self");

        draft.apply(DraftAction::SelectFamilyMember(Some(FamilyMember {
            id: Uuid::new_v4(),
            full_name: "Anya".to_string(),
            relation: "child".to_string(),
            date_of_birth: None,
            gender: None,
        }))).unwrap();
        assert_eq!(draft.patient_label(), "Anya");
    }

    #[test]
    fn test_request_carries_selection() {
        let b1 = branch("A");
        let mut draft = BookingDraft::for_doctor(doctor_with(vec![b1.clone()]), today());
        assert!(draft.to_request().is_none());

        draft.apply(DraftAction::SelectBranch(b1.clone())).unwrap();
        let slot = slot_at(&b1, today());
        draft.apply(DraftAction::SelectSlot(slot.clone())).unwrap();

        let request = draft.to_request().unwrap();
        assert_eq!(request.slot_id, slot.id);
        assert_eq!(request.branch_id, b1.id);
        assert_eq!(request.family_member_id, None);
        assert_eq!(request.payment_method, PaymentMethod::PayAtClinic);
    }
}
