// libs/appointment-cell/src/services/session.rs
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use doctor_cell::models::{Doctor, DoctorClinic, SlotQuery};
use patient_cell::models::CreateFamilyMemberRequest;

use crate::error::{BookingError, DraftError, StepError};
use crate::models::{BookingConfirmation, BookingStep, LookupSummary, PaymentMethod};
use crate::services::draft::{BookingDraft, DraftAction};
use crate::services::family::{FamilyCreateOutcome, FamilyMemberFlow};
use crate::services::gateway::{BookingGateways, ClinicDirectory};
use crate::services::sequencer::{StepSequencer, StepValidator};
use crate::services::slots::{SlotBoard, SlotFetchOutcome, SlotFetcher, SlotTicket};

/// Lookups a draft change requires, detached from the session so they can
/// run without holding the session lock.
pub struct PendingLookup {
    fetcher: Arc<SlotFetcher>,
    clinics: Option<Arc<dyn ClinicDirectory>>,
    ticket: Option<SlotTicket>,
}

#[derive(Debug, Default)]
pub struct LookupResult {
    query: Option<SlotQuery>,
    slots: Option<SlotFetchOutcome>,
    doctor_clinic: Option<anyhow::Result<DoctorClinic>>,
}

impl PendingLookup {
    pub fn query(&self) -> Option<SlotQuery> {
        self.ticket.map(|ticket| ticket.query)
    }

    pub async fn run(self, auth_token: &str) -> LookupResult {
        let Some(ticket) = self.ticket else {
            return LookupResult::default();
        };
        let query = ticket.query;

        match self.clinics {
            Some(clinics) => {
                let (slots, doctor_clinic) = futures::join!(
                    self.fetcher.refresh(ticket, auth_token),
                    clinics.doctor_clinic(query.doctor_id, query.branch_id, auth_token),
                );
                LookupResult {
                    query: Some(query),
                    slots: Some(slots),
                    doctor_clinic: Some(doctor_clinic),
                }
            }
            None => LookupResult {
                query: Some(query),
                slots: Some(self.fetcher.refresh(ticket, auth_token).await),
                doctor_clinic: None,
            },
        }
    }
}

/// Snapshot of a session returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub step: BookingStep,
    pub step_number: u8,
    pub step_title: String,
    pub closed: bool,
    pub draft: BookingDraft,
    pub slots: SlotBoard,
    pub family: FamilyMemberFlow,
    pub confirmation: Option<BookingConfirmation>,
}

/// One run of the booking wizard for one doctor.
pub struct BookingSession {
    id: Uuid,
    draft: BookingDraft,
    sequencer: StepSequencer,
    family: FamilyMemberFlow,
    slots: Arc<SlotFetcher>,
    gateways: BookingGateways,
    closed: bool,
    confirmation: Option<BookingConfirmation>,
}

impl BookingSession {
    /// Open a session on `doctor`. The returned lookup loads the board for
    /// the doctor's first branch on `today`.
    pub fn start(doctor: Doctor, today: NaiveDate, gateways: BookingGateways) -> (Self, PendingLookup) {
        let id = Uuid::new_v4();
        let initial_query = doctor.primary_branch().map(|branch| SlotQuery {
            doctor_id: doctor.id,
            branch_id: branch.id,
            date: today,
        });
        if initial_query.is_none() {
            warn!("Doctor {} has no branches; booking session {} starts with an empty board", doctor.id, id);
        }

        info!("Starting booking session {} for doctor {}", id, doctor.id);

        let slots = Arc::new(SlotFetcher::new(Arc::clone(&gateways.slots)));
        let session = Self {
            id,
            draft: BookingDraft::for_doctor(doctor, today),
            sequencer: StepSequencer::new(),
            family: FamilyMemberFlow::default(),
            slots: Arc::clone(&slots),
            gateways,
            closed: false,
            confirmation: None,
        };
        let pending = PendingLookup {
            ticket: initial_query.map(|query| slots.issue(query)),
            fetcher: slots,
            clinics: None,
        };

        (session, pending)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn current_step(&self) -> BookingStep {
        self.sequencer.current()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<(), BookingError> {
        if self.closed {
            return Err(BookingError::SessionClosed);
        }
        Ok(())
    }

    /// Apply one draft action and hand back the lookups it requires. A slot
    /// query is ticketed here, so the last selection made owns the board no
    /// matter which lookup finishes first.
    pub fn dispatch(&mut self, action: DraftAction) -> Result<PendingLookup, BookingError> {
        self.ensure_open()?;
        debug!("Session {} dispatching {:?}", self.id, action);

        let is_branch_change = matches!(action, DraftAction::SelectBranch(_));
        let query = self.draft.apply(action)?;
        let clinics = if is_branch_change && self.draft.doctor_clinic.is_none() {
            Some(Arc::clone(&self.gateways.clinics))
        } else {
            None
        };

        Ok(PendingLookup {
            fetcher: Arc::clone(&self.slots),
            clinics,
            ticket: query.map(|query| self.slots.issue(query)),
        })
    }

    pub fn begin_branch_selection(&mut self, branch_id: Uuid) -> Result<PendingLookup, BookingError> {
        self.ensure_open()?;
        let branch = self.draft
            .doctor
            .as_ref()
            .ok_or(DraftError::NoDoctor)?
            .branch(branch_id)
            .cloned()
            .ok_or(DraftError::UnknownBranch(branch_id))?;

        self.dispatch(DraftAction::SelectBranch(branch))
    }

    pub fn begin_date_selection(&mut self, date: NaiveDate) -> Result<PendingLookup, BookingError> {
        self.dispatch(DraftAction::SelectDate(date))
    }

    /// Fold the results of a finished lookup back into the draft.
    pub fn finish_lookup(&mut self, result: LookupResult) -> LookupSummary {
        let mut summary = LookupSummary {
            slot_query: result.query,
            ..LookupSummary::default()
        };

        match result.slots {
            Some(SlotFetchOutcome::Applied { .. }) => summary.slots_applied = true,
            Some(SlotFetchOutcome::Failed { reason, .. }) => summary.slot_fetch_error = Some(reason),
            Some(SlotFetchOutcome::Stale { generation }) => {
                debug!("Session {} ignoring stale slot fetch #{}", self.id, generation);
            }
            None => {}
        }

        if self.closed {
            return summary;
        }

        match result.doctor_clinic {
            Some(Ok(doctor_clinic)) => match self.draft.apply(DraftAction::SetDoctorClinic(doctor_clinic)) {
                Ok(_) => summary.doctor_clinic_resolved = true,
                Err(e) => debug!("Session {} discarding doctor clinic: {}", self.id, e),
            },
            Some(Err(e)) => warn!("Session {} could not resolve doctor clinic: {}", self.id, e),
            None => {}
        }

        summary
    }

    #[instrument(skip(self, auth_token), fields(session_id = %self.id))]
    pub async fn select_branch(&mut self, branch_id: Uuid, auth_token: &str) -> Result<LookupSummary, BookingError> {
        let pending = self.begin_branch_selection(branch_id)?;
        let result = pending.run(auth_token).await;
        Ok(self.finish_lookup(result))
    }

    #[instrument(skip(self, auth_token), fields(session_id = %self.id))]
    pub async fn select_date(&mut self, date: NaiveDate, auth_token: &str) -> Result<LookupSummary, BookingError> {
        let pending = self.begin_date_selection(date)?;
        let result = pending.run(auth_token).await;
        Ok(self.finish_lookup(result))
    }

    /// Pick a slot from the board currently shown for the selected branch and date.
    pub async fn select_slot(&mut self, slot_id: Uuid) -> Result<(), BookingError> {
        self.ensure_open()?;
        let query = self.draft.slot_query().ok_or(DraftError::NoBranch)?;
        let slot = self.slots
            .find_slot(&query, slot_id)
            .await
            .ok_or(BookingError::SlotNotFound(slot_id))?;

        self.dispatch(DraftAction::SelectSlot(slot))?;
        Ok(())
    }

    /// `None` books for the account holder. Unknown ids trigger one reload
    /// of the dependent list before giving up.
    pub async fn select_family_member(
        &mut self,
        member_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<(), BookingError> {
        self.ensure_open()?;
        let member = match member_id {
            None => None,
            Some(id) => {
                if self.family.find(id).is_none() {
                    self.family.reload(self.gateways.family.as_ref(), auth_token).await?;
                }
                Some(self.family.find(id).cloned().ok_or(BookingError::FamilyMemberNotFound(id))?)
            }
        };

        self.dispatch(DraftAction::SelectFamilyMember(member))?;
        Ok(())
    }

    pub async fn reload_family_members(&mut self, auth_token: &str) -> Result<usize, BookingError> {
        self.ensure_open()?;
        self.family.reload(self.gateways.family.as_ref(), auth_token).await
    }

    pub fn open_family_dialog(&mut self) -> Result<(), BookingError> {
        self.ensure_open()?;
        self.family.open_create_dialog();
        Ok(())
    }

    pub async fn create_family_member(
        &mut self,
        form: CreateFamilyMemberRequest,
        auth_token: &str,
    ) -> Result<FamilyCreateOutcome, BookingError> {
        self.ensure_open()?;
        Ok(self.family.create_member(self.gateways.family.as_ref(), form, auth_token).await)
    }

    pub fn select_payment_method(&mut self, method: PaymentMethod) -> Result<(), BookingError> {
        self.dispatch(DraftAction::SelectPaymentMethod(method))?;
        Ok(())
    }

    pub fn next_step(&mut self) -> Result<BookingStep, BookingError> {
        self.ensure_open()?;
        Ok(self.sequencer.next_step(&self.draft)?)
    }

    pub fn prev_step(&mut self) -> Result<BookingStep, BookingError> {
        self.ensure_open()?;
        Ok(self.sequencer.prev_step())
    }

    pub fn go_to_step(&mut self, step: u8) -> Result<BookingStep, BookingError> {
        self.ensure_open()?;
        Ok(self.sequencer.go_to_step(step, &self.draft)?)
    }

    /// Summary shown on the review step.
    pub fn review(&self) -> Option<BookingConfirmation> {
        self.draft.summary(None)
    }

    /// Post the draft. On success the session is reset and closed; on any
    /// failure draft and step are left as they were.
    #[instrument(skip(self, auth_token), fields(session_id = %self.id))]
    pub async fn submit(&mut self, auth_token: &str) -> Result<BookingConfirmation, BookingError> {
        self.ensure_open()?;
        if self.sequencer.current() != BookingStep::Payment {
            return Err(BookingError::NotAtPaymentStep);
        }

        for step in [BookingStep::ClinicSelect, BookingStep::DateTime, BookingStep::PatientSelect] {
            self.draft.validate(step).map_err(BookingError::Incomplete)?;
        }

        let request = self.draft
            .to_request()
            .ok_or(BookingError::Incomplete(StepError::DateTimeRequired))?;

        let receipt = match self.gateways.appointments.book(&request, auth_token).await {
            Ok(receipt) => receipt,
            Err(e) => {
                error!("Booking submission failed for session {}: {}", self.id, e);
                return Err(BookingError::SubmissionFailed(e.to_string()));
            }
        };

        if !receipt.status {
            let message = receipt
                .message
                .unwrap_or_else(|| "Failed to book appointment".to_string());
            error!("Booking rejected for session {}: {}", self.id, message);
            return Err(BookingError::Rejected(message));
        }

        let confirmation = self.draft
            .summary(receipt.id)
            .ok_or(BookingError::Incomplete(StepError::DateTimeRequired))?;

        info!("Session {} booked appointment {:?}", self.id, receipt.id);
        self.confirmation = Some(confirmation.clone());
        self.close().await;

        Ok(confirmation)
    }

    /// Discard the draft and stop accepting actions.
    pub async fn close(&mut self) {
        if let Err(e) = self.draft.apply(DraftAction::Reset) {
            warn!("Failed to reset draft for session {}: {}", self.id, e);
        }
        self.sequencer.reset();
        self.family = FamilyMemberFlow::default();
        self.slots.clear().await;
        self.closed = true;
        debug!("Session {} closed", self.id);
    }

    pub async fn view(&self) -> SessionView {
        let step = self.sequencer.current();
        SessionView {
            id: self.id,
            step,
            step_number: step.number(),
            step_title: step.to_string(),
            closed: self.closed,
            draft: self.draft.clone(),
            slots: self.slots.board().await,
            family: self.family.clone(),
            confirmation: self.confirmation.clone(),
        }
    }
}
