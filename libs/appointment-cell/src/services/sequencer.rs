use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StepError;
use crate::models::BookingStep;
use crate::services::draft::BookingDraft;

/// Gate checked before the wizard may leave a step going forward.
pub trait StepValidator {
    fn validate(&self, step: BookingStep) -> Result<(), StepError>;
}

impl StepValidator for BookingDraft {
    fn validate(&self, step: BookingStep) -> Result<(), StepError> {
        match step {
            BookingStep::ClinicSelect if self.branch.is_none() => Err(StepError::ClinicRequired),
            BookingStep::DateTime if self.slot.is_none() => Err(StepError::DateTimeRequired),
            // No family member selected means the account holder is the patient.
            BookingStep::PatientSelect if self.family_member.is_none() => Ok(()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepSequencer {
    current: BookingStep,
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self { current: BookingStep::FIRST }
    }
}

impl StepSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> BookingStep {
        self.current
    }

    pub fn validate_current_step<V: StepValidator + ?Sized>(&self, validator: &V) -> Result<(), StepError> {
        validator.validate(self.current)
    }

    /// Jump to `target`. Moving back or staying put is free; moving forward
    /// requires the current step to validate.
    pub fn go_to_step<V: StepValidator + ?Sized>(
        &mut self,
        target: u8,
        validator: &V,
    ) -> Result<BookingStep, StepError> {
        let step = BookingStep::from_number(target).ok_or(StepError::OutOfRange(target))?;

        if step > self.current {
            if let Err(e) = self.validate_current_step(validator) {
                warn!("Blocked jump from step {} to {}: {}", self.current.number(), target, e);
                return Err(e);
            }
        }

        debug!("Moving from step {} to {}", self.current.number(), step.number());
        self.current = step;
        Ok(step)
    }

    pub fn next_step<V: StepValidator + ?Sized>(&mut self, validator: &V) -> Result<BookingStep, StepError> {
        self.validate_current_step(validator)?;
        self.current = self.current.next();
        Ok(self.current)
    }

    pub fn prev_step(&mut self) -> BookingStep {
        self.current = self.current.prev();
        self.current
    }

    pub fn reset(&mut self) {
        self.current = BookingStep::FIRST;
    }
}
