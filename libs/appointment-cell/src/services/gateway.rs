use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use doctor_cell::models::{Doctor, DoctorClinic, Slot, SlotQuery};
use doctor_cell::services::{AvailabilityService, DoctorService};
use patient_cell::models::{CreateFamilyMemberRequest, FamilyMember};
use patient_cell::services::FamilyService;
use shared_config::AppConfig;

use crate::models::{BookAppointmentRequest, BookingReceipt};
use crate::services::appointments::AppointmentService;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SlotSource: Send + Sync {
    async fn fetch_slots(&self, query: &SlotQuery, auth_token: &str) -> Result<Vec<Slot>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClinicDirectory: Send + Sync {
    async fn doctor(&self, doctor_id: Uuid, auth_token: &str) -> Result<Doctor>;

    async fn doctor_clinic(&self, doctor_id: Uuid, branch_id: Uuid, auth_token: &str) -> Result<DoctorClinic>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait FamilyDirectory: Send + Sync {
    async fn list_members(&self, auth_token: &str) -> Result<Vec<FamilyMember>>;

    async fn create_member(&self, request: CreateFamilyMemberRequest, auth_token: &str) -> Result<FamilyMember>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AppointmentGateway: Send + Sync {
    async fn book(&self, request: &BookAppointmentRequest, auth_token: &str) -> Result<BookingReceipt>;
}

#[async_trait]
impl SlotSource for AvailabilityService {
    async fn fetch_slots(&self, query: &SlotQuery, auth_token: &str) -> Result<Vec<Slot>> {
        self.get_slots(query, auth_token).await
    }
}

#[async_trait]
impl ClinicDirectory for DoctorService {
    async fn doctor(&self, doctor_id: Uuid, auth_token: &str) -> Result<Doctor> {
        self.get_doctor(doctor_id, auth_token).await
    }

    async fn doctor_clinic(&self, doctor_id: Uuid, branch_id: Uuid, auth_token: &str) -> Result<DoctorClinic> {
        self.get_doctor_clinic(doctor_id, branch_id, auth_token).await
    }
}

#[async_trait]
impl FamilyDirectory for FamilyService {
    async fn list_members(&self, auth_token: &str) -> Result<Vec<FamilyMember>> {
        FamilyService::list_members(self, auth_token).await
    }

    async fn create_member(&self, request: CreateFamilyMemberRequest, auth_token: &str) -> Result<FamilyMember> {
        FamilyService::create_member(self, request, auth_token).await
    }
}

#[async_trait]
impl AppointmentGateway for AppointmentService {
    async fn book(&self, request: &BookAppointmentRequest, auth_token: &str) -> Result<BookingReceipt> {
        self.book_appointment(request, auth_token).await
    }
}

/// Backend collaborators a booking session talks to, wired once at startup.
#[derive(Clone)]
pub struct BookingGateways {
    pub slots: Arc<dyn SlotSource>,
    pub clinics: Arc<dyn ClinicDirectory>,
    pub family: Arc<dyn FamilyDirectory>,
    pub appointments: Arc<dyn AppointmentGateway>,
}

impl BookingGateways {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            slots: Arc::new(AvailabilityService::new(config)),
            clinics: Arc::new(DoctorService::new(config)),
            family: Arc::new(FamilyService::new(config)),
            appointments: Arc::new(AppointmentService::new(config)),
        }
    }
}
