use anyhow::Result;
use reqwest::Method;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::BackendClient;

use crate::models::{Branch, Doctor, DoctorClinic, FilterOptions};

pub struct DoctorService {
    backend: BackendClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    pub async fn get_doctor(&self, doctor_id: Uuid, auth_token: &str) -> Result<Doctor> {
        debug!("Fetching doctor: {}", doctor_id);

        let path = format!("/doctors/{}", doctor_id);
        self.backend.request(Method::GET, &path, Some(auth_token), None).await
    }

    pub async fn get_clinic(&self, branch_id: Uuid, auth_token: &str) -> Result<Branch> {
        debug!("Fetching clinic: {}", branch_id);

        let path = format!("/clinics/{}", branch_id);
        self.backend.request(Method::GET, &path, Some(auth_token), None).await
    }

    /// Resolve the association record between a doctor and a branch.
    pub async fn get_doctor_clinic(
        &self,
        doctor_id: Uuid,
        branch_id: Uuid,
        auth_token: &str,
    ) -> Result<DoctorClinic> {
        debug!("Resolving doctor clinic for doctor {} at branch {}", doctor_id, branch_id);

        let path = format!("/doctors/{}/branches/{}/clinic", doctor_id, branch_id);
        self.backend.request(Method::GET, &path, Some(auth_token), None).await
    }

    /// Specialization and language lists used by the doctor search filters.
    pub async fn get_filter_options(&self, auth_token: &str) -> Result<FilterOptions> {
        debug!("Fetching doctor filter options");

        let (specializations, languages) = futures::try_join!(
            self.backend.request::<Vec<String>>(
                Method::GET,
                "/filters/specializations",
                Some(auth_token),
                None,
            ),
            self.backend.request::<Vec<String>>(
                Method::GET,
                "/filters/languages",
                Some(auth_token),
                None,
            ),
        )?;

        Ok(FilterOptions { specializations, languages })
    }
}
