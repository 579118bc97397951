use anyhow::Result;
use reqwest::Method;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::BackendClient;

use crate::models::PatientProfile;

pub struct PatientService {
    backend: BackendClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    pub async fn get_current_profile(&self, auth_token: &str) -> Result<PatientProfile> {
        debug!("Fetching current patient profile");

        let profile: PatientProfile = self.backend
            .request(Method::GET, "/patients/me", Some(auth_token), None)
            .await?;

        debug!("Loaded patient profile {}", profile.id);
        Ok(profile)
    }
}
