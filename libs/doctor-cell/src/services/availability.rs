use anyhow::Result;
use reqwest::Method;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::BackendClient;

use crate::models::{Slot, SlotQuery};

pub struct AvailabilityService {
    backend: BackendClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    /// Fetch the bookable slots of a doctor at one branch on one date.
    pub async fn get_slots(&self, query: &SlotQuery, auth_token: &str) -> Result<Vec<Slot>> {
        debug!("Fetching slots for doctor {} at branch {} on {}",
               query.doctor_id, query.branch_id, query.date);

        let path = format!(
            "/doctors/{}/branches/{}/slots?date={}",
            query.doctor_id,
            query.branch_id,
            query.date.format("%Y-%m-%d"),
        );

        let slots: Vec<Slot> = self.backend
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        debug!("Found {} slots", slots.len());
        Ok(slots)
    }
}
