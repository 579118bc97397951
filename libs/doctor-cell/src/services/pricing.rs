use anyhow::{Result, anyhow};
use reqwest::Method;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::BackendClient;

use crate::models::{CostBreakdown, PriceQuote};

pub struct PricingService {
    backend: BackendClient,
}

impl PricingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    pub async fn get_cost_breakdown(
        &self,
        doctor_clinic_id: Uuid,
        auth_token: &str,
    ) -> Result<CostBreakdown> {
        debug!("Fetching cost breakdown for doctor clinic: {}", doctor_clinic_id);

        let path = format!("/doctor-clinics/{}/cost", doctor_clinic_id);
        let breakdown: CostBreakdown = self.backend
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Self::validate_breakdown(&breakdown)?;
        Ok(breakdown)
    }

    /// Cost breakdown plus the total shown on the review step.
    pub async fn quote(&self, doctor_clinic_id: Uuid, auth_token: &str) -> Result<PriceQuote> {
        let breakdown = self.get_cost_breakdown(doctor_clinic_id, auth_token).await?;
        let total = breakdown.total();

        info!("Quoted ₹{:.2} for doctor clinic {}", total, doctor_clinic_id);

        Ok(PriceQuote {
            doctor_clinic_id,
            breakdown,
            total,
        })
    }

    fn validate_breakdown(breakdown: &CostBreakdown) -> Result<()> {
        let parts = [
            ("consultation fee", breakdown.consultation_fee),
            ("platform fee", breakdown.platform_fee),
            ("GST", breakdown.gst),
        ];

        for (name, amount) in parts {
            if !amount.is_finite() || amount < 0.0 {
                return Err(anyhow!("Invalid {} in cost breakdown: {}", name, amount));
            }
        }

        Ok(())
    }
}
