use anyhow::{Result, anyhow};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::BackendClient;

use crate::models::{CreateFamilyMemberRequest, FamilyMember};

pub struct FamilyService {
    backend: BackendClient,
}

impl FamilyService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    pub async fn list_members(&self, auth_token: &str) -> Result<Vec<FamilyMember>> {
        debug!("Fetching family members");

        let members: Vec<FamilyMember> = self.backend
            .request(Method::GET, "/patients/me/relations", Some(auth_token), None)
            .await?;

        Ok(members)
    }

    /// Register a dependent. The form is forwarded as entered; field checks
    /// are left to the backend.
    pub async fn create_member(
        &self,
        request: CreateFamilyMemberRequest,
        auth_token: &str,
    ) -> Result<FamilyMember> {
        if request.is_blank() {
            warn!("Submitting family member form with no fields filled in");
        }
        debug!("Creating family member: {:?}", request.relation);

        let body = serde_json::to_value(&request)?;
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Value = self.backend.request_with_headers(
            Method::POST,
            "/patients/me/relations",
            Some(auth_token),
            Some(body),
            Some(headers),
        ).await?;

        // The relations endpoint answers with either the record or a one-element list.
        let record = match result {
            Value::Array(mut items) if !items.is_empty() => items.remove(0),
            Value::Array(_) => return Err(anyhow!("Failed to create family member")),
            other => other,
        };

        let member: FamilyMember = serde_json::from_value(record)?;
        debug!("Family member created with ID: {}", member.id);

        Ok(member)
    }
}
