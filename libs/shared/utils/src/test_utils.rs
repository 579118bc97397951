use std::sync::Arc;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;

pub const TEST_AUTH_TOKEN: &str = "test-auth-token";

pub struct TestConfig {
    pub clinic_api_url: String,
    pub clinic_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            clinic_api_url: "http://localhost:8080".to_string(),
            clinic_api_key: "test-api-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Points the config at a mock server.
    pub fn with_url(url: &str) -> Self {
        Self {
            clinic_api_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            clinic_api_url: self.clinic_api_url.clone(),
            clinic_api_key: self.clinic_api_key.clone(),
            clinic_api_timeout_secs: 5,
            booking_session_idle_secs: 600,
            server_port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct MockBackendResponses;

impl MockBackendResponses {
    pub fn branch_response(branch_id: &str, name: &str) -> serde_json::Value {
        json!({
            "id": branch_id,
            "name": name,
            "address": "12 Harbour Road",
            "city": "Dublin"
        })
    }

    pub fn doctor_response(doctor_id: &str, branch_ids: &[&str]) -> serde_json::Value {
        let branches: Vec<serde_json::Value> = branch_ids
            .iter()
            .enumerate()
            .map(|(i, id)| Self::branch_response(id, &format!("Branch {}", i + 1)))
            .collect();

        json!({
            "id": doctor_id,
            "full_name": "Dr. Test",
            "specialization": "General Practice",
            "languages": ["English", "Hindi"],
            "branches": branches
        })
    }

    pub fn doctor_clinic_response(id: &str, doctor_id: &str, branch_id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "branch_id": branch_id,
            "consultation_fee": 500.0
        })
    }

    pub fn slot_response(slot_id: &str, branch_id: &str, date: &str, start_time: &str) -> serde_json::Value {
        json!({
            "id": slot_id,
            "branch_id": branch_id,
            "date": date,
            "start_time": start_time,
            "end_time": "23:59:00",
            "available": true
        })
    }

    pub fn cost_breakdown_response() -> serde_json::Value {
        json!({
            "consultation_fee": 500.0,
            "platform_fee": 50.0,
            "gst": 99.0
        })
    }

    pub fn patient_response(patient_id: &str) -> serde_json::Value {
        json!({
            "id": patient_id,
            "full_name": "Test Patient",
            "email": "patient@example.com",
            "phone": null
        })
    }

    pub fn family_member_response(member_id: &str, full_name: &str) -> serde_json::Value {
        json!({
            "id": member_id,
            "full_name": full_name,
            "relation": "child",
            "date_of_birth": "2015-04-01",
            "gender": null
        })
    }

    pub fn booking_receipt_response(appointment_id: &str) -> serde_json::Value {
        json!({
            "status": true,
            "id": appointment_id,
            "message": "Appointment booked"
        })
    }

    pub fn appointment_response(appointment_id: &str, status: &str) -> serde_json::Value {
        let date = (Utc::now() + Duration::days(2)).date_naive();
        json!({
            "id": appointment_id,
            "patient_id": Uuid::new_v4(),
            "doctor_id": Uuid::new_v4(),
            "branch_id": Uuid::new_v4(),
            "family_member_id": null,
            "date": date.format("%Y-%m-%d").to_string(),
            "start_time": "10:00:00",
            "status": status,
            "payment_method": "pay_at_clinic"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "error": {
                "message": message,
                "code": code
            }
        })
    }
}
