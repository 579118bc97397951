use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::NaiveDate;

/// Profile of the signed-in account holder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A dependent patient linked to the account holder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FamilyMember {
    pub id: Uuid,
    pub full_name: String,
    pub relation: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
}

/// Form fields for registering a dependent. Fields default to empty and
/// are sent as entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateFamilyMemberRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub relation: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl CreateFamilyMemberRequest {
    pub fn is_blank(&self) -> bool {
        self.full_name.trim().is_empty()
            && self.relation.trim().is_empty()
            && self.date_of_birth.is_none()
            && self.gender.is_none()
            && self.phone.is_none()
    }
}
