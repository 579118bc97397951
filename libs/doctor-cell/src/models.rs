use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{NaiveDate, NaiveTime};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    pub id: Uuid,
    pub full_name: String,
    pub specialization: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub branches: Vec<Branch>,
}

impl Doctor {
    /// Branch used for the initial slot lookup when a booking starts.
    pub fn primary_branch(&self) -> Option<&Branch> {
        self.branches.first()
    }

    pub fn branch(&self, branch_id: Uuid) -> Option<&Branch> {
        self.branches.iter().find(|branch| branch.id == branch_id)
    }
}

/// A clinic location where a doctor practises.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
}

/// Association record between a doctor and one of their branches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorClinic {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub branch_id: Uuid,
    pub consultation_fee: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Slot {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl Slot {
    pub fn label(&self) -> String {
        format!("{} {}", self.date.format("%Y-%m-%d"), self.start_time.format("%H:%M"))
    }
}

/// Identifies one slot board: the slots of a doctor at a branch on a date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SlotQuery {
    pub doctor_id: Uuid,
    pub branch_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostBreakdown {
    pub consultation_fee: f64,
    pub platform_fee: f64,
    pub gst: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.consultation_fee + self.platform_fee + self.gst
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceQuote {
    pub doctor_clinic_id: Uuid,
    pub breakdown: CostBreakdown,
    pub total: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilterOptions {
    pub specializations: Vec<String>,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsQueryParams {
    pub date: NaiveDate,
}
