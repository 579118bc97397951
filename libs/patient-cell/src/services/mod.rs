pub mod patient;
pub mod family;

pub use patient::PatientService;
pub use family::FamilyService;
