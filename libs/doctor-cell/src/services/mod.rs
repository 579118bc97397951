pub mod doctor;
pub mod availability;
pub mod pricing;

pub use doctor::DoctorService;
pub use availability::AvailabilityService;
pub use pricing::PricingService;
