pub mod appointments;
pub mod draft;
pub mod family;
pub mod gateway;
pub mod lifecycle;
pub mod sequencer;
pub mod session;
pub mod slots;
pub mod store;

pub use appointments::AppointmentService;
pub use draft::{BookingDraft, DraftAction};
pub use family::{FamilyCreateOutcome, FamilyMemberFlow};
pub use gateway::{AppointmentGateway, BookingGateways, ClinicDirectory, FamilyDirectory, SlotSource};
pub use lifecycle::AppointmentLifecycleService;
pub use sequencer::{StepSequencer, StepValidator};
pub use session::{BookingSession, PendingLookup, SessionView};
pub use slots::{SlotBoard, SlotFetchOutcome, SlotFetcher};
pub use store::BookingSessionStore;
