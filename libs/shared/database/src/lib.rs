pub mod backend;

pub use backend::{BackendClient, BackendError, into_app_error};
