pub mod state;

pub use state::{AppState, ServiceStatus};
