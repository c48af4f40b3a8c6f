pub mod config;
pub mod coordinator;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use config::Config;
pub use coordinator::{Coordinator, FetchOutcome, ToggleOutcome, ViewState};
pub use error::{AppError, AppResult};
