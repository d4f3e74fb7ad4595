pub mod adapters;
pub mod app_state;
pub mod config;
pub mod error;
pub mod jobs;
pub mod models;
pub mod services;
pub mod webhook;

pub use app_state::AppState;
pub use config::AppConfig;
pub use error::{DeployError, DeployResult};
