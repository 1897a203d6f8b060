use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No registration data loaded")]
    NotLoaded,

    #[error("Failed to read registrations: {0}")]
    Load(String),
}
