use thiserror::Error;

pub type CampaignResult<T> = Result<T, CampaignError>;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Customer validation error: {0}")]
    Validation(String),

    #[error("Message enhancement error: {0}")]
    Enhancement(String),

    #[error("Campaign catalog error: {0}")]
    Catalog(String),

    #[error("Invalid pipeline transition from {from} to {to}")]
    StateTransition { from: String, to: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CampaignError {
    pub fn customer_not_found(name: &str) -> Self {
        CampaignError::NotFound(format!("customer not found: {}", name))
    }
}
