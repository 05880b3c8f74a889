pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{CampaignError, CampaignResult};
pub use types::{
    ActivityLevel, CampaignPayload, Channel, ChurnRisk, CustomerRecord, Enhancement,
    EstimatedMetrics, Segment, SegmentationResult, SocialProfile, TemplateId,
};
