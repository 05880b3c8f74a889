//! Campaign selection and personalization: template catalog, selection by
//! segment, `{{placeholder}}` rendering, and estimated performance.

pub mod catalog;
pub mod decisioning;
pub mod personalizer;
pub mod templating;

pub use catalog::{CampaignCatalog, CampaignTemplate};
pub use decisioning::CampaignSelector;
pub use personalizer::CampaignPersonalizer;
pub use templating::TemplateEngine;
