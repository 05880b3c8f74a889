//! Customer data: the CRM directory consulted at ingest and the social
//! signal provider that profiles each customer.

pub mod customers;
pub mod social;

pub use customers::CustomerDirectory;
pub use social::{compute_social_score, MockSocialProvider, SocialSignalProvider};
