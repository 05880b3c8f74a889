//! Campaign selection: picks one catalog template for a segment.

use std::sync::Arc;

use campaign_core::types::{Segment, SocialProfile, TemplateId};
use tracing::debug;

use crate::catalog::{CampaignCatalog, FALLBACK_TEMPLATE};

/// Engagement above which the social template is preferred when eligible.
pub const SOCIAL_ENGAGEMENT_THRESHOLD: f64 = 7.0;

pub struct CampaignSelector {
    catalog: Arc<CampaignCatalog>,
}

impl CampaignSelector {
    pub fn new(catalog: Arc<CampaignCatalog>) -> Self {
        Self { catalog }
    }

    /// Deterministic and total: an empty candidate set yields the onboarding
    /// fallback, never an error.
    pub fn select(&self, segment: Segment, profile: &SocialProfile) -> TemplateId {
        let candidates: Vec<TemplateId> = self
            .catalog
            .iter()
            .filter(|t| t.targets(segment))
            .map(|t| t.id)
            .collect();

        let Some(first) = candidates.first().copied() else {
            debug!(%segment, "No template targets segment, using fallback");
            return FALLBACK_TEMPLATE;
        };

        if profile.engagement_average > SOCIAL_ENGAGEMENT_THRESHOLD
            && candidates.contains(&TemplateId::SocialEngagement)
        {
            return TemplateId::SocialEngagement;
        }

        first
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CampaignTemplate;
    use campaign_core::types::Channel;

    fn engaged(engagement: f64) -> SocialProfile {
        SocialProfile {
            engagement_average: engagement,
            ..SocialProfile::neutral()
        }
    }

    fn selector() -> CampaignSelector {
        CampaignSelector::new(Arc::new(CampaignCatalog::standard()))
    }

    #[test]
    fn test_first_candidate_in_catalog_order() {
        let selector = selector();
        let quiet = engaged(2.0);
        assert_eq!(selector.select(Segment::VipHighValue, &quiet), TemplateId::UpgradePremium);
        assert_eq!(selector.select(Segment::EarlyAdopter, &quiet), TemplateId::UpgradePremium);
        assert_eq!(selector.select(Segment::ChurnRisk, &quiet), TemplateId::UrgentRetention);
        assert_eq!(selector.select(Segment::MassMarket, &quiet), TemplateId::EducationOnboarding);
        assert_eq!(selector.select(Segment::B2bEnterprise, &quiet), TemplateId::CrossSell);
    }

    #[test]
    fn test_high_engagement_prefers_social_when_eligible() {
        let selector = selector();
        let active = engaged(8.5);
        assert_eq!(selector.select(Segment::EarlyAdopter, &active), TemplateId::SocialEngagement);
        assert_eq!(selector.select(Segment::MassMarket, &active), TemplateId::SocialEngagement);
        // not a candidate for these segments
        assert_eq!(selector.select(Segment::VipHighValue, &active), TemplateId::UpgradePremium);
        assert_eq!(selector.select(Segment::B2bEnterprise, &active), TemplateId::CrossSell);
    }

    #[test]
    fn test_threshold_is_strict() {
        let selector = selector();
        assert_eq!(
            selector.select(Segment::MassMarket, &engaged(7.0)),
            TemplateId::EducationOnboarding
        );
    }

    #[test]
    fn test_empty_candidates_fall_back_to_onboarding() {
        let catalog = CampaignCatalog::new(vec![CampaignTemplate {
            id: TemplateId::CrossSell,
            name: "Cross-Sell Inteligente",
            segments: &[Segment::B2bEnterprise],
            channel: Channel::Email,
            subject: "{{name}}",
            body: "{{name}}",
            cta: "Solicitar demo",
            discount: 0.15,
        }]);
        let selector = CampaignSelector::new(Arc::new(catalog));
        assert_eq!(
            selector.select(Segment::ChurnRisk, &engaged(9.0)),
            TemplateId::EducationOnboarding
        );
    }

    #[test]
    fn test_selection_is_deterministic() {
        let selector = selector();
        let profile = engaged(7.9);
        for segment in Segment::ALL {
            let first = selector.select(segment, &profile);
            for _ in 0..5 {
                assert_eq!(selector.select(segment, &profile), first);
            }
        }
    }
}
