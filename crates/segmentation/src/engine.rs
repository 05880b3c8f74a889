//! Core segmentation engine: ordered, first-match-wins rule cascade.

use campaign_cdp::compute_social_score;
use campaign_core::types::{ChurnRisk, CustomerRecord, Segment, SegmentationResult, SocialProfile};
use tracing::debug;

use crate::predicates::{
    format_currency, format_score, has_tech_interest, RuleContext, SECTOR_B2B, SECTOR_TECH,
};

/// One step of the cascade. Confidence is fixed per rule.
#[derive(Clone, Copy)]
pub struct SegmentRule {
    pub segment: Segment,
    pub confidence: f64,
    pub matches: fn(&RuleContext<'_>) -> bool,
    pub reasons: fn(&RuleContext<'_>) -> Vec<String>,
}

/// Evaluation order is part of the contract: reordering changes outcomes.
pub const DEFAULT_RULES: [SegmentRule; 5] = [
    SegmentRule {
        segment: Segment::B2bEnterprise,
        confidence: 0.95,
        matches: b2b_matches,
        reasons: b2b_reasons,
    },
    SegmentRule {
        segment: Segment::EarlyAdopter,
        confidence: 0.88,
        matches: early_adopter_matches,
        reasons: early_adopter_reasons,
    },
    SegmentRule {
        segment: Segment::ChurnRisk,
        confidence: 0.82,
        matches: churn_matches,
        reasons: churn_reasons,
    },
    SegmentRule {
        segment: Segment::VipHighValue,
        confidence: 0.90,
        matches: vip_matches,
        reasons: vip_reasons,
    },
    SegmentRule {
        segment: Segment::MassMarket,
        confidence: 0.70,
        matches: always,
        reasons: mass_market_reasons,
    },
];

fn b2b_matches(ctx: &RuleContext<'_>) -> bool {
    ctx.sector == SECTOR_B2B || ctx.spend > 10_000.0
}

fn b2b_reasons(ctx: &RuleContext<'_>) -> Vec<String> {
    vec![format!(
        "Sector {} con gasto promedio {}",
        ctx.sector,
        format_currency(ctx.spend)
    )]
}

// The score gate applies to both the sector and the interest condition; a
// failed gate falls through to the churn rule.
fn early_adopter_matches(ctx: &RuleContext<'_>) -> bool {
    (ctx.sector == SECTOR_TECH || has_tech_interest(ctx.interests)) && ctx.social_score > 7.0
}

fn early_adopter_reasons(ctx: &RuleContext<'_>) -> Vec<String> {
    let top: Vec<&str> = ctx.interests.iter().take(3).map(String::as_str).collect();
    vec![
        format!(
            "Perfil tecnológico con alta actividad social (score: {})",
            format_score(ctx.social_score)
        ),
        format!("Intereses: {}", top.join(", ")),
    ]
}

fn churn_matches(ctx: &RuleContext<'_>) -> bool {
    *ctx.risk == ChurnRisk::High || (ctx.social_score < 3.0 && ctx.spend > 1_000.0)
}

fn churn_reasons(ctx: &RuleContext<'_>) -> Vec<String> {
    let mut reasons = vec![format!("Riesgo de abandono: {}", ctx.risk)];
    if ctx.social_score < 3.0 {
        reasons.push(format!(
            "Baja actividad social (score: {})",
            format_score(ctx.social_score)
        ));
    }
    reasons
}

fn vip_matches(ctx: &RuleContext<'_>) -> bool {
    ctx.spend > 5_000.0 && *ctx.risk == ChurnRisk::Low && ctx.social_score > 7.0
}

fn vip_reasons(ctx: &RuleContext<'_>) -> Vec<String> {
    vec![format!(
        "Alto valor ({}) con engagement activo",
        format_currency(ctx.spend)
    )]
}

fn always(_: &RuleContext<'_>) -> bool {
    true
}

fn mass_market_reasons(ctx: &RuleContext<'_>) -> Vec<String> {
    vec![
        format!(
            "Perfil estándar: Gasto {}, Riesgo {}",
            format_currency(ctx.spend),
            ctx.risk
        ),
        format!("Score social: {}", format_score(ctx.social_score)),
    ]
}

/// Assigns every (customer, profile) pair to exactly one segment.
#[derive(Clone)]
pub struct SegmentClassifier {
    rules: Vec<SegmentRule>,
}

impl SegmentClassifier {
    pub fn new() -> Self {
        Self {
            rules: DEFAULT_RULES.to_vec(),
        }
    }

    pub fn rules(&self) -> &[SegmentRule] {
        &self.rules
    }

    pub fn classify(
        &self,
        customer: &CustomerRecord,
        profile: &SocialProfile,
    ) -> SegmentationResult {
        let social_score = compute_social_score(profile);
        let ctx = RuleContext::new(customer, profile, social_score);

        let rule = self
            .rules
            .iter()
            .find(|rule| (rule.matches)(&ctx))
            .copied()
            .unwrap_or(DEFAULT_RULES[DEFAULT_RULES.len() - 1]);

        debug!(
            customer = %customer.name,
            segment = %rule.segment,
            social_score,
            "Segment rule matched"
        );

        SegmentationResult {
            segment: rule.segment,
            confidence: rule.confidence,
            reasons: (rule.reasons)(&ctx),
            social_score,
        }
    }
}

impl Default for SegmentClassifier {
    fn default() -> Self {
        Self::new()
    }
}
