//! Predicate helpers and value formatting for segment rules.

use campaign_core::types::{ChurnRisk, CustomerRecord, SocialProfile};

/// Interest fragments that mark a technology-leaning profile.
pub const TECH_KEYWORDS: [&str; 6] = ["ia", "startups", "tech", "web3", "gadgets", "gaming"];

pub const SECTOR_B2B: &str = "B2B";
pub const SECTOR_TECH: &str = "Tecnología";

/// Everything a rule may look at, resolved once per classification.
#[derive(Debug, Clone)]
pub struct RuleContext<'a> {
    pub sector: &'a str,
    pub spend: f64,
    pub risk: &'a ChurnRisk,
    pub interests: &'a [String],
    pub social_score: f64,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        customer: &'a CustomerRecord,
        profile: &'a SocialProfile,
        social_score: f64,
    ) -> Self {
        Self {
            sector: customer.sector_str(),
            spend: customer.average_spend,
            risk: &customer.churn_risk,
            interests: &profile.interests,
            social_score,
        }
    }
}

/// Substring match of any tech keyword against the space-joined,
/// lowercased interest list.
pub fn has_tech_interest(interests: &[String]) -> bool {
    let joined = interests.join(" ").to_lowercase();
    TECH_KEYWORDS.iter().any(|kw| joined.contains(kw))
}

/// `$12,345` style amount, rounded to whole units with ties to even.
pub fn format_currency(amount: f64) -> String {
    let digits = format!("{:.0}", amount.abs());
    let negative = amount < 0.0 && digits.bytes().any(|b| b != b'0');

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Score as shown in justifications: whole numbers keep one decimal.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.1}", score)
    } else {
        format!("{}", score)
    }
}
