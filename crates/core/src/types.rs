//! Domain model shared by every stage of the segmentation pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CampaignError, CampaignResult};

// ─── Customer ───────────────────────────────────────────────────────────────

/// Churn risk as recorded in the CRM export.
///
/// Matching is exact and case-sensitive: only `"Low"`, `"Medium"` and
/// `"High"` map onto known levels. Anything else is kept verbatim and never
/// satisfies a risk-based rule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChurnRisk {
    Low,
    #[default]
    Medium,
    High,
    Unrecognized(String),
}

impl ChurnRisk {
    pub fn as_str(&self) -> &str {
        match self {
            ChurnRisk::Low => "Low",
            ChurnRisk::Medium => "Medium",
            ChurnRisk::High => "High",
            ChurnRisk::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for ChurnRisk {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Low" => ChurnRisk::Low,
            "Medium" => ChurnRisk::Medium,
            "High" => ChurnRisk::High,
            _ => ChurnRisk::Unrecognized(raw),
        }
    }
}

impl From<ChurnRisk> for String {
    fn from(risk: ChurnRisk) -> Self {
        risk.as_str().to_string()
    }
}

impl fmt::Display for ChurnRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer row from the CRM. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub purchase_history: Option<String>,
    #[serde(default)]
    pub average_spend: f64,
    #[serde(default)]
    pub churn_risk: ChurnRisk,
}

impl CustomerRecord {
    /// Sector as used by the rule cascade; a missing sector matches nothing.
    pub fn sector_str(&self) -> &str {
        self.sector.as_deref().unwrap_or("")
    }

    /// Checks the fields ingestion cannot default.
    pub fn validate(&self) -> CampaignResult<()> {
        if self.name.trim().is_empty() {
            return Err(CampaignError::Validation(format!(
                "customer {} has an empty name",
                self.id
            )));
        }
        if !self.average_spend.is_finite() || self.average_spend < 0.0 {
            return Err(CampaignError::Validation(format!(
                "customer {} has an invalid average spend: {}",
                self.name, self.average_spend
            )));
        }
        Ok(())
    }
}

// ─── Social profile ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    #[default]
    Unknown,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ActivityLevel {
    /// Weight fed into the social score.
    pub fn weight(&self) -> f64 {
        match self {
            ActivityLevel::VeryHigh => 10.0,
            ActivityLevel::High => 8.0,
            ActivityLevel::Medium => 5.0,
            ActivityLevel::Low => 2.0,
            ActivityLevel::Unknown => 0.0,
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActivityLevel::Unknown => "unknown",
            ActivityLevel::Low => "low",
            ActivityLevel::Medium => "medium",
            ActivityLevel::High => "high",
            ActivityLevel::VeryHigh => "very_high",
        };
        f.write_str(label)
    }
}

/// Social signals for one customer. Built once per run, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialProfile {
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default = "default_interests")]
    pub interests: Vec<String>,
    #[serde(default)]
    pub last_activity: String,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub engagement_average: f64,
    #[serde(default = "default_channel")]
    pub active_hours: String,
    #[serde(default = "default_tone")]
    pub tone: String,
}

fn default_channel() -> String {
    "N/A".to_string()
}
fn default_interests() -> Vec<String> {
    vec!["tecnología".to_string()]
}
fn default_tone() -> String {
    "Neutral".to_string()
}

impl SocialProfile {
    /// Profile returned for identifiers with no recorded social footprint.
    pub fn neutral() -> Self {
        Self {
            channel: default_channel(),
            interests: vec!["General".to_string()],
            last_activity: "Sin actividad reciente".to_string(),
            activity_level: ActivityLevel::Unknown,
            engagement_average: 0.0,
            active_hours: default_channel(),
            tone: default_tone(),
        }
    }
}

// ─── Segmentation ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Segment {
    VipHighValue,
    ChurnRisk,
    EarlyAdopter,
    MassMarket,
    B2bEnterprise,
}

impl Segment {
    pub const ALL: [Segment; 5] = [
        Segment::VipHighValue,
        Segment::ChurnRisk,
        Segment::EarlyAdopter,
        Segment::MassMarket,
        Segment::B2bEnterprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::VipHighValue => "VIP_HIGH_VALUE",
            Segment::ChurnRisk => "CHURN_RISK",
            Segment::EarlyAdopter => "EARLY_ADOPTER",
            Segment::MassMarket => "MASS_MARKET",
            Segment::B2bEnterprise => "B2B_ENTERPRISE",
        }
    }

    /// Word-capitalized label used inside message copy (`VIP_HIGH_VALUE` reads
    /// "Vip High Value").
    pub fn display_name(&self) -> &'static str {
        match self {
            Segment::VipHighValue => "Vip High Value",
            Segment::ChurnRisk => "Churn Risk",
            Segment::EarlyAdopter => "Early Adopter",
            Segment::MassMarket => "Mass Market",
            Segment::B2bEnterprise => "B2B Enterprise",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Segment::VipHighValue => "Clientes de alto valor con engagement activo",
            Segment::ChurnRisk => "Clientes con señales de abandono",
            Segment::EarlyAdopter => "Tech-savvy con alta actividad en redes",
            Segment::MassMarket => "Clientes estándar con engagement moderado",
            Segment::B2bEnterprise => "Empresas con alto ticket y ciclo largo",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationResult {
    pub segment: Segment,
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub social_score: f64,
}

// ─── Campaigns ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
    SocialDm,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::SocialDm => "social_dm",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of an entry in the campaign template catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateId {
    #[serde(rename = "UPGRADE_PREMIUM")]
    UpgradePremium,
    #[serde(rename = "RETENCION_URGENTE")]
    UrgentRetention,
    #[serde(rename = "EDUCACION_ONBOARDING")]
    EducationOnboarding,
    #[serde(rename = "CROSS_SELL")]
    CrossSell,
    #[serde(rename = "SOCIAL_ENGAGEMENT")]
    SocialEngagement,
}

impl TemplateId {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::UpgradePremium => "UPGRADE_PREMIUM",
            TemplateId::UrgentRetention => "RETENCION_URGENTE",
            TemplateId::EducationOnboarding => "EDUCACION_ONBOARDING",
            TemplateId::CrossSell => "CROSS_SELL",
            TemplateId::SocialEngagement => "SOCIAL_ENGAGEMENT",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected campaign performance, rendered as one-decimal percentages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatedMetrics {
    pub open_rate: String,
    pub click_through_rate: String,
    pub conversion_rate: String,
}

/// Whether the message went through the enhancer, and what it replaced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Enhancement {
    #[default]
    NotEnhanced,
    Enhanced {
        method: String,
        original_body: String,
        original_subject: Option<String>,
    },
}

/// Fully personalized outbound campaign for one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignPayload {
    pub template_id: TemplateId,
    pub name: String,
    pub channel: Channel,
    pub subject: String,
    pub body: String,
    pub cta: String,
    pub discount: f64,
    pub metrics: EstimatedMetrics,
    #[serde(default)]
    pub enhancement: Enhancement,
}

impl CampaignPayload {
    /// Compatibility alias for downstream consumers that read the applied
    /// discount under its own key.
    pub fn applied_discount(&self) -> f64 {
        self.discount
    }

    pub fn was_enhanced(&self) -> bool {
        matches!(self.enhancement, Enhancement::Enhanced { .. })
    }
}
