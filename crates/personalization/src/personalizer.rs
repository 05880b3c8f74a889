//! Turns a selected template into a concrete campaign payload: resolves
//! placeholder values, segment benefits and estimated performance.

use std::sync::Arc;

use campaign_core::error::{CampaignError, CampaignResult};
use campaign_core::types::{
    CampaignPayload, Channel, CustomerRecord, Enhancement, EstimatedMetrics, Segment,
    SocialProfile, TemplateId,
};

use crate::catalog::CampaignCatalog;
use crate::templating::{TemplateContext, TemplateEngine};

const DEFAULT_NAME: &str = "Cliente";
const DEFAULT_SECTOR: &str = "tu sector";
const DEFAULT_HISTORY: &str = "compras anteriores";
const DEFAULT_INTEREST: &str = "nuestros productos";
const DEFAULT_SECOND_BENEFIT: &str = "Acceso prioritario";

const SUBJECT_PRODUCT: &str = "nuestra solución";
const BODY_PRODUCT: &str = "nuestra plataforma";
const CURRENT_PRODUCT: &str = "herramientas actuales";
const NEW_PRODUCT: &str = "Módulo Analytics Pro";
const GOAL: &str = "eficiencia operativa";
const ACCOUNT_MANAGER: &str = "Juan Pérez, Account Manager";

const BENEFITS: &[(Segment, &[&str])] = &[
    (
        Segment::VipHighValue,
        &[
            "Gerente de cuenta dedicado",
            "Acceso anticipado a nuevas features",
            "Reportes personalizados mensuales",
        ],
    ),
    (
        Segment::ChurnRisk,
        &[
            "50% de descuento en renovación",
            "3 meses gratis de soporte premium",
            "Migración asistida sin costo",
        ],
    ),
    (
        Segment::EarlyAdopter,
        &[
            "Beta access a funciones experimentales",
            "Sesiones de feedback con el equipo de producto",
            "Certificación gratuita",
        ],
    ),
    (
        Segment::B2bEnterprise,
        &[
            "SLA del 99.9% garantizado",
            "Integración con tu ERP sin costo",
            "Capacitación on-site para tu equipo",
        ],
    ),
    (
        Segment::MassMarket,
        &[
            "Tutoriales paso a paso",
            "Comunidad de usuarios activa",
            "Plantillas prediseñadas",
        ],
    ),
];

const GENERIC_BENEFITS: &[&str] = &["Soporte dedicado", "Recursos exclusivos"];

/// Base expected rates per segment, as fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateBaseline {
    pub open_rate: f64,
    pub click_through_rate: f64,
    pub conversion_rate: f64,
}

const BASELINES: &[(Segment, RateBaseline)] = &[
    (
        Segment::VipHighValue,
        RateBaseline {
            open_rate: 0.45,
            click_through_rate: 0.12,
            conversion_rate: 0.08,
        },
    ),
    (
        Segment::EarlyAdopter,
        RateBaseline {
            open_rate: 0.52,
            click_through_rate: 0.18,
            conversion_rate: 0.06,
        },
    ),
    (
        Segment::ChurnRisk,
        RateBaseline {
            open_rate: 0.35,
            click_through_rate: 0.08,
            conversion_rate: 0.15,
        },
    ),
    (
        Segment::B2bEnterprise,
        RateBaseline {
            open_rate: 0.38,
            click_through_rate: 0.10,
            conversion_rate: 0.05,
        },
    ),
    (
        Segment::MassMarket,
        RateBaseline {
            open_rate: 0.28,
            click_through_rate: 0.06,
            conversion_rate: 0.03,
        },
    ),
];

const GENERIC_BASELINE: RateBaseline = RateBaseline {
    open_rate: 0.30,
    click_through_rate: 0.07,
    conversion_rate: 0.04,
};

/// SMS is near-universally opened.
const SMS_OPEN_RATE: f64 = 0.98;
const SOCIAL_DM_CTR_LIFT: f64 = 1.3;

pub fn benefits_for(segment: Segment) -> &'static [&'static str] {
    BENEFITS
        .iter()
        .find(|(s, _)| *s == segment)
        .map(|(_, benefits)| *benefits)
        .unwrap_or(GENERIC_BENEFITS)
}

pub fn baseline_for(segment: Segment) -> RateBaseline {
    BASELINES
        .iter()
        .find(|(s, _)| *s == segment)
        .map(|(_, baseline)| *baseline)
        .unwrap_or(GENERIC_BASELINE)
}

/// Baseline adjusted for the delivery channel, formatted as percentages.
pub fn estimate_metrics(segment: Segment, channel: Channel) -> EstimatedMetrics {
    let mut rates = baseline_for(segment);
    match channel {
        Channel::Sms => rates.open_rate = SMS_OPEN_RATE,
        Channel::SocialDm => rates.click_through_rate *= SOCIAL_DM_CTR_LIFT,
        Channel::Email => {}
    }
    EstimatedMetrics {
        open_rate: format_rate(rates.open_rate),
        click_through_rate: format_rate(rates.click_through_rate),
        conversion_rate: format_rate(rates.conversion_rate),
    }
}

fn format_rate(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Customer and social values with every default already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderValues {
    pub name: String,
    pub sector: String,
    pub history: String,
    pub top_interest: String,
}

impl PlaceholderValues {
    pub fn resolve(customer: &CustomerRecord, profile: &SocialProfile) -> Self {
        let history = non_empty_or(customer.purchase_history.as_deref(), DEFAULT_HISTORY);
        let first_purchase = history.split(',').next().unwrap_or_default().to_string();

        Self {
            name: non_empty_or(Some(customer.name.as_str()), DEFAULT_NAME),
            sector: non_empty_or(customer.sector.as_deref(), DEFAULT_SECTOR),
            history: first_purchase,
            top_interest: non_empty_or(
                profile.interests.first().map(String::as_str),
                DEFAULT_INTEREST,
            ),
        }
    }
}

fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

pub struct CampaignPersonalizer {
    catalog: Arc<CampaignCatalog>,
    engine: TemplateEngine,
}

impl CampaignPersonalizer {
    pub fn new(catalog: Arc<CampaignCatalog>) -> Self {
        Self {
            catalog,
            engine: TemplateEngine::new(),
        }
    }

    /// Only an id missing from the catalog fails; customer gaps are defaulted.
    pub fn personalize(
        &self,
        template_id: TemplateId,
        customer: &CustomerRecord,
        profile: &SocialProfile,
        segment: Segment,
    ) -> CampaignResult<CampaignPayload> {
        let template = self.catalog.get(template_id).ok_or_else(|| {
            CampaignError::Catalog(format!("template {} is not in the catalog", template_id))
        })?;

        let values = PlaceholderValues::resolve(customer, profile);
        let benefits = benefits_for(segment);
        let first_benefit = benefits.first().copied().unwrap_or(GENERIC_BENEFITS[0]);
        let second_benefit = benefits.get(1).copied().unwrap_or(DEFAULT_SECOND_BENEFIT);

        let subject_ctx = TemplateContext::new()
            .set("name", values.name.as_str())
            .set("topic", values.top_interest.as_str())
            .set("product", SUBJECT_PRODUCT)
            .set("current_product", CURRENT_PRODUCT);

        let body_ctx = TemplateContext::new()
            .set("name", values.name.as_str())
            .set("top_interest", values.top_interest.as_str())
            .set("topic", values.top_interest.as_str())
            .set("segment", segment.display_name())
            .set("benefit_1", first_benefit)
            .set("benefit_2", second_benefit)
            .set("sector", values.sector.as_str())
            .set("history", values.history.as_str())
            .set("product", BODY_PRODUCT)
            .set("current_product", CURRENT_PRODUCT)
            .set("new_product", NEW_PRODUCT)
            .set("goal", GOAL)
            .set("account_manager", ACCOUNT_MANAGER);

        let subject = self.engine.render(template.subject, &subject_ctx);
        let body = self.engine.render(template.body, &body_ctx).trim().to_string();

        Ok(CampaignPayload {
            template_id: template.id,
            name: template.name.to_string(),
            channel: template.channel,
            subject,
            body,
            cta: template.cta.to_string(),
            discount: template.discount,
            metrics: estimate_metrics(segment, template.channel),
            enhancement: Enhancement::NotEnhanced,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::types::{ActivityLevel, ChurnRisk};

    fn carlos() -> CustomerRecord {
        CustomerRecord {
            id: 1,
            name: "Carlos Ruiz".to_string(),
            sector: Some("Tecnología".to_string()),
            purchase_history: Some("Laptops, Monitores".to_string()),
            average_spend: 3200.0,
            churn_risk: ChurnRisk::Low,
        }
    }

    fn tech_profile() -> SocialProfile {
        SocialProfile {
            channel: "Twitter/X".to_string(),
            interests: vec!["IA".to_string(), "Startups".to_string()],
            activity_level: ActivityLevel::High,
            engagement_average: 8.5,
            ..SocialProfile::neutral()
        }
    }

    fn personalizer() -> CampaignPersonalizer {
        CampaignPersonalizer::new(Arc::new(CampaignCatalog::standard()))
    }

    #[test]
    fn test_social_engagement_payload() {
        let payload = personalizer()
            .personalize(
                TemplateId::SocialEngagement,
                &carlos(),
                &tech_profile(),
                Segment::EarlyAdopter,
            )
            .unwrap();

        assert_eq!(payload.name, "Engagement en Redes");
        assert_eq!(payload.channel, Channel::SocialDm);
        assert_eq!(payload.subject, "👋 Carlos Ruiz, vimos tu post sobre IA");
        assert!(payload.body.starts_with("Hola Carlos Ruiz! 👋"));
        assert!(payload.body.contains("nuestra plataforma está diseñado"));
        assert!(payload.body.contains("buscan eficiencia operativa"));
        assert!(payload.body.ends_with("— Equipo Social Media"));
        assert_eq!(payload.cta, "Más info");
        assert_eq!(payload.discount, 0.20);
        assert_eq!(payload.metrics.click_through_rate, "23.4%");
        assert!(!payload.was_enhanced());
    }

    #[test]
    fn test_cross_sell_uses_first_purchase() {
        let payload = personalizer()
            .personalize(TemplateId::CrossSell, &carlos(), &tech_profile(), Segment::B2bEnterprise)
            .unwrap();
        assert_eq!(payload.subject, "💡 Carlos Ruiz, complementa tu herramientas actuales");
        assert!(payload.body.contains("Basado en tu historial de Laptops, identificamos"));
        assert!(payload.body.contains("⚡ SLA del 99.9% garantizado"));
        assert!(payload.body.ends_with("Juan Pérez, Account Manager"));
    }

    #[test]
    fn test_upgrade_premium_mentions_segment_and_benefits() {
        let payload = personalizer()
            .personalize(
                TemplateId::UpgradePremium,
                &carlos(),
                &tech_profile(),
                Segment::VipHighValue,
            )
            .unwrap();
        assert!(payload.body.contains("Como cliente Vip High Value"));
        assert!(payload.body.contains("✅ Gerente de cuenta dedicado"));
        assert!(payload.body.contains("✅ Acceso anticipado a nuevas features"));
        assert!(payload.body.contains("tu interés en IA."));
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let sparse = CustomerRecord {
            id: 77,
            name: String::new(),
            sector: None,
            purchase_history: None,
            average_spend: 0.0,
            churn_risk: ChurnRisk::Medium,
        };
        let no_interests = SocialProfile {
            interests: Vec::new(),
            ..SocialProfile::neutral()
        };

        let values = PlaceholderValues::resolve(&sparse, &no_interests);
        assert_eq!(values.name, "Cliente");
        assert_eq!(values.sector, "tu sector");
        assert_eq!(values.history, "compras anteriores");
        assert_eq!(values.top_interest, "nuestros productos");

        let payload = personalizer()
            .personalize(
                TemplateId::EducationOnboarding,
                &sparse,
                &no_interests,
                Segment::MassMarket,
            )
            .unwrap();
        assert_eq!(payload.subject, "📚 Cliente, guía para aprovechar nuestra solución");
        assert!(payload.body.contains("clientes en tu sector aumentan"));
        assert!(!payload.body.contains("{{"));
    }

    #[test]
    fn test_every_template_fully_resolves() {
        let personalizer = personalizer();
        for template in CampaignCatalog::standard().iter() {
            for segment in Segment::ALL {
                let payload = personalizer
                    .personalize(template.id, &carlos(), &tech_profile(), segment)
                    .unwrap();
                assert!(!payload.subject.contains("{{"), "{}", template.id);
                assert!(!payload.body.contains("{{"), "{}", template.id);
                assert_eq!(payload.body, payload.body.trim());
            }
        }
    }

    #[test]
    fn test_sms_open_rate_always_98() {
        for segment in Segment::ALL {
            assert_eq!(estimate_metrics(segment, Channel::Sms).open_rate, "98.0%");
        }
        let payload = personalizer()
            .personalize(
                TemplateId::UrgentRetention,
                &carlos(),
                &tech_profile(),
                Segment::ChurnRisk,
            )
            .unwrap();
        assert_eq!(payload.metrics.open_rate, "98.0%");
        assert_eq!(payload.metrics.click_through_rate, "8.0%");
        assert_eq!(payload.metrics.conversion_rate, "15.0%");
    }

    #[test]
    fn test_email_metrics_use_segment_baseline() {
        let metrics = estimate_metrics(Segment::VipHighValue, Channel::Email);
        assert_eq!(metrics.open_rate, "45.0%");
        assert_eq!(metrics.click_through_rate, "12.0%");
        assert_eq!(metrics.conversion_rate, "8.0%");

        let metrics = estimate_metrics(Segment::MassMarket, Channel::SocialDm);
        assert_eq!(metrics.open_rate, "28.0%");
        assert_eq!(metrics.click_through_rate, "7.8%");
    }

    #[test]
    fn test_discount_alias_matches() {
        let personalizer = personalizer();
        for template in CampaignCatalog::standard().iter() {
            let payload = personalizer
                .personalize(template.id, &carlos(), &tech_profile(), Segment::MassMarket)
                .unwrap();
            assert_eq!(payload.discount, payload.applied_discount());
            assert_eq!(payload.discount, template.discount);
        }
    }

    #[test]
    fn test_unknown_template_is_catalog_error() {
        let personalizer = CampaignPersonalizer::new(Arc::new(CampaignCatalog::new(Vec::new())));
        let err = personalizer
            .personalize(TemplateId::CrossSell, &carlos(), &tech_profile(), Segment::B2bEnterprise)
            .unwrap_err();
        assert!(matches!(err, CampaignError::Catalog(_)));
    }

    #[test]
    fn test_benefit_table_covers_all_segments() {
        for segment in Segment::ALL {
            assert!(benefits_for(segment).len() >= 2);
            assert_ne!(benefits_for(segment), GENERIC_BENEFITS);
        }
    }
}
