//! Static campaign template catalog. Declaration order is significant:
//! selection picks the first matching template.

use campaign_core::types::{Channel, Segment, TemplateId};

/// Template returned when no catalog entry targets a segment.
pub const FALLBACK_TEMPLATE: TemplateId = TemplateId::EducationOnboarding;

#[derive(Debug, Clone)]
pub struct CampaignTemplate {
    pub id: TemplateId,
    pub name: &'static str,
    pub segments: &'static [Segment],
    pub channel: Channel,
    pub subject: &'static str,
    pub body: &'static str,
    pub cta: &'static str,
    pub discount: f64,
}

impl CampaignTemplate {
    pub fn targets(&self, segment: Segment) -> bool {
        self.segments.contains(&segment)
    }
}

/// Read-only after construction.
#[derive(Debug, Clone)]
pub struct CampaignCatalog {
    templates: Vec<CampaignTemplate>,
}

impl CampaignCatalog {
    pub fn new(templates: Vec<CampaignTemplate>) -> Self {
        Self { templates }
    }

    /// The five built-in campaigns.
    pub fn standard() -> Self {
        Self::new(standard_templates())
    }

    pub fn get(&self, id: TemplateId) -> Option<&CampaignTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CampaignTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for CampaignCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_templates() -> Vec<CampaignTemplate> {
    vec![
        CampaignTemplate {
            id: TemplateId::UpgradePremium,
            name: "Upgrade Premium",
            segments: &[Segment::VipHighValue, Segment::EarlyAdopter],
            channel: Channel::Email,
            subject: "🚀 {{name}}, accede a funciones exclusivas",
            body: r#"
Hola {{name}},

Hemos notado tu interés en {{top_interest}}.

Como cliente {{segment}}, tienes acceso prioritario a nuestro plan Premium con:
✅ {{benefit_1}}
✅ {{benefit_2}}
✅ Soporte 24/7 personalizado

Activa tu upgrade con 30% de descuento hasta fin de mes.

[Activar Premium]

Saludos,
Equipo CRM Inteligente
"#,
            cta: "Activar Premium",
            discount: 0.30,
        },
        CampaignTemplate {
            id: TemplateId::UrgentRetention,
            name: "Retención con Oferta Especial",
            segments: &[Segment::ChurnRisk],
            channel: Channel::Sms,
            subject: "⚠️ {{name}}, te extrañamos",
            body: r#"
Hola {{name}},

Notamos que llevas tiempo sin interactuar con nosotros.

Como gesto de aprecio, te ofrecemos:
🎁 {{benefit_1}}
🎁 Asesoría gratuita personalizada

Tu satisfacción es nuestra prioridad.

[Reclama tu oferta]

Equipo CRM
"#,
            cta: "Reclama tu oferta",
            discount: 0.40,
        },
        CampaignTemplate {
            id: TemplateId::EducationOnboarding,
            name: "Onboarding Educativo",
            segments: &[Segment::MassMarket, Segment::EarlyAdopter],
            channel: Channel::Email,
            subject: "📚 {{name}}, guía para aprovechar {{product}}",
            body: r#"
Hola {{name}},

¿Sabías que el 80% de nuestros clientes en {{sector}} aumentan su productividad con {{product}}?

Te compartimos:
📖 Guía práctica en 5 pasos
🎥 Video tutorial exclusivo
💬 Acceso a comunidad de usuarios

Empieza hoy y transforma tu {{goal}}.

[Ver guía completa]

Equipo de Éxito del Cliente
"#,
            cta: "Ver guía completa",
            discount: 0.0,
        },
        CampaignTemplate {
            id: TemplateId::CrossSell,
            name: "Cross-Sell Inteligente",
            segments: &[Segment::VipHighValue, Segment::B2bEnterprise],
            channel: Channel::Email,
            subject: "💡 {{name}}, complementa tu {{current_product}}",
            body: r#"
Hola {{name}},

Basado en tu historial de {{history}}, identificamos una oportunidad:

{{new_product}} se integra perfectamente con tu configuración actual y te permitirá:
⚡ {{benefit_1}}
⚡ {{benefit_2}}

Clientes como tú reportan ROI del 150% en 3 meses.

[Solicitar demo]

Saludos,
{{account_manager}}
"#,
            cta: "Solicitar demo",
            discount: 0.15,
        },
        CampaignTemplate {
            id: TemplateId::SocialEngagement,
            name: "Engagement en Redes",
            segments: &[Segment::EarlyAdopter, Segment::MassMarket],
            channel: Channel::SocialDm,
            subject: "👋 {{name}}, vimos tu post sobre {{topic}}",
            body: r#"
Hola {{name}}! 👋

Nos encantó tu reciente post sobre {{topic}}.

Tenemos algo que podría interesarte:
{{product}} está diseñado para personas como tú que buscan {{goal}}.

¿Te gustaría conocer más? Te regalamos 20% de descuento.

[Más info]

— Equipo Social Media
"#,
            cta: "Más info",
            discount: 0.20,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_order() {
        let ids: Vec<TemplateId> = CampaignCatalog::standard().iter().map(|t| t.id).collect();
        assert_eq!(
            ids,
            vec![
                TemplateId::UpgradePremium,
                TemplateId::UrgentRetention,
                TemplateId::EducationOnboarding,
                TemplateId::CrossSell,
                TemplateId::SocialEngagement,
            ]
        );
    }

    #[test]
    fn test_every_segment_has_a_template() {
        let catalog = CampaignCatalog::standard();
        for segment in Segment::ALL {
            assert!(catalog.iter().any(|t| t.targets(segment)), "{segment} has no template");
        }
        assert!(catalog.get(FALLBACK_TEMPLATE).is_some());
    }

    #[test]
    fn test_discounts_in_range() {
        for template in CampaignCatalog::standard().iter() {
            assert!((0.0..=1.0).contains(&template.discount));
        }
    }
}
