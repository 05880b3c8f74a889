//! Social signal lookup and the derived 0–10 social score.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use campaign_core::types::{ActivityLevel, SocialProfile};
use tracing::debug;

/// Source of social profiles. Lookups are total: unknown identifiers get
/// [`SocialProfile::neutral`] rather than an error.
#[async_trait]
pub trait SocialSignalProvider: Send + Sync {
    async fn get_profile(&self, customer_id: u32) -> SocialProfile;
}

/// Weighted blend of activity level and engagement, rounded to two decimals
/// and clamped to `[0, 10]`.
pub fn compute_social_score(profile: &SocialProfile) -> f64 {
    let engagement = if profile.engagement_average.is_finite() {
        profile.engagement_average
    } else {
        0.0
    };
    let raw = profile.activity_level.weight() * 0.6 + engagement * 0.4;
    round_to_cents(raw).clamp(0.0, 10.0)
}

/// Two-decimal rounding of the exact binary value, ties to even. Scaling by
/// 100 first would push values such as 7.005 up to 7.01.
fn round_to_cents(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Fixed in-memory lookup table standing in for real social networks.
pub struct MockSocialProvider {
    profiles: HashMap<u32, SocialProfile>,
    latency: Duration,
}

impl MockSocialProvider {
    pub fn new(profiles: HashMap<u32, SocialProfile>, latency: Duration) -> Self {
        Self { profiles, latency }
    }

    /// Provider seeded with the eight demo profiles.
    pub fn demo(latency: Duration) -> Self {
        Self::new(demo_profiles(), latency)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[async_trait]
impl SocialSignalProvider for MockSocialProvider {
    async fn get_profile(&self, customer_id: u32) -> SocialProfile {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self.profiles.get(&customer_id) {
            Some(profile) => profile.clone(),
            None => {
                debug!(customer_id, "No social footprint, using neutral profile");
                SocialProfile::neutral()
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn profile(
    channel: &str,
    interests: &[&str],
    last_activity: &str,
    activity_level: ActivityLevel,
    tone: &str,
    engagement_average: f64,
    active_hours: &str,
) -> SocialProfile {
    SocialProfile {
        channel: channel.to_string(),
        interests: interests.iter().map(|i| i.to_string()).collect(),
        last_activity: last_activity.to_string(),
        activity_level,
        engagement_average,
        active_hours: active_hours.to_string(),
        tone: tone.to_string(),
    }
}

fn demo_profiles() -> HashMap<u32, SocialProfile> {
    HashMap::from([
        (
            1,
            profile(
                "Twitter/X",
                &["IA", "Startups", "Gaming", "Web3", "Gadgets"],
                "Increíble lo nuevo en modelos de lenguaje #AIRevolution",
                ActivityLevel::High,
                "Técnico y entusiasta",
                8.5,
                "20:00-23:00",
            ),
        ),
        (
            2,
            profile(
                "Instagram",
                &["Yoga", "Nutrición", "Mindfulness", "Viajes"],
                "Rutina matutina para empezar con energía",
                ActivityLevel::Medium,
                "Inspiracional y positivo",
                6.2,
                "07:00-09:00",
            ),
        ),
        (
            3,
            profile(
                "LinkedIn",
                &["Cloud Computing", "Ciberseguridad", "DevOps", "Automatización"],
                "Buscamos proveedores de infraestructura híbrida. Abierto a propuestas.",
                ActivityLevel::VeryHigh,
                "Profesional y directo",
                12.4,
                "09:00-18:00",
            ),
        ),
        (
            4,
            profile(
                "Facebook",
                &["Economía", "Golf", "Vinos Premium", "Inversiones"],
                "Análisis del mercado bursátil esta semana",
                ActivityLevel::Low,
                "Conservador y formal",
                3.1,
                "12:00-14:00",
            ),
        ),
        (
            5,
            profile(
                "TikTok",
                &["Study hacks", "Moda low-cost", "K-pop", "DIY"],
                "Cómo aprobé todos mis exámenes con este método",
                ActivityLevel::High,
                "Informal y creativo",
                9.7,
                "21:00-00:00",
            ),
        ),
        (
            6,
            profile(
                "LinkedIn",
                &["Retail Tech", "CX", "Gestión de equipos", "E-commerce"],
                "Cómo implementamos un sistema POS que aumentó ventas 30%",
                ActivityLevel::Medium,
                "Práctico y orientado a resultados",
                5.8,
                "10:00-17:00",
            ),
        ),
        (
            7,
            profile(
                "Instagram",
                &["Marketing Digital", "SEO", "Branding", "Creatividad"],
                "5 tendencias de marketing que dominarán el año",
                ActivityLevel::High,
                "Educativo y trendy",
                7.9,
                "15:00-19:00",
            ),
        ),
        (
            8,
            profile(
                "LinkedIn",
                &["Manufactura 4.0", "IoT Industrial", "Eficiencia operativa"],
                "Nuestra planta redujo tiempos de producción con sensores IoT",
                ActivityLevel::Low,
                "Técnico y conservador",
                4.2,
                "08:00-16:00",
            ),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(level: ActivityLevel, engagement: f64) -> SocialProfile {
        SocialProfile {
            activity_level: level,
            engagement_average: engagement,
            ..SocialProfile::neutral()
        }
    }

    #[test]
    fn test_score_weights() {
        assert_eq!(compute_social_score(&with(ActivityLevel::Unknown, 0.0)), 0.0);
        assert_eq!(compute_social_score(&with(ActivityLevel::High, 8.5)), 8.2);
        assert_eq!(compute_social_score(&with(ActivityLevel::Medium, 6.2)), 5.48);
        assert_eq!(compute_social_score(&with(ActivityLevel::Low, 3.1)), 2.44);
    }

    #[test]
    fn test_score_is_clamped() {
        // 10 * 0.6 + 12.4 * 0.4 = 10.96
        assert_eq!(compute_social_score(&with(ActivityLevel::VeryHigh, 12.4)), 10.0);
        assert_eq!(compute_social_score(&with(ActivityLevel::Low, -50.0)), 0.0);
        assert_eq!(compute_social_score(&with(ActivityLevel::High, f64::NAN)), 4.8);
    }

    #[test]
    fn test_score_rounds_the_stored_value_not_a_scaled_one() {
        // 4.8 + 2.205 is stored just below 7.005
        assert_eq!(compute_social_score(&with(ActivityLevel::High, 5.5125)), 7.0);
        // 6.0 + 1.005 likewise stays at 7.0
        assert_eq!(compute_social_score(&with(ActivityLevel::VeryHigh, 2.5125)), 7.0);
        assert_eq!(compute_social_score(&with(ActivityLevel::Medium, 6.2)), 5.48);
    }

    #[test]
    fn test_score_is_deterministic() {
        let profile = with(ActivityLevel::High, 7.9);
        let first = compute_social_score(&profile);
        for _ in 0..10 {
            assert_eq!(compute_social_score(&profile), first);
        }
    }

    #[tokio::test]
    async fn test_known_and_unknown_ids() {
        let provider = MockSocialProvider::demo(Duration::ZERO);
        assert_eq!(provider.len(), 8);

        let carlos = provider.get_profile(1).await;
        assert_eq!(carlos.channel, "Twitter/X");
        assert_eq!(carlos.activity_level, ActivityLevel::High);

        let unknown = provider.get_profile(999).await;
        assert_eq!(unknown, SocialProfile::neutral());
        assert_eq!(compute_social_score(&unknown), 0.0);
    }
}
