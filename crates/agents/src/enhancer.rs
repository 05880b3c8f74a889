//! Optional generative rewrite of campaign copy.
//!
//! Enhancers never fail past their boundary: any problem is reported as
//! "not enhanced" and the template text is used unchanged.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use campaign_core::config::EnhancerConfig;
use campaign_core::error::{CampaignError, CampaignResult};
use campaign_core::types::{CustomerRecord, Segment, SocialProfile};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Result of a body rewrite attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancedMessage {
    pub message: String,
    pub was_enhanced: bool,
    pub original_message: Option<String>,
}

impl EnhancedMessage {
    pub fn unchanged(base: &str) -> Self {
        Self {
            message: base.to_string(),
            was_enhanced: false,
            original_message: None,
        }
    }

    pub fn rewritten(base: &str, message: String) -> Self {
        Self {
            message,
            was_enhanced: true,
            original_message: Some(base.to_string()),
        }
    }
}

#[async_trait]
pub trait MessageEnhancer: Send + Sync {
    /// Whether the collaborator is configured to make calls at all.
    fn is_available(&self) -> bool;

    /// Provenance label stored on enhanced payloads.
    fn method(&self) -> &str;

    async fn enhance_message(
        &self,
        base: &str,
        customer: &CustomerRecord,
        profile: &SocialProfile,
        segment: Segment,
    ) -> EnhancedMessage;

    async fn enhance_subject(
        &self,
        base_subject: &str,
        customer: &CustomerRecord,
    ) -> Option<String>;
}

/// Pass-through used when no generative backend is configured.
#[derive(Debug, Clone, Default)]
pub struct TemplateOnlyEnhancer;

#[async_trait]
impl MessageEnhancer for TemplateOnlyEnhancer {
    fn is_available(&self) -> bool {
        false
    }

    fn method(&self) -> &str {
        "template"
    }

    async fn enhance_message(
        &self,
        base: &str,
        _customer: &CustomerRecord,
        _profile: &SocialProfile,
        _segment: Segment,
    ) -> EnhancedMessage {
        EnhancedMessage::unchanged(base)
    }

    async fn enhance_subject(
        &self,
        _base_subject: &str,
        _customer: &CustomerRecord,
    ) -> Option<String> {
        None
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

const SYSTEM_PROMPT: &str = "Eres un redactor de marketing B2B. Reescribes mensajes de campaña \
     en español, con un tono cercano y profesional, sin inventar descuentos ni datos nuevos.";

const SUBJECT_TEMPERATURE: f32 = 0.8;
const SUBJECT_MAX_TOKENS: u32 = 30;

/// OpenAI-compatible chat completions backend. One attempt per call.
#[derive(Clone)]
pub struct OpenAiEnhancer {
    client: Client,
    config: EnhancerConfig,
    api_key: String,
}

impl OpenAiEnhancer {
    pub fn new(config: EnhancerConfig, api_key: String) -> CampaignResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                CampaignError::Enhancement(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }

    async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> CampaignResult<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CampaignError::Enhancement(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CampaignError::Enhancement(format!(
                "Completion endpoint returned {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CampaignError::Enhancement(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| CampaignError::Enhancement("empty completion".to_string()))
    }
}

/// Prompt for a body rewrite: customer context plus the base copy.
pub fn message_prompt(
    base: &str,
    customer: &CustomerRecord,
    profile: &SocialProfile,
    segment: Segment,
) -> String {
    let interests = profile
        .interests
        .iter()
        .take(3)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Personaliza este mensaje para {name}.\n\
         Sector: {sector}\n\
         Segmento: {segment}\n\
         Intereses: {interests}\n\
         Tono preferido: {tone}\n\n\
         Mensaje base:\n{base}\n\n\
         Devuelve solo el mensaje final, manteniendo la oferta y la llamada a la acción.",
        name = customer.name,
        sector = customer.sector_str(),
        segment = segment.display_name(),
        interests = interests,
        tone = profile.tone,
        base = base,
    )
}

fn subject_prompt(base_subject: &str, customer: &CustomerRecord) -> String {
    format!(
        "Mejora este asunto de email para {} (sector {}). Máximo 60 caracteres. \
         Devuelve solo el asunto.\n\nAsunto: {}",
        customer.name,
        customer.sector_str(),
        base_subject
    )
}

fn strip_quotes(text: &str) -> String {
    text.trim().trim_matches(|c| c == '"' || c == '\'').trim().to_string()
}

#[async_trait]
impl MessageEnhancer for OpenAiEnhancer {
    fn is_available(&self) -> bool {
        true
    }

    fn method(&self) -> &str {
        &self.config.model
    }

    async fn enhance_message(
        &self,
        base: &str,
        customer: &CustomerRecord,
        profile: &SocialProfile,
        segment: Segment,
    ) -> EnhancedMessage {
        let prompt = message_prompt(base, customer, profile, segment);
        match self
            .complete(&prompt, self.config.temperature, self.config.max_tokens)
            .await
        {
            Ok(message) => {
                debug!(customer = %customer.name, "Message rewritten");
                EnhancedMessage::rewritten(base, message)
            }
            Err(e) => {
                warn!(
                    customer = %customer.name,
                    error = %e,
                    "Message enhancement failed, keeping template"
                );
                EnhancedMessage::unchanged(base)
            }
        }
    }

    async fn enhance_subject(
        &self,
        base_subject: &str,
        customer: &CustomerRecord,
    ) -> Option<String> {
        let prompt = subject_prompt(base_subject, customer);
        match self
            .complete(&prompt, SUBJECT_TEMPERATURE, SUBJECT_MAX_TOKENS)
            .await
        {
            Ok(subject) => Some(strip_quotes(&subject)).filter(|s| !s.is_empty()),
            Err(e) => {
                warn!(customer = %customer.name, error = %e, "Subject enhancement failed");
                None
            }
        }
    }
}

/// Picks the enhancer for a configuration. Disabled or unusable setups
/// degrade to [`TemplateOnlyEnhancer`].
pub fn build_enhancer(config: &EnhancerConfig) -> Arc<dyn MessageEnhancer> {
    if !config.enabled {
        return Arc::new(TemplateOnlyEnhancer);
    }

    let Some(api_key) = config.resolved_api_key() else {
        warn!("Enhancer enabled but no API key configured, using template text");
        return Arc::new(TemplateOnlyEnhancer);
    };

    match OpenAiEnhancer::new(config.clone(), api_key) {
        Ok(enhancer) => {
            info!(model = %config.model, endpoint = %config.endpoint, "Generative enhancer ready");
            Arc::new(enhancer)
        }
        Err(e) => {
            warn!(error = %e, "Enhancer unavailable, using template text");
            Arc::new(TemplateOnlyEnhancer)
        }
    }
}
