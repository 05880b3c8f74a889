use serde::Deserialize;

/// Root application configuration. Loaded from an optional
/// `campaign-express.toml` file and environment variables with the prefix
/// `CAMPAIGN_EXPRESS__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub social: SocialConfig,
    #[serde(default)]
    pub enhancer: EnhancerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ─── Social Signals ─────────────────────────────────────────────────────
#[derive(Debug, Clone, Deserialize)]
pub struct SocialConfig {
    /// Simulated lookup latency. Zero disables the delay.
    #[serde(default = "default_social_latency_ms")]
    pub latency_ms: u64,
}

fn default_social_latency_ms() -> u64 { 300 }

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_social_latency_ms(),
        }
    }
}

// ─── Message Enhancer ───────────────────────────────────────────────────
#[derive(Debug, Clone, Deserialize)]
pub struct EnhancerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_enhancer_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_enhancer_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_enhancer_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_enhancer_temperature")]
    pub temperature: f32,
    #[serde(default = "default_enhancer_max_tokens")]
    pub max_tokens: u32,
}

fn default_enhancer_endpoint() -> String { "https://api.openai.com/v1".to_string() }
fn default_enhancer_model() -> String { "gpt-3.5-turbo".to_string() }
fn default_enhancer_timeout_ms() -> u64 { 10_000 }
fn default_enhancer_temperature() -> f32 { 0.7 }
fn default_enhancer_max_tokens() -> u32 { 300 }

impl EnhancerConfig {
    /// Configured key, falling back to `OPENAI_API_KEY`.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_enhancer_endpoint(),
            model: default_enhancer_model(),
            api_key: None,
            timeout_ms: default_enhancer_timeout_ms(),
            temperature: default_enhancer_temperature(),
            max_tokens: default_enhancer_max_tokens(),
        }
    }
}

// ─── Data & Output ──────────────────────────────────────────────────────
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataConfig {
    /// JSON array of customer records. The demo directory is used when unset.
    #[serde(default)]
    pub customers_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

fn default_output_dir() -> String { "output".to_string() }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the optional config file and environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("campaign-express").required(false))
            .add_source(
                config::Environment::with_prefix("CAMPAIGN_EXPRESS")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
