//! Marketing copy generation.
//!
//! [`AiCopyWriter`] asks an OpenAI-compatible chat endpoint for the copy and
//! falls back to [`TemplateCopyWriter`] whenever that is not possible, so
//! writing copy never fails.

mod openai;
mod template;

pub use openai::AiCopyWriter;
pub use template::TemplateCopyWriter;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{GeneratedContent, ScrapeResult};

/// Configuration for the copy generator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// API key; usually supplied through `AI_API_KEY`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Chat model name (default: gpt-4o-mini)
    pub model: String,

    /// OpenAI-compatible API root (default: https://api.openai.com/v1)
    pub base_url: String,

    pub temperature: f32,

    /// Request timeout in seconds (default: 60)
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

/// Trait for copy generation implementations
#[async_trait]
pub trait CopyWriter: Send + Sync {
    /// Write copy for a merged scrape result. Always returns all three fields.
    async fn write(&self, result: &ScrapeResult) -> GeneratedContent;
}
