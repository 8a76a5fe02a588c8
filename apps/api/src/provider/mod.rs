//! Interview Provider: pluggable strategy for every generative step.
//!
//! Variants: `AiProvider` over OpenAI or Gemini, and the deterministic
//! `MockProvider`. One is chosen at startup from which API key is set and
//! carried in `AppState` as `Arc<dyn InterviewProvider>`.
//!
//! Methods are infallible: the AI variant logs provider failures and answers
//! with the mock's output instead, so callers never see a provider error.

pub mod ai;
pub mod mock;
pub mod prompts;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::llm_client::{CompletionBackend, GeminiClient, LlmClient, OpenAiClient};
use crate::models::interview::{InterviewFeedback, InterviewQuestion, InterviewSession};
use crate::models::resume::ResumeData;

pub use ai::AiProvider;
pub use mock::MockProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Gemini,
    Mock,
}

impl ProviderKind {
    /// OpenAI wins when both keys are set.
    pub fn from_config(config: &Config) -> Self {
        if config.openai_api_key.is_some() {
            ProviderKind::OpenAi
        } else if config.gemini_api_key.is_some() {
            ProviderKind::Gemini
        } else {
            ProviderKind::Mock
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Mock => "mock",
        }
    }
}

/// Narrative half of an interview summary.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SummaryNarrative {
    #[serde(default)]
    pub overall_feedback: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[async_trait]
pub trait InterviewProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Turns extracted resume text into `ResumeData` with status "processed".
    async fn structure_resume(&self, resume_id: Uuid, raw_text: &str) -> ResumeData;

    /// Proposes questions for a session. May return more or fewer than
    /// `count`; the caller pads and truncates.
    async fn generate_questions(
        &self,
        resume: &ResumeData,
        session_id: Uuid,
        count: usize,
    ) -> Vec<InterviewQuestion>;

    async fn analyze_response(
        &self,
        question: &InterviewQuestion,
        question_index: usize,
        response_text: &str,
    ) -> InterviewFeedback;

    async fn summarize(&self, session: &InterviewSession, average_score: f64)
        -> SummaryNarrative;
}

/// Builds the text provider for the configured key, if any.
pub fn select_provider(config: &Config) -> Result<Arc<dyn InterviewProvider>> {
    let kind = ProviderKind::from_config(config);
    let provider: Arc<dyn InterviewProvider> = match (
        kind,
        &config.openai_api_key,
        &config.gemini_api_key,
    ) {
        (ProviderKind::OpenAi, Some(key), _) => {
            ai_provider(kind, Arc::new(OpenAiClient::new(key.clone())?))
        }
        (ProviderKind::Gemini, _, Some(key)) => {
            ai_provider(kind, Arc::new(GeminiClient::new(key.clone())?))
        }
        _ => Arc::new(MockProvider),
    };
    info!("Interview provider: {}", provider.kind().as_str());
    Ok(provider)
}

fn ai_provider(kind: ProviderKind, backend: Arc<dyn CompletionBackend>) -> Arc<dyn InterviewProvider> {
    let llm = LlmClient::new(backend);
    info!("LLM client initialized (model: {})", llm.model());
    Arc::new(AiProvider::new(kind, llm))
}
