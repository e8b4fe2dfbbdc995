use std::time::Duration;

use reqwest::blocking::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::parser::{parse_allocation_response, parse_prediction_response};
use super::prompt::{
    build_allocation_prompt, build_prediction_prompt, ALLOCATION_SYSTEM_PROMPT,
    PREDICTION_SYSTEM_PROMPT,
};
use crate::config::DEFAULT_ENRICHMENT_MODEL;

use super::{
    AllocationContext, AllocationEnrichment, Enricher, EnrichmentError, PredictionContext,
    PredictionEnrichment,
};

/// Text-generation backend (allows mocking).
pub trait LlmClient: Send + Sync {
    fn generate(&self, model: &str, prompt: &str, system: &str) -> Result<String, EnrichmentError>;

    fn list_models(&self) -> Result<Vec<String>, EnrichmentError>;

    /// A bare name such as `llama3.2` matches any installed tag of it.
    fn is_model_available(&self, model: &str) -> Result<bool, EnrichmentError> {
        Ok(self.list_models()?.iter().any(|m| m.starts_with(model)))
    }
}

/// Ollama HTTP client for local LLM inference.
///
/// Blocking: call from `spawn_blocking` when inside the runtime.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, EnrichmentError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EnrichmentError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send, reject non-2xx with the upstream body, decode the JSON reply.
    fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, EnrichmentError> {
        let response = request.send().map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Upstream {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        response
            .json()
            .map_err(|e| EnrichmentError::MalformedResponse(e.to_string()))
    }

    fn classify(&self, e: reqwest::Error) -> EnrichmentError {
        if e.is_connect() {
            EnrichmentError::Unavailable(self.base_url.clone())
        } else if e.is_timeout() {
            EnrichmentError::Timeout(self.timeout_secs)
        } else {
            EnrichmentError::HttpClient(e.to_string())
        }
    }
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateReply {
    response: String,
}

#[derive(Deserialize)]
struct TagsReply {
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

impl LlmClient for OllamaClient {
    fn generate(&self, model: &str, prompt: &str, system: &str) -> Result<String, EnrichmentError> {
        let body = GenerateBody {
            model,
            prompt,
            system,
            stream: false,
        };
        let reply: GenerateReply =
            self.fetch(self.client.post(self.endpoint("/api/generate")).json(&body))?;
        Ok(reply.response)
    }

    fn list_models(&self) -> Result<Vec<String>, EnrichmentError> {
        let reply: TagsReply = self.fetch(self.client.get(self.endpoint("/api/tags")))?;
        Ok(reply.models.into_iter().map(|m| m.name).collect())
    }
}

/// Canned client for tests and offline runs.
pub struct MockLlmClient {
    reply: String,
    installed: Vec<String>,
}

impl MockLlmClient {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_owned(),
            installed: vec![format!("{DEFAULT_ENRICHMENT_MODEL}:latest")],
        }
    }

    pub fn with_models(self, installed: Vec<String>) -> Self {
        Self { installed, ..self }
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, _model: &str, _prompt: &str, _system: &str) -> Result<String, EnrichmentError> {
        Ok(self.reply.clone())
    }

    fn list_models(&self) -> Result<Vec<String>, EnrichmentError> {
        Ok(self.installed.clone())
    }
}

/// [`Enricher`] backed by a text-generation model.
pub struct LlmEnricher {
    client: Box<dyn LlmClient>,
    model: String,
}

impl LlmEnricher {
    pub fn new(client: Box<dyn LlmClient>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Enricher for LlmEnricher {
    fn try_enrich_prediction(
        &self,
        ctx: &PredictionContext,
    ) -> Result<PredictionEnrichment, EnrichmentError> {
        let prompt = build_prediction_prompt(ctx);
        let text = self
            .client
            .generate(&self.model, &prompt, PREDICTION_SYSTEM_PROMPT)?;
        parse_prediction_response(&text)
    }

    fn try_enrich_allocation(
        &self,
        ctx: &AllocationContext,
    ) -> Result<AllocationEnrichment, EnrichmentError> {
        let prompt = build_allocation_prompt(ctx);
        let text = self
            .client
            .generate(&self.model, &prompt, ALLOCATION_SYSTEM_PROMPT)?;
        parse_allocation_response(&text)
    }

    fn is_ready(&self) -> bool {
        match self.client.is_model_available(&self.model) {
            Ok(available) => available,
            Err(e) => {
                tracing::debug!(error = %e, "Enrichment model check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriorityLevel;

    fn context() -> PredictionContext {
        PredictionContext {
            symptoms: "sprained ankle".into(),
            priority_level: PriorityLevel::Routine,
            age: Some(31),
            department_name: Some("General Medicine".into()),
            queue_length: 2,
            available_doctors: 1,
            time_of_day: "10:15".into(),
            basic_estimate: 40,
        }
    }

    #[test]
    fn mock_client_returns_configured_response() {
        let client = MockLlmClient::new("test response");
        let result = client.generate("model", "prompt", "system").unwrap();
        assert_eq!(result, "test response");
    }

    #[test]
    fn mock_client_model_availability() {
        let client = MockLlmClient::new("").with_models(vec!["mistral:7b".into()]);
        assert!(client.is_model_available("mistral").unwrap());
        assert!(!client.is_model_available("llama3.2").unwrap());
        assert_eq!(client.list_models().unwrap().len(), 1);
    }

    #[test]
    fn ollama_client_trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", 60).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
        assert_eq!(client.timeout_secs, 60);
    }

    #[test]
    fn unreachable_server_is_unavailable() {
        let client = OllamaClient::new("http://127.0.0.1:1", 2).unwrap();
        assert!(matches!(
            client.list_models(),
            Err(EnrichmentError::Unavailable(url)) if url == "http://127.0.0.1:1"
        ));
        assert!(client.is_model_available("llama3.2").is_err());
    }

    #[test]
    fn enricher_parses_model_output() {
        let client = MockLlmClient::new(
            r#"{"timeAdjustment": 5, "confidence": 0.6, "patientAdvice": "Keep the ankle raised", "reasoning": "Simple injury"}"#,
        );
        let enricher = LlmEnricher::new(Box::new(client), "llama3.2");
        let enrichment = enricher.try_enrich_prediction(&context()).unwrap();
        assert_eq!(enrichment.time_adjustment, Some(5.0));
        assert_eq!(enrichment.reasoning.as_deref(), Some("Simple injury"));
        assert!(enricher.is_ready());
    }

    #[test]
    fn enricher_surfaces_parse_errors() {
        let enricher = LlmEnricher::new(Box::new(MockLlmClient::new("no idea")), "llama3.2");
        assert!(matches!(
            enricher.try_enrich_prediction(&context()),
            Err(EnrichmentError::MalformedResponse(_))
        ));
    }

    #[test]
    fn enricher_not_ready_without_model() {
        let client = MockLlmClient::new("").with_models(vec![]);
        let enricher = LlmEnricher::new(Box::new(client), "llama3.2");
        assert!(!enricher.is_ready());
        assert_eq!(enricher.model(), "llama3.2");
    }
}
