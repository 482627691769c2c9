pub mod classify;
pub mod enrich;

use crate::config::GatewayConfig;
use crate::error::{Result, ScraperError};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

/// Fault classes the generative service can raise, kept distinct because
/// they drive different retry strategies: rate limits may rotate models,
/// server faults never do.
#[derive(Debug, thiserror::Error)]
pub enum BackendFault {
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("server fault: {0}")]
    Server(String),
}

/// Low-level client for a single generative-text call. Separated from the
/// gateway so tests can script fault sequences.
#[async_trait::async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        instruction: &str,
        content: &str,
    ) -> std::result::Result<String, BackendFault>;
}

// A shared backend behind an `Arc` is itself a backend: the call forwards to
// the inner value. Lets callers retain a handle to the backend after handing
// ownership of a boxed clone to the gateway.
#[async_trait::async_trait]
impl<T: GenerativeBackend + ?Sized> GenerativeBackend for std::sync::Arc<T> {
    async fn generate(
        &self,
        model: &str,
        instruction: &str,
        content: &str,
    ) -> std::result::Result<String, BackendFault> {
        (**self).generate(model, instruction, content).await
    }
}

/// Gemini REST backend. Requires `GEMINI_API_KEY`.
pub struct GeminiBackend {
    http: reqwest::Client,
    api_key: String,
}

impl GeminiBackend {
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")?;
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate(
        &self,
        model: &str,
        instruction: &str,
        content: &str,
    ) -> std::result::Result<String, BackendFault> {
        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }
        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }
        #[derive(Serialize)]
        struct Request<'a> {
            system_instruction: Content<'a>,
            contents: Vec<Content<'a>>,
        }
        #[derive(Deserialize)]
        struct Response {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }
        #[derive(Deserialize)]
        struct Candidate {
            content: CandidateContent,
        }
        #[derive(Deserialize)]
        struct CandidateContent {
            #[serde(default)]
            parts: Vec<ResponsePart>,
        }
        #[derive(Deserialize)]
        struct ResponsePart {
            text: String,
        }

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent"
        );
        let request = Request {
            system_instruction: Content {
                parts: vec![Part { text: instruction }],
            },
            contents: vec![Content {
                parts: vec![Part { text: content }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendFault::Server(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            // Rate-limit class: the caller's quota, not the service's fault
            let body = response.text().await.unwrap_or_default();
            return Err(BackendFault::RateLimited(format!("{status}: {body}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendFault::Server(format!("{status}: {body}")));
        }

        let body: Response = response
            .json()
            .await
            .map_err(|e| BackendFault::Server(e.to_string()))?;
        Ok(body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .unwrap_or_default())
    }
}

/// Which retry move follows a rate-limit fault.
#[derive(Debug, PartialEq, Eq)]
enum RetryAction {
    Wait(Duration),
    Rotate,
}

/// Escalating backoff schedule for a single gateway call. Each wait doubles
/// the next one; once the ceiling is reached, a rate-limit fault rotates
/// models instead of waiting longer.
#[derive(Debug)]
struct Backoff {
    wait: Duration,
    ceiling: Duration,
}

impl Backoff {
    fn new(base: Duration, ceiling: Duration) -> Self {
        Self { wait: base, ceiling }
    }

    fn on_rate_limit(&mut self) -> RetryAction {
        if self.wait >= self.ceiling {
            RetryAction::Rotate
        } else {
            let wait = self.wait;
            self.wait *= 2;
            RetryAction::Wait(wait)
        }
    }

    // Server faults wait on the same model without a ceiling.
    fn on_server_fault(&mut self) -> Duration {
        let wait = self.wait;
        self.wait *= 2;
        wait
    }

    fn reset(&mut self, base: Duration) {
        self.wait = base;
    }
}

/// Position in the fixed model fallback list. The index only ever moves
/// forward within a run; it never wraps back to a rate-limited model.
#[derive(Debug)]
struct RotationState {
    models: Vec<String>,
    current: usize,
}

impl RotationState {
    fn active_model(&self) -> String {
        self.models[self.current].clone()
    }

    fn advance(&mut self) -> Result<String> {
        if self.current + 1 >= self.models.len() {
            return Err(ScraperError::ModelsExhausted);
        }
        self.current += 1;
        Ok(self.models[self.current].clone())
    }
}

/// Single choke point for every call to the generative-text service.
/// Callers supply a system instruction and content; fallback across the
/// model list and all backoff waits live here and nowhere else.
pub struct ModelGateway {
    backend: Box<dyn GenerativeBackend>,
    state: Mutex<RotationState>,
    base_backoff: Duration,
    backoff_ceiling: Duration,
}

impl ModelGateway {
    pub fn new(backend: Box<dyn GenerativeBackend>, config: &GatewayConfig) -> Self {
        Self {
            backend,
            state: Mutex::new(RotationState {
                models: config.models.clone(),
                current: 0,
            }),
            base_backoff: Duration::from_secs(config.base_backoff_secs),
            backoff_ceiling: Duration::from_secs(config.backoff_ceiling_secs),
        }
    }

    pub fn active_model(&self) -> String {
        self.state.lock().unwrap().active_model()
    }

    /// Make one generative call, absorbing transient faults.
    ///
    /// Rate limits back off (base, doubling) until the ceiling, then rotate
    /// to the next model and reset the backoff; rotation is sticky for the
    /// rest of the run. Server faults retry the same model indefinitely on
    /// the same doubling schedule. Running past the last model is terminal.
    pub async fn generate(&self, instruction: &str, content: &str) -> Result<String> {
        let mut backoff = Backoff::new(self.base_backoff, self.backoff_ceiling);
        loop {
            let model = self.active_model();
            match self.backend.generate(&model, instruction, content).await {
                Ok(text) => {
                    debug!("Model {} answered", model);
                    return Ok(text.trim_matches('\n').to_string());
                }
                Err(BackendFault::RateLimited(reason)) => match backoff.on_rate_limit() {
                    RetryAction::Wait(wait) => {
                        warn!(
                            "Rate limit exceeded on {} ({}). Waiting {} seconds",
                            model,
                            reason,
                            wait.as_secs()
                        );
                        tokio::time::sleep(wait).await;
                    }
                    RetryAction::Rotate => {
                        let next = self.state.lock().unwrap().advance()?;
                        warn!(
                            "Rate limit for {} has been reached. Switching to {}",
                            model, next
                        );
                        backoff.reset(self.base_backoff);
                    }
                },
                Err(BackendFault::Server(reason)) => {
                    let wait = backoff.on_server_fault();
                    warn!(
                        "Model {} is overloaded ({}). Waiting {} seconds",
                        model,
                        reason,
                        wait.as_secs()
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_backoff_doubles_then_rotates_at_the_ceiling() {
        let mut backoff = Backoff::new(Duration::from_secs(25), Duration::from_secs(100));
        assert_eq!(backoff.on_rate_limit(), RetryAction::Wait(Duration::from_secs(25)));
        assert_eq!(backoff.on_rate_limit(), RetryAction::Wait(Duration::from_secs(50)));
        // Third fault would have to wait the full ceiling; rotate instead
        assert_eq!(backoff.on_rate_limit(), RetryAction::Rotate);
        backoff.reset(Duration::from_secs(25));
        assert_eq!(backoff.on_rate_limit(), RetryAction::Wait(Duration::from_secs(25)));
    }

    #[test]
    fn server_fault_backoff_has_no_ceiling() {
        let mut backoff = Backoff::new(Duration::from_secs(25), Duration::from_secs(100));
        assert_eq!(backoff.on_server_fault(), Duration::from_secs(25));
        assert_eq!(backoff.on_server_fault(), Duration::from_secs(50));
        assert_eq!(backoff.on_server_fault(), Duration::from_secs(100));
        assert_eq!(backoff.on_server_fault(), Duration::from_secs(200));
    }

    #[test]
    fn rotation_never_wraps() {
        let mut state = RotationState {
            models: vec!["a".to_string(), "b".to_string()],
            current: 0,
        };
        assert_eq!(state.advance().unwrap(), "b");
        assert!(matches!(state.advance(), Err(ScraperError::ModelsExhausted)));
        // A failed advance leaves the index on the last model
        assert_eq!(state.active_model(), "b");
    }
}
