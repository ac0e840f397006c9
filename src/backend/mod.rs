//! Language-model backend access with ordered transport fallback.
//!
//! A [`BackendGateway`] holds a list of [`Transport`]s, each with its own timeout. An
//! invocation tries them in order, once each, and stops at the first one that returns
//! non-empty text. There are no retries and no backoff. The full attempt sequence is returned
//! alongside the text so callers and tests can see which transports ran.

mod http;
mod process;

pub use http::OllamaHttpTransport;
pub use process::OllamaProcessTransport;

use crate::config::Config;
use async_trait::async_trait;
use serde::Serialize;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors raised by a single transport attempt.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Backend could not be reached or the process could not be started.
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    /// Backend answered with an error status or exit code.
    #[error("backend returned an error: {0}")]
    Rejected(String),
    /// Backend answer could not be decoded.
    #[error("malformed backend response: {0}")]
    InvalidResponse(String),
}

/// One way of reaching the language-model backend.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short label used in logs and attempt records.
    fn name(&self) -> &'static str;

    /// Upper bound on a single attempt.
    fn timeout(&self) -> Duration;

    /// Send `prompt` and return the raw generated text.
    async fn generate(&self, prompt: &str) -> Result<String, TransportError>;
}

/// How a single transport attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Transport produced non-empty text.
    Succeeded,
    /// Transport answered but the text was blank.
    Empty,
    /// Transport failed before producing text.
    Failed(String),
    /// Transport did not finish within its timeout.
    TimedOut,
}

/// Record of one transport attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportAttempt {
    /// Transport label.
    pub transport: &'static str,
    /// How the attempt ended.
    pub outcome: AttemptOutcome,
    /// Wall-clock duration of the attempt.
    pub elapsed_ms: u64,
}

/// Result of a gateway invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Invocation {
    /// Generated text, or `None` when every transport failed.
    pub text: Option<String>,
    /// Attempts in the order they were made.
    pub attempts: Vec<TransportAttempt>,
}

impl Invocation {
    /// Whether a transport other than the first had to be tried.
    pub fn used_fallback(&self) -> bool {
        self.attempts.len() > 1
    }
}

/// Ordered transport chain in front of the language model.
pub struct BackendGateway {
    transports: Vec<Box<dyn Transport>>,
}

impl BackendGateway {
    /// Build a gateway over an explicit transport order.
    pub fn new(transports: Vec<Box<dyn Transport>>) -> Self {
        Self { transports }
    }

    /// HTTP first, then the local `ollama` executable, as configured.
    pub fn from_config(config: &Config) -> Self {
        Self::new(vec![
            Box::new(OllamaHttpTransport::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
                Duration::from_secs(config.http_timeout_secs),
            )),
            Box::new(OllamaProcessTransport::new(
                config.ollama_bin.clone(),
                config.ollama_model.clone(),
                Duration::from_secs(config.cli_timeout_secs),
            )),
        ])
    }

    /// Transport labels in attempt order.
    pub fn transport_names(&self) -> Vec<&'static str> {
        self.transports.iter().map(|transport| transport.name()).collect()
    }

    /// Send `prompt` through the chain until one transport yields text.
    pub async fn invoke(&self, prompt: &str) -> Invocation {
        tracing::debug!(prompt_chars = prompt.chars().count(), "Invoking backend");
        let mut attempts = Vec::with_capacity(self.transports.len());

        for transport in &self.transports {
            let started = Instant::now();
            let result = tokio::time::timeout(transport.timeout(), transport.generate(prompt)).await;
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

            let (outcome, text) = match result {
                Ok(Ok(text)) if !text.trim().is_empty() => (AttemptOutcome::Succeeded, Some(text)),
                Ok(Ok(_)) => (AttemptOutcome::Empty, None),
                Ok(Err(error)) => (AttemptOutcome::Failed(error.to_string()), None),
                Err(_) => (AttemptOutcome::TimedOut, None),
            };

            match &outcome {
                AttemptOutcome::Succeeded => {
                    tracing::debug!(transport = transport.name(), elapsed_ms, "Backend answered")
                }
                other => tracing::warn!(
                    transport = transport.name(),
                    elapsed_ms,
                    outcome = ?other,
                    "Backend transport failed"
                ),
            }

            attempts.push(TransportAttempt {
                transport: transport.name(),
                outcome,
                elapsed_ms,
            });

            if text.is_some() {
                return Invocation { text, attempts };
            }
        }

        tracing::warn!(attempts = attempts.len(), "All backend transports exhausted");
        Invocation {
            text: None,
            attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedTransport {
        name: &'static str,
        reply: Result<&'static str, &'static str>,
        delay: Duration,
        timeout: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedTransport {
        fn boxed(
            name: &'static str,
            reply: Result<&'static str, &'static str>,
            calls: &Arc<AtomicUsize>,
        ) -> Box<dyn Transport> {
            Box::new(Self {
                name,
                reply,
                delay: Duration::ZERO,
                timeout: Duration::from_secs(5),
                calls: Arc::clone(calls),
            })
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        fn name(&self) -> &'static str {
            self.name
        }

        fn timeout(&self) -> Duration {
            self.timeout
        }

        async fn generate(&self, _prompt: &str) -> Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.reply
                .map(str::to_string)
                .map_err(|reason| TransportError::Unreachable(reason.to_string()))
        }
    }

    #[tokio::test]
    async fn primary_success_skips_secondary() {
        let primary = Arc::new(AtomicUsize::new(0));
        let secondary = Arc::new(AtomicUsize::new(0));
        let gateway = BackendGateway::new(vec![
            ScriptedTransport::boxed("http", Ok("answer"), &primary),
            ScriptedTransport::boxed("process", Ok("unused"), &secondary),
        ]);

        let invocation = gateway.invoke("prompt").await;
        assert_eq!(invocation.text.as_deref(), Some("answer"));
        assert_eq!(invocation.attempts.len(), 1);
        assert!(!invocation.used_fallback());
        assert_eq!(secondary.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_primary_falls_back() {
        let primary = Arc::new(AtomicUsize::new(0));
        let secondary = Arc::new(AtomicUsize::new(0));
        let gateway = BackendGateway::new(vec![
            ScriptedTransport::boxed("http", Ok("   "), &primary),
            ScriptedTransport::boxed("process", Ok("from cli"), &secondary),
        ]);

        let invocation = gateway.invoke("prompt").await;
        assert_eq!(invocation.text.as_deref(), Some("from cli"));
        assert_eq!(invocation.attempts[0].outcome, AttemptOutcome::Empty);
        assert_eq!(invocation.attempts[1].outcome, AttemptOutcome::Succeeded);
        assert!(invocation.used_fallback());
    }

    #[tokio::test]
    async fn both_failures_yield_absent_text() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gateway = BackendGateway::new(vec![
            ScriptedTransport::boxed("http", Err("connection refused"), &calls),
            ScriptedTransport::boxed("process", Err("not installed"), &calls),
        ]);

        let invocation = gateway.invoke("prompt").await;
        assert!(invocation.text.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(matches!(
            &invocation.attempts[0].outcome,
            AttemptOutcome::Failed(reason) if reason.contains("connection refused")
        ));
    }

    #[tokio::test]
    async fn slow_transport_times_out() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gateway = BackendGateway::new(vec![
            Box::new(ScriptedTransport {
                name: "http",
                reply: Ok("too late"),
                delay: Duration::from_secs(5),
                timeout: Duration::from_millis(20),
                calls: Arc::clone(&calls),
            }),
            ScriptedTransport::boxed("process", Ok("on time"), &calls),
        ]);

        let invocation = gateway.invoke("prompt").await;
        assert_eq!(invocation.attempts[0].outcome, AttemptOutcome::TimedOut);
        assert_eq!(invocation.text.as_deref(), Some("on time"));
    }

    #[test]
    fn default_chain_is_http_then_process() {
        let gateway = BackendGateway::from_config(&Config::default());
        assert_eq!(gateway.transport_names(), vec!["http", "process"]);
    }
}
