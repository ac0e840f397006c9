//! Assistant service coordinating classification, prompting, backend calls, and cleanup.
//!
//! Each flow is a single pass: classify (chat only), compose a prompt from the session's
//! document memory, invoke the backend gateway, and sanitize the answer. Every flow failure is
//! turned into a fixed human-readable reply rather than an error status; [`AssistantError`]'s
//! `Display` strings are exactly those replies.

use crate::{
    backend::{BackendGateway, Invocation},
    config::Config,
    extract::{DocumentKind, ExtractLimits, extract_text},
    intent::{ChatRoute, Query, classify, route_chat},
    logging::request_span,
    memory::DocumentMemory,
    metrics::{AssistantMetrics, MetricsSnapshot},
    prompt::PromptRequest,
    sanitize::sanitize,
};
use async_trait::async_trait;
use thiserror::Error;
use tracing::Instrument;

/// Canned answer for bare greetings.
pub const GREETING_RESPONSE: &str =
    "Hello! I am LawEase, your AI legal assistant. How can I help you today?";
/// Canned answer for out-of-domain chat.
pub const REFUSAL_RESPONSE: &str = "I can assist only with legal questions or real-life legal situations. Please ask a law-related query.";
/// Confirmation message returned with a stored upload.
pub const UPLOAD_MESSAGE: &str = "Document uploaded successfully";

/// Failures surfaced by assistant flows.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Upload had an extension other than `.pdf` or `.docx`.
    #[error("Unsupported file type")]
    UnsupportedFileType,
    /// Every backend transport failed.
    #[error("[LLM unavailable] Could not contact Ollama.")]
    BackendUnavailable,
    /// Translation requested for blank text.
    #[error("No text provided for translation.")]
    EmptyInput,
    /// Summary requested before any upload.
    #[error("No document uploaded yet.")]
    NoDocumentLoaded,
}

/// Text returned to the caller plus the backend attempts behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Final user-facing text.
    pub text: String,
    /// Backend attempt record; `None` when the backend was never called.
    pub invocation: Option<Invocation>,
}

impl Reply {
    fn canned(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            invocation: None,
        }
    }

    /// Whether any transport was tried for this reply.
    pub fn backend_invoked(&self) -> bool {
        self.invocation.is_some()
    }
}

impl From<AssistantError> for Reply {
    fn from(error: AssistantError) -> Self {
        Self::canned(error.to_string())
    }
}

/// Summary of a stored upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Filename as sent by the client.
    pub filename: String,
    /// Character count of the stored text.
    pub characters: usize,
}

/// Abstraction over the assistant used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Answer a chat message for `session`.
    async fn chat(&self, session: &str, prompt: &str) -> Reply;

    /// Summarize the document stored for `session`.
    async fn summarize(&self, session: &str, style: Option<&str>) -> Reply;

    /// Translate `text` between the given language labels.
    async fn translate(&self, text: &str, from_lang: &str, to_lang: &str) -> Reply;

    /// Extract and store an uploaded document for `session`.
    async fn upload(
        &self,
        session: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<UploadOutcome, AssistantError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Owns the document memory, backend gateway, and counters.
///
/// Construct once near process start and share it through an `Arc`.
pub struct AssistantService {
    gateway: BackendGateway,
    memory: DocumentMemory,
    metrics: AssistantMetrics,
    extract_limits: ExtractLimits,
}

impl AssistantService {
    /// Build a service around an explicit gateway.
    pub fn new(gateway: BackendGateway, extract_limits: ExtractLimits) -> Self {
        Self {
            gateway,
            memory: DocumentMemory::new(),
            metrics: AssistantMetrics::new(),
            extract_limits,
        }
    }

    /// Build a service with the configured HTTP and process transports.
    pub fn from_config(config: &Config) -> Self {
        tracing::info!(
            ollama_url = %config.ollama_url,
            model = %config.ollama_model,
            "Initializing backend gateway"
        );
        Self::new(
            BackendGateway::from_config(config),
            ExtractLimits::from_config(config),
        )
    }

    /// Document memory shared by all flows.
    pub fn memory(&self) -> &DocumentMemory {
        &self.memory
    }

    async fn run(&self, request: PromptRequest) -> Reply {
        let flow = request.flow();
        let invocation = self.gateway.invoke(&request.render()).await;
        self.metrics
            .record_invocation(invocation.attempts.len(), invocation.text.is_some());

        let text = match invocation.text.as_deref() {
            Some(raw) => sanitize(flow, raw),
            None => AssistantError::BackendUnavailable.to_string(),
        };
        tracing::info!(
            flow = flow.as_str(),
            attempts = invocation.attempts.len(),
            fallback = invocation.used_fallback(),
            answered = invocation.text.is_some(),
            "Flow completed"
        );
        Reply {
            text,
            invocation: Some(invocation),
        }
    }
}

#[async_trait]
impl AssistantApi for AssistantService {
    async fn chat(&self, session: &str, prompt: &str) -> Reply {
        let span = request_span("chat", session);
        async {
            self.metrics.record_chat();
            let query = Query::new(prompt);
            let signals = classify(&query);
            let route = route_chat(&signals);
            tracing::debug!(
                greeting = signals.greeting,
                legal = signals.legal,
                scenario = signals.scenario,
                followup = signals.followup,
                ?route,
                "Classified chat"
            );

            match route {
                ChatRoute::Greet => {
                    self.metrics.record_greeting();
                    Reply::canned(GREETING_RESPONSE)
                }
                ChatRoute::Refuse => {
                    self.metrics.record_refusal();
                    Reply::canned(REFUSAL_RESPONSE)
                }
                ChatRoute::Backend => {
                    let document = self.memory.get(session);
                    self.run(PromptRequest::chat(query.raw, document)).await
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn summarize(&self, session: &str, style: Option<&str>) -> Reply {
        let span = request_span("summarize", session);
        async {
            match PromptRequest::summarize(style, self.memory.get(session)) {
                Ok(request) => self.run(request).await,
                Err(error) => {
                    tracing::info!(%error, "Summary skipped");
                    error.into()
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn translate(&self, text: &str, from_lang: &str, to_lang: &str) -> Reply {
        let span = request_span("translate", "-");
        async {
            match PromptRequest::translate(text, from_lang, to_lang) {
                Ok(request) => self.run(request).await,
                Err(error) => {
                    tracing::info!(%error, "Translation skipped");
                    error.into()
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn upload(
        &self,
        session: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<UploadOutcome, AssistantError> {
        let span = request_span("upload", session);
        async {
            let kind = DocumentKind::from_filename(filename);
            if !kind.is_supported_upload() {
                tracing::info!(filename, "Rejected upload with unsupported extension");
                return Err(AssistantError::UnsupportedFileType);
            }

            // Parsing is CPU-bound; keep it off the async workers.
            let owned = bytes.to_vec();
            let name = filename.to_string();
            let limits = self.extract_limits;
            let current = tracing::Span::current();
            let text = tokio::task::spawn_blocking(move || {
                current.in_scope(|| extract_text(&owned, &name, limits))
            })
            .await
            .unwrap_or_else(|error| {
                tracing::warn!(filename, %error, "Extraction task failed");
                kind.failure_text(format!("extraction task failed: {error}"))
            });

            let characters = text.chars().count();
            self.memory.set(session, text);
            self.metrics.record_upload();
            tracing::info!(filename, characters, "Document stored");

            Ok(UploadOutcome {
                filename: filename.to_string(),
                characters,
            })
        }
        .instrument(span)
        .await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AttemptOutcome, Transport, TransportError};
    use crate::extract::fixtures;
    use crate::memory::DEFAULT_SESSION;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct RecordingTransport {
        reply: Option<&'static str>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingTransport {
        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().expect("prompts lock").clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(5)
        }

        async fn generate(&self, prompt: &str) -> Result<String, TransportError> {
            self.prompts
                .lock()
                .expect("prompts lock")
                .push(prompt.to_string());
            self.reply
                .map(str::to_string)
                .ok_or_else(|| TransportError::Unreachable("offline".into()))
        }
    }

    fn service_with(reply: Option<&'static str>) -> (AssistantService, RecordingTransport) {
        let transport = RecordingTransport {
            reply,
            ..RecordingTransport::default()
        };
        let gateway = BackendGateway::new(vec![Box::new(transport.clone())]);
        let limits = ExtractLimits {
            fallback_chars: 1_000,
            max_body_bytes: 64 * 1024,
        };
        (AssistantService::new(gateway, limits), transport)
    }

    #[tokio::test]
    async fn greeting_never_reaches_backend() {
        let (service, transport) = service_with(Some("unused"));
        for input in ["hello", "  Good Morning ", "NAMASTE"] {
            let reply = service.chat(DEFAULT_SESSION, input).await;
            assert_eq!(reply.text, GREETING_RESPONSE);
            assert!(!reply.backend_invoked());
        }
        assert!(transport.prompts().is_empty());
        assert_eq!(service.metrics_snapshot().greetings, 3);
    }

    #[tokio::test]
    async fn non_legal_chat_is_refused() {
        let (service, transport) = service_with(Some("unused"));
        let reply = service.chat(DEFAULT_SESSION, "tell a joke").await;
        assert_eq!(reply.text, REFUSAL_RESPONSE);
        assert!(transport.prompts().is_empty());
    }

    #[tokio::test]
    async fn legal_chat_returns_trimmed_answer() {
        let (service, transport) = service_with(Some("  ## Issue Summary\nBail is possible.  \n"));
        let reply = service
            .chat(DEFAULT_SESSION, "Can I get bail for a bailable offence?")
            .await;
        assert_eq!(reply.text, "## Issue Summary\nBail is possible.");
        let prompts = transport.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("User question: Can I get bail for a bailable offence?"));
    }

    #[tokio::test]
    async fn chat_includes_uploaded_document_for_session() {
        let (service, transport) = service_with(Some("answer"));
        service
            .memory()
            .set("tab-1", "Clause 9: Security deposit is refundable.".into());

        service.chat("tab-1", "explain the deposit clause").await;
        service.chat("tab-2", "explain the deposit clause").await;

        let prompts = transport.prompts();
        assert!(prompts[0].contains("Clause 9: Security deposit is refundable."));
        assert!(!prompts[1].contains("Clause 9"));
    }

    #[tokio::test]
    async fn unavailable_backend_yields_fixed_message() {
        let (service, _) = service_with(None);
        let reply = service.chat(DEFAULT_SESSION, "my employer withheld wages").await;
        assert_eq!(reply.text, "[LLM unavailable] Could not contact Ollama.");
        let invocation = reply.invocation.expect("backend tried");
        assert!(matches!(
            invocation.attempts[0].outcome,
            AttemptOutcome::Failed(_)
        ));
        assert_eq!(service.metrics_snapshot().unavailable, 1);
    }

    #[tokio::test]
    async fn summarize_without_document_skips_backend() {
        let (service, transport) = service_with(Some("unused"));
        let reply = service.summarize(DEFAULT_SESSION, Some("detailed")).await;
        assert_eq!(reply.text, "No document uploaded yet.");
        assert!(!reply.backend_invoked());
        assert!(transport.prompts().is_empty());
    }

    #[tokio::test]
    async fn translate_blank_text_skips_backend() {
        let (service, transport) = service_with(Some("unused"));
        let reply = service.translate("   ", "Hindi", "English").await;
        assert_eq!(reply.text, "No text provided for translation.");
        assert!(transport.prompts().is_empty());
    }

    #[tokio::test]
    async fn translate_strips_label() {
        let (service, _) = service_with(Some("Translation: Bonjour"));
        let reply = service.translate("Hello", "", "French").await;
        assert_eq!(reply.text, "Bonjour");
    }

    #[tokio::test]
    async fn upload_replaces_previous_document() {
        let (service, transport) = service_with(Some("summary"));
        let error = service
            .upload(DEFAULT_SESSION, "notes.txt", b"plain")
            .await
            .expect_err("unsupported");
        assert!(matches!(error, AssistantError::UnsupportedFileType));

        let outcome = service
            .upload(DEFAULT_SESSION, "lease.pdf", b"garbage")
            .await
            .expect("stored");
        assert_eq!(outcome.filename, "lease.pdf");
        let stored = service.memory().get(DEFAULT_SESSION).expect("stored text");
        assert!(stored.starts_with("[Error extracting PDF]"));
        assert_eq!(outcome.characters, stored.chars().count());

        let reply = service.summarize(DEFAULT_SESSION, None).await;
        assert_eq!(reply.text, "summary");
        assert!(transport.prompts()[0].contains("[Error extracting PDF]"));
        assert_eq!(service.metrics_snapshot().documents_uploaded, 1);
    }

    #[tokio::test]
    async fn upload_extracts_pdf_and_docx_text() {
        let (service, _) = service_with(Some("unused"));
        let pdf = fixtures::pdf(&[Some("Sale deed of plot 42"), None]);
        let outcome = service
            .upload("tab-1", "deed.pdf", &pdf)
            .await
            .expect("pdf stored");
        let stored = service.memory().get("tab-1").expect("pdf text");
        assert!(stored.contains("Sale deed of plot 42"), "got {stored:?}");
        assert_eq!(outcome.characters, stored.chars().count());

        let docx = fixtures::docx(
            "<w:document><w:body><w:p><w:r><w:t>Notice period: 30 days</w:t></w:r></w:p></w:body></w:document>",
        );
        service
            .upload("tab-1", "offer.DOCX", &docx)
            .await
            .expect("docx stored");
        assert_eq!(
            service.memory().get("tab-1").as_deref(),
            Some("Notice period: 30 days")
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn oversized_docx_is_stored_as_error_text() {
        let (service, _) = service_with(Some("unused"));
        let xml = format!(
            "<w:document><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>",
            "x".repeat(256 * 1024)
        );
        service
            .upload(DEFAULT_SESSION, "bomb.docx", &fixtures::docx(&xml))
            .await
            .expect("stored in-band");
        assert_eq!(
            service.memory().get(DEFAULT_SESSION).as_deref(),
            Some("[Error extracting DOCX] document body too large")
        );
    }
}
