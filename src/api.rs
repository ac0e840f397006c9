//! HTTP surface for LawEase.
//!
//! This module exposes a compact Axum router:
//!
//! - `GET /` – Liveness marker.
//! - `POST /upload-document` – Multipart upload (`file` field) of a PDF or DOCX; the extracted
//!   text replaces the session's document memory.
//! - `POST /translate` – Translate `text` from `from_lang` to `to_lang`.
//! - `POST /summarize` – Summarize the session's document in the requested `type` of summary.
//! - `POST /chat` – Legal Q&A grounded in the session's document when one is loaded.
//! - `GET /metrics` – Request and backend counters.
//! - `GET /commands` – Machine-readable command catalog.
//!
//! Flow failures (no document, blank text, backend down) are ordinary `200` responses whose
//! text carries a fixed message. An optional `x-session-id` header selects the document slot;
//! without it every client shares the `default` slot.

use crate::assistant::{AssistantApi, UPLOAD_MESSAGE};
use crate::memory::session_key;
use crate::metrics::MetricsSnapshot;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::HeaderMap,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Header carrying the caller's session identifier.
pub const SESSION_HEADER: &str = "x-session-id";

/// Build the HTTP router exposing the assistant API surface.
pub fn create_router<S>(service: Arc<S>, max_upload_bytes: usize) -> Router
where
    S: AssistantApi + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/upload-document", post(upload_document::<S>))
        .route("/translate", post(translate::<S>))
        .route("/summarize", post(summarize::<S>))
        .route("/chat", post(chat::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .with_state(service)
}

fn session_from(headers: &HeaderMap) -> String {
    session_key(
        headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok()),
    )
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
}

async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "LawEase backend running",
    })
}

/// Response body for `POST /upload-document`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum UploadResponse {
    Stored {
        status: &'static str,
        filename: String,
        characters: usize,
        message: &'static str,
    },
    Rejected {
        error: String,
    },
}

/// Store the uploaded file's text as the session's document.
///
/// The first multipart field named `file` is used; any other fields are ignored.
async fn upload_document<S>(
    State(service): State<Arc<S>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Json<UploadResponse>
where
    S: AssistantApi,
{
    let session = session_from(&headers);
    let mut file: Option<(String, Vec<u8>)> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                let filename = field.file_name().unwrap_or("document").to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        file = Some((filename, bytes.to_vec()));
                        break;
                    }
                    Err(error) => {
                        tracing::warn!(%error, "Failed to read upload bytes");
                        return Json(UploadResponse::Rejected {
                            error: "Failed to read file data".into(),
                        });
                    }
                }
            }
            Ok(None) => break,
            Err(error) => {
                tracing::warn!(%error, "Malformed multipart body");
                return Json(UploadResponse::Rejected {
                    error: "Failed to read file data".into(),
                });
            }
        }
    }

    let Some((filename, bytes)) = file else {
        return Json(UploadResponse::Rejected {
            error: "No file provided".into(),
        });
    };

    match service.upload(&session, &filename, &bytes).await {
        Ok(outcome) => Json(UploadResponse::Stored {
            status: "success",
            filename: outcome.filename,
            characters: outcome.characters,
            message: UPLOAD_MESSAGE,
        }),
        Err(error) => Json(UploadResponse::Rejected {
            error: error.to_string(),
        }),
    }
}

/// Request body for `POST /translate`.
#[derive(Deserialize)]
struct TranslateRequest {
    text: String,
    #[serde(default)]
    from_lang: String,
    #[serde(default)]
    to_lang: String,
}

#[derive(Serialize)]
struct TranslateResponse {
    translation: String,
}

async fn translate<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<TranslateRequest>,
) -> Json<TranslateResponse>
where
    S: AssistantApi,
{
    let reply = service
        .translate(&request.text, &request.from_lang, &request.to_lang)
        .await;
    Json(TranslateResponse {
        translation: reply.text,
    })
}

/// Request body for `POST /summarize`.
#[derive(Deserialize, Default)]
struct SummarizeRequest {
    #[serde(default, rename = "type")]
    summary_type: Option<String>,
}

#[derive(Serialize)]
struct SummarizeResponse {
    summary: String,
}

async fn summarize<S>(
    State(service): State<Arc<S>>,
    headers: HeaderMap,
    request: Option<Json<SummarizeRequest>>,
) -> Json<SummarizeResponse>
where
    S: AssistantApi,
{
    let request = request.map(|Json(body)| body).unwrap_or_default();
    let session = session_from(&headers);
    let reply = service
        .summarize(&session, request.summary_type.as_deref())
        .await;
    Json(SummarizeResponse {
        summary: reply.text,
    })
}

/// Request body for `POST /chat`.
#[derive(Deserialize)]
struct ChatRequest {
    prompt: String,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

async fn chat<S>(
    State(service): State<Arc<S>>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse>
where
    S: AssistantApi,
{
    let session = session_from(&headers);
    let reply = service.chat(&session, &request.prompt).await;
    Json(ChatResponse {
        response: reply.text,
    })
}

async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: AssistantApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery in clients.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "upload_document",
                method: "POST",
                path: "/upload-document",
                description: "Upload a PDF or DOCX as multipart field `file`; its text becomes the document context for chat and summarize.",
                request_example: None,
            },
            CommandDescriptor {
                name: "chat",
                method: "POST",
                path: "/chat",
                description: "Ask a legal question or describe a situation. Response returns { \"response\": string }.",
                request_example: Some(json!({
                    "prompt": "My landlord is refusing to return my deposit. What should I do?"
                })),
            },
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summarize",
                description: "Summarize the uploaded document. Response returns { \"summary\": string }.",
                request_example: Some(json!({ "type": "detailed" })),
            },
            CommandDescriptor {
                name: "translate",
                method: "POST",
                path: "/translate",
                description: "Translate text between languages. Blank languages default to auto -> English.",
                request_example: Some(json!({
                    "text": "Namaste",
                    "from_lang": "Hindi",
                    "to_lang": "English"
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return request and backend counters.",
                request_example: None,
            },
        ],
    })
}
