//! Prompt templates for the chat, summarize, and translate flows.
//!
//! Document text is embedded verbatim with no truncation; a document larger than the model's
//! context window is the backend's problem, not the composer's.

use crate::assistant::AssistantError;

/// Summary style used when the caller does not specify one.
pub const DEFAULT_SUMMARY_STYLE: &str = "short";
/// Source language label used for blank input.
pub const DEFAULT_SOURCE_LANGUAGE: &str = "auto";
/// Target language label used for blank input.
pub const DEFAULT_TARGET_LANGUAGE: &str = "English";

const CHAT_PERSONA: &str = "You are LawEase, an AI legal assistant specialized in Indian law.\n\n\
You must:\n\
- Answer legal questions\n\
- Analyze real-life situations described by users (scenario-based queries)\n\
- Identify relevant IPC sections ONLY when clearly applicable\n\
- Explain why the law applies in simple terms\n\
- Suggest practical next steps (police, complaint, legal notice)\n\
- Respond empathetically in sensitive cases\n\n\
Rules:\n\
- Do NOT hallucinate IPC sections\n\
- If unsure, clearly say 'This may apply depending on facts'\n\
- Do NOT give final legal advice\n\
- Use headings and bullet points\n\
- End with a short summary\n\n";

const CHAT_OUTPUT_SKELETON: &str = "If this is a real-life situation, respond in this format:\n\
1. Issue Summary\n\
2. Applicable Laws (if any)\n\
3. What You Can Do Next\n\
4. Important Notes\n\n\
Answer clearly and politely:\n";

const SUMMARY_PERSONA: &str = "You are LawEase, an AI legal assistant.";

const SUMMARY_RULES: &str = "Rules:\n\
- Use headings\n\
- Bullet points\n\
- Clear legal language\n\
- No personal advice\n\
- Only summarize from the document";

const TRANSLATION_RULES: &str = "IMPORTANT RULES:\n\
- Return ONLY the translated text and nothing else (no labels, no explanation, no punctuation outside the translation).\n\
- Preserve meaning and punctuation inside the translated sentence only.\n\
- If there is ambiguity about dialect, use the most common, neutral form.";

/// Which assistant flow a prompt belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Conversational legal Q&A.
    Chat,
    /// Summary of the uploaded document.
    Summarize,
    /// Plain text translation.
    Translate,
}

impl Flow {
    /// Stable lowercase label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Flow::Chat => "chat",
            Flow::Summarize => "summarize",
            Flow::Translate => "translate",
        }
    }
}

/// Inputs for one backend prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptRequest {
    /// Legal question, optionally grounded in the uploaded document.
    Chat {
        /// Question exactly as the user typed it.
        question: String,
        /// Uploaded document text, if any.
        document: Option<String>,
    },
    /// Summary of a loaded document.
    Summarize {
        /// Free-form style hint such as `short` or `detailed`.
        style: String,
        /// Full document text.
        document: String,
    },
    /// Translation between two language labels.
    Translate {
        /// Trimmed text to translate.
        text: String,
        /// Source language label.
        source: String,
        /// Target language label.
        target: String,
    },
}

impl PromptRequest {
    /// Chat prompt for `question`, with document context when one is loaded.
    pub fn chat(question: impl Into<String>, document: Option<String>) -> Self {
        Self::Chat {
            question: question.into(),
            document: document.filter(|text| !text.is_empty()),
        }
    }

    /// Summary prompt; fails when no document is loaded.
    pub fn summarize(style: Option<&str>, document: Option<String>) -> Result<Self, AssistantError> {
        let document = document
            .filter(|text| !text.is_empty())
            .ok_or(AssistantError::NoDocumentLoaded)?;
        let style = style
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_SUMMARY_STYLE)
            .to_string();
        Ok(Self::Summarize { style, document })
    }

    /// Translation prompt; fails on blank text and fills in default language labels.
    pub fn translate(text: &str, source: &str, target: &str) -> Result<Self, AssistantError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AssistantError::EmptyInput);
        }
        Ok(Self::Translate {
            text: text.to_string(),
            source: label_or(source, DEFAULT_SOURCE_LANGUAGE),
            target: label_or(target, DEFAULT_TARGET_LANGUAGE),
        })
    }

    /// Flow this request belongs to.
    pub fn flow(&self) -> Flow {
        match self {
            Self::Chat { .. } => Flow::Chat,
            Self::Summarize { .. } => Flow::Summarize,
            Self::Translate { .. } => Flow::Translate,
        }
    }

    /// Render the final prompt text sent to the backend.
    pub fn render(&self) -> String {
        match self {
            Self::Chat { question, document } => render_chat(question, document.as_deref()),
            Self::Summarize { style, document } => render_summary(style, document),
            Self::Translate {
                text,
                source,
                target,
            } => render_translation(text, source, target),
        }
    }
}

fn label_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

fn render_chat(question: &str, document: Option<&str>) -> String {
    let mut prompt = String::from(CHAT_PERSONA);
    if let Some(document) = document {
        prompt.push_str("\n\nHere is the user's uploaded document summary/context:\n");
        prompt.push_str(document);
        prompt.push('\n');
    }
    prompt.push_str(&format!("\nUser question: {}\n\n", question.trim()));
    prompt.push_str(CHAT_OUTPUT_SKELETON);
    prompt
}

fn render_summary(style: &str, document: &str) -> String {
    format!(
        "{SUMMARY_PERSONA}\n\n\
         Summarize the following legal document in a **{style}** manner.\n\n\
         {SUMMARY_RULES}\n\n\
         Document:\n{document}\n\n\
         Provide the summary below:\n"
    )
}

fn render_translation(text: &str, source: &str, target: &str) -> String {
    format!(
        "You are a professional translator. Translate the following text from {source} to {target}.\n\n\
         {TRANSLATION_RULES}\n\n\
         Text to translate:\n{text}\n\n\
         Return only the translation (one response)."
    )
}
