//! AI gateway: the single point of entry for all generative-AI calls.
//!
//! No other module may talk to the generative-language API directly; session
//! controllers depend on the [`AiGateway`] trait so they can be exercised
//! without a network. Each operation is a single HTTP round-trip wrapped in
//! [`crate::retry::execute_with_retry`].
//! No local caching: every call hits the network fresh.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::retry::{execute_with_retry, is_overload_message, FailureClass, RetryPolicy};

pub mod problem;
pub mod prompts;

use problem::{Difficulty, GeneratedProblem};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// Multimodal model used for audio transcription.
pub const TRANSCRIPTION_MODEL: &str = "gemini-2.5-flash";
/// Text model used for feedback and problem generation.
pub const GENERATION_MODEL: &str = "gemini-2.0-flash-exp";

const MAX_ATTEMPTS: u32 = 3;
const TRANSCRIBE_BASE_DELAY_MS: u64 = 2000;
const FEEDBACK_BASE_DELAY_MS: u64 = 2000;
const PROBLEM_BASE_DELAY_MS: u64 = 3000;

/// Audio formats the backend accepts verbatim. Anything else is mapped to
/// the nearest accepted format by [`normalize_mime_type`].
const ACCEPTED_AUDIO_TYPES: [&str; 6] = [
    "audio/wav",
    "audio/mp3",
    "audio/aiff",
    "audio/aac",
    "audio/ogg",
    "audio/flac",
];

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx status with the backend's body passed through verbatim.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// 429/403: the key is out of quota or rejected. Never retried; the
    /// remediation text is meant for the user.
    #[error("credential or quota error (status {status}): {remediation}")]
    CredentialOrQuota { status: u16, remediation: String },

    /// Produced only after the retry budget is exhausted on overload-class
    /// failures, replacing the raw status text.
    #[error("the AI service is currently overloaded, please try again in a few minutes")]
    Overloaded,

    #[error("no transcription text in response")]
    EmptyTranscription,

    #[error("no feedback text in response")]
    EmptyFeedback,

    /// Success status but no extractable text, for a reason we do not
    /// recognize from the finish reason.
    #[error("backend returned no content (finish reason: {finish_reason})")]
    EmptyContent { finish_reason: String },

    /// The backend reported it stopped before completing the payload.
    #[error("response truncated before completion (finish reason: {finish_reason})")]
    Truncated { finish_reason: String },

    #[error("content filtered by safety settings")]
    ContentFiltered,
}

impl GatewayError {
    /// Retry classification. Transport and status failures are transient
    /// (overload variants get extended backoff); credential problems and
    /// empty payloads are surfaced immediately.
    pub fn failure_class(&self) -> FailureClass {
        match self {
            GatewayError::Http(_)
            | GatewayError::Api { .. }
            | GatewayError::Truncated { .. }
            | GatewayError::ContentFiltered => {
                if is_overload_message(&self.to_string()) {
                    FailureClass::Overload
                } else {
                    FailureClass::Transient
                }
            }
            GatewayError::Overloaded => FailureClass::Overload,
            GatewayError::CredentialOrQuota { .. }
            | GatewayError::EmptyTranscription
            | GatewayError::EmptyFeedback
            | GatewayError::EmptyContent { .. } => FailureClass::Fatal,
        }
    }

    /// True for the 429/403 class that needs user action rather than a retry.
    pub fn is_credential_or_quota(&self) -> bool {
        matches!(self, GatewayError::CredentialOrQuota { .. })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (generative-language HTTP contract)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "topP", skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Extracts the text of the first text-bearing part, if any.
    fn text(&self) -> Option<&str> {
        self.candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_ref()?
            .iter()
            .find_map(|part| part.text.as_deref())
    }

    fn finish_reason(&self) -> Option<&str> {
        self.candidates.as_ref()?.first()?.finish_reason.as_deref()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gateway trait and client
// ────────────────────────────────────────────────────────────────────────────

/// The seam between session controllers and the network. Controllers receive
/// already-classified failures and never inspect raw transport errors.
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Transcribes recorded audio. The declared MIME type is normalized to
    /// an accepted audio format before the request is built.
    async fn transcribe(&self, audio: &[u8], declared_mime: &str) -> Result<String, GatewayError>;

    /// Generates 2-3 sentences of interviewer feedback for an answer.
    async fn generate_feedback(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<String, GatewayError>;

    /// Generates a fresh coding problem. JSON parse failure is absorbed into
    /// a canned fallback problem; every other failure surfaces.
    async fn generate_problem(
        &self,
        difficulty: Difficulty,
    ) -> Result<GeneratedProblem, GatewayError>;
}

/// HTTP client for the generative-language API, authenticated with a
/// query-string key.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GatewayError> {
        let url = format!("{GEMINI_BASE_URL}/{model}:generateContent?key={}", self.api_key);
        let response = self.http.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "generation request failed: {body}");
            return Err(error_for_status(status.as_u16(), body));
        }

        Ok(response.json().await?)
    }

    async fn transcribe_once(
        &self,
        encoded_audio: &str,
        mime_type: &'static str,
    ) -> Result<String, GatewayError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::text(prompts::TRANSCRIPTION_INSTRUCTION),
                    Part::inline_data(mime_type, encoded_audio),
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                max_output_tokens: 2000,
                top_p: None,
            },
        };

        let response = self.generate_content(TRANSCRIPTION_MODEL, &request).await?;
        transcript_from(&response)
    }

    async fn feedback_once(&self, prompt: &str) -> Result<String, GatewayError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
            generation_config: GenerationConfig {
                temperature: 0.5,
                max_output_tokens: 200,
                top_p: Some(0.95),
            },
        };

        let response = self.generate_content(GENERATION_MODEL, &request).await?;
        response
            .text()
            .map(str::to_owned)
            .ok_or(GatewayError::EmptyFeedback)
    }

    async fn problem_once(
        &self,
        difficulty: Difficulty,
    ) -> Result<GeneratedProblem, GatewayError> {
        // Fresh seed per attempt biases the backend away from repeating
        // earlier output. A hint only, not a uniqueness guarantee.
        let seed: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(13)
            .map(char::from)
            .collect();
        let prompt = prompts::problem_prompt(difficulty, &seed, Utc::now().timestamp_millis());

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 4000,
                top_p: Some(0.95),
            },
        };

        let response = self.generate_content(GENERATION_MODEL, &request).await?;
        let Some(text) = response.text() else {
            return Err(no_content_error(response.finish_reason()));
        };

        Ok(problem::problem_from_response_text(text, difficulty))
    }
}

#[async_trait]
impl AiGateway for GeminiClient {
    async fn transcribe(&self, audio: &[u8], declared_mime: &str) -> Result<String, GatewayError> {
        let mime_type = normalize_mime_type(declared_mime);
        let encoded = BASE64.encode(audio);
        debug!(
            bytes = audio.len(),
            declared_mime, mime_type, "transcribing audio"
        );

        execute_with_retry(
            || self.transcribe_once(&encoded, mime_type),
            RetryPolicy::new(
                MAX_ATTEMPTS,
                std::time::Duration::from_millis(TRANSCRIBE_BASE_DELAY_MS),
            ),
            GatewayError::failure_class,
            || GatewayError::Overloaded,
        )
        .await
    }

    async fn generate_feedback(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<String, GatewayError> {
        let prompt = prompts::feedback_prompt(question, answer);
        debug!("generating interview feedback");

        execute_with_retry(
            || self.feedback_once(&prompt),
            RetryPolicy::new(
                MAX_ATTEMPTS,
                std::time::Duration::from_millis(FEEDBACK_BASE_DELAY_MS),
            ),
            GatewayError::failure_class,
            || GatewayError::Overloaded,
        )
        .await
    }

    async fn generate_problem(
        &self,
        difficulty: Difficulty,
    ) -> Result<GeneratedProblem, GatewayError> {
        debug!(%difficulty, "generating coding problem");

        execute_with_retry(
            || self.problem_once(difficulty),
            RetryPolicy::new(
                MAX_ATTEMPTS,
                std::time::Duration::from_millis(PROBLEM_BASE_DELAY_MS),
            ),
            GatewayError::failure_class,
            || GatewayError::Overloaded,
        )
        .await
    }
}

/// Maps a non-2xx status to the error taxonomy. 429 and 403 carry remediation
/// text for the user; everything else keeps the body verbatim.
fn error_for_status(status: u16, body: String) -> GatewayError {
    match status {
        429 => GatewayError::CredentialOrQuota {
            status,
            remediation: "Rate limit exceeded. The configured API key has run out of quota; \
                wait a while or supply a key with a higher limit via GOOGLE_API_KEY."
                .to_string(),
        },
        403 => GatewayError::CredentialOrQuota {
            status,
            remediation: "The API key was rejected. Check that GOOGLE_API_KEY is set to a \
                valid generative-language API key."
                .to_string(),
        },
        _ => GatewayError::Api {
            status,
            message: body,
        },
    }
}

/// Extracts the transcript text from a transcription response. A response
/// with no text-bearing part is unusable and fails without a retry.
fn transcript_from(response: &GenerateContentResponse) -> Result<String, GatewayError> {
    response
        .text()
        .map(str::to_owned)
        .ok_or(GatewayError::EmptyTranscription)
}

fn no_content_error(finish_reason: Option<&str>) -> GatewayError {
    match finish_reason {
        Some("MAX_TOKENS") => GatewayError::Truncated {
            finish_reason: "MAX_TOKENS".to_string(),
        },
        Some("SAFETY") => GatewayError::ContentFiltered,
        other => GatewayError::EmptyContent {
            finish_reason: other.unwrap_or("unknown").to_string(),
        },
    }
}

/// Normalizes a declared MIME type to one the backend accepts. Container
/// formats map to the nearest accepted audio format; unrecognized input
/// defaults to `audio/ogg`.
pub fn normalize_mime_type(declared: &str) -> &'static str {
    let declared = declared.to_ascii_lowercase();
    if declared.contains("webm") {
        return "audio/ogg";
    }
    if declared.contains("mpeg") {
        return "audio/mp3";
    }
    ACCEPTED_AUDIO_TYPES
        .iter()
        .find(|accepted| **accepted == declared)
        .copied()
        .unwrap_or("audio/ogg")
}
