//! Remote compiler client for languages that cannot run in-process.
//!
//! One POST per run: `{language_id, source_code, stdin}` against a hosted
//! execution service, authenticated with a caller-supplied credential header.
//! The practice controller treats transport failure as a signal to degrade,
//! not as a hard error, so this client only classifies and reports.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const SUBMISSION_URL: &str =
    "https://judge0-ce.p.rapidapi.com/submissions?base64_encoded=false&wait=true";
const RAPIDAPI_HOST: &str = "judge0-ce.p.rapidapi.com";

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("compiler service error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Serialize)]
struct Submission<'a> {
    language_id: u32,
    source_code: &'a str,
    stdin: &'a str,
}

/// What the execution service reported back. Exactly one of the fields is
/// usually populated; the controller picks stdout first, then diagnostics.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutionReport {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
}

/// Seam for remote code execution, so the practice controller can be tested
/// without the hosted service.
#[async_trait]
pub trait RemoteCompiler: Send + Sync {
    async fn execute(&self, language_id: u32, source_code: &str)
        -> Result<ExecutionReport, CompilerError>;
}

pub struct RemoteCompilerClient {
    http: reqwest::Client,
    api_key: String,
}

impl RemoteCompilerClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl RemoteCompiler for RemoteCompilerClient {
    async fn execute(
        &self,
        language_id: u32,
        source_code: &str,
    ) -> Result<ExecutionReport, CompilerError> {
        debug!(language_id, "submitting source to remote compiler");
        let response = self
            .http
            .post(SUBMISSION_URL)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", RAPIDAPI_HOST)
            .json(&Submission {
                language_id,
                source_code,
                stdin: "",
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompilerError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.json().await?)
    }
}
