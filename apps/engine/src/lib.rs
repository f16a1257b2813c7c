//! Core engine for an AI-assisted interview practice product.
//!
//! Three layers:
//! - [`gateway`]: a generative-language HTTP client with bounded retries,
//!   differentiated overload backoff, and response sanitization.
//! - [`interview`]: a mock-interview session driven through a strict phase
//!   machine, recording answers and collecting AI feedback per question.
//! - [`practice`]: a coding-practice session with AI-generated problems and
//!   per-language execution strategies.
//!
//! Everything that touches the outside world (audio capture, speech, script
//! evaluation, remote compilation, the AI backend) sits behind a trait so
//! controllers stay testable without the real services.

pub mod compiler;
pub mod config;
pub mod gateway;
pub mod interview;
pub mod practice;
pub mod retry;

pub use compiler::{RemoteCompiler, RemoteCompilerClient};
pub use config::Config;
pub use gateway::problem::{Difficulty, GeneratedProblem, WorkedExample};
pub use gateway::{AiGateway, GatewayError, GeminiClient};
pub use interview::{InterviewError, InterviewPhase, InterviewSession, InterviewTurn};
pub use practice::templates::Language;
pub use practice::{PracticeError, PracticeSession};
