//! Execution seams for the practice editor.
//!
//! These shims are opaque to the controller: what matters is captured
//! output. Faults raised by evaluated code come back as [`ScriptFault`] and
//! are rendered into the output panel, never propagated further.

use async_trait::async_trait;
use thiserror::Error;

/// A fault raised while evaluating user code. Carries the renderable
/// message and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ScriptFault(pub String);

/// In-process evaluation of the buffer as executable code in an isolated
/// invocation. Implementations capture all diagnostic-output calls made
/// during the run and return them as the result.
#[async_trait]
pub trait ScriptHost: Send + Sync {
    async fn eval(&self, source: &str) -> Result<String, ScriptFault>;
}

/// Sandboxed interpreter bootstrapped once per process from an external
/// runtime. Initialization is slow; [`WasmInterpreter::is_ready`] gates
/// execution until it finishes.
#[async_trait]
pub trait WasmInterpreter: Send + Sync {
    fn is_ready(&self) -> bool;

    /// Evaluates the buffer with standard output redirected to an in-memory
    /// sink and returns the sink's contents.
    async fn eval_captured(&self, source: &str) -> Result<String, ScriptFault>;
}
