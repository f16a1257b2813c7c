//! Media capability seams: microphone capture and question playback.
//!
//! The microphone is a scarce exclusive resource. Acquisition returns a
//! handle whose `Drop` releases the device, so every exit path of the
//! interview controller (stop, error, teardown) gives it back without any
//! explicit bookkeeping. A leaked handle is a correctness bug.

use async_trait::async_trait;
use thiserror::Error;

/// Why the capture device could not be acquired. Recoverable: the user can
/// retry the record action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceAccessError {
    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("no audio capture device available")]
    NoDevice,
}

/// Exclusive handle on an acquired capture device.
///
/// Implementations MUST release the underlying device in their `Drop`; the
/// controller relies on drop order, never on an explicit release call.
pub trait CaptureHandle: Send {
    /// The negotiated recording format, e.g. `audio/webm;codecs=opus`.
    fn mime_type(&self) -> &str;
}

/// Factory for capture handles. One device exists per session environment;
/// at most one handle is live at a time by controller policy.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn CaptureHandle>, DeviceAccessError>;
}

/// Reads the active question aloud. Playback is fire-and-forget; failures
/// are the implementation's problem, not the controller's.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str);
}
