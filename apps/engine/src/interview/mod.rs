//! Interview session controller: the record → transcribe → feedback →
//! advance cycle over a fixed question script.
//!
//! The controller owns the only real state machine in the system:
//!
//! ```text
//! NotStarted → AwaitingRecording → Recording → Processing → AwaitingAdvance
//!                      ↑               |            |             |
//!                      └── error ──────┴────────────┘      next question /
//!                                                             Completed
//! ```
//!
//! Every state-changing method is phase-gated and returns
//! [`InterviewError::InvalidPhase`] when called out of turn. That gate is the
//! concurrency invariant: there is no edge out of `Processing` on a record
//! action, so a second processing sequence can never start while one is in
//! flight. If a `finish_recording` future is dropped mid-processing, the
//! session rolls back to `AwaitingRecording` so the question can be answered
//! again.

pub mod media;
pub mod questions;

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};

use crate::gateway::{AiGateway, GatewayError};
use media::{CaptureDevice, CaptureHandle, DeviceAccessError, SpeechSynthesizer};
use questions::HR_QUESTIONS;

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewPhase {
    NotStarted,
    AwaitingRecording,
    Recording,
    Processing,
    AwaitingAdvance,
    Completed,
}

#[derive(Debug, Error)]
pub enum InterviewError {
    /// The requested action has no edge from the current phase.
    #[error("action not allowed while the session is {0:?}")]
    InvalidPhase(InterviewPhase),

    #[error(transparent)]
    Device(#[from] DeviceAccessError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Per-question working state. Discarded on advance.
#[derive(Debug, Clone, Default)]
pub struct InterviewTurn {
    pub question_index: usize,
    pub transcript: Option<String>,
    pub feedback: Option<String>,
}

/// Live only between start and stop of a recording. Owns the device handle
/// and the buffered audio fragments.
struct RecordingSession {
    handle: Box<dyn CaptureHandle>,
    chunks: Vec<Bytes>,
}

/// Rolls the phase back to `AwaitingRecording` unless settled first.
/// `Processing` has no outgoing edge of its own, so a `finish_recording`
/// future that is dropped mid-flight must not strand the session there.
struct PhaseGuard<'a> {
    phase: &'a mut InterviewPhase,
    settled: bool,
}

impl<'a> PhaseGuard<'a> {
    fn new(phase: &'a mut InterviewPhase) -> Self {
        Self {
            phase,
            settled: false,
        }
    }

    fn settle(mut self, phase: InterviewPhase) {
        *self.phase = phase;
        self.settled = true;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            *self.phase = InterviewPhase::AwaitingRecording;
        }
    }
}

/// Drives one mock interview. One instance per active session; no state
/// survives outside it.
pub struct InterviewSession {
    gateway: Arc<dyn AiGateway>,
    device: Arc<dyn CaptureDevice>,
    voice: Option<Arc<dyn SpeechSynthesizer>>,
    phase: InterviewPhase,
    turn: InterviewTurn,
    recording: Option<RecordingSession>,
}

impl InterviewSession {
    pub fn new(gateway: Arc<dyn AiGateway>, device: Arc<dyn CaptureDevice>) -> Self {
        Self {
            gateway,
            device,
            voice: None,
            phase: InterviewPhase::NotStarted,
            turn: InterviewTurn::default(),
            recording: None,
        }
    }

    /// Attaches a speech synthesizer for [`Self::play_question`].
    pub fn with_voice(mut self, voice: Arc<dyn SpeechSynthesizer>) -> Self {
        self.voice = Some(voice);
        self
    }

    pub fn phase(&self) -> InterviewPhase {
        self.phase
    }

    pub fn question_index(&self) -> usize {
        self.turn.question_index
    }

    pub fn question_count(&self) -> usize {
        HR_QUESTIONS.len()
    }

    /// Text of the active question.
    pub fn current_question(&self) -> &'static str {
        HR_QUESTIONS[self.turn.question_index]
    }

    pub fn transcript(&self) -> Option<&str> {
        self.turn.transcript.as_deref()
    }

    pub fn feedback(&self) -> Option<&str> {
        self.turn.feedback.as_deref()
    }

    /// Reads the active question aloud, when a synthesizer is attached.
    pub fn play_question(&self) {
        if let Some(voice) = &self.voice {
            voice.speak(self.current_question());
        }
    }

    /// Begins the interview at question 0.
    pub fn start(&mut self) -> Result<(), InterviewError> {
        if self.phase != InterviewPhase::NotStarted {
            return Err(InterviewError::InvalidPhase(self.phase));
        }
        info!("interview started");
        self.turn = InterviewTurn::default();
        self.phase = InterviewPhase::AwaitingRecording;
        Ok(())
    }

    /// Acquires the capture device and starts buffering. On acquisition
    /// failure the session stays in `AwaitingRecording` so the user can
    /// retry.
    pub async fn start_recording(&mut self) -> Result<(), InterviewError> {
        if self.phase != InterviewPhase::AwaitingRecording {
            return Err(InterviewError::InvalidPhase(self.phase));
        }
        let handle = self.device.acquire().await?;
        info!(
            question = self.turn.question_index,
            mime_type = handle.mime_type(),
            "recording started"
        );
        self.recording = Some(RecordingSession {
            handle,
            chunks: Vec::new(),
        });
        self.phase = InterviewPhase::Recording;
        Ok(())
    }

    /// Appends one captured audio fragment. Only legal while recording.
    pub fn push_audio(&mut self, chunk: Bytes) -> Result<(), InterviewError> {
        let Some(recording) = self.recording.as_mut() else {
            return Err(InterviewError::InvalidPhase(self.phase));
        };
        recording.chunks.push(chunk);
        Ok(())
    }

    /// Stops the recording, releases the device, and runs the transcription
    /// and feedback calls sequentially.
    ///
    /// The device handle is dropped before any network work starts, so the
    /// microphone is free even when the gateway fails. Failure of either
    /// call returns the session to `AwaitingRecording` on the same question;
    /// success lands in `AwaitingAdvance`.
    pub async fn finish_recording(&mut self) -> Result<(), InterviewError> {
        if self.phase != InterviewPhase::Recording {
            return Err(InterviewError::InvalidPhase(self.phase));
        }
        let Some(RecordingSession { handle, chunks }) = self.recording.take() else {
            // Recording phase always carries a live session; treat the
            // inconsistency as a phase error and recover.
            self.phase = InterviewPhase::AwaitingRecording;
            return Err(InterviewError::InvalidPhase(InterviewPhase::Recording));
        };

        let mime_type = handle.mime_type().to_string();
        drop(handle);

        let audio: Vec<u8> = chunks.iter().flat_map(|chunk| chunk.iter().copied()).collect();
        info!(
            question = self.turn.question_index,
            bytes = audio.len(),
            mime_type,
            "recording stopped, processing answer"
        );
        self.phase = InterviewPhase::Processing;

        let gateway = self.gateway.clone();
        let question = HR_QUESTIONS[self.turn.question_index];
        let turn = &mut self.turn;
        let guard = PhaseGuard::new(&mut self.phase);

        let outcome = async {
            let transcript = gateway.transcribe(&audio, &mime_type).await?;
            turn.transcript = Some(transcript.clone());

            let feedback = gateway.generate_feedback(question, &transcript).await?;
            turn.feedback = Some(feedback);
            Ok(())
        }
        .await;

        match outcome {
            Ok(()) => {
                guard.settle(InterviewPhase::AwaitingAdvance);
                Ok(())
            }
            Err(error) => {
                warn!(%error, "answer processing failed, question stays active");
                guard.settle(InterviewPhase::AwaitingRecording);
                Err(error)
            }
        }
    }

    /// Moves to the next question, clearing transcript and feedback. From
    /// the final question's `AwaitingAdvance` the session completes instead;
    /// there is no next question to advance to.
    pub fn advance(&mut self) -> Result<(), InterviewError> {
        if self.phase != InterviewPhase::AwaitingAdvance {
            return Err(InterviewError::InvalidPhase(self.phase));
        }
        if self.turn.question_index + 1 < HR_QUESTIONS.len() {
            self.turn = InterviewTurn {
                question_index: self.turn.question_index + 1,
                ..InterviewTurn::default()
            };
            self.phase = InterviewPhase::AwaitingRecording;
            info!(question = self.turn.question_index, "advanced to next question");
        } else {
            self.phase = InterviewPhase::Completed;
            info!("interview completed");
        }
        Ok(())
    }

    /// Resets a completed interview back to the initial state.
    pub fn restart(&mut self) -> Result<(), InterviewError> {
        if self.phase != InterviewPhase::Completed {
            return Err(InterviewError::InvalidPhase(self.phase));
        }
        self.turn = InterviewTurn::default();
        self.phase = InterviewPhase::NotStarted;
        info!("interview reset");
        Ok(())
    }
}
