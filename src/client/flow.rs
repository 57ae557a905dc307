use std::fmt;
use url::Url;

use super::analysis::{AnalysisClient, AnalysisError};
use crate::models::{AnalysisResult, AudioClip};
use crate::share;

/// What the quiz screen is showing
#[derive(Debug, Clone, PartialEq)]
pub enum QuizState {
    Idle,
    Recording,
    Analyzing,
    Result(AnalysisResult),
    Error(String),
}

impl QuizState {
    pub fn name(&self) -> &'static str {
        match self {
            QuizState::Idle => "idle",
            QuizState::Recording => "recording",
            QuizState::Analyzing => "analyzing",
            QuizState::Result(_) => "result",
            QuizState::Error(_) => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizAction {
    StartRecording,
    CancelRecording,
    FinishRecording,
    Complete,
    Reset,
    RestoreShared,
}

/// An action that is not allowed from the current state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub from: &'static str,
    pub action: QuizAction,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot {:?} while {}", self.action, self.from)
    }
}

impl std::error::Error for TransitionError {}

/// idle -> recording -> analyzing -> result | error, back to idle on reset
/// or when the recording is cancelled
#[derive(Debug, Clone, PartialEq)]
pub struct QuizFlow {
    state: QuizState,
}

impl Default for QuizFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizFlow {
    pub fn new() -> Self {
        Self {
            state: QuizState::Idle,
        }
    }

    /// Start from a page URL; a decodable share parameter skips straight to
    /// the result and is removed from `url`.
    pub fn from_url(url: &mut Url) -> Self {
        let mut flow = Self::new();
        if let Some(result) = share::take_shared_result(url) {
            // Idle -> Result is always allowed.
            let _ = flow.restore_shared(result);
        }
        flow
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            QuizState::Result(result) => Some(result),
            _ => None,
        }
    }

    fn reject(&self, action: QuizAction) -> TransitionError {
        TransitionError {
            from: self.state.name(),
            action,
        }
    }

    pub fn start_recording(&mut self) -> Result<(), TransitionError> {
        match self.state {
            QuizState::Idle => {
                self.state = QuizState::Recording;
                Ok(())
            }
            _ => Err(self.reject(QuizAction::StartRecording)),
        }
    }

    /// The capture device failed or the recording was abandoned.
    pub fn cancel_recording(&mut self) -> Result<(), TransitionError> {
        match self.state {
            QuizState::Recording => {
                self.state = QuizState::Idle;
                Ok(())
            }
            _ => Err(self.reject(QuizAction::CancelRecording)),
        }
    }

    /// Timer expiry and the stop button both land here.
    pub fn finish_recording(&mut self) -> Result<(), TransitionError> {
        match self.state {
            QuizState::Recording => {
                self.state = QuizState::Analyzing;
                Ok(())
            }
            _ => Err(self.reject(QuizAction::FinishRecording)),
        }
    }

    pub fn complete(
        &mut self,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> Result<(), TransitionError> {
        if self.state != QuizState::Analyzing {
            return Err(self.reject(QuizAction::Complete));
        }

        self.state = match outcome {
            Ok(result) => QuizState::Result(result),
            Err(e) => {
                tracing::error!("Analysis failed: {}", e);
                QuizState::Error(e.user_message().to_string())
            }
        };
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), TransitionError> {
        match self.state {
            QuizState::Result(_) | QuizState::Error(_) => {
                self.state = QuizState::Idle;
                Ok(())
            }
            _ => Err(self.reject(QuizAction::Reset)),
        }
    }

    pub fn restore_shared(&mut self, result: AnalysisResult) -> Result<(), TransitionError> {
        match self.state {
            QuizState::Idle => {
                self.state = QuizState::Result(result);
                Ok(())
            }
            _ => Err(self.reject(QuizAction::RestoreShared)),
        }
    }

    /// Finish the recording and run the analysis request to completion.
    pub async fn analyze(
        &mut self,
        client: &AnalysisClient,
        clip: AudioClip,
    ) -> Result<&QuizState, TransitionError> {
        self.finish_recording()?;
        let outcome = client.analyze(clip).await;
        self.complete(outcome)?;
        Ok(&self.state)
    }
}
