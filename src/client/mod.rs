//! Client side of the quiz: recording, the analysis request and the
//! state machine the UI follows.

pub mod analysis;
pub mod flow;
pub mod session;

pub use analysis::{AnalysisClient, AnalysisError};
pub use flow::{QuizAction, QuizFlow, QuizState, TransitionError};
pub use session::{
    CaptureDevice, CaptureError, Countdown, CountdownTick, RecordingSession, StopReason,
    RECORDING_SECONDS,
};
