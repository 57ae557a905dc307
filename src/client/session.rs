use std::fmt;
use std::time::Duration;
use tokio::sync::oneshot;

use crate::models::AudioClip;

/// Length of one recording.
pub const RECORDING_SECONDS: u32 = 15;

/// Whole-second countdown shown while recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    Remaining(u32),
    Expired,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self { remaining: seconds }
    }

    pub fn start() -> Self {
        Self::new(RECORDING_SECONDS)
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Advance by one elapsed second. Saturates at zero.
    pub fn tick(&mut self) -> CountdownTick {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            CountdownTick::Expired
        } else {
            CountdownTick::Remaining(self.remaining)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The user refused microphone access.
    PermissionDenied,
    /// No usable input device, or it failed while recording.
    Unavailable(String),
    /// The session was torn down before it finished.
    Cancelled,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::PermissionDenied => write!(f, "Microphone access was denied"),
            CaptureError::Unavailable(msg) => write!(f, "Audio input unavailable: {}", msg),
            CaptureError::Cancelled => write!(f, "Recording cancelled"),
        }
    }
}

impl std::error::Error for CaptureError {}

/// An acquired audio input, plus whatever it drives (stream, visualizer loop)
pub trait CaptureDevice {
    /// Stop encoding and hand over the recording as one clip.
    fn finish(&mut self) -> Result<AudioClip, CaptureError>;

    /// Stop the input stream and cancel any draw loop.
    ///
    /// The session calls this exactly once, on every exit path.
    fn release(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The user pressed stop.
    Manual,
    /// The countdown reached zero.
    TimeUp,
}

/// One recording attempt owning its capture device
///
/// The device is released when the session stops, and by `Drop` when the
/// session is abandoned (cancel, teardown, a dropped `run` future).
pub struct RecordingSession<D: CaptureDevice> {
    device: Option<D>,
    countdown: Countdown,
}

impl<D: CaptureDevice> RecordingSession<D> {
    pub fn start(device: D) -> Self {
        tracing::debug!("Recording started ({}s)", RECORDING_SECONDS);
        Self {
            device: Some(device),
            countdown: Countdown::start(),
        }
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn tick(&mut self) -> CountdownTick {
        self.countdown.tick()
    }

    /// End the recording and collect the clip.
    pub fn stop(mut self) -> Result<AudioClip, CaptureError> {
        let mut device = self.device.take().ok_or(CaptureError::Cancelled)?;
        let clip = device.finish();
        device.release();
        clip
    }

    /// Drive the countdown once per second until it expires or `stop` fires.
    ///
    /// `on_tick` receives the remaining seconds after each tick. A dropped
    /// stop sender counts as teardown: the device is released and
    /// `Cancelled` is returned.
    pub async fn run<F>(
        mut self,
        mut stop: oneshot::Receiver<()>,
        mut on_tick: F,
    ) -> Result<(StopReason, AudioClip), CaptureError>
    where
        F: FnMut(u32),
    {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // The first tick of an interval completes immediately.
        interval.tick().await;

        let reason = loop {
            tokio::select! {
                signal = &mut stop => match signal {
                    Ok(()) => break StopReason::Manual,
                    Err(_) => return Err(CaptureError::Cancelled),
                },
                _ = interval.tick() => {
                    let tick = self.tick();
                    on_tick(self.countdown.remaining());
                    if tick == CountdownTick::Expired {
                        break StopReason::TimeUp;
                    }
                }
            }
        };

        tracing::debug!(?reason, "Recording stopped");
        let clip = self.stop()?;
        Ok((reason, clip))
    }
}

impl<D: CaptureDevice> Drop for RecordingSession<D> {
    fn drop(&mut self) {
        if let Some(mut device) = self.device.take() {
            tracing::debug!("Releasing abandoned capture device");
            device.release();
        }
    }
}
