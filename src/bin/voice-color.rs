use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;
use url::Url;

use voice_color_api::{
    client::{
        AnalysisClient, CaptureDevice, CaptureError, QuizFlow, QuizState, RecordingSession,
        StopReason,
    },
    models::{AnalysisResult, AudioClip},
    share,
};

#[derive(Parser)]
#[command(name = "voice-color")]
#[command(about = "Analyze a voice recording into twelve personality colors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Relay base URL
    #[arg(long, env = "VOICE_COLOR_BACKEND_URL", global = true)]
    backend: Option<Url>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a recorded clip for analysis
    Analyze {
        /// Audio file (webm, ogg, wav, mp4...)
        file: PathBuf,

        /// Mime type of the file; guessed from the extension when omitted
        #[arg(long)]
        mime: Option<String>,

        /// Page URL to build a share link on
        #[arg(long)]
        share_base: Option<Url>,

        /// Run the 15 second recording countdown before sending; Ctrl-C stops early
        #[arg(long)]
        countdown: bool,
    },

    /// Restore a result from a share link or a bare token
    Decode { input: String },

    /// Upload a PNG snapshot and print its public URL
    Upload { file: PathBuf },
}

/// A recording that already sits on disk
struct FileCapture {
    path: PathBuf,
    mime_type: Option<String>,
}

impl CaptureDevice for FileCapture {
    fn finish(&mut self) -> std::result::Result<AudioClip, CaptureError> {
        let bytes = std::fs::read(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => CaptureError::PermissionDenied,
            _ => CaptureError::Unavailable(format!("{}: {}", self.path.display(), e)),
        })?;
        Ok(AudioClip::new(bytes, self.mime_type.clone()))
    }

    fn release(&mut self) {
        tracing::debug!("Closed {}", self.path.display());
    }
}

fn guess_mime(path: &std::path::Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "webm" => "audio/webm",
        "ogg" | "oga" => "audio/ogg",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "mp4" | "m4a" => "audio/mp4",
        _ => return None,
    };
    Some(mime.to_string())
}

fn print_result(result: &AnalysisResult) {
    println!("{}", result.summary);
    println!();
    for axis in result.radar_axes() {
        println!(
            "  {:<12} {:<16} {:>5.1}  {}",
            axis.label, axis.sub_label, axis.score, axis.color_code
        );
    }
    if let Some(top) = result.dominant() {
        println!();
        println!("Dominant: {} ({}) - {}", top.label, top.sub_label, top.description);
    }
    if let Err(violations) = result.validate() {
        println!();
        for violation in violations {
            println!("warning: {}", violation);
        }
    }
}

/// Keep the session open until the countdown expires or Ctrl-C is pressed.
async fn record_with_countdown(
    session: RecordingSession<FileCapture>,
) -> std::result::Result<AudioClip, CaptureError> {
    let (stop_tx, stop_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(());
        }
    });

    let (reason, clip) = session
        .run(stop_rx, |remaining| {
            eprint!("\rRecording... {:>2}s", remaining);
            let _ = std::io::stderr().flush();
        })
        .await?;
    eprintln!();

    match reason {
        StopReason::Manual => tracing::info!("Recording stopped"),
        StopReason::TimeUp => tracing::info!("Recording time is up"),
    }
    Ok(clip)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            mime,
            share_base,
            countdown,
        } => {
            let client = AnalysisClient::new(cli.backend);
            let mut flow = QuizFlow::new();

            let mime_type = mime.or_else(|| guess_mime(&file));
            let session = RecordingSession::start(FileCapture {
                path: file,
                mime_type,
            });
            flow.start_recording()?;
            let captured = if countdown {
                record_with_countdown(session).await
            } else {
                session.stop()
            };
            let clip = match captured {
                Ok(clip) => clip,
                Err(e) => {
                    flow.cancel_recording()?;
                    return Err(e).context("Failed to read recording");
                }
            };
            tracing::info!("Analyzing {} bytes", clip.bytes.len());

            match flow.analyze(&client, clip).await? {
                QuizState::Result(result) => {
                    print_result(result);
                    if let Some(base) = share_base {
                        println!();
                        println!("{}", share::share_url(&base, result));
                    }
                }
                QuizState::Error(message) => bail!("{}", message),
                other => bail!("Analysis ended in unexpected state '{}'", other.name()),
            }
        }
        Commands::Decode { input } => {
            let restored = match Url::parse(&input) {
                Ok(mut url) => QuizFlow::from_url(&mut url).result().cloned(),
                Err(_) => share::decode(&input),
            };
            match restored {
                Some(result) => print_result(&result),
                None => bail!("Nothing to restore from '{}'", input),
            }
        }
        Commands::Upload { file } => {
            let client = AnalysisClient::new(cli.backend);
            let png = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let url = client.upload_snapshot(png).await?;
            tracing::info!("Snapshot uploaded");
            println!("{}", url);
        }
    }

    Ok(())
}
