//! `aide vision` — grab one webcam frame and ask a vision model what it shows.
//!
//! Flow: acquire a device (primary index, then the alternate), read a frame,
//! encode it as JPEG into a transient file, submit it, print the description.
//! Acquisition and frame reads share a bounded retry loop. The transient file
//! is a [`NamedTempFile`], so it is gone once the run ends whatever the outcome.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use image::{ImageFormat, RgbImage};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use aide_core::config::load_config;
use aide_providers::{HttpProvider, ProviderConfig, ProviderError, ProviderKind, VisionProvider};

const DEFAULT_VISION_MODEL: &str = "llava-v1.5-7b-4096-preview";
const VISION_PROMPT: &str = "What's in this image?";

const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;
const FRAME_GRAB_TIMEOUT: Duration = Duration::from_secs(10);
const WARM_UP: Duration = Duration::from_millis(500);

// ─────────────────────────────────────────────
// Errors / frames
// ─────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("camera device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("failed to read frame: {0}")]
    FrameRead(String),

    #[error("failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One raw RGB8 frame, row-major.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// Opens camera devices by index.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn open(&self, index: u32) -> Result<Box<dyn CameraDevice>, CaptureError>;
}

/// An opened camera. Dropping it releases the device.
#[async_trait]
pub trait CameraDevice: Send {
    async fn read_frame(&mut self) -> Result<Frame, CaptureError>;
}

// ─────────────────────────────────────────────
// ffmpeg-backed camera
// ─────────────────────────────────────────────

/// Reads frames by running `ffmpeg` against the platform capture API.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegCamera;

#[async_trait]
impl FrameSource for FfmpegCamera {
    async fn open(&self, index: u32) -> Result<Box<dyn CameraDevice>, CaptureError> {
        let input = ffmpeg_input_args(index).ok_or_else(|| {
            CaptureError::DeviceUnavailable(format!(
                "camera capture is not supported on {}",
                std::env::consts::OS
            ))
        })?;

        if cfg!(target_os = "linux") {
            let node = PathBuf::from(format!("/dev/video{index}"));
            if !node.exists() {
                return Err(CaptureError::DeviceUnavailable(format!(
                    "{} does not exist",
                    node.display()
                )));
            }
        }

        debug!(index, "camera opened");
        Ok(Box::new(FfmpegDevice { index, input }))
    }
}

struct FfmpegDevice {
    index: u32,
    input: Vec<String>,
}

#[async_trait]
impl CameraDevice for FfmpegDevice {
    async fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        let scale = format!("scale={FRAME_WIDTH}:{FRAME_HEIGHT}");
        let child = Command::new("ffmpeg")
            .args(["-hide_banner", "-loglevel", "error"])
            .args(&self.input)
            .args(["-frames:v", "1", "-vf", &scale])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CaptureError::DeviceUnavailable(format!("failed to start ffmpeg: {e}")))?;

        let output = tokio::time::timeout(FRAME_GRAB_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| {
                CaptureError::FrameRead(format!(
                    "ffmpeg timed out after {} seconds",
                    FRAME_GRAB_TIMEOUT.as_secs()
                ))
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CaptureError::FrameRead(format!(
                "ffmpeg exited with {} on device {}: {}",
                output.status,
                self.index,
                stderr.trim()
            )));
        }

        let expected = (FRAME_WIDTH * FRAME_HEIGHT * 3) as usize;
        if output.stdout.len() != expected {
            return Err(CaptureError::FrameRead(format!(
                "expected {expected} bytes, got {}",
                output.stdout.len()
            )));
        }

        Ok(Frame {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            rgb: output.stdout,
        })
    }
}

/// ffmpeg input arguments for camera `index`, or `None` on unsupported platforms.
fn ffmpeg_input_args(index: u32) -> Option<Vec<String>> {
    let size = format!("{FRAME_WIDTH}x{FRAME_HEIGHT}");
    if cfg!(target_os = "linux") {
        Some(vec![
            "-f".into(),
            "v4l2".into(),
            "-video_size".into(),
            size,
            "-i".into(),
            format!("/dev/video{index}"),
        ])
    } else if cfg!(target_os = "macos") {
        Some(vec![
            "-f".into(),
            "avfoundation".into(),
            "-framerate".into(),
            "30".into(),
            "-video_size".into(),
            size,
            "-i".into(),
            index.to_string(),
        ])
    } else {
        None
    }
}

// ─────────────────────────────────────────────
// Capture state machine
// ─────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct CaptureSettings {
    pub primary_device: u32,
    pub alternate_device: u32,
    /// Total attempts at acquire + read (at least 1).
    pub attempts: u32,
    pub retry_delay: Duration,
    /// Pause between opening a device and reading from it.
    pub warm_up: Duration,
    pub model: String,
    pub prompt: String,
    /// Directory for the transient JPEG; the system temp dir when `None`.
    pub work_dir: Option<PathBuf>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            primary_device: 0,
            alternate_device: 1,
            attempts: 3,
            retry_delay: Duration::from_secs(1),
            warm_up: WARM_UP,
            model: DEFAULT_VISION_MODEL.to_string(),
            prompt: VISION_PROMPT.to_string(),
            work_dir: None,
        }
    }
}

#[derive(Debug)]
pub enum CaptureOutcome {
    Described(String),
    /// No frame could be captured or encoded.
    Failed(CaptureError),
    /// A frame was captured but the provider call failed.
    DescriptionFailed(ProviderError),
}

enum Stage {
    AcquireDevice { attempt: u32 },
    CaptureFrame { device: Box<dyn CameraDevice>, attempt: u32 },
    Encode(Frame),
    Submit(NamedTempFile),
    Done(CaptureOutcome),
}

/// Run one capture → describe cycle. Never panics; every failure becomes an outcome.
pub async fn run_capture(
    source: &dyn FrameSource,
    vision: &dyn VisionProvider,
    settings: &CaptureSettings,
) -> CaptureOutcome {
    let mut stage = Stage::AcquireDevice { attempt: 1 };

    loop {
        stage = match stage {
            Stage::AcquireDevice { attempt } => match acquire_device(source, settings).await {
                Ok(device) => {
                    tokio::time::sleep(settings.warm_up).await;
                    Stage::CaptureFrame { device, attempt }
                }
                Err(e) => retry_or_fail(e, attempt, settings).await,
            },
            Stage::CaptureFrame { mut device, attempt } => match device.read_frame().await {
                Ok(frame) => Stage::Encode(frame),
                Err(e) => retry_or_fail(e, attempt, settings).await,
            },
            Stage::Encode(frame) => match write_jpeg(frame, settings.work_dir.as_deref()) {
                Ok(file) => Stage::Submit(file),
                Err(e) => Stage::Done(CaptureOutcome::Failed(e)),
            },
            Stage::Submit(file) => {
                info!(path = %file.path().display(), model = %settings.model, "submitting capture");
                let result = vision
                    .describe_image(file.path(), &settings.prompt, &settings.model)
                    .await;
                drop(file);
                match result {
                    Ok(text) => Stage::Done(CaptureOutcome::Described(text)),
                    Err(e) => Stage::Done(CaptureOutcome::DescriptionFailed(e)),
                }
            }
            Stage::Done(outcome) => return outcome,
        };
    }
}

/// Open the primary device, falling back to the alternate index.
async fn acquire_device(
    source: &dyn FrameSource,
    settings: &CaptureSettings,
) -> Result<Box<dyn CameraDevice>, CaptureError> {
    match source.open(settings.primary_device).await {
        Ok(device) => return Ok(device),
        Err(e) => debug!(index = settings.primary_device, error = %e, "primary camera failed"),
    }
    match source.open(settings.alternate_device).await {
        Ok(device) => Ok(device),
        Err(e) => {
            debug!(index = settings.alternate_device, error = %e, "alternate camera failed");
            Err(CaptureError::DeviceUnavailable(format!(
                "no camera at index {} or {}",
                settings.primary_device, settings.alternate_device
            )))
        }
    }
}

async fn retry_or_fail(error: CaptureError, attempt: u32, settings: &CaptureSettings) -> Stage {
    if attempt >= settings.attempts {
        warn!(attempts = attempt, error = %error, "capture failed");
        return Stage::Done(CaptureOutcome::Failed(error));
    }
    warn!(attempt, error = %error, "capture attempt failed, retrying");
    tokio::time::sleep(settings.retry_delay).await;
    Stage::AcquireDevice {
        attempt: attempt + 1,
    }
}

/// Encode `frame` as JPEG into a fresh `aide-capture-*.jpg` temp file.
fn write_jpeg(frame: Frame, dir: Option<&Path>) -> Result<NamedTempFile, CaptureError> {
    let Frame { width, height, rgb } = frame;
    let len = rgb.len();
    let image = RgbImage::from_raw(width, height, rgb).ok_or_else(|| {
        CaptureError::FrameRead(format!("{len} bytes do not fill a {width}x{height} RGB frame"))
    })?;

    let mut builder = tempfile::Builder::new();
    builder.prefix("aide-capture-").suffix(".jpg");
    let mut file = match dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };

    image.write_to(file.as_file_mut(), ImageFormat::Jpeg)?;
    debug!(path = %file.path().display(), "frame encoded");
    Ok(file)
}

// ─────────────────────────────────────────────
// Command
// ─────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct VisionArgs {
    /// Primary camera index
    #[arg(long, default_value_t = 0)]
    pub device: u32,

    /// Camera index tried when the primary cannot be opened
    #[arg(long, default_value_t = 1)]
    pub alt_device: u32,

    /// Capture attempts before giving up
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub retries: u32,

    /// Delay between attempts, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// Vision model served by Groq
    #[arg(long, default_value = DEFAULT_VISION_MODEL)]
    pub model: String,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub logs: bool,
}

impl From<&VisionArgs> for CaptureSettings {
    fn from(args: &VisionArgs) -> Self {
        Self {
            primary_device: args.device,
            alternate_device: args.alt_device,
            attempts: args.retries,
            retry_delay: Duration::from_millis(args.delay_ms),
            model: args.model.clone(),
            ..Default::default()
        }
    }
}

pub async fn run(args: VisionArgs) -> Result<()> {
    let config = load_config(None);
    let spec = ProviderKind::Groq.spec();

    let Some(provider_config) = ProviderConfig::from_config(&config, spec) else {
        println!("Error: GROQ API key not found in config file");
        return Ok(());
    };
    let provider =
        HttpProvider::new(&provider_config, spec).context("failed to create Groq client")?;

    println!("Capturing image...");
    match run_capture(&FfmpegCamera, &provider, &CaptureSettings::from(&args)).await {
        CaptureOutcome::Described(text) => println!("{text}"),
        CaptureOutcome::Failed(e) => println!("Error: Failed to capture image: {e}"),
        CaptureOutcome::DescriptionFailed(e) => println!("Error: {e}"),
    }
    Ok(())
}
