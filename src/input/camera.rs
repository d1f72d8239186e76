// src/input/camera.rs
use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use thiserror::Error;
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

use super::ImageFile;
use crate::config::CameraSettings;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Camera capture is disabled in settings")]
    Disabled,

    #[error("No camera grab command is configured for this platform")]
    Unsupported,

    #[error("Failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Frame grab timed out after {0:?}")]
    Timeout(Duration),

    #[error("Frame grab failed: {0}")]
    Grab(String),

    #[error("Camera image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("No frame captured yet")]
    NoFrame,

    #[error("Camera stream closed")]
    Stopped,
}

/// Upper bound on how long a running grab ignores a stop request.
const STOP_POLL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct Frame {
    /// Increases with every new frame, so viewers can skip re-uploading.
    pub serial: u64,
    pub image: Arc<RgbaImage>,
}

pub trait Camera {
    /// Succeeds only once a first frame is available.
    fn open(&self) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// A live preview that owns the device until dropped.
pub trait CameraStream {
    fn latest_frame(&self) -> Option<Frame>;
}

/// Rasterizes the current frame into a JPEG file and releases the stream.
pub fn capture_still(stream: Box<dyn CameraStream>, quality: u8) -> Result<ImageFile, CameraError> {
    let frame = stream.latest_frame();
    drop(stream);

    let frame = frame.ok_or(CameraError::NoFrame)?;
    let bytes = encode_jpeg(&frame.image, quality)?;
    info!(
        width = frame.image.width(),
        height = frame.image.height(),
        bytes = bytes.len(),
        "Captured still"
    );

    Ok(ImageFile {
        name: format!("capture-{}.jpg", Utc::now().timestamp_millis()),
        mime: "image/jpeg".to_string(),
        bytes,
    })
}

pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>, CameraError> {
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).encode_image(&rgb)?;
    Ok(bytes)
}

/// Camera backed by an external program that writes one encoded frame to
/// stdout per run (ffmpeg by default).
#[derive(Debug, Clone)]
pub struct CommandCamera {
    enabled: bool,
    command: Option<Vec<String>>,
    frame_interval: Duration,
    grab_timeout: Duration,
}

impl CommandCamera {
    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self {
            enabled: settings.enabled,
            command: settings.command.clone(),
            frame_interval: Duration::from_millis(settings.frame_interval_ms),
            grab_timeout: Duration::from_millis(settings.grab_timeout_ms),
        }
    }
}

impl Camera for CommandCamera {
    fn open(&self) -> Result<Box<dyn CameraStream>, CameraError> {
        if !self.enabled {
            return Err(CameraError::Disabled);
        }
        let command = match &self.command {
            Some(command) if !command.is_empty() => command.clone(),
            _ => return Err(CameraError::Unsupported),
        };

        let first = grab_frame(&command, self.grab_timeout, &AtomicBool::new(false))?;
        info!(program = %command[0], "Camera stream opened");
        Ok(Box::new(CommandStream::start(
            command,
            first,
            self.frame_interval,
            self.grab_timeout,
        )))
    }
}

/// Runs the grab command once. The child is killed on timeout or as soon
/// as `stop` is raised.
fn grab_frame(command: &[String], timeout: Duration, stop: &AtomicBool) -> Result<RgbaImage, CameraError> {
    let (program, args) = command.split_first().ok_or(CameraError::Unsupported)?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| CameraError::Spawn {
            program: program.clone(),
            source,
        })?;

    // Drain stdout while waiting; a full pipe would stall the child
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| CameraError::Grab("stdout was not captured".to_string()))?;
    let reader = thread::spawn(move || {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).map(|_| buf)
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        if stop.load(Ordering::SeqCst) {
            abandon(&mut child, reader);
            return Err(CameraError::Stopped);
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            abandon(&mut child, reader);
            return Err(CameraError::Timeout(timeout));
        }
        match child.wait_timeout(remaining.min(STOP_POLL)) {
            Ok(Some(status)) => break status,
            Ok(None) => continue,
            Err(e) => {
                abandon(&mut child, reader);
                return Err(CameraError::Grab(e.to_string()));
            }
        }
    };

    let bytes = match reader.join() {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => return Err(CameraError::Grab(e.to_string())),
        Err(_) => return Err(CameraError::Grab("stdout reader panicked".to_string())),
    };

    if !status.success() {
        return Err(CameraError::Grab(format!("`{}` exited with {}", program, status)));
    }
    if bytes.is_empty() {
        return Err(CameraError::Grab(format!("`{}` produced no frame", program)));
    }

    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

fn abandon(child: &mut Child, reader: JoinHandle<io::Result<Vec<u8>>>) {
    let _ = child.kill();
    let _ = child.wait();
    let _ = reader.join();
}

struct CommandStream {
    latest: Arc<Mutex<Frame>>,
    stopping: Arc<AtomicBool>,
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl CommandStream {
    fn start(command: Vec<String>, first: RgbaImage, interval: Duration, timeout: Duration) -> Self {
        let latest = Arc::new(Mutex::new(Frame {
            serial: 0,
            image: Arc::new(first),
        }));
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let stopping = Arc::new(AtomicBool::new(false));

        let shared = Arc::clone(&latest);
        let stop_flag = Arc::clone(&stopping);
        let worker = thread::spawn(move || {
            let mut serial = 0;
            // Runs until the sender is dropped
            while let Err(RecvTimeoutError::Timeout) = stop_rx.recv_timeout(interval) {
                match grab_frame(&command, timeout, &stop_flag) {
                    Ok(image) => {
                        serial += 1;
                        if let Ok(mut frame) = shared.lock() {
                            *frame = Frame {
                                serial,
                                image: Arc::new(image),
                            };
                        }
                    }
                    Err(CameraError::Stopped) => break,
                    Err(e) => warn!("Camera frame grab failed: {}", e),
                }
            }
            debug!(frames = serial, "Camera preview thread stopped");
        });

        Self {
            latest,
            stopping,
            stop: Some(stop_tx),
            worker: Some(worker),
        }
    }
}

impl CameraStream for CommandStream {
    fn latest_frame(&self) -> Option<Frame> {
        self.latest.lock().ok().map(|frame| frame.clone())
    }
}

impl Drop for CommandStream {
    fn drop(&mut self) {
        self.stopping.store(true, Ordering::SeqCst);
        self.stop.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        info!("Camera stream released");
    }
}
