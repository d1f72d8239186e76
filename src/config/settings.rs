// src/config/settings.rs
use serde::{Serialize, Deserialize};
use std::path::PathBuf;

pub const APP_DIR_NAME: &str = "car-analyzer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub endpoint: EndpointSettings,
    pub camera: CameraSettings,
    pub storage: StorageSettings,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: EndpointSettings::default(),
            camera: CameraSettings::default(),
            storage: StorageSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    pub base_url: String,
    pub path: String,
    /// No timeout when unset.
    pub request_timeout_secs: Option<u64>,
}

impl EndpointSettings {
    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            path: "/api/analyze".to_string(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub enabled: bool,
    /// Program and arguments writing one encoded frame to stdout per run.
    pub command: Option<Vec<String>>,
    pub frame_interval_ms: u64,
    pub grab_timeout_ms: u64,
    pub jpeg_quality: u8,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            command: default_camera_command(),
            frame_interval_ms: 200,
            grab_timeout_ms: 3000,
            jpeg_quality: 90,
        }
    }
}

#[cfg(target_os = "linux")]
fn default_camera_command() -> Option<Vec<String>> {
    Some(ffmpeg_grab(&["-f", "v4l2", "-i", "/dev/video0"]))
}

#[cfg(target_os = "macos")]
fn default_camera_command() -> Option<Vec<String>> {
    Some(ffmpeg_grab(&["-f", "avfoundation", "-framerate", "30", "-i", "0"]))
}

// No known grab command; the native capture dialog is used instead.
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn default_camera_command() -> Option<Vec<String>> {
    None
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
fn ffmpeg_grab(input: &[&str]) -> Vec<String> {
    let mut args = vec!["ffmpeg", "-hide_banner", "-loglevel", "error"];
    args.extend_from_slice(input);
    args.extend_from_slice(&["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "-"]);
    args.into_iter().map(String::from).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: Option<PathBuf>,
}

impl StorageSettings {
    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR_NAME)
        })
    }
}
