// src/input/dropped.rs
use eframe::egui;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use super::ImageFile;

/// The parts of a dropped file needed to read it.
#[derive(Debug, Clone, Default)]
pub struct DroppedCandidate {
    pub name: String,
    pub path: Option<PathBuf>,
    pub bytes: Option<Arc<[u8]>>,
}

impl From<&egui::DroppedFile> for DroppedCandidate {
    fn from(file: &egui::DroppedFile) -> Self {
        Self {
            name: file.name.clone(),
            path: file.path.clone(),
            bytes: file.bytes.clone(),
        }
    }
}

impl DroppedCandidate {
    fn display_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dropped".to_string())
    }

    fn read(&self) -> Option<Vec<u8>> {
        if let Some(bytes) = &self.bytes {
            return Some(bytes.to_vec());
        }
        let path = self.path.as_ref()?;
        match fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Failed to read dropped file {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Only the first dropped file counts; it is ignored unless it is an image.
pub fn first_image(candidates: &[DroppedCandidate]) -> Option<ImageFile> {
    let candidate = candidates.first()?;
    let file = ImageFile::new(candidate.display_name(), candidate.read()?);
    if !file.is_image() {
        debug!(name = %file.name, mime = %file.mime, "Ignoring non-image drop");
        return None;
    }
    Some(file)
}

pub fn take_dropped_image(ctx: &egui::Context) -> Option<ImageFile> {
    let candidates: Vec<DroppedCandidate> = ctx.input(|i| {
        i.raw.dropped_files.iter().map(DroppedCandidate::from).collect()
    });
    first_image(&candidates)
}

pub fn is_hovering_files(ctx: &egui::Context) -> bool {
    ctx.input(|i| !i.raw.hovered_files.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const GIF_MAGIC: &[u8] = b"GIF89a\x01\x00\x01\x00";

    fn in_memory(name: &str, bytes: &[u8]) -> DroppedCandidate {
        DroppedCandidate {
            name: name.to_string(),
            path: None,
            bytes: Some(Arc::from(bytes)),
        }
    }

    #[test]
    fn accepts_image_bytes() {
        let file = first_image(&[in_memory("car.gif", GIF_MAGIC)]).unwrap();
        assert_eq!(file.mime, "image/gif");
        assert_eq!(file.bytes, GIF_MAGIC);
    }

    #[test]
    fn ignores_non_image_drop() {
        assert!(first_image(&[in_memory("notes.txt", b"hello world")]).is_none());
    }

    #[test]
    fn only_first_file_is_considered() {
        let drops = [in_memory("notes.txt", b"hello world"), in_memory("car.gif", GIF_MAGIC)];
        assert!(first_image(&drops).is_none());
        assert!(first_image(&[]).is_none());
    }

    #[test]
    fn reads_from_path_when_bytes_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("car.gif");
        std::fs::write(&path, GIF_MAGIC).unwrap();

        let candidate = DroppedCandidate { path: Some(path), ..Default::default() };
        let file = first_image(&[candidate]).unwrap();
        assert_eq!(file.name, "car.gif");
        assert!(file.is_image());
    }

    #[test]
    fn unreadable_path_is_ignored() {
        let candidate = DroppedCandidate {
            path: Some(PathBuf::from("/definitely/not/here.png")),
            ..Default::default()
        };
        assert!(first_image(&[candidate]).is_none());
    }
}
