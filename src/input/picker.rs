// src/input/picker.rs
use rfd::FileDialog;
use std::path::{Path, PathBuf};

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

fn image_dialog(title: &str, start_dir: Option<&Path>) -> FileDialog {
    let dialog = FileDialog::new()
        .add_filter("Images", IMAGE_EXTENSIONS)
        .set_title(title);
    match start_dir {
        Some(dir) => dialog.set_directory(dir),
        None => dialog,
    }
}

pub fn pick_image(start_dir: Option<&Path>) -> Option<PathBuf> {
    image_dialog("Choose a car image", start_dir).pick_file()
}

/// Stand-in for a native capture input when no camera stream can be opened.
pub fn pick_capture(start_dir: Option<&Path>) -> Option<PathBuf> {
    image_dialog("Take or choose a photo", start_dir).pick_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;

    #[test]
    fn offered_extensions_can_be_previewed() {
        for ext in IMAGE_EXTENSIONS {
            let format = ImageFormat::from_extension(ext).unwrap();
            assert!(format.reading_enabled(), "{} has no decoder", ext);
        }
    }
}
