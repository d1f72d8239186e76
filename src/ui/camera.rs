// src/ui/camera.rs
use std::time::Duration;
use eframe::egui;
use crate::input::CameraStream;

const PREVIEW_MAX_WIDTH: f32 = 640.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraAction {
    None,
    Capture,
    Cancel,
}

/// GPU copy of the newest camera frame.
#[derive(Default)]
pub struct CameraPreview {
    texture: Option<egui::TextureHandle>,
    serial: Option<u64>,
}

impl CameraPreview {
    pub fn reset(&mut self) {
        self.texture = None;
        self.serial = None;
    }

    fn refresh(&mut self, ctx: &egui::Context, stream: &dyn CameraStream) {
        let Some(frame) = stream.latest_frame() else {
            return;
        };
        if self.serial == Some(frame.serial) {
            return;
        }

        let size = [frame.image.width() as usize, frame.image.height() as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, frame.image.as_raw());
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture("camera-preview", image, egui::TextureOptions::LINEAR));
            }
        }
        self.serial = Some(frame.serial);
    }

    pub fn show(&mut self, ui: &mut egui::Ui, stream: Option<&dyn CameraStream>, busy: bool) -> CameraAction {
        let mut action = CameraAction::None;
        if let Some(stream) = stream {
            self.refresh(ui.ctx(), stream);
        }

        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                match &self.texture {
                    Some(texture) => {
                        let size = texture.size_vec2();
                        let width = ui.available_width().min(PREVIEW_MAX_WIDTH);
                        let scale = (width / size.x).min(1.0);
                        ui.add(egui::Image::new(egui::load::SizedTexture::new(texture.id(), size * scale)));
                    }
                    None => {
                        ui.spinner();
                        ui.label("Waiting for camera...");
                    }
                }

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    let capture = ui.add_enabled(
                        !busy && self.texture.is_some(),
                        egui::Button::new("Capture"),
                    );
                    if capture.clicked() {
                        action = CameraAction::Capture;
                    }
                    if ui.button("Cancel").clicked() {
                        action = CameraAction::Cancel;
                    }
                });
            });
        });

        // Keep pulling frames while the view is open
        ui.ctx().request_repaint_after(Duration::from_millis(100));
        action
    }
}
