// src/ui/upload.rs
use eframe::egui;
use crate::input::dropped;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadAction {
    None,
    PickFile,
    OpenCamera,
}

pub fn show_upload_view(ui: &mut egui::Ui, state: &AppState) -> UploadAction {
    let mut action = UploadAction::None;
    let busy = state.is_busy();

    let stroke = if dropped::is_hovering_files(ui.ctx()) && !busy {
        ui.visuals().selection.stroke
    } else {
        ui.visuals().widgets.noninteractive.bg_stroke
    };

    let zone = egui::Frame::group(ui.style()).stroke(stroke).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.set_min_height(160.0);
        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.heading("Click to upload or drag and drop");
            ui.label("PNG, JPG or JPEG (MAX. 10MB)");
            ui.add_space(12.0);

            // Inputs stay disabled while a request is outstanding
            ui.add_enabled_ui(!busy, |ui| {
                if ui.button("Choose image...").clicked() {
                    action = UploadAction::PickFile;
                }
                if ui.button("Take photo").clicked() {
                    action = UploadAction::OpenCamera;
                }
            });
            ui.add_space(12.0);
        });
    });
    if !busy && action == UploadAction::None && zone.response.interact(egui::Sense::click()).clicked() {
        action = UploadAction::PickFile;
    }

    if busy {
        ui.add_space(12.0);
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Analyzing image...");
        });
    }

    action
}

/// Dismissable inline error, shown above whichever view is active.
pub fn show_error_banner(ui: &mut egui::Ui, error_message: &mut Option<String>) {
    let Some(error) = error_message.clone() else {
        return;
    };

    egui::Frame::none()
        .fill(ui.visuals().extreme_bg_color)
        .stroke(egui::Stroke::new(1.0, egui::Color32::RED))
        .rounding(4.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::RED, &error);
                if ui.small_button("Dismiss").clicked() {
                    *error_message = None;
                }
            });
        });
    ui.add_space(12.0);
}
