// src/ui/history.rs
use std::collections::HashMap;
use chrono::{Local, TimeZone};
use eframe::egui;
use tracing::warn;

use crate::state::HistoryStore;
use crate::utils::decode_data_url;
use super::result::show_analysis;

const THUMBNAIL_SIZE: [u32; 2] = [256, 192];

/// Decoded history thumbnails keyed by insertion index. The store is
/// append-only, so an index always names the same entry.
#[derive(Default)]
pub struct ThumbnailCache {
    textures: HashMap<usize, Option<egui::TextureHandle>>,
}

impl ThumbnailCache {
    fn get(&mut self, ctx: &egui::Context, index: usize, image_data: &str) -> Option<&egui::TextureHandle> {
        self.textures
            .entry(index)
            .or_insert_with(|| {
                decode_thumbnail(image_data).map(|image| {
                    ctx.load_texture(format!("history-{}", index), image, egui::TextureOptions::LINEAR)
                })
            })
            .as_ref()
    }

    pub fn clear(&mut self) {
        self.textures.clear();
    }
}

pub fn decode_thumbnail(image_data: &str) -> Option<egui::ColorImage> {
    let (_, bytes) = decode_data_url(image_data)?;
    let image = match image::load_from_memory(&bytes) {
        Ok(image) => image,
        Err(e) => {
            warn!("Cannot preview stored image: {}", e);
            return None;
        }
    };
    // Shrink only; small images keep their size
    let [max_w, max_h] = THUMBNAIL_SIZE;
    let image = if image.width() > max_w || image.height() > max_h {
        image.thumbnail(max_w, max_h)
    } else {
        image
    };
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Some(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_flat_samples().as_slice()))
}

pub fn format_timestamp(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "Unknown time".to_string())
}

pub fn show_history_view(ui: &mut egui::Ui, history: &HistoryStore, thumbnails: &mut ThumbnailCache) {
    ui.heading(format!("History ({})", history.len()));
    ui.add_space(8.0);

    if history.is_empty() {
        ui.label("No analyses yet. Upload a car image to get started.");
        return;
    }

    let ctx = ui.ctx().clone();
    for (index, entry) in history.newest_first() {
        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.set_width(THUMBNAIL_SIZE[0] as f32);
                    match thumbnails.get(&ctx, index, &entry.image_data) {
                        Some(texture) => {
                            let size = texture.size_vec2();
                            let scale = (THUMBNAIL_SIZE[0] as f32 / size.x)
                                .min(THUMBNAIL_SIZE[1] as f32 / size.y)
                                .min(1.0);
                            ui.add(egui::Image::new(egui::load::SizedTexture::new(
                                texture.id(),
                                size * scale,
                            )));
                        }
                        None => {
                            ui.label("Preview unavailable");
                        }
                    }
                    ui.small(format_timestamp(entry.timestamp));
                });

                ui.vertical(|ui| {
                    show_analysis(ui, &entry.analysis);
                });
            });
        });
        ui.add_space(8.0);
    }
}
