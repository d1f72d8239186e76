// src/analysis/submit.rs
use std::thread;
use chrono::Utc;
use tracing::{error, info};

use super::client::{AnalyzeError, Analyzer};
use crate::config::HistoryEntry;
use crate::input::ImageFile;
use crate::utils::to_data_url;

/// Sends the image and builds its data URL side by side, then joins both.
pub fn submit(analyzer: &dyn Analyzer, image: &ImageFile) -> Result<HistoryEntry, AnalyzeError> {
    let (analysis, image_data) = thread::scope(|scope| {
        let request = scope.spawn(|| analyzer.analyze(image));
        let image_data = to_data_url(&image.mime, &image.bytes);
        let analysis = request.join().unwrap_or_else(|_| {
            error!("Analysis request thread panicked");
            Err(AnalyzeError::Failed)
        });
        (analysis, image_data)
    });

    let analysis = analysis?;
    info!(
        make = analysis.make.as_deref().unwrap_or("?"),
        model = analysis.model.as_deref().unwrap_or("?"),
        "Analysis complete"
    );

    Ok(HistoryEntry {
        analysis,
        timestamp: Utc::now().timestamp_millis(),
        image_data,
    })
}
