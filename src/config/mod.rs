// src/config/mod.rs
pub mod analysis;
pub mod history;
pub mod settings;

// Re-export commonly used types
pub use analysis::{CarAnalysis, NumberPair, PriceRange, Rarity, TopSpeed};
pub use history::HistoryEntry;
pub use settings::{CameraSettings, EndpointSettings, Settings};
