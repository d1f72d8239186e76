// src/analysis/mod.rs
pub mod client;
pub mod display;
pub mod submit;
pub mod worker;

// Re-export commonly used types
pub use client::{Analyzer, HttpAnalyzer};
pub use display::AnalysisDisplay;
pub use worker::AnalysisWorker;
