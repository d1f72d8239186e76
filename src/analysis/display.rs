// src/analysis/display.rs
use crate::config::{CarAnalysis, NumberPair, PriceRange, TopSpeed};
use crate::utils::{format_number, group_thousands};

pub const NOT_AVAILABLE: &str = "N/A";
pub const DEFAULT_PRICE_UNIT: &str = "USD";
pub const DEFAULT_SPEED_UNIT: &str = "km/h";

/// Display text for every field of an analysis card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisDisplay {
    pub make: String,
    pub model: String,
    pub year: String,
    pub price: String,
    pub horsepower: String,
    pub top_speed: String,
    pub rarity: String,
    pub chance: String,
}

impl From<&CarAnalysis> for AnalysisDisplay {
    fn from(analysis: &CarAnalysis) -> Self {
        let rarity = analysis.rarity.as_ref();
        Self {
            make: text(analysis.make.as_deref()),
            model: text(analysis.model.as_deref()),
            year: range(analysis.year.as_ref()),
            price: currency_range(analysis.price.as_ref()),
            horsepower: format!("{} HP", range(analysis.horsepower.as_ref())),
            top_speed: speed(analysis.speed.as_ref()),
            rarity: text(rarity.and_then(|r| r.level.as_deref())),
            chance: text(rarity.and_then(|r| r.chance.as_deref())),
        }
    }
}

/// Blank text counts as missing.
pub fn text(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn number(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn range(pair: Option<&NumberPair>) -> String {
    let pair = pair.copied().unwrap_or_default();
    format!("{} - {}", number(pair.low), number(pair.high))
}

pub fn currency_range(price: Option<&PriceRange>) -> String {
    let grouped = |v: Option<f64>| v.map(group_thousands).unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let min = grouped(price.and_then(|p| p.min));
    let max = grouped(price.and_then(|p| p.max));
    format!("{} - {} {}", min, max, unit(price.and_then(|p| p.unit.as_deref()), DEFAULT_PRICE_UNIT))
}

/// A single figure reads as one number; two as a range.
pub fn speed(speed: Option<&TopSpeed>) -> String {
    let pair = speed.and_then(|s| s.max).unwrap_or_default();
    let unit = unit(speed.and_then(|s| s.unit.as_deref()), DEFAULT_SPEED_UNIT);
    match (pair.low, pair.high) {
        (Some(low), None) => format!("{} {}", format_number(low), unit),
        (low, high) => format!("{} - {} {}", number(low), number(high), unit),
    }
}

fn unit<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => fallback,
    }
}
