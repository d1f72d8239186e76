// src/config/analysis.rs
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Structured answer of the analysis endpoint.
///
/// Every field is optional: the endpoint is backed by a language model and
/// routinely omits keys or returns them with an unexpected shape. A key with
/// the wrong JSON type is read as missing instead of failing the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarAnalysis {
    #[serde(rename = "Car Make", default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(rename = "Model", default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "Year", default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub year: Option<NumberPair>,
    #[serde(rename = "Price", default, deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceRange>,
    #[serde(rename = "HP", default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub horsepower: Option<NumberPair>,
    #[serde(rename = "Speed", default, deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    pub speed: Option<TopSpeed>,
    #[serde(rename = "Chances", default, deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    pub rarity: Option<Rarity>,
}

impl CarAnalysis {
    /// Parses a response body. Anything but a JSON object is rejected.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(body)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("analysis must be a JSON object"));
        }
        serde_json::from_value(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(default, deserialize_with = "lenient")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub max: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopSpeed {
    #[serde(default, deserialize_with = "lenient")]
    pub max: Option<NumberPair>,
    #[serde(default, deserialize_with = "lenient")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rarity {
    #[serde(rename = "Rarity", default, deserialize_with = "lenient")]
    pub level: Option<String>,
    #[serde(rename = "Chance", default, deserialize_with = "lenient")]
    pub chance: Option<String>,
}

/// Low/high pair sent as a JSON array (`[1950, 1965]`).
///
/// A bare number is accepted as the low bound, and numeric strings are
/// parsed. Serialized back as a two element array with `null` holes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumberPair {
    pub low: Option<f64>,
    pub high: Option<f64>,
}

#[cfg(test)]
impl NumberPair {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low: Some(low), high: Some(high) }
    }
}

impl Serialize for NumberPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.low, self.high).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NumberPair {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pair = match Value::deserialize(deserializer)? {
            Value::Array(items) => NumberPair {
                low: items.first().and_then(as_number),
                high: items.get(1).and_then(as_number),
            },
            other => NumberPair {
                low: as_number(&other),
                high: None,
            },
        };
        Ok(pair)
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Like `lenient`, but only a JSON object is read; derived structs would
/// otherwise also accept a positional array.
fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(T::deserialize(value).ok())
}
