//! Scheme catalog: the record model, tolerant decoding of the data endpoint
//! payload, display formatting, the pure view state and a text renderer.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

pub mod format;
pub mod render;
pub mod view;

/// One PMS offering as served by the whitelisted-schemes data endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scheme {
    #[serde(default, deserialize_with = "lenient_int")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text_required")]
    pub provider: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub one_year_return: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub three_year_return: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub min_inv: Option<String>,
}

impl Scheme {
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn category_or_empty(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }

    /// Ordering key for the returns sort; absent counts as zero.
    pub fn return_key(&self) -> f64 {
        self.one_year_return.unwrap_or(0.0)
    }
}

fn number_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn text_from(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(number_from(&value))
}

fn lenient_int<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i64>, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_text<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(text_from(&value))
}

fn lenient_text_required<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(text_from(&value).unwrap_or_default())
}

/// Decoded payload of the data endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogDocument {
    pub schemes: Vec<Scheme>,
    /// Array entries that were not objects and were dropped.
    pub skipped: usize,
    /// Hex SHA-256 of the raw body, used to correlate loads in logs.
    pub digest: String,
}

/// Decodes `{ "schemes": [...] }`. A missing or non-array `schemes` field
/// yields an empty collection; only a body that is not JSON at all is an
/// error.
pub fn parse_catalog(body: &[u8]) -> serde_json::Result<CatalogDocument> {
    let root: Value = serde_json::from_slice(body)?;
    let digest = hex::encode(Sha256::digest(body));

    let entries = match root.get("schemes") {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    };

    let mut schemes = Vec::with_capacity(entries.len());
    let mut skipped = 0;
    for entry in entries {
        if !entry.is_object() {
            skipped += 1;
            continue;
        }
        match Scheme::deserialize(entry) {
            Ok(scheme) => schemes.push(scheme),
            Err(_) => skipped += 1,
        }
    }

    Ok(CatalogDocument {
        schemes,
        skipped,
        digest,
    })
}
