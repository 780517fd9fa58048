//! Core data models for price analysis
//!
//! `ProductAnalysis` is what the model emits inside its fenced JSON block.
//! Deserialization validates and coerces: required fields must be present,
//! prices may arrive as numbers or decorated strings, optional text and lists
//! default to empty.

use lazy_static::lazy_static;
use regex::Regex;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::warn;

lazy_static! {
    // Optional currency prefix, a plain or comma-grouped number (Indian or
    // western grouping), optional fraction, optional `/-` suffix. Nothing else.
    static ref PRICE_TEXT: Regex = Regex::new(
        r"^\s*(?:₹|(?i:rs\.?|inr))?\s*(\d{1,3}(?:,\d{2,3})+|\d+)(\.\d*)?\s*(?:/-)?\s*$"
    )
    .unwrap();
}

//
// ================= Verdict =================
//

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    BuyNow,
    Wait,
    Neutral,
}

impl Verdict {
    /// Parse a verdict token, tolerating case, spaces and hyphens
    pub fn parse(token: &str) -> Option<Verdict> {
        let normalized: String = token
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();

        match normalized.as_str() {
            "BUY_NOW" => Some(Verdict::BuyNow),
            "WAIT" => Some(Verdict::Wait),
            "NEUTRAL" => Some(Verdict::Neutral),
            _ => None,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            Verdict::BuyNow => "BUY_NOW",
            Verdict::Wait => "WAIT",
            Verdict::Neutral => "NEUTRAL",
        }
    }

    /// Human label shown to users
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::BuyNow => "BUY NOW",
            Verdict::Wait => "WAIT",
            Verdict::Neutral => "NEUTRAL",
        }
    }
}

impl<'de> Deserialize<'de> for Verdict {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Verdict::parse(&raw).unwrap_or_else(|| {
            warn!(verdict = %raw, "Unrecognized verdict, treating as NEUTRAL");
            Verdict::Neutral
        }))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_token())
    }
}

//
// ================= Price history =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub month: String,
    #[serde(deserialize_with = "deserialize_price")]
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductAnalysis {
    pub product_name: String,
    #[serde(deserialize_with = "deserialize_price")]
    pub current_price: f64,
    #[serde(deserialize_with = "deserialize_price")]
    pub lowest_price: f64,
    #[serde(deserialize_with = "deserialize_price")]
    pub highest_price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub best_time: String,
    pub verdict: Verdict,
    #[serde(default, deserialize_with = "null_as_default")]
    pub analysis_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<PricePoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reliable_sources: Vec<String>,
}

impl ProductAnalysis {
    /// Current price within 5% of the 12-month low
    pub fn is_near_low(&self) -> bool {
        self.current_price <= self.lowest_price * 1.05
    }

    /// Rounded percentage the current price sits above the low.
    /// `None` when the low is zero.
    pub fn premium_over_low_pct(&self) -> Option<i64> {
        if self.lowest_price <= 0.0 {
            return None;
        }
        let pct = (self.current_price - self.lowest_price) / self.lowest_price * 100.0;
        Some(pct.round() as i64)
    }
}

//
// ================= Citations =================
//

/// A grounding reference as the provider reports it; `uri` may be absent
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceCitation {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl SourceCitation {
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            title: Some(title.into()),
        }
    }
}

/// A citation that survived filtering: always has a uri
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Citation {
    /// Title if present, else the host without `www.`, else a generic label
    pub fn label(&self) -> String {
        if let Some(title) = self.title.as_deref().map(str::trim) {
            if !title.is_empty() {
                return title.to_string();
            }
        }

        reqwest::Url::parse(&self.uri)
            .ok()
            .and_then(|url| {
                url.host_str()
                    .map(|h| h.strip_prefix("www.").unwrap_or(h).to_string())
            })
            .unwrap_or_else(|| "External Source".to_string())
    }
}

//
// ================= Final Result =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub analysis: ProductAnalysis,
    pub citations: Vec<Citation>,
}

//
// ================= Deserialization helpers =================
//

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    coerce_price(&value).map_err(de::Error::custom)
}

/// Accept a non-negative JSON number or a string such as `"₹12,999"`
pub fn coerce_price(value: &Value) -> Result<f64, String> {
    let price = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("price {} is not representable", n))?,
        Value::String(s) => parse_price_text(s)?,
        other => return Err(format!("expected a price, found {}", other)),
    };

    if !price.is_finite() || price < 0.0 {
        return Err(format!("price must be a non-negative number, found {}", price));
    }

    Ok(price)
}

fn parse_price_text(text: &str) -> Result<f64, String> {
    let caps = PRICE_TEXT
        .captures(text)
        .ok_or_else(|| format!("not a plain price: {:?}", text))?;

    let whole = caps.get(1).map(|m| m.as_str()).unwrap_or_default().replace(',', "");
    let fraction = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

    format!("{}{}", whole, fraction.trim_end_matches('.'))
        .parse::<f64>()
        .map_err(|e| format!("invalid price {:?}: {}", text, e))
}
