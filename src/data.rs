// src/data.rs
// Dataset model and JSON loading - price series, sentiment series, metadata

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Wire Records
// ============================================================================

/// One daily close, as stored in b.json (minified field names)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PricePoint {
    /// Calendar date (local day, KST for the bundled Upbit data)
    pub d: NaiveDate,
    /// Closing price in the quote currency
    pub c: f64,
}

/// One fear/greed reading, as stored in f.json
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SentimentPoint {
    pub d: NaiveDate,
    /// Index value 0-100 (low = fear, high = greed)
    pub v: u8,
    /// Classification label ("Extreme Fear", "Greed", ...)
    pub s: String,
}

/// Dataset metadata, as stored in m.json
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Meta {
    /// Last update timestamp (ISO, UTC)
    pub u: String,
    pub start: String,
    pub end: String,
    pub rows_b: usize,
    pub rows_f: usize,
    pub ver: String,
}

// ============================================================================
// Series
// ============================================================================

/// Daily close prices keyed by calendar date.
///
/// Absence of a date is an expected condition (non-trading day or data gap),
/// not an error.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    closes: BTreeMap<NaiveDate, f64>,
}

impl PriceSeries {
    /// Build from wire records. Input order does not matter; on duplicate
    /// dates the last record wins (matches the daily-update merge).
    pub fn from_points(points: &[PricePoint]) -> Self {
        let closes = points.iter().map(|p| (p.d, p.c)).collect();
        Self { closes }
    }

    pub fn close(&self, date: NaiveDate) -> Option<f64> {
        self.closes.get(&date).copied()
    }

    /// Most recent close in the series - the live-price fallback when no
    /// real-time feed is attached.
    pub fn last_close(&self) -> Option<f64> {
        self.closes.values().next_back().copied()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.closes.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.closes.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// A single sentiment reading (value + label).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentimentEntry {
    pub value: u8,
    pub label: String,
}

/// Fear/greed index readings keyed by date. Sparse relative to the price
/// series: may start later and may have gaps.
#[derive(Debug, Clone, Default)]
pub struct SentimentSeries {
    entries: BTreeMap<NaiveDate, SentimentEntry>,
}

impl SentimentSeries {
    /// Build from wire records; tolerates unordered input and duplicates
    /// (last record wins).
    pub fn from_points(points: &[SentimentPoint]) -> Self {
        let entries = points
            .iter()
            .map(|p| {
                (
                    p.d,
                    SentimentEntry {
                        value: p.v,
                        label: p.s.clone(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn entry(&self, date: NaiveDate) -> Option<&SentimentEntry> {
        self.entries.get(&date)
    }

    /// The entry for the greatest date strictly before `date`, if any.
    pub fn last_before(&self, date: NaiveDate) -> Option<(NaiveDate, &SentimentEntry)> {
        self.entries
            .range(..date)
            .next_back()
            .map(|(d, e)| (*d, e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Dataset
// ============================================================================

/// Everything the engine and the server need: raw point vectors (for the
/// chart endpoints) plus the date-keyed series (for simulation lookups).
#[derive(Debug, Clone)]
pub struct Dataset {
    pub price_points: Vec<PricePoint>,
    pub sentiment_points: Vec<SentimentPoint>,
    pub prices: PriceSeries,
    pub sentiment: SentimentSeries,
    pub meta: Meta,
}

/// Load b.json / f.json / m.json from a data directory.
pub fn load_dataset(dir: &Path) -> Result<Dataset, String> {
    let mut price_points: Vec<PricePoint> = read_json(&dir.join("b.json"))?;
    let mut sentiment_points: Vec<SentimentPoint> = read_json(&dir.join("f.json"))?;
    let meta: Meta = read_json(&dir.join("m.json"))?;

    if price_points.is_empty() {
        return Err("No price data found".to_string());
    }

    // The files are normally sorted already, but the engine depends on it
    price_points.sort_by_key(|p| p.d);
    sentiment_points.sort_by_key(|p| p.d);

    let prices = PriceSeries::from_points(&price_points);
    let sentiment = SentimentSeries::from_points(&sentiment_points);

    Ok(Dataset {
        price_points,
        sentiment_points,
        prices,
        sentiment,
        meta,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}
