//! Dataset collection tool
//!
//! Modes: bootstrap (5+ years of history) | daily (trailing-week delta)
//!
//! Pulls KRW-BTC daily candles from the Upbit API and the fear/greed index
//! from alternative.me, converts candle timestamps to KST calendar days, and
//! writes the minified b.json / f.json / m.json files the engine loads.
//!
//! Usage: fetch_data [bootstrap|daily]   (DATA_DIR defaults to public/data)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use dca_backtest::data::{Meta, PricePoint, SentimentPoint};

const UPBIT_CANDLES_URL: &str = "https://api.upbit.com/v1/candles/days";
const FNG_URL: &str = "https://api.alternative.me/fng/";

/// KST = UTC+9; the dataset's calendar days are Korean local days
const KST_OFFSET_HOURS: i64 = 9;

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Deserialize)]
struct UpbitCandle {
    candle_date_time_utc: String,
    trade_price: f64,
}

#[derive(Deserialize)]
struct FngResponse {
    data: Vec<FngItem>,
}

#[derive(Deserialize)]
struct FngItem {
    value: String,
    value_classification: String,
    /// YYYY-MM-DD with date_format=kr
    timestamp: String,
}

// ============================================================================
// Fetching
// ============================================================================

fn to_kst_day(utc: &str) -> Result<NaiveDate, String> {
    let dt = NaiveDateTime::parse_from_str(utc, "%Y-%m-%dT%H:%M:%S")
        .map_err(|e| format!("Bad candle timestamp {}: {}", utc, e))?;
    Ok((dt + chrono::Duration::hours(KST_OFFSET_HOURS)).date())
}

/// One page of daily candles, newest first. Retries on 429 with exponential
/// backoff, like the upstream rate limit requires.
async fn fetch_upbit_candles(
    client: &reqwest::Client,
    to: Option<&str>,
    count: u32,
) -> Result<Vec<PricePoint>, String> {
    let url = match to {
        Some(to) => format!("{}?market=KRW-BTC&count={}&to={}", UPBIT_CANDLES_URL, count, to),
        None => format!("{}?market=KRW-BTC&count={}", UPBIT_CANDLES_URL, count),
    };

    let mut backoff_ms = 1000;
    for attempt in 0..3 {
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Upbit request failed: {}", e))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS && attempt < 2 {
            eprintln!("Rate limited, retrying in {}ms...", backoff_ms);
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            backoff_ms *= 2;
            continue;
        }
        if !response.status().is_success() {
            return Err(format!("Upbit HTTP {}", response.status()));
        }

        let candles: Vec<UpbitCandle> = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse Upbit response: {}", e))?;

        return candles
            .into_iter()
            .map(|c| {
                Ok(PricePoint {
                    d: to_kst_day(&c.candle_date_time_utc)?,
                    c: c.trade_price.floor(),
                })
            })
            .collect();
    }

    Err("Upbit rate limit retries exhausted".to_string())
}

/// Fear/greed history; limit = 0 means everything.
async fn fetch_fng(client: &reqwest::Client, limit: u32) -> Result<Vec<SentimentPoint>, String> {
    let url = format!("{}?limit={}&date_format=kr", FNG_URL, limit);
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| format!("FNG request failed: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("FNG HTTP {}", response.status()));
    }

    let body: FngResponse = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse FNG response: {}", e))?;

    body.data
        .into_iter()
        .map(|item| {
            let date_part = item.timestamp.split(' ').next().unwrap_or(&item.timestamp);
            let d: NaiveDate = date_part
                .parse()
                .map_err(|e| format!("Bad FNG date {}: {}", item.timestamp, e))?;
            let v: u8 = item
                .value
                .parse()
                .map_err(|e| format!("Bad FNG value {}: {}", item.value, e))?;
            Ok(SentimentPoint {
                d,
                v,
                s: item.value_classification,
            })
        })
        .collect()
}

async fn bootstrap_prices(client: &reqwest::Client) -> Result<Vec<PricePoint>, String> {
    eprintln!("Bootstrap mode: fetching 5+ years of BTC data...");
    let mut all: Vec<PricePoint> = Vec::new();
    let mut to: Option<String> = None;
    let target_days = 365 * 6; // 6 years, with margin

    while all.len() < target_days {
        eprintln!("Fetched {} candles...", all.len());
        let candles = fetch_upbit_candles(client, to.as_deref(), 200).await?;
        if candles.is_empty() {
            break;
        }

        // Next page starts before the oldest candle of this one
        let oldest = &candles[candles.len() - 1];
        to = Some(format!("{}T00:00:00", oldest.d));
        all.extend(candles);

        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    eprintln!("Total BTC candles: {}", all.len());
    Ok(all)
}

async fn bootstrap_fng(client: &reqwest::Client) -> Result<Vec<SentimentPoint>, String> {
    eprintln!("Bootstrap mode: fetching FNG data...");
    let data = fetch_fng(client, 0).await?;
    eprintln!("Total FNG entries: {}", data.len());
    Ok(data)
}

// ============================================================================
// Merging & Persistence
// ============================================================================

/// Merge by date, newer records winning, output sorted.
fn merge_prices(existing: Vec<PricePoint>, recent: Vec<PricePoint>) -> Vec<PricePoint> {
    let mut map: BTreeMap<NaiveDate, PricePoint> = BTreeMap::new();
    for p in existing.into_iter().chain(recent) {
        map.insert(p.d, p);
    }
    map.into_values().collect()
}

fn merge_sentiment(
    existing: Vec<SentimentPoint>,
    recent: Vec<SentimentPoint>,
) -> Vec<SentimentPoint> {
    let mut map: BTreeMap<NaiveDate, SentimentPoint> = BTreeMap::new();
    for p in existing.into_iter().chain(recent) {
        map.insert(p.d, p);
    }
    map.into_values().collect()
}

fn read_existing<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, String> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), String> {
    let content = serde_json::to_string(value).map_err(|e| e.to_string())?;
    std::fs::write(path, content).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

fn build_meta(prices: &[PricePoint], sentiment: &[SentimentPoint]) -> Meta {
    Meta {
        u: chrono::Utc::now().to_rfc3339(),
        start: prices.first().map(|p| p.d.to_string()).unwrap_or_default(),
        end: prices.last().map(|p| p.d.to_string()).unwrap_or_default(),
        rows_b: prices.len(),
        rows_f: sentiment.len(),
        ver: "1.0.0".to_string(),
    }
}

async fn run(mode: &str, data_dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| format!("Failed to create {}: {}", data_dir.display(), e))?;

    let btc_file = data_dir.join("b.json");
    let fng_file = data_dir.join("f.json");
    let meta_file = data_dir.join("m.json");

    let client = reqwest::Client::new();

    let (prices, sentiment) = if mode == "bootstrap" {
        (
            bootstrap_prices(&client).await?,
            bootstrap_fng(&client).await?,
        )
    } else {
        eprintln!("Daily mode: fetching recent data...");
        let existing_prices: Vec<PricePoint> = read_existing(&btc_file)?;
        let existing_fng: Vec<SentimentPoint> = read_existing(&fng_file)?;

        let recent_prices = fetch_upbit_candles(&client, None, 7).await?;
        let recent_fng = fetch_fng(&client, 7).await?;

        (
            merge_prices(existing_prices, recent_prices),
            merge_sentiment(existing_fng, recent_fng),
        )
    };

    // Bootstrap pages arrive newest-first; normalize either way
    let prices = merge_prices(prices, Vec::new());
    let sentiment = merge_sentiment(sentiment, Vec::new());

    let meta = build_meta(&prices, &sentiment);

    write_json(&btc_file, &prices)?;
    write_json(&fng_file, &sentiment)?;
    write_json(&meta_file, &meta)?;

    eprintln!(
        "Saved {} closes, {} FNG entries ({} to {})",
        meta.rows_b, meta.rows_f, meta.start, meta.end
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mode = args.get(1).map(String::as_str).unwrap_or("daily");

    if mode != "bootstrap" && mode != "daily" {
        eprintln!("Usage: fetch_data [bootstrap|daily]");
        std::process::exit(1);
    }

    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "public/data".to_string());

    if let Err(e) = run(mode, &PathBuf::from(data_dir)).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    eprintln!("Data update complete");
}
