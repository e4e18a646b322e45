// src/sim/types.rs
// Core types for the simulation engine, matching frontend TypeScript types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Parameter Types
// ============================================================================

/// Purchase cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
}

/// How the terminal valuation price is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SellMode {
    /// Price at `sell_date` (nearest earlier close within 7 days, else live)
    OnDate,
    /// The injected live/current price
    #[default]
    AtCurrentPrice,
}

/// Simulation parameters supplied by the UI layer.
///
/// The sentiment gate, consecutive-days rule, sell date and fee are all
/// optional with default-off behavior; one parameterized engine covers every
/// combination.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Currency amount per scheduled purchase
    pub amount_per_purchase: f64,
    pub cadence: Cadence,
    /// Buy only when resolved sentiment <= this value (gate off when absent)
    #[serde(default)]
    pub buy_threshold: Option<u8>,
    /// Require the threshold to hold for this many consecutive calendar days
    /// (0 = rule off; only meaningful with a threshold)
    #[serde(default)]
    pub consecutive_days_required: u32,
    #[serde(default)]
    pub sell_mode: SellMode,
    #[serde(default)]
    pub sell_date: Option<NaiveDate>,
    /// Fraction 0-1; reduces quantity acquired, never the invested total
    #[serde(default)]
    pub fee_rate: f64,
}

impl SimulationParams {
    /// Reject invalid configuration before the engine runs.
    ///
    /// `start_date > end_date` is deliberately NOT an error: the schedule is
    /// empty and the run is a valid zero-result scenario.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.amount_per_purchase > 0.0) {
            return Err(format!(
                "amountPerPurchase must be positive, got {}",
                self.amount_per_purchase
            ));
        }
        if !(0.0..=1.0).contains(&self.fee_rate) {
            return Err(format!("feeRate must be within [0, 1], got {}", self.fee_rate));
        }
        if let Some(threshold) = self.buy_threshold {
            if threshold > 100 {
                return Err(format!("buyThreshold must be within 0-100, got {}", threshold));
            }
        }
        if self.sell_mode == SellMode::OnDate && self.sell_date.is_none() {
            return Err("sellDate is required when sellMode is onDate".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Why a scheduled purchase date did not execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// A prior date triggered the extreme-greed stop
    Stopped,
    /// No close price for the scheduled date
    MissingPrice,
    /// Sentiment series has not started yet
    SentimentUnavailable,
    /// This date's sentiment reached extreme greed and set the stop flag
    StopTriggered,
    /// Resolved sentiment above the buy threshold
    ThresholdNotMet,
    /// Consecutive-days rule failed
    ConsecutiveDaysNotMet,
}

/// Skip tallies per reason class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipCounts {
    pub stopped: u32,
    pub missing_price: u32,
    pub sentiment_unavailable: u32,
    pub stop_triggered: u32,
    pub threshold_not_met: u32,
    pub consecutive_days_not_met: u32,
}

impl SkipCounts {
    pub fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Stopped => self.stopped += 1,
            SkipReason::MissingPrice => self.missing_price += 1,
            SkipReason::SentimentUnavailable => self.sentiment_unavailable += 1,
            SkipReason::StopTriggered => self.stop_triggered += 1,
            SkipReason::ThresholdNotMet => self.threshold_not_met += 1,
            SkipReason::ConsecutiveDaysNotMet => self.consecutive_days_not_met += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.stopped
            + self.missing_price
            + self.sentiment_unavailable
            + self.stop_triggered
            + self.threshold_not_met
            + self.consecutive_days_not_met
    }
}

/// Outcome of valuing the accumulated position at one price
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub price: f64,
    pub value: f64,
    pub profit: f64,
    /// Percent, e.g. -6.67 for a 6.67% loss
    pub profit_rate: f64,
}

/// Accumulated simulation output
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    /// Face-value sum of executed purchases (fees not subtracted)
    pub total_invested: f64,
    /// Asset quantity acquired (net of fees)
    pub total_quantity: f64,
    /// total_invested / total_quantity, 0 when nothing was bought
    pub average_cost: f64,
    pub purchase_count: u32,
    pub skip_counts: SkipCounts,
    /// Valuation at the terminal price per sell_mode
    pub valuation: Valuation,
    /// Second valuation at the live price (only when sell_mode = onDate)
    pub live_valuation: Option<Valuation>,
    /// Scheduled dates where a held-last sentiment value was used
    pub hold_last_dates: Vec<NaiveDate>,
    /// Date the extreme-greed stop fired, if it did
    pub buy_stopped_at: Option<NaiveDate>,
}
