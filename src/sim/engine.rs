// src/sim/engine.rs
// Main simulation engine - replays a purchase schedule over historical data

use chrono::NaiveDate;

use crate::data::{PriceSeries, SentimentSeries};
use crate::sim::schedule::generate_schedule;
use crate::sim::sentiment::resolve;
use crate::sim::summary::{average_cost, valuation};
use crate::sim::types::{SellMode, SimulationParams, SimulationResult, SkipCounts, SkipReason};

/// Fixed stop threshold: once resolved sentiment reaches this value, buying
/// halts for the rest of the simulated period. Independent of buy_threshold.
pub const EXTREME_GREED_STOP: u8 = 75;

/// How far back the sell-date lookup scans for the nearest earlier close
/// before falling back to the live price.
const SELL_DATE_LOOKBACK_DAYS: u32 = 7;

/// Replay the purchase schedule over the price series and produce investment
/// outcomes.
///
/// Expected data gaps (missing price, sentiment not yet available, threshold
/// not met, stop triggered) are tallied per reason and never abort the run.
/// Invalid configuration is rejected up front. Inputs are read-only; the
/// live price is an injected scalar - the engine never touches a clock or
/// the network.
pub fn run_simulation(
    params: &SimulationParams,
    prices: &PriceSeries,
    sentiment: Option<&SentimentSeries>,
    live_price: f64,
) -> Result<SimulationResult, String> {
    params.validate()?;

    let mut total_invested = 0.0;
    let mut total_quantity = 0.0;
    let mut purchase_count = 0u32;
    let mut skip_counts = SkipCounts::default();
    let mut hold_last_dates: Vec<NaiveDate> = Vec::new();
    let mut buy_stopped_at: Option<NaiveDate> = None;
    let mut stopped = false;

    let schedule = generate_schedule(params.start_date, params.end_date, params.cadence);

    for d in schedule {
        // Once the extreme-greed stop fires, every later date is skipped
        // without re-checking anything else
        if stopped {
            skip_counts.record(SkipReason::Stopped);
            continue;
        }

        let Some(price) = prices.close(d) else {
            skip_counts.record(SkipReason::MissingPrice);
            continue;
        };

        if let Some(threshold) = params.buy_threshold {
            let Some(resolved) = sentiment.and_then(|s| resolve(d, s)) else {
                skip_counts.record(SkipReason::SentimentUnavailable);
                continue;
            };

            if resolved.held {
                hold_last_dates.push(d);
            }

            if resolved.value >= EXTREME_GREED_STOP {
                stopped = true;
                buy_stopped_at = Some(d);
                skip_counts.record(SkipReason::StopTriggered);
                continue;
            }

            if resolved.value > threshold {
                skip_counts.record(SkipReason::ThresholdNotMet);
                continue;
            }

            if params.consecutive_days_required > 0 {
                // sentiment is present here: resolve() above succeeded
                let series = sentiment.expect("gate resolved against a present series");
                if !meets_consecutive_days(d, params.consecutive_days_required, threshold, series)
                {
                    skip_counts.record(SkipReason::ConsecutiveDaysNotMet);
                    continue;
                }
            }
        }

        // Execute: the fee reduces quantity acquired, not the invested total
        let fee = params.amount_per_purchase * params.fee_rate;
        let net_amount = params.amount_per_purchase - fee;
        total_invested += params.amount_per_purchase;
        total_quantity += net_amount / price;
        purchase_count += 1;
    }

    let terminal_price = match params.sell_mode {
        SellMode::OnDate => {
            // validate() guarantees sell_date is present in this mode
            let sell_date = params
                .sell_date
                .ok_or("sellDate is required when sellMode is onDate")?;
            resolve_sell_price(sell_date, prices, live_price)
        }
        SellMode::AtCurrentPrice => live_price,
    };

    let result_valuation = valuation(total_invested, total_quantity, terminal_price);
    // Second scenario at the live price; redundant for atCurrentPrice where
    // the terminal valuation already is the live one
    let live_valuation = match params.sell_mode {
        SellMode::OnDate => Some(valuation(total_invested, total_quantity, live_price)),
        SellMode::AtCurrentPrice => None,
    };

    Ok(SimulationResult {
        total_invested,
        total_quantity,
        average_cost: average_cost(total_invested, total_quantity),
        purchase_count,
        skip_counts,
        valuation: result_valuation,
        live_valuation,
        hold_last_dates,
        buy_stopped_at,
    })
}

/// True when resolved sentiment stays <= threshold on `date` and each of the
/// `required - 1` immediately preceding calendar days. Scans backward
/// day-by-day with hold-last resolution and exits on the first failure.
fn meets_consecutive_days(
    date: NaiveDate,
    required: u32,
    threshold: u8,
    series: &SentimentSeries,
) -> bool {
    let mut d = date;
    for _ in 0..required {
        match resolve(d, series) {
            Some(r) if r.value <= threshold => {}
            _ => return false,
        }
        d = match d.pred_opt() {
            Some(prev) => prev,
            None => return false,
        };
    }
    true
}

/// Terminal price for sellMode = onDate: the close on the sell date, else the
/// nearest earlier close within the lookback window, else the live price.
fn resolve_sell_price(sell_date: NaiveDate, prices: &PriceSeries, live_price: f64) -> f64 {
    let mut d = sell_date;
    for _ in 0..=SELL_DATE_LOOKBACK_DAYS {
        if let Some(price) = prices.close(d) {
            return price;
        }
        match d.pred_opt() {
            Some(prev) => d = prev,
            None => break,
        }
    }
    live_price
}
