// tests/simulation.rs
// End-to-end scenarios against hand-computed expected results

use approx::assert_relative_eq;
use chrono::NaiveDate;

use dca_backtest::data::{PricePoint, PriceSeries, SentimentPoint, SentimentSeries};
use dca_backtest::sim::{run_simulation, Cadence, SellMode, SimulationParams};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn price_series(points: &[(&str, f64)]) -> PriceSeries {
    let points: Vec<PricePoint> = points
        .iter()
        .map(|(d, c)| PricePoint { d: d.parse().unwrap(), c: *c })
        .collect();
    PriceSeries::from_points(&points)
}

fn sentiment_series(points: &[(&str, u8)]) -> SentimentSeries {
    let points: Vec<SentimentPoint> = points
        .iter()
        .map(|(d, v)| SentimentPoint {
            d: d.parse().unwrap(),
            v: *v,
            s: String::new(),
        })
        .collect();
    SentimentSeries::from_points(&points)
}

fn params(start: &str, end: &str, amount: f64, cadence: Cadence) -> SimulationParams {
    SimulationParams {
        start_date: date(start),
        end_date: date(end),
        amount_per_purchase: amount,
        cadence,
        buy_threshold: None,
        consecutive_days_required: 0,
        sell_mode: SellMode::AtCurrentPrice,
        sell_date: None,
        fee_rate: 0.0,
    }
}

/// Weekly ungated run with a down market.
///
/// Buys of 10,000 at closes 100, 200, 100 accumulate 100 + 50 + 100 = 250
/// units; valued at 80 the position is worth 20,000 on 30,000 invested.
#[test]
fn test_weekly_ungated_end_to_end() {
    let prices = price_series(&[
        ("2024-01-01", 100.0),
        ("2024-01-08", 200.0),
        ("2024-01-15", 100.0),
    ]);
    let p = params("2024-01-01", "2024-01-15", 10_000.0, Cadence::Weekly);

    let result = run_simulation(&p, &prices, None, 80.0).unwrap();

    assert_eq!(result.purchase_count, 3);
    assert_relative_eq!(result.total_invested, 30_000.0);
    assert_relative_eq!(result.total_quantity, 250.0);
    assert_relative_eq!(result.average_cost, 120.0);
    assert_relative_eq!(result.valuation.price, 80.0);
    assert_relative_eq!(result.valuation.value, 20_000.0);
    assert_relative_eq!(result.valuation.profit, -10_000.0);
    assert_relative_eq!(result.valuation.profit_rate, -33.333333333, epsilon = 1e-6);
    assert!(result.live_valuation.is_none());
    assert!(result.hold_last_dates.is_empty());
    assert!(result.buy_stopped_at.is_none());
}

/// Weekly run where the middle close is missing and the loss works out to
/// the round -6.67%: 30,000 in, 350 units, valued at 80.
#[test]
fn test_weekly_with_gap_and_loss() {
    let prices = price_series(&[
        ("2024-01-01", 100.0),
        ("2024-01-08", 100.0),
        // 2024-01-15 missing
        ("2024-01-22", 100.0),
        ("2024-01-29", 200.0),
    ]);
    let p = params("2024-01-01", "2024-01-29", 10_000.0, Cadence::Weekly);

    let result = run_simulation(&p, &prices, None, 80.0).unwrap();

    // 100 + 100 + skip + 100 + 50 units
    assert_eq!(result.purchase_count, 4);
    assert_eq!(result.skip_counts.missing_price, 1);
    assert_relative_eq!(result.total_invested, 40_000.0);
    assert_relative_eq!(result.total_quantity, 350.0);
    assert_relative_eq!(result.average_cost, 114.285714286, epsilon = 1e-6);
    assert_relative_eq!(result.valuation.value, 28_000.0);
    assert_relative_eq!(result.valuation.profit, -12_000.0);
    assert_relative_eq!(result.valuation.profit_rate, -30.0, epsilon = 1e-9);
}

/// Month-end anchor re-derives from the start date every month instead of
/// sticking at a clamped day: Jan 31 -> Feb 29 (leap) -> Mar 31 -> Apr 30.
#[test]
fn test_monthly_anchor_clamp_is_not_sticky() {
    let prices = price_series(&[
        ("2024-01-31", 100.0),
        ("2024-02-29", 100.0),
        ("2024-03-31", 100.0),
        ("2024-04-30", 100.0),
        // A close on Mar 29 must NOT be bought; the anchor snapped back to 31
        ("2024-03-29", 999.0),
    ]);
    let p = params("2024-01-31", "2024-04-30", 10_000.0, Cadence::Monthly);

    let result = run_simulation(&p, &prices, None, 100.0).unwrap();

    assert_eq!(result.purchase_count, 4);
    assert_relative_eq!(result.total_invested, 40_000.0);
    assert_relative_eq!(result.total_quantity, 400.0);
    assert_eq!(result.skip_counts.total(), 0);
}

/// Once extreme greed (>= 75) resolves on a scheduled date, buying halts for
/// good even if sentiment later recovers below the threshold.
#[test]
fn test_extreme_greed_stop_is_permanent() {
    let prices = price_series(&[
        ("2024-01-01", 100.0),
        ("2024-01-02", 100.0),
        ("2024-01-03", 100.0),
        ("2024-01-04", 100.0),
        ("2024-01-05", 100.0),
    ]);
    let fng = sentiment_series(&[
        ("2024-01-01", 20),
        ("2024-01-02", 20),
        ("2024-01-03", 75),
        ("2024-01-04", 10),
        ("2024-01-05", 10),
    ]);
    let mut p = params("2024-01-01", "2024-01-05", 10_000.0, Cadence::Daily);
    p.buy_threshold = Some(30);

    let result = run_simulation(&p, &prices, Some(&fng), 100.0).unwrap();

    assert_eq!(result.purchase_count, 2);
    assert_eq!(result.buy_stopped_at, Some(date("2024-01-03")));
    assert_eq!(result.skip_counts.stop_triggered, 1);
    assert_eq!(result.skip_counts.stopped, 2);
    assert_relative_eq!(result.total_invested, 20_000.0);
}

/// Hold-last resolution: a weekend gap in the sentiment series resolves to
/// the last prior reading, and those dates are reported.
#[test]
fn test_hold_last_resolution_over_gaps() {
    let prices = price_series(&[
        ("2024-01-05", 100.0),
        ("2024-01-06", 100.0),
        ("2024-01-07", 100.0),
        ("2024-01-08", 100.0),
    ]);
    // Readings only on Friday and Monday
    let fng = sentiment_series(&[("2024-01-05", 20), ("2024-01-08", 40)]);
    let mut p = params("2024-01-05", "2024-01-08", 10_000.0, Cadence::Daily);
    p.buy_threshold = Some(30);

    let result = run_simulation(&p, &prices, Some(&fng), 100.0).unwrap();

    // Fri buys, Sat/Sun hold Friday's 20 and buy, Mon's 40 fails the gate
    assert_eq!(result.purchase_count, 3);
    assert_eq!(result.skip_counts.threshold_not_met, 1);
    assert_eq!(
        result.hold_last_dates,
        vec![date("2024-01-06"), date("2024-01-07")]
    );
}

/// The consecutive-days rule scans backward over calendar days with
/// hold-last resolution, not over series entries.
#[test]
fn test_consecutive_days_with_weekend_gap() {
    let prices = price_series(&[("2024-01-08", 100.0)]);
    // Fear since Friday; Monday requires 3 consecutive days <= 30
    let fng = sentiment_series(&[
        ("2024-01-04", 50),
        ("2024-01-05", 20),
        ("2024-01-08", 25),
    ]);
    let mut p = params("2024-01-08", "2024-01-08", 10_000.0, Cadence::Daily);
    p.buy_threshold = Some(30);
    p.consecutive_days_required = 3;

    let result = run_simulation(&p, &prices, Some(&fng), 100.0).unwrap();
    // Mon 25, Sun holds 20, Sat holds 20 -> qualifies
    assert_eq!(result.purchase_count, 1);

    p.consecutive_days_required = 5;
    let result = run_simulation(&p, &prices, Some(&fng), 100.0).unwrap();
    // Thu's 50 breaks the streak at day 5
    assert_eq!(result.purchase_count, 0);
    assert_eq!(result.skip_counts.consecutive_days_not_met, 1);
}

/// Fees reduce the quantity acquired but never the invested total, so a
/// fee-bearing run reports a lower value on the same invested amount.
#[test]
fn test_fee_effect_on_outcome() {
    let prices = price_series(&[("2024-01-01", 100.0), ("2024-01-02", 100.0)]);
    let mut p = params("2024-01-01", "2024-01-02", 10_000.0, Cadence::Daily);
    p.fee_rate = 0.01;

    let result = run_simulation(&p, &prices, None, 100.0).unwrap();

    assert_relative_eq!(result.total_invested, 20_000.0);
    assert_relative_eq!(result.total_quantity, 198.0);
    assert_relative_eq!(result.valuation.value, 19_800.0);
    assert_relative_eq!(result.valuation.profit, -200.0);
    assert_relative_eq!(result.valuation.profit_rate, -1.0, epsilon = 1e-9);
}

/// Sell-on-date produces two valuations from one position: one at the
/// historical sell price, one at the live price.
#[test]
fn test_on_date_dual_valuation() {
    let prices = price_series(&[
        ("2024-01-01", 100.0),
        ("2024-01-08", 100.0),
        ("2024-06-30", 150.0),
    ]);
    let mut p = params("2024-01-01", "2024-01-08", 10_000.0, Cadence::Weekly);
    p.sell_mode = SellMode::OnDate;
    p.sell_date = Some(date("2024-06-30"));

    let result = run_simulation(&p, &prices, None, 120.0).unwrap();

    assert_relative_eq!(result.total_quantity, 200.0);
    assert_relative_eq!(result.valuation.price, 150.0);
    assert_relative_eq!(result.valuation.value, 30_000.0);
    assert_relative_eq!(result.valuation.profit, 10_000.0);
    assert_relative_eq!(result.valuation.profit_rate, 50.0, epsilon = 1e-9);

    let live = result.live_valuation.expect("onDate reports a live scenario");
    assert_relative_eq!(live.price, 120.0);
    assert_relative_eq!(live.value, 24_000.0);
    assert_relative_eq!(live.profit, 4_000.0);
}

/// A run where nothing executes must report all-zero outcomes, not NaN.
#[test]
fn test_zero_purchase_run_is_all_zeros() {
    let prices = price_series(&[("2023-06-01", 100.0)]);
    let p = params("2024-01-01", "2024-01-07", 10_000.0, Cadence::Daily);

    let result = run_simulation(&p, &prices, None, 100.0).unwrap();

    assert_eq!(result.purchase_count, 0);
    assert_eq!(result.skip_counts.missing_price, 7);
    assert!(result.total_invested == 0.0);
    assert!(result.average_cost == 0.0);
    assert!(result.valuation.value == 0.0);
    assert!(result.valuation.profit_rate == 0.0);
    assert!(!result.valuation.profit_rate.is_nan());
}

/// Parameters arrive as the frontend's camelCase JSON and the result
/// serializes back the same way.
#[test]
fn test_wire_format_round_trip() {
    let json = r#"{
        "startDate": "2024-01-01",
        "endDate": "2024-01-02",
        "amountPerPurchase": 10000,
        "cadence": "daily",
        "buyThreshold": 30,
        "feeRate": 0.0005
    }"#;
    let p: SimulationParams = serde_json::from_str(json).unwrap();
    let prices = price_series(&[("2024-01-01", 100.0), ("2024-01-02", 100.0)]);
    let fng = sentiment_series(&[("2024-01-01", 20), ("2024-01-02", 20)]);

    let result = run_simulation(&p, &prices, Some(&fng), 100.0).unwrap();
    let out = serde_json::to_value(&result).unwrap();

    assert_eq!(out["purchaseCount"], 2);
    assert_eq!(out["skipCounts"]["missingPrice"], 0);
    assert!(out["buyStoppedAt"].is_null());
    assert!(out["liveValuation"].is_null());
    assert!(out["valuation"]["profitRate"].is_number());
}
