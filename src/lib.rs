//! # DCA Backtest
//!
//! Simulation engine for backtesting a periodic ("dollar-cost averaging")
//! Bitcoin purchase strategy against historical daily closes and the
//! fear/greed sentiment index.
//!
//! The engine is a pure, synchronous function: the caller supplies the
//! parameters, the price/sentiment dataset and a live price scalar; it
//! returns a single result record. All expected data gaps (missing closes,
//! sentiment not yet available, gate conditions not met) are tallied as
//! skips rather than raised as errors.
//!
//! ## Example
//! ```
//! use dca_backtest::data::{PricePoint, PriceSeries};
//! use dca_backtest::sim::{run_simulation, Cadence, SellMode, SimulationParams};
//!
//! let points = vec![
//!     PricePoint { d: "2024-01-01".parse().unwrap(), c: 100.0 },
//!     PricePoint { d: "2024-01-08".parse().unwrap(), c: 200.0 },
//! ];
//! let prices = PriceSeries::from_points(&points);
//!
//! let params = SimulationParams {
//!     start_date: "2024-01-01".parse().unwrap(),
//!     end_date: "2024-01-08".parse().unwrap(),
//!     amount_per_purchase: 10_000.0,
//!     cadence: Cadence::Weekly,
//!     buy_threshold: None,
//!     consecutive_days_required: 0,
//!     sell_mode: SellMode::AtCurrentPrice,
//!     sell_date: None,
//!     fee_rate: 0.0,
//! };
//!
//! let result = run_simulation(&params, &prices, None, 150.0).unwrap();
//! assert_eq!(result.purchase_count, 2);
//! ```

pub mod data;
pub mod sim;

// Re-export the public API at crate root
pub use data::{
    load_dataset, Dataset, Meta, PricePoint, PriceSeries, SentimentEntry, SentimentPoint,
    SentimentSeries,
};
pub use sim::{
    generate_schedule, resolve, run_simulation, Cadence, ResolvedSentiment, SellMode,
    SimulationParams, SimulationResult, SkipCounts, SkipReason, Valuation, EXTREME_GREED_STOP,
};
