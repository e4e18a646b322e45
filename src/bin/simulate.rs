//! Native simulation CLI
//!
//! Usage: simulate <data_dir> <params.json> [live_price]
//!
//! Live price defaults to the dataset's last close when not given.

use std::path::PathBuf;

use dca_backtest::data::load_dataset;
use dca_backtest::sim::{run_simulation, SimulationParams};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: simulate <data_dir> <params.json> [live_price]");
        std::process::exit(1);
    }

    let data_dir = PathBuf::from(&args[1]);
    let params_path = PathBuf::from(&args[2]);

    let dataset = match load_dataset(&data_dir) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to load dataset: {}", e);
            std::process::exit(1);
        }
    };

    let params: SimulationParams = match std::fs::read_to_string(&params_path)
        .map_err(|e| format!("Failed to read {}: {}", params_path.display(), e))
        .and_then(|content| {
            serde_json::from_str(&content)
                .map_err(|e| format!("Failed to parse {}: {}", params_path.display(), e))
        }) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let live_price = match args.get(3) {
        Some(raw) => match raw.parse::<f64>() {
            Ok(p) => p,
            Err(_) => {
                eprintln!("Invalid live price: {}", raw);
                std::process::exit(1);
            }
        },
        None => match dataset.prices.last_close() {
            Some(p) => p,
            None => {
                eprintln!("Dataset has no closes to use as a live price");
                std::process::exit(1);
            }
        },
    };

    eprintln!(
        "[DATA] {} closes, {} sentiment readings, live price {}",
        dataset.prices.len(),
        dataset.sentiment.len(),
        live_price
    );

    match run_simulation(&params, &dataset.prices, Some(&dataset.sentiment), live_price) {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result).unwrap());
        }
        Err(e) => {
            eprintln!("Simulation error: {}", e);
            std::process::exit(1);
        }
    }
}
