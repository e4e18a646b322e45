// src/sim/summary.rs
// Post-loop derivation of display-ready aggregates from accumulated totals

use crate::sim::types::Valuation;

/// Average cost basis; 0 when nothing was bought.
pub fn average_cost(total_invested: f64, total_quantity: f64) -> f64 {
    if total_quantity > 0.0 {
        total_invested / total_quantity
    } else {
        0.0
    }
}

/// Value the accumulated position at one price.
pub fn valuation(total_invested: f64, total_quantity: f64, price: f64) -> Valuation {
    let value = total_quantity * price;
    let profit = value - total_invested;
    let profit_rate = if total_invested > 0.0 {
        profit / total_invested * 100.0
    } else {
        0.0
    };

    Valuation {
        price,
        value,
        profit,
        profit_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_average_cost() {
        assert_relative_eq!(average_cost(30_000.0, 350.0), 85.714285714, epsilon = 1e-6);
    }

    #[test]
    fn test_average_cost_zero_quantity() {
        assert_eq!(average_cost(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_valuation_loss() {
        let v = valuation(30_000.0, 350.0, 80.0);
        assert_relative_eq!(v.value, 28_000.0);
        assert_relative_eq!(v.profit, -2_000.0);
        assert_relative_eq!(v.profit_rate, -6.666666667, epsilon = 1e-6);
    }

    #[test]
    fn test_valuation_zero_invested_never_divides() {
        let v = valuation(0.0, 0.0, 80.0);
        assert_eq!(v.value, 0.0);
        assert_eq!(v.profit, 0.0);
        assert_eq!(v.profit_rate, 0.0);
    }
}
