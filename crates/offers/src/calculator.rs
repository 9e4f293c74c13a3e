//! Points profit calculator.

use common::Error;
use serde::Serialize;

use crate::engine::MILHEIRO_PRICE;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculatorInput {
    /// Purchase amount in R$.
    pub purchase: f64,
    /// Points earned per R$.
    pub rate: f64,
    /// R$ received per 1,000 points sold.
    pub sell_price: f64,
}

impl CalculatorInput {
    pub fn new(purchase: f64, rate: f64) -> Self {
        Self {
            purchase,
            rate,
            sell_price: MILHEIRO_PRICE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalculatorResult {
    pub points: f64,
    /// R$ obtained by selling the points.
    pub cash_return: f64,
    /// Purchase minus cash return.
    pub net_cost: f64,
    pub effective_cashback_pct: f64,
}

pub fn calculate(input: CalculatorInput) -> Result<CalculatorResult, Error> {
    for (name, v) in [
        ("purchase", input.purchase),
        ("rate", input.rate),
        ("sell_price", input.sell_price),
    ] {
        if !v.is_finite() || v < 0.0 {
            return Err(Error::Validation(format!("{name} must be a number >= 0, got {v}")));
        }
    }

    let points = input.purchase * input.rate;
    let cash_return = points / 1000.0 * input.sell_price;
    let effective_cashback_pct = if input.purchase > 0.0 {
        cash_return / input.purchase * 100.0
    } else {
        0.0
    };

    Ok(CalculatorResult {
        points,
        cash_return,
        net_cost: input.purchase - cash_return,
        effective_cashback_pct,
    })
}

/// `R$ 350.00`
pub fn format_brl(amount: f64) -> String {
    if amount < 0.0 {
        format!("-R$ {:.2}", -amount)
    } else {
        format!("R$ {:.2}", amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_purchase() {
        let result = calculate(CalculatorInput {
            purchase: 1000.0,
            rate: 10.0,
            sell_price: 35.0,
        })
        .expect("valid input");

        assert_eq!(result.points, 10000.0);
        assert_eq!(format_brl(result.cash_return), "R$ 350.00");
        assert_eq!(format_brl(result.net_cost), "R$ 650.00");
        assert!((result.effective_cashback_pct - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_sell_price_is_milheiro_price() {
        assert_eq!(CalculatorInput::new(200.0, 5.0).sell_price, 35.0);
    }

    #[test]
    fn test_zero_purchase() {
        let result = calculate(CalculatorInput::new(0.0, 10.0)).unwrap();
        assert_eq!(result.points, 0.0);
        assert_eq!(result.effective_cashback_pct, 0.0);
    }

    #[test]
    fn test_negative_input_rejected() {
        let err = calculate(CalculatorInput::new(-1.0, 10.0)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(calculate(CalculatorInput::new(10.0, f64::NAN)).is_err());
    }

    #[test]
    fn test_format_brl_negative() {
        assert_eq!(format_brl(-12.5), "-R$ 12.50");
    }
}
