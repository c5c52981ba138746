//! Position-sizing calculator.
//!
//! All inputs are quoted in a single account currency. The pip value is an
//! external conversion factor supplied by configuration, not derived here.

/// Inputs to a sizing calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskInput {
    pub account_balance: f64,
    pub risk_percentage: f64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: Option<f64>,
    pub pip_value: f64,
}

/// Result of a sizing calculation. Reward figures are present only when a
/// take profit was supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskCalculation {
    pub risk_amount: f64,
    pub position_size: f64,
    pub reward_amount: Option<f64>,
    pub risk_reward_ratio: Option<f64>,
}

impl RiskCalculation {
    /// Size a position so a stop-out loses `risk_percentage` of the balance.
    /// A zero price distance or zero risk amount yields zeros rather than an
    /// error.
    pub fn compute(input: &RiskInput) -> Self {
        let risk_amount = input.account_balance * input.risk_percentage / 100.0;
        let price_distance = (input.entry_price - input.stop_loss).abs();

        let position_size = if price_distance > 0.0 && risk_amount > 0.0 {
            risk_amount / (price_distance * input.pip_value)
        } else {
            0.0
        };

        let (reward_amount, risk_reward_ratio) = match input.take_profit {
            Some(target) if target > 0.0 && position_size > 0.0 => {
                let reward_distance = (target - input.entry_price).abs();
                let reward = position_size * reward_distance * input.pip_value;
                let ratio = if risk_amount > 0.0 {
                    reward / risk_amount
                } else {
                    0.0
                };
                (Some(reward), Some(ratio))
            }
            _ => (None, None),
        };

        RiskCalculation {
            risk_amount,
            position_size,
            reward_amount,
            risk_reward_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_input() -> RiskInput {
        RiskInput {
            account_balance: 10_000.0,
            risk_percentage: 2.0,
            entry_price: 2024.5,
            stop_loss: 2020.0,
            take_profit: Some(2033.5),
            pip_value: 10.0,
        }
    }

    #[test]
    fn risk_amount_is_percentage_of_balance() {
        let calc = RiskCalculation::compute(&sample_input());
        assert_relative_eq!(calc.risk_amount, 200.0);
    }

    #[test]
    fn position_size_scales_with_stop_distance() {
        let calc = RiskCalculation::compute(&sample_input());
        // 200 / (4.5 * 10)
        assert_relative_eq!(calc.position_size, 200.0 / 45.0, epsilon = 1e-12);
    }

    #[test]
    fn reward_and_ratio_follow_take_profit() {
        let calc = RiskCalculation::compute(&sample_input());
        let size = 200.0 / 45.0;
        assert_relative_eq!(calc.reward_amount.unwrap(), size * 9.0 * 10.0, epsilon = 1e-9);
        assert_relative_eq!(calc.risk_reward_ratio.unwrap(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn no_take_profit_means_no_reward_figures() {
        let mut input = sample_input();
        input.take_profit = None;
        let calc = RiskCalculation::compute(&input);
        assert_eq!(calc.reward_amount, None);
        assert_eq!(calc.risk_reward_ratio, None);
    }

    #[test]
    fn zero_stop_distance_yields_zero_size() {
        let mut input = sample_input();
        input.stop_loss = input.entry_price;
        let calc = RiskCalculation::compute(&input);
        assert_relative_eq!(calc.position_size, 0.0);
        assert_eq!(calc.reward_amount, None);
    }

    #[test]
    fn zero_risk_amount_yields_zero_size() {
        let mut input = sample_input();
        input.risk_percentage = 0.0;
        let calc = RiskCalculation::compute(&input);
        assert_relative_eq!(calc.risk_amount, 0.0);
        assert_relative_eq!(calc.position_size, 0.0);
    }

    #[test]
    fn stop_above_entry_uses_absolute_distance() {
        // Sizing a short: stop sits above the entry.
        let input = RiskInput {
            account_balance: 5_000.0,
            risk_percentage: 1.0,
            entry_price: 100.0,
            stop_loss: 105.0,
            take_profit: Some(90.0),
            pip_value: 1.0,
        };
        let calc = RiskCalculation::compute(&input);
        assert_relative_eq!(calc.risk_amount, 50.0);
        assert_relative_eq!(calc.position_size, 10.0);
        assert_relative_eq!(calc.reward_amount.unwrap(), 100.0);
        assert_relative_eq!(calc.risk_reward_ratio.unwrap(), 2.0);
    }
}
