//! Portfolio statistics over a snapshot of journal entries.

use super::trade::{TradeRecord, TradeStatus};

/// Derived performance figures. Recomputed in full from a trade snapshot,
/// never stored or incrementally updated.
///
/// `win_rate` is a percentage in `[0, 100]`. `gross_loss` and `average_loss`
/// are positive magnitudes. `profit_factor` is `f64::INFINITY` when there
/// are wins but no losses, so display layers can render it as an unbounded
/// symbol rather than a number.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioStats {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub open_trades: usize,
    pub cancelled_trades: usize,
    pub win_rate: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub net_profit: f64,
    pub average_win: f64,
    pub average_loss: f64,
    pub profit_factor: f64,
    pub total_fees: f64,
}

impl PortfolioStats {
    /// Aggregate a snapshot. Total over any finite slice, including empty;
    /// every ratio has an explicit zero or infinity fallback, so this never
    /// divides by zero.
    pub fn compute(trades: &[TradeRecord]) -> Self {
        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut total_trades = 0usize;
        let mut open_trades = 0usize;
        let mut cancelled_trades = 0usize;
        let mut gross_profit = 0.0_f64;
        let mut gross_loss = 0.0_f64;
        let mut net_profit = 0.0_f64;
        let mut total_fees = 0.0_f64;

        for trade in trades {
            // Fees are charged regardless of outcome.
            total_fees += trade.fees;

            match trade.status {
                TradeStatus::Open => {
                    open_trades += 1;
                    continue;
                }
                TradeStatus::Cancelled => {
                    cancelled_trades += 1;
                    continue;
                }
                TradeStatus::Closed => {}
            }

            total_trades += 1;
            // Status is the partition key; a closed row with no stored P&L
            // contributes zero and counts toward neither side.
            let pnl = trade.profit_loss.unwrap_or(0.0);
            net_profit += pnl;
            if pnl > 0.0 {
                winning_trades += 1;
                gross_profit += pnl;
            } else if pnl < 0.0 {
                losing_trades += 1;
                gross_loss += pnl.abs();
            }
        }

        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let average_win = if winning_trades > 0 {
            gross_profit / winning_trades as f64
        } else {
            0.0
        };

        let average_loss = if losing_trades > 0 {
            gross_loss / losing_trades as f64
        } else {
            0.0
        };

        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        PortfolioStats {
            total_trades,
            winning_trades,
            losing_trades,
            open_trades,
            cancelled_trades,
            win_rate,
            gross_profit,
            gross_loss,
            net_profit,
            average_win,
            average_loss,
            profit_factor,
            total_fees,
        }
    }
}
