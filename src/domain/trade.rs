//! Trade records and their lifecycle.

use chrono::{DateTime, Utc};

/// Side of a trade. Determines sign conventions for every downstream
/// computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Some(Direction::Buy),
            "SELL" => Some(Direction::Sell),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    Open,
    Closed,
    Cancelled,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Open => "open",
            TradeStatus::Closed => "closed",
            TradeStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Some(TradeStatus::Open),
            "closed" => Some(TradeStatus::Closed),
            "cancelled" => Some(TradeStatus::Cancelled),
            _ => None,
        }
    }

    /// Closed and cancelled are terminal states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TradeStatus::Closed | TradeStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: TradeStatus) -> bool {
        if *self == next {
            return true;
        }
        match self {
            TradeStatus::Open => true,
            TradeStatus::Closed | TradeStatus::Cancelled => false,
        }
    }
}

/// A journal entry. `id`, `created_at` and `updated_at` are assigned by the
/// journal store; `profit_loss` is set only once the trade closes and is
/// already net of fees.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub id: Option<i64>,
    pub owner: String,
    pub asset: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub quantity: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub fees: f64,
    pub status: TradeStatus,
    pub profit_loss: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User-supplied form state for a not-yet-saved trade. Every field tracks
/// its own presence so validation can report absence instead of panicking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeDraft {
    pub asset: Option<String>,
    pub direction: Option<Direction>,
    pub entry_price: Option<f64>,
    pub quantity: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub fees: Option<f64>,
    pub notes: Option<String>,
}

impl TradeDraft {
    /// Materialize a validated draft into an open record for `owner`.
    ///
    /// Callers must run the draft through `validation::validate` first;
    /// missing required fields here are a caller bug.
    pub fn into_record(self, owner: &str, now: DateTime<Utc>) -> Option<TradeRecord> {
        Some(TradeRecord {
            id: None,
            owner: owner.to_string(),
            asset: self.asset?.trim().to_uppercase(),
            direction: self.direction?,
            entry_price: self.entry_price?,
            quantity: self.quantity?,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            fees: self.fees.unwrap_or(0.0),
            status: TradeStatus::Open,
            profit_loss: None,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Reduce an exit to a single realized P&L figure, net of fees.
pub fn realized_pnl(
    direction: Direction,
    entry_price: f64,
    exit_price: f64,
    quantity: f64,
    fees: f64,
) -> f64 {
    let price_diff = match direction {
        Direction::Buy => exit_price - entry_price,
        Direction::Sell => entry_price - exit_price,
    };
    price_diff * quantity - fees
}
