//! Draft-trade validation.
//!
//! Pure and total: absence of a field is a reported issue, never a panic.
//! Issues come back in a fixed priority order so callers may show only the
//! first one.

use super::trade::{Direction, TradeDraft};

pub const MAX_ASSET_LEN: usize = 50;

/// A single validation failure. The `Display` string is the user-facing
/// message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationIssue {
    #[error("Asset symbol is required")]
    AssetMissing,
    #[error("Asset symbol must be at most {MAX_ASSET_LEN} characters")]
    AssetTooLong,
    #[error("Trade direction is required")]
    DirectionMissing,
    #[error("Entry price must be greater than 0")]
    EntryPriceInvalid,
    #[error("Quantity must be greater than 0")]
    QuantityInvalid,
    #[error("Fees cannot be negative")]
    FeesNegative,
    #[error("Stop loss must be greater than 0")]
    StopLossInvalid,
    #[error("Stop loss must be below entry price for BUY trades")]
    StopLossAboveEntryForBuy,
    #[error("Stop loss must be above entry price for SELL trades")]
    StopLossBelowEntryForSell,
    #[error("Take profit must be greater than 0")]
    TakeProfitInvalid,
    #[error("Take profit must be above entry price for BUY trades")]
    TakeProfitBelowEntryForBuy,
    #[error("Take profit must be below entry price for SELL trades")]
    TakeProfitAboveEntryForSell,
}

/// Validate a draft trade, returning every failure in priority order.
/// An empty vec means the draft is ready to save.
pub fn validate(draft: &TradeDraft) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    match draft.asset.as_deref().map(str::trim) {
        None | Some("") => issues.push(ValidationIssue::AssetMissing),
        Some(asset) if asset.chars().count() > MAX_ASSET_LEN => {
            issues.push(ValidationIssue::AssetTooLong)
        }
        Some(_) => {}
    }

    if draft.direction.is_none() {
        issues.push(ValidationIssue::DirectionMissing);
    }

    let entry_valid = matches!(draft.entry_price, Some(p) if p > 0.0);
    if !entry_valid {
        issues.push(ValidationIssue::EntryPriceInvalid);
    }

    if !matches!(draft.quantity, Some(q) if q > 0.0) {
        issues.push(ValidationIssue::QuantityInvalid);
    }

    if matches!(draft.fees, Some(f) if f < 0.0) {
        issues.push(ValidationIssue::FeesNegative);
    }

    // Directional checks only make sense against a valid entry price and a
    // known direction; otherwise the earlier issues already cover the draft.
    let reference = if entry_valid {
        draft.direction.map(|d| (d, draft.entry_price.unwrap_or(0.0)))
    } else {
        None
    };

    if let Some(stop) = draft.stop_loss {
        if stop <= 0.0 {
            issues.push(ValidationIssue::StopLossInvalid);
        } else if let Some((direction, entry)) = reference {
            match direction {
                Direction::Buy if stop >= entry => {
                    issues.push(ValidationIssue::StopLossAboveEntryForBuy)
                }
                Direction::Sell if stop <= entry => {
                    issues.push(ValidationIssue::StopLossBelowEntryForSell)
                }
                _ => {}
            }
        }
    }

    if let Some(target) = draft.take_profit {
        if target <= 0.0 {
            issues.push(ValidationIssue::TakeProfitInvalid);
        } else if let Some((direction, entry)) = reference {
            match direction {
                Direction::Buy if target <= entry => {
                    issues.push(ValidationIssue::TakeProfitBelowEntryForBuy)
                }
                Direction::Sell if target >= entry => {
                    issues.push(ValidationIssue::TakeProfitAboveEntryForSell)
                }
                _ => {}
            }
        }
    }

    issues
}
