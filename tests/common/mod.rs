#![allow(dead_code)]

use chrono::Utc;
use std::cell::RefCell;
use std::collections::HashMap;
use tradelog::domain::error::TradelogError;
use tradelog::domain::trade::{Direction, TradeRecord, TradeStatus};
use tradelog::ports::journal_port::JournalPort;

/// In-memory journal keyed by owner, with optional injected failures.
pub struct MockJournalPort {
    pub trades: RefCell<HashMap<String, Vec<TradeRecord>>>,
    pub fail_reason: Option<String>,
    next_id: RefCell<i64>,
}

impl MockJournalPort {
    pub fn new() -> Self {
        Self {
            trades: RefCell::new(HashMap::new()),
            fail_reason: None,
            next_id: RefCell::new(1),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            trades: RefCell::new(HashMap::new()),
            fail_reason: Some(reason.to_string()),
            next_id: RefCell::new(1),
        }
    }

    pub fn with_trades(self, owner: &str, trades: Vec<TradeRecord>) -> Self {
        {
            let mut map = self.trades.borrow_mut();
            let mut next_id = self.next_id.borrow_mut();
            let mut stored = trades;
            for trade in &mut stored {
                if trade.id.is_none() {
                    trade.id = Some(*next_id);
                    *next_id += 1;
                }
            }
            map.insert(owner.to_string(), stored);
        }
        self
    }

    fn check_failure(&self) -> Result<(), TradelogError> {
        match &self.fail_reason {
            Some(reason) => Err(TradelogError::Database {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl JournalPort for MockJournalPort {
    fn list_trades(&self, owner: &str) -> Result<Vec<TradeRecord>, TradelogError> {
        self.check_failure()?;
        Ok(self
            .trades
            .borrow()
            .get(owner)
            .cloned()
            .unwrap_or_default())
    }

    fn get_trade(&self, owner: &str, id: i64) -> Result<Option<TradeRecord>, TradelogError> {
        self.check_failure()?;
        Ok(self
            .trades
            .borrow()
            .get(owner)
            .and_then(|list| list.iter().find(|t| t.id == Some(id)).cloned()))
    }

    fn insert_trade(
        &self,
        owner: &str,
        record: &TradeRecord,
    ) -> Result<TradeRecord, TradelogError> {
        self.check_failure()?;
        let mut stored = record.clone();
        stored.id = Some(*self.next_id.borrow());
        *self.next_id.borrow_mut() += 1;
        stored.owner = owner.to_string();
        self.trades
            .borrow_mut()
            .entry(owner.to_string())
            .or_default()
            .insert(0, stored.clone());
        Ok(stored)
    }

    fn update_trade(
        &self,
        owner: &str,
        record: &TradeRecord,
    ) -> Result<TradeRecord, TradelogError> {
        self.check_failure()?;
        let id = record.id.ok_or(TradelogError::TradeNotFound { id: 0 })?;
        let mut map = self.trades.borrow_mut();
        let list = map
            .get_mut(owner)
            .ok_or(TradelogError::TradeNotFound { id })?;
        let slot = list
            .iter_mut()
            .find(|t| t.id == Some(id))
            .ok_or(TradelogError::TradeNotFound { id })?;
        if !slot.status.can_transition_to(record.status) {
            return Err(TradelogError::InvalidTransition {
                id,
                status: slot.status.as_str().to_string(),
            });
        }
        let mut updated = record.clone();
        updated.updated_at = Utc::now();
        *slot = updated.clone();
        Ok(updated)
    }

    fn delete_trade(&self, owner: &str, id: i64) -> Result<(), TradelogError> {
        self.check_failure()?;
        let mut map = self.trades.borrow_mut();
        let list = map
            .get_mut(owner)
            .ok_or(TradelogError::TradeNotFound { id })?;
        let before = list.len();
        list.retain(|t| t.id != Some(id));
        if list.len() == before {
            return Err(TradelogError::TradeNotFound { id });
        }
        Ok(())
    }
}

pub fn make_trade(owner: &str, asset: &str, status: TradeStatus) -> TradeRecord {
    let now = Utc::now();
    TradeRecord {
        id: None,
        owner: owner.to_string(),
        asset: asset.to_string(),
        direction: Direction::Buy,
        entry_price: 100.0,
        quantity: 1.0,
        stop_loss: Some(95.0),
        take_profit: Some(110.0),
        fees: 1.0,
        status,
        profit_loss: None,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn closed_trade(owner: &str, asset: &str, pnl: f64, fees: f64) -> TradeRecord {
    let mut trade = make_trade(owner, asset, TradeStatus::Closed);
    trade.profit_loss = Some(pnl);
    trade.fees = fees;
    trade
}
