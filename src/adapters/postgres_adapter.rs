//! PostgreSQL journal store for hosted deployments.

use crate::domain::error::TradelogError;
use crate::domain::trade::{Direction, TradeRecord, TradeStatus};
use crate::ports::config_port::ConfigPort;
use crate::ports::journal_port::{ChangeKind, JournalChange, JournalPort};
use chrono::{DateTime, Utc};
use postgres::{Client, NoTls, Row};
use std::cell::RefCell;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Mutex;

pub struct PostgresJournal {
    client: RefCell<Client>,
    subscribers: Mutex<Vec<Sender<JournalChange>>>,
}

impl PostgresJournal {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradelogError> {
        let conninfo = config.get_string("postgres", "conninfo").ok_or_else(|| {
            TradelogError::ConfigMissing {
                section: "postgres".into(),
                key: "conninfo".into(),
            }
        })?;

        let client = Client::connect(&conninfo, NoTls).map_err(|e| TradelogError::Database {
            reason: e.to_string(),
        })?;

        Ok(Self {
            client: RefCell::new(client),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    pub fn initialize_schema(&self) -> Result<(), TradelogError> {
        self.client
            .borrow_mut()
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS trades (
                    id BIGSERIAL PRIMARY KEY,
                    owner TEXT NOT NULL,
                    asset TEXT NOT NULL,
                    direction TEXT NOT NULL,
                    entry_price DOUBLE PRECISION NOT NULL,
                    quantity DOUBLE PRECISION NOT NULL,
                    stop_loss DOUBLE PRECISION,
                    take_profit DOUBLE PRECISION,
                    fees DOUBLE PRECISION NOT NULL DEFAULT 0,
                    status TEXT NOT NULL,
                    profit_loss DOUBLE PRECISION,
                    notes TEXT,
                    created_at TIMESTAMPTZ NOT NULL,
                    updated_at TIMESTAMPTZ NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_trades_owner ON trades(owner);",
            )
            .map_err(|e| TradelogError::DatabaseQuery {
                reason: e.to_string(),
            })
    }

    fn notify(&self, owner: &str, kind: ChangeKind, id: i64) {
        let mut subscribers = match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        subscribers.retain(|sender| {
            sender
                .send(JournalChange {
                    owner: owner.to_string(),
                    kind,
                    id,
                })
                .is_ok()
        });
    }
}

const SELECT_COLUMNS: &str = "id, owner, asset, direction, entry_price, quantity, stop_loss, \
                              take_profit, fees, status, profit_loss, notes, created_at, updated_at";

fn map_row(row: &Row) -> Result<TradeRecord, TradelogError> {
    let direction_str: String = row.get(3);
    let direction =
        Direction::parse(&direction_str).ok_or_else(|| TradelogError::DatabaseQuery {
            reason: format!("unknown direction {direction_str:?}"),
        })?;

    let status_str: String = row.get(9);
    let status = TradeStatus::parse(&status_str).ok_or_else(|| TradelogError::DatabaseQuery {
        reason: format!("unknown status {status_str:?}"),
    })?;

    let created_at: DateTime<Utc> = row.get(12);
    let updated_at: DateTime<Utc> = row.get(13);

    Ok(TradeRecord {
        id: Some(row.get(0)),
        owner: row.get(1),
        asset: row.get(2),
        direction,
        entry_price: row.get(4),
        quantity: row.get(5),
        stop_loss: row.get(6),
        take_profit: row.get(7),
        fees: row.get(8),
        status,
        profit_loss: row.get(10),
        notes: row.get(11),
        created_at,
        updated_at,
    })
}

impl JournalPort for PostgresJournal {
    fn list_trades(&self, owner: &str) -> Result<Vec<TradeRecord>, TradelogError> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM trades WHERE owner = $1 ORDER BY created_at DESC, id DESC"
        );

        let rows = self
            .client
            .borrow_mut()
            .query(&query, &[&owner])
            .map_err(|e| TradelogError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        rows.iter().map(map_row).collect()
    }

    fn get_trade(&self, owner: &str, id: i64) -> Result<Option<TradeRecord>, TradelogError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM trades WHERE owner = $1 AND id = $2");

        let rows = self
            .client
            .borrow_mut()
            .query(&query, &[&owner, &id])
            .map_err(|e| TradelogError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        rows.first().map(map_row).transpose()
    }

    fn insert_trade(
        &self,
        owner: &str,
        record: &TradeRecord,
    ) -> Result<TradeRecord, TradelogError> {
        let now = Utc::now();
        let row = self
            .client
            .borrow_mut()
            .query_one(
                "INSERT INTO trades (owner, asset, direction, entry_price, quantity, stop_loss, \
                                     take_profit, fees, status, profit_loss, notes, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                 RETURNING id",
                &[
                    &owner,
                    &record.asset,
                    &record.direction.as_str(),
                    &record.entry_price,
                    &record.quantity,
                    &record.stop_loss,
                    &record.take_profit,
                    &record.fees,
                    &record.status.as_str(),
                    &record.profit_loss,
                    &record.notes,
                    &now,
                    &now,
                ],
            )
            .map_err(|e| TradelogError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let id: i64 = row.get(0);
        self.notify(owner, ChangeKind::Inserted, id);

        self.get_trade(owner, id)?
            .ok_or(TradelogError::TradeNotFound { id })
    }

    fn update_trade(
        &self,
        owner: &str,
        record: &TradeRecord,
    ) -> Result<TradeRecord, TradelogError> {
        let id = record.id.ok_or(TradelogError::TradeNotFound { id: 0 })?;

        let existing = self
            .get_trade(owner, id)?
            .ok_or(TradelogError::TradeNotFound { id })?;

        if !existing.status.can_transition_to(record.status) {
            return Err(TradelogError::InvalidTransition {
                id,
                status: existing.status.as_str().to_string(),
            });
        }

        let now = Utc::now();
        self.client
            .borrow_mut()
            .execute(
                "UPDATE trades SET asset = $1, direction = $2, entry_price = $3, quantity = $4, \
                                   stop_loss = $5, take_profit = $6, fees = $7, status = $8, \
                                   profit_loss = $9, notes = $10, updated_at = $11
                 WHERE owner = $12 AND id = $13",
                &[
                    &record.asset,
                    &record.direction.as_str(),
                    &record.entry_price,
                    &record.quantity,
                    &record.stop_loss,
                    &record.take_profit,
                    &record.fees,
                    &record.status.as_str(),
                    &record.profit_loss,
                    &record.notes,
                    &now,
                    &owner,
                    &id,
                ],
            )
            .map_err(|e| TradelogError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        self.notify(owner, ChangeKind::Updated, id);

        self.get_trade(owner, id)?
            .ok_or(TradelogError::TradeNotFound { id })
    }

    fn delete_trade(&self, owner: &str, id: i64) -> Result<(), TradelogError> {
        let affected = self
            .client
            .borrow_mut()
            .execute(
                "DELETE FROM trades WHERE owner = $1 AND id = $2",
                &[&owner, &id],
            )
            .map_err(|e| TradelogError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        if affected == 0 {
            return Err(TradelogError::TradeNotFound { id });
        }

        self.notify(owner, ChangeKind::Deleted, id);
        Ok(())
    }

    fn subscribe(&self) -> Receiver<JournalChange> {
        let (sender, receiver) = std::sync::mpsc::channel();
        let mut subscribers = match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        subscribers.push(sender);
        receiver
    }
}
