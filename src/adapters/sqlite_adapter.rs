//! SQLite journal store.

use crate::domain::error::TradelogError;
use crate::domain::trade::{Direction, TradeRecord, TradeStatus};
use crate::ports::config_port::ConfigPort;
use crate::ports::journal_port::{ChangeKind, JournalChange, JournalPort};
use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Row};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Mutex;

pub struct SqliteJournal {
    pool: Pool<SqliteConnectionManager>,
    subscribers: Mutex<Vec<Sender<JournalChange>>>,
}

impl SqliteJournal {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradelogError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| TradelogError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| TradelogError::Database {
                    reason: e.to_string(),
                })?;

        Ok(Self {
            pool,
            subscribers: Mutex::new(Vec::new()),
        })
    }

    pub fn in_memory() -> Result<Self, TradelogError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| TradelogError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self {
            pool,
            subscribers: Mutex::new(Vec::new()),
        })
    }

    pub fn initialize_schema(&self) -> Result<(), TradelogError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| TradelogError::Database {
                reason: e.to_string(),
            })?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS trades (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner TEXT NOT NULL,
                asset TEXT NOT NULL,
                direction TEXT NOT NULL,
                entry_price REAL NOT NULL,
                quantity REAL NOT NULL,
                stop_loss REAL,
                take_profit REAL,
                fees REAL NOT NULL DEFAULT 0,
                status TEXT NOT NULL,
                profit_loss REAL,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_trades_owner ON trades(owner);
            CREATE INDEX IF NOT EXISTS idx_trades_owner_status ON trades(owner, status);",
        )
        .map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    fn notify(&self, owner: &str, kind: ChangeKind, id: i64) {
        let mut subscribers = match self.subscribers.lock() {
            Ok(guard) => guard,
            // A poisoned lock only means a subscriber thread panicked;
            // mutations must still succeed.
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

fn map_row(row: &Row<'_>) -> rusqlite::Result<TradeRecord> {
    let direction_str: String = row.get(3)?;
    let direction = Direction::parse(&direction_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown direction {direction_str:?}").into(),
        )
    })?;

    let status_str: String = row.get(9)?;
    let status = TradeStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            9,
            rusqlite::types::Type::Text,
            format!("unknown status {status_str:?}").into(),
        )
    })?;

    Ok(TradeRecord {
        id: Some(row.get(0)?),
        owner: row.get(1)?,
        asset: row.get(2)?,
        direction,
        entry_price: row.get(4)?,
        quantity: row.get(5)?,
        stop_loss: row.get(6)?,
        take_profit: row.get(7)?,
        fees: row.get(8)?,
        status,
        profit_loss: row.get(10)?,
        notes: row.get(11)?,
        created_at: parse_timestamp(row, 12)?,
        updated_at: parse_timestamp(row, 13)?,
    })
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

const SELECT_COLUMNS: &str = "id, owner, asset, direction, entry_price, quantity, stop_loss, \
                              take_profit, fees, status, profit_loss, notes, created_at, updated_at";

impl JournalPort for SqliteJournal {
    fn list_trades(&self, owner: &str) -> Result<Vec<TradeRecord>, TradelogError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| TradelogError::Database {
                reason: e.to_string(),
            })?;

        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM trades WHERE owner = ?1 ORDER BY created_at DESC, id DESC"
        );

        let mut stmt =
            conn.prepare(&query)
                .map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let rows = stmt
            .query_map(params![owner], map_row)
            .map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut trades = Vec::new();
        for row in rows {
            trades.push(
                row.map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
                    reason: e.to_string(),
                })?,
            );
        }

        Ok(trades)
    }

    fn get_trade(&self, owner: &str, id: i64) -> Result<Option<TradeRecord>, TradelogError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| TradelogError::Database {
                reason: e.to_string(),
            })?;

        let query = format!("SELECT {SELECT_COLUMNS} FROM trades WHERE owner = ?1 AND id = ?2");

        let mut stmt =
            conn.prepare(&query)
                .map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let mut rows = stmt
            .query_map(params![owner, id], map_row)
            .map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        match rows.next() {
            Some(row) => Ok(Some(row.map_err(|e: rusqlite::Error| {
                TradelogError::DatabaseQuery {
                    reason: e.to_string(),
                }
            })?)),
            None => Ok(None),
        }
    }

    fn insert_trade(
        &self,
        owner: &str,
        record: &TradeRecord,
    ) -> Result<TradeRecord, TradelogError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| TradelogError::Database {
                reason: e.to_string(),
            })?;

        let now = Utc::now();
        conn.execute(
            "INSERT INTO trades (owner, asset, direction, entry_price, quantity, stop_loss, \
                                 take_profit, fees, status, profit_loss, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                owner,
                record.asset,
                record.direction.as_str(),
                record.entry_price,
                record.quantity,
                record.stop_loss,
                record.take_profit,
                record.fees,
                record.status.as_str(),
                record.profit_loss,
                record.notes,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        let id = conn.last_insert_rowid();
        drop(conn);
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

        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| TradelogError::Database {
                reason: e.to_string(),
            })?;

        let now = Utc::now();
        conn.execute(
            "UPDATE trades SET asset = ?1, direction = ?2, entry_price = ?3, quantity = ?4, \
                               stop_loss = ?5, take_profit = ?6, fees = ?7, status = ?8, \
                               profit_loss = ?9, notes = ?10, updated_at = ?11
             WHERE owner = ?12 AND id = ?13",
            params![
                record.asset,
                record.direction.as_str(),
                record.entry_price,
                record.quantity,
                record.stop_loss,
                record.take_profit,
                record.fees,
                record.status.as_str(),
                record.profit_loss,
                record.notes,
                now.to_rfc3339(),
                owner,
                id,
            ],
        )
        .map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        drop(conn);
        self.notify(owner, ChangeKind::Updated, id);

        self.get_trade(owner, id)?
            .ok_or(TradelogError::TradeNotFound { id })
    }

    fn delete_trade(&self, owner: &str, id: i64) -> Result<(), TradelogError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| TradelogError::Database {
                reason: e.to_string(),
            })?;

        let affected = conn
            .execute(
                "DELETE FROM trades WHERE owner = ?1 AND id = ?2",
                params![owner, id],
            )
            .map_err(|e: rusqlite::Error| TradelogError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        if affected == 0 {
            return Err(TradelogError::TradeNotFound { id });
        }

        drop(conn);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::TradeDraft;

    struct EmptyConfig;

    impl ConfigPort for EmptyConfig {
        fn get_string(&self, _section: &str, _key: &str) -> Option<String> {
            None
        }
        fn get_int(&self, _section: &str, _key: &str, default: i64) -> i64 {
            default
        }
        fn get_double(&self, _section: &str, _key: &str, default: f64) -> f64 {
            default
        }
        fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
            default
        }
    }

    fn open_journal() -> SqliteJournal {
        let journal = SqliteJournal::in_memory().unwrap();
        journal.initialize_schema().unwrap();
        journal
    }

    fn sample_record(owner: &str, asset: &str) -> TradeRecord {
        TradeDraft {
            asset: Some(asset.to_string()),
            direction: Some(Direction::Buy),
            entry_price: Some(100.0),
            quantity: Some(2.0),
            stop_loss: Some(95.0),
            take_profit: Some(120.0),
            fees: Some(1.5),
            notes: None,
        }
        .into_record(owner, Utc::now())
        .unwrap()
    }

    #[test]
    fn from_config_missing_path() {
        let result = SqliteJournal::from_config(&EmptyConfig);
        match result {
            Err(TradelogError::ConfigMissing { section, key }) => {
                assert_eq!(section, "sqlite");
                assert_eq!(key, "path");
            }
            Err(other) => panic!("expected ConfigMissing, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn insert_assigns_id_and_timestamps() {
        let journal = open_journal();
        let stored = journal
            .insert_trade("user-1", &sample_record("user-1", "EURUSD"))
            .unwrap();
        assert!(stored.id.is_some());
        assert_eq!(stored.asset, "EURUSD");
        assert_eq!(stored.status, TradeStatus::Open);
        assert_eq!(stored.created_at, stored.updated_at);
    }

    #[test]
    fn list_is_scoped_by_owner() {
        let journal = open_journal();
        journal
            .insert_trade("alice", &sample_record("alice", "EURUSD"))
            .unwrap();
        journal
            .insert_trade("bob", &sample_record("bob", "XAUUSD"))
            .unwrap();

        let alice = journal.list_trades("alice").unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].asset, "EURUSD");

        let bob = journal.list_trades("bob").unwrap();
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0].asset, "XAUUSD");
    }

    #[test]
    fn get_foreign_owner_row_is_none() {
        let journal = open_journal();
        let stored = journal
            .insert_trade("alice", &sample_record("alice", "EURUSD"))
            .unwrap();
        assert!(journal
            .get_trade("bob", stored.id.unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn update_replaces_whole_record() {
        let journal = open_journal();
        let mut stored = journal
            .insert_trade("user-1", &sample_record("user-1", "EURUSD"))
            .unwrap();

        stored.status = TradeStatus::Closed;
        stored.profit_loss = Some(42.0);
        stored.notes = Some("closed into strength".to_string());
        let updated = journal.update_trade("user-1", &stored).unwrap();

        assert_eq!(updated.status, TradeStatus::Closed);
        assert_eq!(updated.profit_loss, Some(42.0));
        assert_eq!(updated.notes.as_deref(), Some("closed into strength"));
        assert!(updated.updated_at >= updated.created_at);
    }

    #[test]
    fn update_refuses_leaving_terminal_state() {
        let journal = open_journal();
        let mut stored = journal
            .insert_trade("user-1", &sample_record("user-1", "EURUSD"))
            .unwrap();

        stored.status = TradeStatus::Cancelled;
        let cancelled = journal.update_trade("user-1", &stored).unwrap();

        let mut reopened = cancelled.clone();
        reopened.status = TradeStatus::Open;
        match journal.update_trade("user-1", &reopened) {
            Err(TradelogError::InvalidTransition { status, .. }) => {
                assert_eq!(status, "cancelled");
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let journal = open_journal();
        let mut record = sample_record("user-1", "EURUSD");
        record.id = Some(999);
        match journal.update_trade("user-1", &record) {
            Err(TradelogError::TradeNotFound { id }) => assert_eq!(id, 999),
            other => panic!("expected TradeNotFound, got {other:?}"),
        }
    }

    #[test]
    fn delete_removes_row() {
        let journal = open_journal();
        let stored = journal
            .insert_trade("user-1", &sample_record("user-1", "EURUSD"))
            .unwrap();
        let id = stored.id.unwrap();

        journal.delete_trade("user-1", id).unwrap();
        assert!(journal.get_trade("user-1", id).unwrap().is_none());
        assert!(matches!(
            journal.delete_trade("user-1", id),
            Err(TradelogError::TradeNotFound { .. })
        ));
    }

    #[test]
    fn delete_is_scoped_by_owner() {
        let journal = open_journal();
        let stored = journal
            .insert_trade("alice", &sample_record("alice", "EURUSD"))
            .unwrap();
        assert!(matches!(
            journal.delete_trade("bob", stored.id.unwrap()),
            Err(TradelogError::TradeNotFound { .. })
        ));
        assert_eq!(journal.list_trades("alice").unwrap().len(), 1);
    }

    #[test]
    fn subscribers_see_every_mutation() {
        let journal = open_journal();
        let feed = journal.subscribe();

        let stored = journal
            .insert_trade("user-1", &sample_record("user-1", "EURUSD"))
            .unwrap();
        let id = stored.id.unwrap();

        let mut closed = stored.clone();
        closed.status = TradeStatus::Closed;
        closed.profit_loss = Some(10.0);
        journal.update_trade("user-1", &closed).unwrap();
        journal.delete_trade("user-1", id).unwrap();

        let events: Vec<JournalChange> = feed.try_iter().collect();
        assert_eq!(
            events
                .iter()
                .map(|e| e.kind)
                .collect::<Vec<_>>(),
            vec![ChangeKind::Inserted, ChangeKind::Updated, ChangeKind::Deleted]
        );
        assert!(events.iter().all(|e| e.owner == "user-1" && e.id == id));
    }

    #[test]
    fn dropped_subscriber_does_not_block_mutations() {
        let journal = open_journal();
        drop(journal.subscribe());
        journal
            .insert_trade("user-1", &sample_record("user-1", "EURUSD"))
            .unwrap();
    }

    #[test]
    fn list_orders_newest_first() {
        let journal = open_journal();
        journal
            .insert_trade("user-1", &sample_record("user-1", "FIRST"))
            .unwrap();
        journal
            .insert_trade("user-1", &sample_record("user-1", "SECOND"))
            .unwrap();

        let trades = journal.list_trades("user-1").unwrap();
        assert_eq!(trades[0].asset, "SECOND");
        assert_eq!(trades[1].asset, "FIRST");
    }
}
