//! Journal store port trait.
//!
//! Every operation is scoped by the owning user: reads never return another
//! owner's rows and writes never touch them. The store assigns ids and
//! timestamps; callers hand it records and get the stored row back.

use crate::domain::error::TradelogError;
use crate::domain::trade::TradeRecord;
use std::sync::mpsc::Receiver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Inserted,
    Updated,
    Deleted,
}

/// A committed mutation, pushed to every subscriber. Consumers refetch the
/// snapshot on receipt; the event deliberately carries no row data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalChange {
    pub owner: String,
    pub kind: ChangeKind,
    pub id: i64,
}

pub trait JournalPort {
    /// All trades for `owner`, newest first.
    fn list_trades(&self, owner: &str) -> Result<Vec<TradeRecord>, TradelogError>;

    fn get_trade(&self, owner: &str, id: i64) -> Result<Option<TradeRecord>, TradelogError>;

    /// Persist a new record, assigning id and timestamps. Returns the row as
    /// stored.
    fn insert_trade(
        &self,
        owner: &str,
        record: &TradeRecord,
    ) -> Result<TradeRecord, TradelogError>;

    /// Full-record replace by id. Fails with `TradeNotFound` for a missing
    /// or foreign-owned id and `InvalidTransition` when the stored row is in
    /// a terminal state and the update changes its status.
    fn update_trade(
        &self,
        owner: &str,
        record: &TradeRecord,
    ) -> Result<TradeRecord, TradelogError>;

    /// Permanent deletion, scoped to `owner`.
    fn delete_trade(&self, owner: &str, id: i64) -> Result<(), TradelogError>;

    /// Subscribe to the change feed. The default implementation returns a
    /// channel that never fires, for stores without push support.
    fn subscribe(&self) -> Receiver<JournalChange> {
        let (sender, receiver) = std::sync::mpsc::channel();
        drop(sender);
        receiver
    }
}
