//! CSV export of journal entries.

use crate::domain::error::TradelogError;
use crate::domain::trade::TradeRecord;
use std::path::Path;

const HEADER: &[&str] = &[
    "id",
    "asset",
    "direction",
    "status",
    "entry_price",
    "quantity",
    "stop_loss",
    "take_profit",
    "fees",
    "profit_loss",
    "notes",
    "created_at",
    "updated_at",
];

pub struct CsvExportAdapter;

impl CsvExportAdapter {
    /// Write one row per trade, in the order given, to `path`.
    pub fn write<P: AsRef<Path>>(path: P, trades: &[TradeRecord]) -> Result<(), TradelogError> {
        let mut writer = csv::Writer::from_path(path.as_ref()).map_err(|e| {
            TradelogError::Database {
                reason: format!("failed to open {}: {}", path.as_ref().display(), e),
            }
        })?;

        writer
            .write_record(HEADER)
            .map_err(|e| TradelogError::Database {
                reason: format!("CSV write error: {}", e),
            })?;

        for trade in trades {
            writer
                .write_record(&record_fields(trade))
                .map_err(|e| TradelogError::Database {
                    reason: format!("CSV write error: {}", e),
                })?;
        }

        writer.flush().map_err(|e| TradelogError::Database {
            reason: format!("CSV flush error: {}", e),
        })
    }
}

fn record_fields(trade: &TradeRecord) -> Vec<String> {
    vec![
        trade.id.map(|id| id.to_string()).unwrap_or_default(),
        trade.asset.clone(),
        trade.direction.as_str().to_string(),
        trade.status.as_str().to_string(),
        trade.entry_price.to_string(),
        trade.quantity.to_string(),
        opt_num(trade.stop_loss),
        opt_num(trade.take_profit),
        trade.fees.to_string(),
        opt_num(trade.profit_loss),
        trade.notes.clone().unwrap_or_default(),
        trade.created_at.to_rfc3339(),
        trade.updated_at.to_rfc3339(),
    ]
}

fn opt_num(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::{Direction, TradeDraft, TradeStatus};
    use chrono::Utc;
    use std::fs;

    fn sample_trade(asset: &str, id: i64) -> TradeRecord {
        let mut record = TradeDraft {
            asset: Some(asset.to_string()),
            direction: Some(Direction::Sell),
            entry_price: Some(1.25),
            quantity: Some(10_000.0),
            stop_loss: Some(1.26),
            take_profit: None,
            fees: Some(0.5),
            notes: Some("news fade".to_string()),
        }
        .into_record("user-1", Utc::now())
        .unwrap();
        record.id = Some(id);
        record
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.csv");

        let trades = vec![sample_trade("GBP/USD", 1), sample_trade("EUR/USD", 2)];
        CsvExportAdapter::write(&path, &trades).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,asset,direction,status"));
        assert!(lines[1].starts_with("1,GBP/USD,SELL,open,1.25,10000"));
        assert!(lines[2].contains("EUR/USD"));
    }

    #[test]
    fn optional_fields_export_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.csv");

        let mut trade = sample_trade("EUR/USD", 3);
        trade.stop_loss = None;
        trade.notes = None;
        trade.status = TradeStatus::Closed;
        trade.profit_loss = Some(-12.5);
        CsvExportAdapter::write(&path, &[trade]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let row = content.lines().nth(1).unwrap();
        assert!(row.contains("closed"));
        assert!(row.contains("-12.5"));
        // absent stop loss leaves the column empty
        assert!(row.contains(",,"));
    }

    #[test]
    fn empty_journal_exports_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        CsvExportAdapter::write(&path, &[]).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn unwritable_path_errors() {
        let result = CsvExportAdapter::write("/nonexistent-dir/trades.csv", &[]);
        assert!(matches!(result, Err(TradelogError::Database { .. })));
    }
}
