//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_export_adapter::CsvExportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::assets::{self, AssetClass};
use crate::domain::assistant;
use crate::domain::currency::format_currency;
use crate::domain::error::TradelogError;
use crate::domain::risk::{RiskCalculation, RiskInput};
use crate::domain::stats::PortfolioStats;
use crate::domain::trade::{realized_pnl, Direction, TradeDraft, TradeStatus};
use crate::domain::validation::validate;
use crate::ports::config_port::ConfigPort;
use crate::ports::journal_port::JournalPort;

/// Exit code for a draft that failed validation.
const VALIDATION_EXIT: u8 = 5;

#[derive(Parser, Debug)]
#[command(name = "tradelog", about = "Trading journal and portfolio statistics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log a new trade (opens in `open` status)
    Add {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        asset: Option<String>,
        /// BUY or SELL
        #[arg(long)]
        direction: Option<String>,
        #[arg(long)]
        entry_price: Option<f64>,
        #[arg(long)]
        quantity: Option<f64>,
        #[arg(long)]
        stop_loss: Option<f64>,
        #[arg(long)]
        take_profit: Option<f64>,
        #[arg(long)]
        fees: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List journaled trades, newest first
    List {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Close an open trade at an exit price
    Close {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        id: i64,
        #[arg(long)]
        exit_price: f64,
    },
    /// Cancel an open trade
    Cancel {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        id: i64,
    },
    /// Permanently delete a trade
    Delete {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        id: i64,
    },
    /// Show portfolio statistics
    Stats {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Position-sizing calculator
    Risk {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        balance: f64,
        #[arg(long)]
        risk_pct: f64,
        #[arg(long)]
        entry_price: f64,
        #[arg(long)]
        stop_loss: f64,
        #[arg(long)]
        take_profit: Option<f64>,
    },
    /// Export the journal to CSV
    Export {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// List known instrument symbols
    Symbols {
        /// Filter by class: STOCK, FOREX, COMMODITY, CRYPTO
        #[arg(long)]
        class: Option<String>,
    },
    /// Ask the journal assistant a question
    Ask {
        #[arg(short, long)]
        config: PathBuf,
        message: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Add {
            config,
            asset,
            direction,
            entry_price,
            quantity,
            stop_loss,
            take_profit,
            fees,
            notes,
        } => {
            let draft = TradeDraft {
                asset,
                direction: direction.as_deref().and_then(Direction::parse),
                entry_price,
                quantity,
                stop_loss,
                take_profit,
                fees,
                notes,
            };
            run_add(&config, draft)
        }
        Command::List { config } => run_list(&config),
        Command::Close {
            config,
            id,
            exit_price,
        } => run_close(&config, id, exit_price),
        Command::Cancel { config, id } => run_cancel(&config, id),
        Command::Delete { config, id } => run_delete(&config, id),
        Command::Stats { config } => run_stats(&config),
        Command::Risk {
            config,
            balance,
            risk_pct,
            entry_price,
            stop_loss,
            take_profit,
        } => run_risk(&config, balance, risk_pct, entry_price, stop_loss, take_profit),
        Command::Export { config, output } => run_export(&config, &output),
        Command::Symbols { class } => run_symbols(class.as_deref()),
        Command::Ask { config, message } => run_ask(&config, &message),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TradelogError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn journal_owner(config: &dyn ConfigPort) -> String {
    config
        .get_string("journal", "owner")
        .unwrap_or_else(|| "default".to_string())
}

fn journal_currency(config: &dyn ConfigPort) -> String {
    config
        .get_string("journal", "currency")
        .unwrap_or_else(|| "USD".to_string())
}

fn open_journal(config: &dyn ConfigPort) -> Result<Box<dyn JournalPort>, TradelogError> {
    #[cfg(feature = "postgres")]
    if config.get_string("postgres", "conninfo").is_some() {
        use crate::adapters::postgres_adapter::PostgresJournal;
        let journal = PostgresJournal::from_config(config)?;
        journal.initialize_schema()?;
        return Ok(Box::new(journal));
    }

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_adapter::SqliteJournal;
        let journal = SqliteJournal::from_config(config)?;
        journal.initialize_schema()?;
        Ok(Box::new(journal))
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = config;
        Err(TradelogError::ConfigMissing {
            section: "postgres".into(),
            key: "conninfo".into(),
        })
    }
}

fn run_add(config_path: &PathBuf, draft: TradeDraft) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let issues = validate(&draft);
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("error: {issue}");
        }
        return ExitCode::from(VALIDATION_EXIT);
    }

    let owner = journal_owner(&config);
    let record = match draft.into_record(&owner, chrono::Utc::now()) {
        Some(r) => r,
        None => {
            // validate() guarantees the required fields are present
            eprintln!("error: incomplete draft after validation");
            return ExitCode::from(VALIDATION_EXIT);
        }
    };

    let journal = match open_journal(&config) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match journal.insert_trade(&owner, &record) {
        Ok(stored) => {
            println!(
                "Logged trade {} {} {} @ {} (id {})",
                stored.direction.as_str(),
                stored.quantity,
                stored.asset,
                stored.entry_price,
                stored.id.unwrap_or_default(),
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_list(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let owner = journal_owner(&config);
    let currency = journal_currency(&config);

    let journal = match open_journal(&config) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let trades = match journal.list_trades(&owner) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if trades.is_empty() {
        println!("No trades journaled yet.");
        return ExitCode::SUCCESS;
    }

    println!(
        "{:>5}  {:<12} {:<4} {:<9} {:>12} {:>12} {:>12}",
        "id", "asset", "side", "status", "entry", "quantity", "p&l"
    );
    for trade in &trades {
        let pnl = trade
            .profit_loss
            .map(|v| format_currency(v, &currency))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>5}  {:<12} {:<4} {:<9} {:>12} {:>12} {:>12}",
            trade.id.unwrap_or_default(),
            trade.asset,
            trade.direction.as_str(),
            trade.status.as_str(),
            trade.entry_price,
            trade.quantity,
            pnl,
        );
    }
    ExitCode::SUCCESS
}

fn run_close(config_path: &PathBuf, id: i64, exit_price: f64) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let owner = journal_owner(&config);
    let currency = journal_currency(&config);

    let journal = match open_journal(&config) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let result = close_trade(journal.as_ref(), &owner, id, exit_price);
    match result {
        Ok(pnl) => {
            println!("Closed trade {id} for {}", format_currency(pnl, &currency));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Load, reduce the exit to a realized P&L, and persist the closed record.
/// Returns the realized P&L.
pub fn close_trade(
    journal: &dyn JournalPort,
    owner: &str,
    id: i64,
    exit_price: f64,
) -> Result<f64, TradelogError> {
    let mut record = journal
        .get_trade(owner, id)?
        .ok_or(TradelogError::TradeNotFound { id })?;

    if record.status != TradeStatus::Open {
        return Err(TradelogError::InvalidTransition {
            id,
            status: record.status.as_str().to_string(),
        });
    }

    let pnl = realized_pnl(
        record.direction,
        record.entry_price,
        exit_price,
        record.quantity,
        record.fees,
    );
    record.status = TradeStatus::Closed;
    record.profit_loss = Some(pnl);
    journal.update_trade(owner, &record)?;
    Ok(pnl)
}

fn run_cancel(config_path: &PathBuf, id: i64) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let owner = journal_owner(&config);

    let journal = match open_journal(&config) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let result = (|| -> Result<(), TradelogError> {
        let mut record = journal
            .get_trade(&owner, id)?
            .ok_or(TradelogError::TradeNotFound { id })?;
        if record.status != TradeStatus::Open {
            return Err(TradelogError::InvalidTransition {
                id,
                status: record.status.as_str().to_string(),
            });
        }
        record.status = TradeStatus::Cancelled;
        journal.update_trade(&owner, &record)?;
        Ok(())
    })();

    match result {
        Ok(()) => {
            println!("Cancelled trade {id}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_delete(config_path: &PathBuf, id: i64) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let owner = journal_owner(&config);

    let journal = match open_journal(&config) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match journal.delete_trade(&owner, id) {
        Ok(()) => {
            println!("Deleted trade {id}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_stats(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let owner = journal_owner(&config);
    let currency = journal_currency(&config);

    let journal = match open_journal(&config) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let trades = match journal.list_trades(&owner) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let stats = PortfolioStats::compute(&trades);
    print_stats(&stats, &currency);
    ExitCode::SUCCESS
}

fn print_stats(stats: &PortfolioStats, currency: &str) {
    let fmt = |v: f64| format_currency(v, currency);
    let profit_factor = if stats.profit_factor.is_infinite() {
        "∞".to_string()
    } else {
        format!("{:.2}", stats.profit_factor)
    };

    println!("Closed trades:   {}", stats.total_trades);
    println!(
        "  won / lost:    {} / {}",
        stats.winning_trades, stats.losing_trades
    );
    println!(
        "  open / cancelled: {} / {}",
        stats.open_trades, stats.cancelled_trades
    );
    println!("Win rate:        {:.1}%", stats.win_rate);
    println!("Net P&L:         {}", fmt(stats.net_profit));
    println!("Gross profit:    {}", fmt(stats.gross_profit));
    println!("Gross loss:      {}", fmt(stats.gross_loss));
    println!("Average win:     {}", fmt(stats.average_win));
    println!("Average loss:    {}", fmt(stats.average_loss));
    println!("Profit factor:   {profit_factor}");
    println!("Total fees:      {}", fmt(stats.total_fees));
}

fn run_risk(
    config_path: &PathBuf,
    balance: f64,
    risk_pct: f64,
    entry_price: f64,
    stop_loss: f64,
    take_profit: Option<f64>,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let currency = journal_currency(&config);
    let pip_value = config.get_double("calculator", "pip_value", 10.0);

    let input = RiskInput {
        account_balance: balance,
        risk_percentage: risk_pct,
        entry_price,
        stop_loss,
        take_profit,
        pip_value,
    };
    let calc = RiskCalculation::compute(&input);

    println!(
        "Risk amount:     {}",
        format_currency(calc.risk_amount, &currency)
    );
    println!("Position size:   {:.2}", calc.position_size);
    if let (Some(reward), Some(ratio)) = (calc.reward_amount, calc.risk_reward_ratio) {
        println!(
            "Reward amount:   {}",
            format_currency(reward, &currency)
        );
        println!("Risk:Reward:     1:{ratio:.2}");
    }
    ExitCode::SUCCESS
}

fn run_export(config_path: &PathBuf, output: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let owner = journal_owner(&config);

    let journal = match open_journal(&config) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let result = journal
        .list_trades(&owner)
        .and_then(|trades| CsvExportAdapter::write(output, &trades).map(|()| trades.len()));

    match result {
        Ok(count) => {
            println!("Exported {count} trades to {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_symbols(class: Option<&str>) -> ExitCode {
    let filter = match class {
        Some(raw) => match AssetClass::parse(raw) {
            Some(c) => Some(c),
            None => {
                eprintln!("error: unknown asset class {raw:?}");
                return ExitCode::from(2);
            }
        },
        None => None,
    };

    for info in assets::CATALOG {
        if filter.is_some_and(|c| c != info.class) {
            continue;
        }
        let exchange = info.exchange.unwrap_or("-");
        println!(
            "{:<10} {:<9} {:<8} {:<6} {}",
            info.symbol,
            info.class.as_str(),
            exchange,
            info.currency,
            info.name
        );
    }
    ExitCode::SUCCESS
}

fn run_ask(config_path: &PathBuf, message: &str) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let owner = journal_owner(&config);

    let journal = match open_journal(&config) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let trades = match journal.list_trades(&owner) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let stats = PortfolioStats::compute(&trades);
    let reply = assistant::respond(message, &stats);
    println!("{}", reply.text);
    ExitCode::SUCCESS
}
