//! Scripted journal assistant.
//!
//! An ordered rule table: each rule pairs a keyword set with a canned
//! response template filled from the current portfolio statistics. The first
//! matching rule wins and the last rule matches everything. Pure string
//! selection, no external calls.

use super::currency::format_usd;
use super::stats::PortfolioStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCategory {
    Analysis,
    Risk,
    Psychology,
    Education,
    Motivation,
}

pub struct Rule {
    pub keywords: &'static [&'static str],
    pub category: ResponseCategory,
    render: fn(&PortfolioStats) -> String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub category: ResponseCategory,
    pub text: String,
}

pub const RULES: &[Rule] = &[
    Rule {
        keywords: &["analysis", "analyse", "analyze", "performance", "stats", "statistics"],
        category: ResponseCategory::Analysis,
        render: render_analysis,
    },
    Rule {
        keywords: &["risk", "lot", "size", "sizing"],
        category: ResponseCategory::Risk,
        render: render_risk,
    },
    Rule {
        keywords: &["psychology", "emotion", "feeling", "tilt", "stress"],
        category: ResponseCategory::Psychology,
        render: render_psychology,
    },
    Rule {
        keywords: &["tip", "tips", "learn", "education", "improve"],
        category: ResponseCategory::Education,
        render: render_education,
    },
    // Fallback: empty keyword set matches any message.
    Rule {
        keywords: &[],
        category: ResponseCategory::Motivation,
        render: render_fallback,
    },
];

/// Pick the first rule whose keyword set matches the message and render its
/// template against the stats snapshot.
pub fn respond(message: &str, stats: &PortfolioStats) -> Reply {
    let lowered = message.to_lowercase();
    for rule in RULES {
        let matches = rule.keywords.is_empty()
            || rule.keywords.iter().any(|kw| lowered.contains(kw));
        if matches {
            return Reply {
                category: rule.category,
                text: (rule.render)(stats),
            };
        }
    }
    unreachable!("fallback rule matches every message");
}

fn render_analysis(stats: &PortfolioStats) -> String {
    let verdict = if stats.total_trades == 0 {
        "No closed trades yet; close a few positions and ask again."
    } else if stats.win_rate < 50.0 {
        "Win rate is below 50%. Focus on setup quality and cut losses with discipline."
    } else {
        "Win rate looks healthy. Keep executing the strategy that got you here."
    };
    format!(
        "Journal analysis:\n\
         - Closed trades: {closed} ({wins} wins / {losses} losses, {open} still open)\n\
         - Win rate: {win_rate:.1}%\n\
         - Net P&L: {net}\n\
         - Profit factor: {pf}\n\
         {verdict}",
        closed = stats.total_trades,
        wins = stats.winning_trades,
        losses = stats.losing_trades,
        open = stats.open_trades,
        win_rate = stats.win_rate,
        net = format_usd(stats.net_profit),
        pf = format_profit_factor(stats.profit_factor),
    )
}

fn render_risk(stats: &PortfolioStats) -> String {
    let ratio_line = if stats.average_loss > 0.0 {
        let ratio = stats.average_win / stats.average_loss;
        if ratio < 1.5 {
            format!(
                "Your reward:risk is {ratio:.2}:1 — widen targets or tighten stops until it clears 1.5:1."
            )
        } else {
            format!("Your reward:risk is {ratio:.2}:1 — keep it there.")
        }
    } else {
        "Not enough losing trades recorded to judge reward:risk yet.".to_string()
    };
    format!(
        "Risk management check:\n\
         - Average win: {avg_win}\n\
         - Average loss: {avg_loss}\n\
         - {ratio_line}\n\
         Cap risk at 2% of balance per trade and keep position sizing consistent.",
        avg_win = format_usd(stats.average_win),
        avg_loss = format_usd(stats.average_loss),
    )
}

fn render_psychology(stats: &PortfolioStats) -> String {
    let opener = if stats.net_profit < 0.0 {
        "You are in a drawdown. That is part of trading, not a verdict on you."
    } else {
        "Performance is positive — guard the mindset that produced it."
    };
    format!(
        "{opener}\n\
         - Wait for setups that meet your rules; skip the rest.\n\
         - A stopped-out trade that followed the plan was a good trade.\n\
         - After consecutive losses, step away before sizing the next entry."
    )
}

fn render_education(stats: &PortfolioStats) -> String {
    let focus = if stats.total_trades == 0 {
        "Start by logging every trade, including the ones you would rather forget."
    } else if stats.win_rate > 60.0 {
        "Your win rate is high — the risk now is overconfidence, not strategy."
    } else {
        "Review your losing trades weekly and look for one repeated mistake."
    };
    format!(
        "Study suggestion:\n\
         - {focus}\n\
         - Journal the reason for entry before the trade, not after.\n\
         - Measure yourself on process adherence, not single-trade outcomes."
    )
}

fn render_fallback(stats: &PortfolioStats) -> String {
    format!(
        "I can analyse your journal, review risk management, or talk trading \
         psychology. You have {total} closed trades logged — ask me about \
         'performance', 'risk', or 'psychology'.",
        total = stats.total_trades
    )
}

fn format_profit_factor(pf: f64) -> String {
    if pf.is_infinite() {
        "∞".to_string()
    } else {
        format!("{pf:.2}")
    }
}
