//! Currency display formatting (en-US conventions).

/// Symbols for the currencies the journal commonly quotes in. Anything else
/// falls back to a `CODE ` prefix.
fn symbol_for(code: &str) -> Option<&'static str> {
    match code {
        "USD" | "AUD" | "CAD" | "NZD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "CHF" => Some("Fr"),
        _ => None,
    }
}

/// Format an amount with two decimal places, thousands grouping, and the
/// currency symbol or code. Negative amounts get a leading minus; zero gets
/// no sign.
pub fn format_currency(amount: f64, code: &str) -> String {
    let negative = amount < 0.0;
    let grouped = group_thousands(amount.abs());
    let body = match symbol_for(code) {
        Some(symbol) => format!("{symbol}{grouped}"),
        None => format!("{code} {grouped}"),
    };
    if negative {
        format!("-{body}")
    } else {
        body
    }
}

/// Default-currency wrapper; the journal quotes in USD unless configured
/// otherwise.
pub fn format_usd(amount: f64) -> String {
    format_currency(amount, "USD")
}

fn group_thousands(amount: f64) -> String {
    let fixed = format!("{amount:.2}");
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{grouped}.{fraction}")
}
