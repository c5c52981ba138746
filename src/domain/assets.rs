//! Static catalog of commonly journaled instruments.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    Stock,
    Forex,
    Commodity,
    Crypto,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Stock => "STOCK",
            AssetClass::Forex => "FOREX",
            AssetClass::Commodity => "COMMODITY",
            AssetClass::Crypto => "CRYPTO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "STOCK" => Some(AssetClass::Stock),
            "FOREX" => Some(AssetClass::Forex),
            "COMMODITY" => Some(AssetClass::Commodity),
            "CRYPTO" => Some(AssetClass::Crypto),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    pub symbol: &'static str,
    pub name: &'static str,
    pub class: AssetClass,
    pub exchange: Option<&'static str>,
    pub currency: &'static str,
}

const fn forex(symbol: &'static str, name: &'static str, currency: &'static str) -> AssetInfo {
    AssetInfo {
        symbol,
        name,
        class: AssetClass::Forex,
        exchange: None,
        currency,
    }
}

const fn commodity(
    symbol: &'static str,
    name: &'static str,
    exchange: &'static str,
) -> AssetInfo {
    AssetInfo {
        symbol,
        name,
        class: AssetClass::Commodity,
        exchange: Some(exchange),
        currency: "USD",
    }
}

pub const CATALOG: &[AssetInfo] = &[
    forex("EUR/USD", "Euro/US Dollar", "USD"),
    forex("GBP/USD", "British Pound/US Dollar", "USD"),
    forex("USD/JPY", "US Dollar/Japanese Yen", "JPY"),
    forex("USD/CHF", "US Dollar/Swiss Franc", "CHF"),
    forex("AUD/USD", "Australian Dollar/US Dollar", "USD"),
    forex("USD/CAD", "US Dollar/Canadian Dollar", "CAD"),
    forex("NZD/USD", "New Zealand Dollar/US Dollar", "USD"),
    forex("EUR/GBP", "Euro/British Pound", "GBP"),
    forex("EUR/JPY", "Euro/Japanese Yen", "JPY"),
    forex("GBP/JPY", "British Pound/Japanese Yen", "JPY"),
    commodity("XAUUSD", "Gold/US Dollar", "OANDA"),
    commodity("GC", "Gold Futures", "COMEX"),
    commodity("SI", "Silver Futures", "COMEX"),
    commodity("CL", "Crude Oil WTI", "NYMEX"),
    commodity("BZ", "Brent Crude Oil", "ICE"),
    commodity("NG", "Natural Gas", "NYMEX"),
    commodity("HG", "Copper", "COMEX"),
    commodity("PL", "Platinum", "COMEX"),
    commodity("ZC", "Corn Futures", "CBOT"),
    commodity("ZW", "Wheat Futures", "CBOT"),
];

/// Case-insensitive symbol lookup.
pub fn lookup(symbol: &str) -> Option<&'static AssetInfo> {
    let wanted = symbol.trim().to_uppercase();
    CATALOG.iter().find(|a| a.symbol == wanted)
}

pub fn by_class(class: AssetClass) -> impl Iterator<Item = &'static AssetInfo> {
    CATALOG.iter().filter(move |a| a.class == class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let info = lookup("xauusd").unwrap();
        assert_eq!(info.name, "Gold/US Dollar");
        assert_eq!(info.exchange, Some("OANDA"));
    }

    #[test]
    fn lookup_unknown_symbol() {
        assert!(lookup("NOPE").is_none());
    }

    #[test]
    fn by_class_partitions_catalog() {
        let forex_count = by_class(AssetClass::Forex).count();
        let commodity_count = by_class(AssetClass::Commodity).count();
        assert_eq!(forex_count + commodity_count, CATALOG.len());
        assert!(forex_count >= 10);
    }

    #[test]
    fn class_parse_round_trip() {
        assert_eq!(AssetClass::parse("forex"), Some(AssetClass::Forex));
        assert_eq!(AssetClass::parse(" CRYPTO "), Some(AssetClass::Crypto));
        assert_eq!(AssetClass::parse("bond"), None);
        assert_eq!(AssetClass::Commodity.as_str(), "COMMODITY");
    }
}
