//! Commodity name → Yahoo Finance ticker catalog.
//!
//! Each entry carries a futures ticker (`GC=F`) and, where one exists, an ETF
//! that tracks the same commodity. Futures are preferred; the ETF is the
//! fallback when a futures fetch comes back empty.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Futures and ETF tickers for one commodity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickerPair {
    pub futures: Option<&'static str>,
    pub etf: Option<&'static str>,
}

impl TickerPair {
    const fn both(futures: &'static str, etf: &'static str) -> Self {
        Self {
            futures: Some(futures),
            etf: Some(etf),
        }
    }

    const fn futures_only(futures: &'static str) -> Self {
        Self {
            futures: Some(futures),
            etf: None,
        }
    }

    /// Pick a ticker: futures first when preferred, then ETF, then futures.
    pub fn pick(&self, prefer_futures: bool) -> Option<&'static str> {
        if prefer_futures && self.futures.is_some() {
            return self.futures;
        }
        self.etf.or(self.futures)
    }
}

/// Kind of instrument behind a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickerType {
    Futures,
    Etf,
}

impl TickerType {
    /// Yahoo futures tickers carry an `=F` suffix.
    pub fn of(symbol: &str) -> Self {
        if symbol.contains("=F") {
            TickerType::Futures
        } else {
            TickerType::Etf
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TickerType::Futures => "futures",
            TickerType::Etf => "etf",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "futures" => Some(TickerType::Futures),
            "etf" => Some(TickerType::Etf),
            _ => None,
        }
    }
}

impl fmt::Display for TickerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup order for substring matching follows this table's order.
const TICKERS: &[(&str, TickerPair)] = &[
    // Metals
    ("GOLD", TickerPair::both("GC=F", "GLD")),
    ("SILVER", TickerPair::both("SI=F", "SLV")),
    ("COPPER", TickerPair::both("HG=F", "CPER")),
    ("PLATINUM", TickerPair::both("PL=F", "PPLT")),
    ("PALLADIUM", TickerPair::both("PA=F", "PALL")),
    // Crude
    ("CRUDE OIL, LIGHT SWEET", TickerPair::both("CL=F", "USO")),
    ("CRUDE OIL", TickerPair::both("CL=F", "USO")),
    ("WTI", TickerPair::both("CL=F", "USO")),
    ("BRENT CRUDE", TickerPair::both("BZ=F", "BNO")),
    ("BRENT", TickerPair::both("BZ=F", "BNO")),
    // Products and gas
    ("GASOLINE", TickerPair::both("RB=F", "UGA")),
    ("RBOB GASOLINE", TickerPair::both("RB=F", "UGA")),
    ("HEATING OIL", TickerPair::both("HO=F", "UHN")),
    ("NATURAL GAS", TickerPair::both("NG=F", "UNG")),
    ("NAT GAS", TickerPair::both("NG=F", "UNG")),
    // Grains
    ("CORN", TickerPair::both("ZC=F", "CORN")),
    ("WHEAT", TickerPair::both("ZW=F", "WEAT")),
    ("SOYBEANS", TickerPair::both("ZS=F", "SOYB")),
    ("SOYBEAN OIL", TickerPair::futures_only("ZL=F")),
    ("SOYBEAN MEAL", TickerPair::futures_only("ZM=F")),
    ("OATS", TickerPair::futures_only("ZO=F")),
    ("ROUGH RICE", TickerPair::futures_only("ZR=F")),
    ("RICE", TickerPair::futures_only("ZR=F")),
    // Softs
    ("COFFEE", TickerPair::both("KC=F", "JO")),
    ("SUGAR", TickerPair::both("SB=F", "CANE")),
    ("COTTON", TickerPair::both("CT=F", "BAL")),
    ("ORANGE JUICE", TickerPair::futures_only("OJ=F")),
    ("COCOA", TickerPair::both("CC=F", "NIB")),
    // Livestock
    ("LIVE CATTLE", TickerPair::both("LE=F", "COW")),
    ("CATTLE", TickerPair::both("LE=F", "COW")),
    ("FEEDER CATTLE", TickerPair::futures_only("GF=F")),
    ("FEEDER", TickerPair::futures_only("GF=F")),
    ("LEAN HOGS", TickerPair::futures_only("HE=F")),
    ("HOGS", TickerPair::futures_only("HE=F")),
    // Dairy
    ("MILK", TickerPair::futures_only("DC=F")),
    ("CHEESE", TickerPair::futures_only("DA=F")),
    ("BUTTER", TickerPair::futures_only("DB=F")),
    // Other
    ("LUMBER", TickerPair::futures_only("LBS=F")),
    ("RANDOM LENGTH LUMBER", TickerPair::futures_only("LBS=F")),
];

/// Alternate spellings that should resolve to a catalog key.
const VARIANTS: &[(&str, &[&str])] = &[
    (
        "CRUDE OIL, LIGHT SWEET",
        &["CRUDE OIL", "WTI CRUDE", "LIGHT SWEET CRUDE"],
    ),
    ("GASOLINE", &["RBOB GASOLINE", "GASOLINE RBOB"]),
    (
        "NATURAL GAS",
        &["NAT GAS", "HENRY HUB", "NATURAL GAS FINANCIAL"],
    ),
    ("LIVE CATTLE", &["CATTLE", "LIVE CATTLE FINANCIAL"]),
    ("FEEDER CATTLE", &["FEEDER", "FEEDER CATTLE FINANCIAL"]),
    ("LEAN HOGS", &["HOGS", "LEAN HOGS FINANCIAL"]),
    ("MILK", &["MILK, CLASS III", "MILK CLASS III"]),
    ("CORN", &["CORN FINANCIAL"]),
    ("WHEAT", &["WHEAT FINANCIAL"]),
    ("SOYBEANS", &["SOYBEANS FINANCIAL"]),
];

const STRIPPED_SUFFIXES: &[&str] = &[
    " FINANCIAL",
    " - FINANCIAL",
    " - ICE",
    " - CME",
    " - NYMEX",
    " - COMEX",
];

fn exact(name_upper: &str) -> Option<TickerPair> {
    TICKERS
        .iter()
        .find(|(key, _)| *key == name_upper)
        .map(|(_, pair)| *pair)
}

/// Upper-case, trim, and strip exchange/"FINANCIAL" suffixes.
pub fn normalize_commodity_name(name: &str) -> String {
    let mut name = name.trim().to_uppercase();
    for suffix in STRIPPED_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped.to_string();
        }
    }
    name.trim().to_string()
}

/// Best ticker for a commodity name: exact key, then substring key, then variants.
pub fn ticker_for(commodity_name: &str, prefer_futures: bool) -> Option<&'static str> {
    let upper = commodity_name.to_uppercase();

    if let Some(pair) = exact(&upper) {
        return pair.pick(prefer_futures);
    }

    if let Some(symbol) = TICKERS
        .iter()
        .filter(|(key, _)| upper.contains(key))
        .find_map(|(_, pair)| pair.pick(prefer_futures))
    {
        return Some(symbol);
    }

    VARIANTS
        .iter()
        .filter(|(_, variants)| variants.iter().any(|v| upper.contains(v)))
        .find_map(|(base, _)| exact(base).and_then(|pair| pair.pick(prefer_futures)))
}

/// Both tickers for a commodity name: exact key, then substring key.
pub fn tickers_for(commodity_name: &str) -> Option<TickerPair> {
    let upper = commodity_name.to_uppercase();
    exact(&upper).or_else(|| {
        TICKERS
            .iter()
            .find(|(key, _)| upper.contains(key))
            .map(|(_, pair)| *pair)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_prefers_futures() {
        assert_eq!(ticker_for("GOLD", true), Some("GC=F"));
        assert_eq!(ticker_for("GOLD", false), Some("GLD"));
        assert_eq!(ticker_for("OATS", false), Some("ZO=F"));
    }

    #[test]
    fn substring_match_follows_table_order() {
        // "CRUDE OIL, LIGHT SWEET-WTI" contains several keys; the first in the table wins.
        assert_eq!(ticker_for("CRUDE OIL, LIGHT SWEET-WTI", true), Some("CL=F"));
        assert_eq!(ticker_for("MICRO GOLD", true), Some("GC=F"));
        // "SOYBEAN OIL" is an exact key and must not fall through to "SOYBEANS".
        assert_eq!(ticker_for("SOYBEAN OIL", true), Some("ZL=F"));
    }

    #[test]
    fn variants_resolve_to_base_key() {
        assert_eq!(ticker_for("HENRY HUB PENULTIMATE", true), Some("NG=F"));
        assert_eq!(ticker_for("LIGHT SWEET CRUDE", false), Some("USO"));
    }

    #[test]
    fn unknown_commodity() {
        assert_eq!(ticker_for("BITCOIN", true), None);
        assert_eq!(tickers_for("BITCOIN"), None);
    }

    #[test]
    fn both_tickers() {
        let pair = tickers_for("silver").unwrap();
        assert_eq!(pair.futures, Some("SI=F"));
        assert_eq!(pair.etf, Some("SLV"));
        assert_eq!(tickers_for("LEAN HOGS").unwrap().etf, None);
    }

    #[test]
    fn normalization_strips_suffixes() {
        assert_eq!(normalize_commodity_name("  corn financial "), "CORN");
        assert_eq!(normalize_commodity_name("GOLD - COMEX"), "GOLD");
        assert_eq!(normalize_commodity_name("WHEAT-SRW"), "WHEAT-SRW");
    }

    #[test]
    fn ticker_type_from_symbol() {
        assert_eq!(TickerType::of("GC=F"), TickerType::Futures);
        assert_eq!(TickerType::of("GLD"), TickerType::Etf);
        assert_eq!(TickerType::parse("etf"), Some(TickerType::Etf));
        assert_eq!(TickerType::Futures.to_string(), "futures");
    }
}
