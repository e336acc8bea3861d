//! Sidebar filters over the commodity list.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cot::CommodityStats;

/// Whether a commodity must (or must not) have a price mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceAvailability {
    #[default]
    All,
    With,
    Without,
}

impl FromStr for PriceAvailability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "with" => Ok(Self::With),
            "without" => Ok(Self::Without),
            other => Err(format!(
                "unknown price filter '{other}' (expected all, with, or without)"
            )),
        }
    }
}

impl fmt::Display for PriceAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::With => "with",
            Self::Without => "without",
        })
    }
}

/// A commodity as offered in the dropdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommodityListing {
    #[serde(flatten)]
    pub stats: CommodityStats,
    pub has_price_data: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommodityFilter {
    /// Type labels to keep; empty keeps every type.
    pub types: Vec<String>,
    pub price: PriceAvailability,
    /// Bounds on each commodity's maximum open interest.
    pub oi_min: Option<f64>,
    pub oi_max: Option<f64>,
}

impl CommodityFilter {
    fn keeps(&self, stats: &CommodityStats, has_price_data: bool) -> bool {
        if !self.types.is_empty() && !self.types.iter().any(|t| *t == stats.commodity_type) {
            return false;
        }
        match self.price {
            PriceAvailability::With if !has_price_data => return false,
            PriceAvailability::Without if has_price_data => return false,
            _ => {}
        }
        if self.oi_min.is_some() || self.oi_max.is_some() {
            let Some(max_oi) = stats.max_oi else {
                return false;
            };
            if self.oi_min.is_some_and(|lo| max_oi < lo) || self.oi_max.is_some_and(|hi| max_oi > hi) {
                return false;
            }
        }
        true
    }

    /// Filter the stats list, keeping the first row seen for each commodity name.
    pub fn apply(
        &self,
        stats: Vec<CommodityStats>,
        mapped: &HashSet<String>,
    ) -> Vec<CommodityListing> {
        let mut seen = HashSet::new();
        stats
            .into_iter()
            .filter_map(|s| {
                let has_price_data = mapped.contains(&s.commodity_name);
                self.keeps(&s, has_price_data)
                    .then_some(CommodityListing {
                        stats: s,
                        has_price_data,
                    })
            })
            .filter(|l| seen.insert(l.stats.commodity_name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(name: &str, ty: &str, max_oi: Option<f64>) -> CommodityStats {
        CommodityStats {
            commodity_name: name.into(),
            exchange_name: "EX".into(),
            commodity_code: None,
            commodity_type: ty.into(),
            min_oi: max_oi,
            max_oi,
            avg_oi: max_oi,
        }
    }

    fn sample() -> Vec<CommodityStats> {
        vec![
            stats("CORN", "Agricultural", Some(1_400_000.0)),
            stats("GOLD", "Metals", Some(510_000.0)),
            stats("GOLD", "Metals", Some(20_000.0)),
            stats("PJM WESTERN HUB", "Power & Emissions", None),
        ]
    }

    fn names(listings: &[CommodityListing]) -> Vec<&str> {
        listings.iter().map(|l| l.stats.commodity_name.as_str()).collect()
    }

    #[test]
    fn default_filter_keeps_everything_once() {
        let out = CommodityFilter::default().apply(sample(), &HashSet::new());
        assert_eq!(names(&out), vec!["CORN", "GOLD", "PJM WESTERN HUB"]);
        assert!(out.iter().all(|l| !l.has_price_data));
    }

    #[test]
    fn type_filter() {
        let f = CommodityFilter {
            types: vec!["Metals".into()],
            ..Default::default()
        };
        assert_eq!(names(&f.apply(sample(), &HashSet::new())), vec!["GOLD"]);
    }

    #[test]
    fn price_filter_uses_mapping_set() {
        let mapped: HashSet<String> = ["GOLD".to_string()].into();
        let with = CommodityFilter {
            price: PriceAvailability::With,
            ..Default::default()
        };
        let out = with.apply(sample(), &mapped);
        assert_eq!(names(&out), vec!["GOLD"]);
        assert!(out[0].has_price_data);

        let without = CommodityFilter {
            price: PriceAvailability::Without,
            ..Default::default()
        };
        assert_eq!(names(&without.apply(sample(), &mapped)), vec!["CORN", "PJM WESTERN HUB"]);
    }

    #[test]
    fn oi_range_applies_to_max_and_drops_unknown() {
        let f = CommodityFilter {
            oi_min: Some(100_000.0),
            oi_max: Some(1_000_000.0),
            ..Default::default()
        };
        assert_eq!(names(&f.apply(sample(), &HashSet::new())), vec!["GOLD"]);
    }

    #[test]
    fn price_availability_parses() {
        assert_eq!("".parse::<PriceAvailability>(), Ok(PriceAvailability::All));
        assert_eq!("With".parse::<PriceAvailability>(), Ok(PriceAvailability::With));
        assert!("some".parse::<PriceAvailability>().is_err());
    }

    // ── Properties (proptest) ────────────────────────────────────────

    use proptest::prelude::*;

    fn arb_stats() -> impl Strategy<Value = Vec<CommodityStats>> {
        prop::collection::vec(
            (
                prop::sample::select(vec!["CORN", "GOLD", "SILVER", "COCOA"]),
                prop::sample::select(vec!["Metals", "Agricultural - Softs"]),
                prop::option::of(0.0..2_000_000.0_f64),
            )
                .prop_map(|(n, t, oi)| stats(n, t, oi)),
            0..12,
        )
    }

    proptest! {
        #[test]
        fn listings_are_unique_and_drawn_from_input(input in arb_stats(), lo in 0.0..1_000_000.0_f64) {
            let f = CommodityFilter { oi_min: Some(lo), ..Default::default() };
            let out = f.apply(input.clone(), &HashSet::new());
            let unique: HashSet<&str> = names(&out).into_iter().collect();
            prop_assert_eq!(unique.len(), out.len());
            for l in &out {
                prop_assert!(input.contains(&l.stats));
                prop_assert!(l.stats.max_oi.is_some_and(|m| m >= lo));
            }
        }

        #[test]
        fn with_and_without_partition_all(input in arb_stats()) {
            let mapped: HashSet<String> = ["GOLD".to_string(), "COCOA".to_string()].into();
            let all = CommodityFilter::default().apply(input.clone(), &mapped);
            let with = CommodityFilter { price: PriceAvailability::With, ..Default::default() }
                .apply(input.clone(), &mapped);
            let without = CommodityFilter { price: PriceAvailability::Without, ..Default::default() }
                .apply(input, &mapped);
            prop_assert_eq!(with.len() + without.len(), all.len());
            prop_assert!(with.iter().all(|l| l.has_price_data));
            prop_assert!(without.iter().all(|l| !l.has_price_data));
        }
    }
}
