//! Commodity type classification by keyword.
//!
//! Names are matched upper-cased against ordered keyword groups; the first
//! group with a hit wins. The order matters: "HEATING OIL" must resolve to
//! energy before the generic natural-gas keywords get a chance.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad commodity sector shown in the dashboard's type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CommodityType {
    #[serde(rename = "Metals")]
    Metals,
    #[serde(rename = "Energy - Oil & Products")]
    EnergyOil,
    #[serde(rename = "Natural Gas")]
    NaturalGas,
    #[serde(rename = "Power & Emissions")]
    PowerEmissions,
    #[serde(rename = "Agricultural - Grains")]
    Grains,
    #[serde(rename = "Agricultural - Softs")]
    Softs,
    #[serde(rename = "Livestock")]
    Livestock,
    #[serde(rename = "Dairy")]
    Dairy,
    #[serde(rename = "Other Industrial")]
    OtherIndustrial,
    #[serde(rename = "Other")]
    Other,
}

const KEYWORDS: &[(CommodityType, &[&str])] = &[
    (
        CommodityType::Metals,
        &[
            "GOLD", "SILVER", "COPPER", "ALUMINUM", "ALUMINIUM", "PLATINUM", "PALLADIUM",
            "COBALT", "LITHIUM", "STEEL", "SCRAP", "HRC", "HOT-ROLL",
        ],
    ),
    (
        CommodityType::EnergyOil,
        &[
            "CRUDE", "WTI", "BRENT", "GASOLINE", "HEATING OIL", "ULSD", "USLD", "PROPANE",
            "ETHANE", "BUTANE", "NAPHTHA", "FUEL OIL", "JET", "MARINE FUEL", "RBOB", "CBOB",
            "CRACK", "BALMO",
        ],
    ),
    (
        CommodityType::NaturalGas,
        &[
            "NATURAL GAS", "NAT GAS", "HENRY HUB", "BASIS", "INDEX", "CITYGATE", "FINANCIAL",
            "PENULTIMATE", "LD1", "ICE", "NYME",
        ],
    ),
    (
        CommodityType::PowerEmissions,
        &[
            "ERCOT", "PJM", "NYISO", "CAISO", "MISO", "ISONE", "CARBON", "RGGI", "REC", "AEC",
            "COMPLIANCE", "EMISSIONS", "OFFSET", "VINTAGE", "DA PEAK", "DA OFF", "RT PK",
            "RT OFF", "DAY-AHEAD", "REAL-TIME", "HUB", "ZONE", "MONTH_OFF", "MONTH_ON",
            "OFF_DAP", "ON_DAP",
        ],
    ),
    (
        CommodityType::Grains,
        &["CORN", "WHEAT", "SOYBEAN", "CANOLA", "OATS", "RICE", "ROUGH RICE"],
    ),
    (
        CommodityType::Softs,
        &["COFFEE", "COCOA", "SUGAR", "COTTON", "ORANGE JUICE", "FRZN CONCENTRATED"],
    ),
    (CommodityType::Livestock, &["CATTLE", "FEEDER", "HOGS", "LEAN HOGS"]),
    (CommodityType::Dairy, &["MILK", "CHEESE", "BUTTER", "WHEY", "DRY MILK"]),
    (
        CommodityType::OtherIndustrial,
        &["LUMBER", "RANDOM LENGTH", "UREA", "PALM OIL"],
    ),
];

impl CommodityType {
    pub const ALL: [CommodityType; 10] = [
        CommodityType::Metals,
        CommodityType::EnergyOil,
        CommodityType::NaturalGas,
        CommodityType::PowerEmissions,
        CommodityType::Grains,
        CommodityType::Softs,
        CommodityType::Livestock,
        CommodityType::Dairy,
        CommodityType::OtherIndustrial,
        CommodityType::Other,
    ];

    /// Label stored in `cot_data.Commodity_Type`.
    pub fn label(self) -> &'static str {
        match self {
            CommodityType::Metals => "Metals",
            CommodityType::EnergyOil => "Energy - Oil & Products",
            CommodityType::NaturalGas => "Natural Gas",
            CommodityType::PowerEmissions => "Power & Emissions",
            CommodityType::Grains => "Agricultural - Grains",
            CommodityType::Softs => "Agricultural - Softs",
            CommodityType::Livestock => "Livestock",
            CommodityType::Dairy => "Dairy",
            CommodityType::OtherIndustrial => "Other Industrial",
            CommodityType::Other => "Other",
        }
    }

    pub fn from_label(label: &str) -> Option<CommodityType> {
        CommodityType::ALL.into_iter().find(|t| t.label() == label)
    }
}

impl fmt::Display for CommodityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a commodity name. Never fails: unknown names are [`CommodityType::Other`].
pub fn classify(commodity_name: &str) -> CommodityType {
    let upper = commodity_name.to_uppercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| upper.contains(w)))
        .map(|(ty, _)| *ty)
        .unwrap_or(CommodityType::Other)
}
