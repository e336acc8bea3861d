//! Column catalog for the CFTC disaggregated futures-only report.
//!
//! Every column the loader keeps has a technical name (as published by the
//! CFTC and stored in `cot_data`), a short display name used in charts and
//! formulas, and a one-line description for the column reference.

use serde::Serialize;

/// Catalog entry for one stored column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: &'static str,
    pub short_name: &'static str,
    pub description: &'static str,
}

// ── Identification and derived columns ──────────────────────────────

pub const MARKET_AND_EXCHANGE_NAMES: &str = "Market_and_Exchange_Names";
pub const AS_OF_DATE: &str = "As_of_Date_In_Form_YYMMDD";
pub const REPORT_DATE: &str = "Report_Date_as_MM_DD_YYYY";
pub const CONTRACT_MARKET_CODE: &str = "CFTC_Contract_Market_Code";
pub const COMMODITY_CODE: &str = "CFTC_Commodity_Code";
pub const CONTRACT_UNITS: &str = "Contract_Units";

pub const COMMODITY_NAME: &str = "Commodity_Name";
pub const EXCHANGE_NAME: &str = "Exchange_Name";
pub const COMMODITY_TYPE: &str = "Commodity_Type";

/// Number of identification columns that precede the metrics in [`COLUMN_REFERENCE`].
const IDENTIFICATION_COUNT: usize = 5;

/// Every mapped column, identification first, then metrics in [`Metric::ALL`] order.
pub const COLUMN_REFERENCE: &[ColumnInfo] = &[
    ColumnInfo {
        name: AS_OF_DATE,
        short_name: "Date",
        description: "Report date in YYMMDD format",
    },
    ColumnInfo {
        name: REPORT_DATE,
        short_name: "Report Date",
        description: "Report date in MM/DD/YYYY format",
    },
    ColumnInfo {
        name: CONTRACT_MARKET_CODE,
        short_name: "Market Code",
        description: "CFTC contract market code",
    },
    ColumnInfo {
        name: COMMODITY_CODE,
        short_name: "Commodity Code",
        description: "CFTC commodity classification code",
    },
    ColumnInfo {
        name: CONTRACT_UNITS,
        short_name: "Contract Units",
        description: "Number of units per contract",
    },
    // Core position data
    ColumnInfo {
        name: "Open_Interest_All",
        short_name: "Open Interest",
        description: "Total open interest for all contracts",
    },
    // Producer/Merchant
    ColumnInfo {
        name: "Prod_Merc_Positions_Long_ALL",
        short_name: "Prod/Merc Long",
        description: "Producer/Merchant long positions (all contracts)",
    },
    ColumnInfo {
        name: "Prod_Merc_Positions_Short_ALL",
        short_name: "Prod/Merc Short",
        description: "Producer/Merchant short positions (all contracts)",
    },
    // Swap dealers
    ColumnInfo {
        name: "Swap_Positions_Long_All",
        short_name: "Swap Long",
        description: "Swap dealer long positions (all contracts)",
    },
    ColumnInfo {
        name: "Swap__Positions_Short_All",
        short_name: "Swap Short",
        description: "Swap dealer short positions (all contracts)",
    },
    ColumnInfo {
        name: "Swap__Positions_Spread_All",
        short_name: "Swap Spread",
        description: "Swap dealer spread positions (all contracts)",
    },
    // Managed money
    ColumnInfo {
        name: "M_Money_Positions_Long_ALL",
        short_name: "MM Long",
        description: "Money Manager (Managed Money) long positions (all contracts)",
    },
    ColumnInfo {
        name: "M_Money_Positions_Short_ALL",
        short_name: "MM Short",
        description: "Money Manager (Managed Money) short positions (all contracts)",
    },
    ColumnInfo {
        name: "M_Money_Positions_Spread_ALL",
        short_name: "MM Spread",
        description: "Money Manager spread positions (all contracts)",
    },
    // Other reportables
    ColumnInfo {
        name: "Other_Rept_Positions_Long_ALL",
        short_name: "Other Rept Long",
        description: "Other reportable long positions (all contracts)",
    },
    ColumnInfo {
        name: "Other_Rept_Positions_Short_ALL",
        short_name: "Other Rept Short",
        description: "Other reportable short positions (all contracts)",
    },
    ColumnInfo {
        name: "Other_Rept_Positions_Spread_ALL",
        short_name: "Other Rept Spread",
        description: "Other reportable spread positions (all contracts)",
    },
    // Total reportables
    ColumnInfo {
        name: "Tot_Rept_Positions_Long_All",
        short_name: "Total Rept Long",
        description: "Total reportable long positions (all contracts)",
    },
    ColumnInfo {
        name: "Tot_Rept_Positions_Short_All",
        short_name: "Total Rept Short",
        description: "Total reportable short positions (all contracts)",
    },
    // Non-reportables
    ColumnInfo {
        name: "NonRept_Positions_Long_All",
        short_name: "Non-Rept Long",
        description: "Non-reportable long positions (all contracts)",
    },
    ColumnInfo {
        name: "NonRept_Positions_Short_All",
        short_name: "Non-Rept Short",
        description: "Non-reportable short positions (all contracts)",
    },
    // Percentages of open interest
    ColumnInfo {
        name: "Pct_of_OI_Prod_Merc_Long_All",
        short_name: "% OI Prod/Merc Long",
        description: "Producer/Merchant long positions as percentage of open interest",
    },
    ColumnInfo {
        name: "Pct_of_OI_Prod_Merc_Short_All",
        short_name: "% OI Prod/Merc Short",
        description: "Producer/Merchant short positions as percentage of open interest",
    },
    ColumnInfo {
        name: "Pct_of_OI_Swap_Long_All",
        short_name: "% OI Swap Long",
        description: "Swap dealer long positions as percentage of open interest",
    },
    ColumnInfo {
        name: "Pct_of_OI_Swap_Short_All",
        short_name: "% OI Swap Short",
        description: "Swap dealer short positions as percentage of open interest",
    },
    ColumnInfo {
        name: "Pct_of_OI_M_Money_Long_All",
        short_name: "% OI MM Long",
        description: "Money Manager long positions as percentage of open interest",
    },
    ColumnInfo {
        name: "Pct_of_OI_M_Money_Short_All",
        short_name: "% OI MM Short",
        description: "Money Manager short positions as percentage of open interest",
    },
    ColumnInfo {
        name: "Pct_of_OI_Tot_Rept_Long_All",
        short_name: "% OI Total Rept Long",
        description: "Total reportable long positions as percentage of open interest",
    },
    ColumnInfo {
        name: "Pct_of_OI_Tot_Rept_Short_All",
        short_name: "% OI Total Rept Short",
        description: "Total reportable short positions as percentage of open interest",
    },
];

/// Columns the loader reads from a workbook. Anything else is discarded.
pub const ESSENTIAL_COLUMNS: &[&str] = &[
    MARKET_AND_EXCHANGE_NAMES,
    AS_OF_DATE,
    REPORT_DATE,
    CONTRACT_MARKET_CODE,
    COMMODITY_CODE,
    CONTRACT_UNITS,
    "Open_Interest_All",
    "Prod_Merc_Positions_Long_ALL",
    "Prod_Merc_Positions_Short_ALL",
    "Swap_Positions_Long_All",
    "Swap__Positions_Short_All",
    "Swap__Positions_Spread_All",
    "M_Money_Positions_Long_ALL",
    "M_Money_Positions_Short_ALL",
    "M_Money_Positions_Spread_ALL",
    "Other_Rept_Positions_Long_ALL",
    "Other_Rept_Positions_Short_ALL",
    "Other_Rept_Positions_Spread_ALL",
    "Tot_Rept_Positions_Long_All",
    "Tot_Rept_Positions_Short_All",
    "NonRept_Positions_Long_All",
    "NonRept_Positions_Short_All",
    "Pct_of_OI_Prod_Merc_Long_All",
    "Pct_of_OI_Prod_Merc_Short_All",
    "Pct_of_OI_Swap_Long_All",
    "Pct_of_OI_Swap_Short_All",
    "Pct_of_OI_M_Money_Long_All",
    "Pct_of_OI_M_Money_Short_All",
    "Pct_of_OI_Tot_Rept_Long_All",
    "Pct_of_OI_Tot_Rept_Short_All",
];

/// Look up the catalog entry for a technical column name.
pub fn column_info(name: &str) -> Option<&'static ColumnInfo> {
    COLUMN_REFERENCE.iter().find(|c| c.name == name)
}

/// Short display name for a column, or the name itself when unmapped.
pub fn short_name(name: &str) -> &str {
    column_info(name).map(|c| c.short_name).unwrap_or(name)
}

/// Description for a column.
pub fn description(name: &str) -> &'static str {
    column_info(name)
        .map(|c| c.description)
        .unwrap_or("No description available")
}

// ── Metrics ─────────────────────────────────────────────────────────

/// A numeric position column. These are the values charts and formulas work with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    OpenInterest,
    ProdMercLong,
    ProdMercShort,
    SwapLong,
    SwapShort,
    SwapSpread,
    ManagedMoneyLong,
    ManagedMoneyShort,
    ManagedMoneySpread,
    OtherReptLong,
    OtherReptShort,
    OtherReptSpread,
    TotalReptLong,
    TotalReptShort,
    NonReptLong,
    NonReptShort,
    PctOiProdMercLong,
    PctOiProdMercShort,
    PctOiSwapLong,
    PctOiSwapShort,
    PctOiManagedMoneyLong,
    PctOiManagedMoneyShort,
    PctOiTotalReptLong,
    PctOiTotalReptShort,
}

impl Metric {
    pub const COUNT: usize = 24;

    pub const ALL: [Metric; Metric::COUNT] = [
        Metric::OpenInterest,
        Metric::ProdMercLong,
        Metric::ProdMercShort,
        Metric::SwapLong,
        Metric::SwapShort,
        Metric::SwapSpread,
        Metric::ManagedMoneyLong,
        Metric::ManagedMoneyShort,
        Metric::ManagedMoneySpread,
        Metric::OtherReptLong,
        Metric::OtherReptShort,
        Metric::OtherReptSpread,
        Metric::TotalReptLong,
        Metric::TotalReptShort,
        Metric::NonReptLong,
        Metric::NonReptShort,
        Metric::PctOiProdMercLong,
        Metric::PctOiProdMercShort,
        Metric::PctOiSwapLong,
        Metric::PctOiSwapShort,
        Metric::PctOiManagedMoneyLong,
        Metric::PctOiManagedMoneyShort,
        Metric::PctOiTotalReptLong,
        Metric::PctOiTotalReptShort,
    ];

    /// Position of this metric in [`Metric::ALL`] and in `CotRecord::metrics`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn info(self) -> &'static ColumnInfo {
        &COLUMN_REFERENCE[IDENTIFICATION_COUNT + self.index()]
    }

    /// Technical column name.
    pub fn column(self) -> &'static str {
        self.info().name
    }

    pub fn short_name(self) -> &'static str {
        self.info().short_name
    }

    /// Resolve a technical column name.
    pub fn from_column(name: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.column() == name)
    }

    /// Resolve either a short or a technical name, ignoring ASCII case.
    pub fn lookup(name: &str) -> Option<Metric> {
        let name = name.trim();
        Metric::ALL.into_iter().find(|m| {
            m.short_name().eq_ignore_ascii_case(name) || m.column().eq_ignore_ascii_case(name)
        })
    }

    /// True for the `Pct_of_OI_*` family.
    pub fn is_percentage(self) -> bool {
        self >= Metric::PctOiProdMercLong
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn metric_table_lines_up_with_reference() {
        assert_eq!(COLUMN_REFERENCE.len(), IDENTIFICATION_COUNT + Metric::COUNT);
        assert_eq!(Metric::OpenInterest.column(), "Open_Interest_All");
        assert_eq!(Metric::SwapShort.column(), "Swap__Positions_Short_All");
        assert_eq!(Metric::ManagedMoneySpread.short_name(), "MM Spread");
        assert_eq!(
            Metric::PctOiTotalReptShort.column(),
            "Pct_of_OI_Tot_Rept_Short_All"
        );
        for (i, m) in Metric::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }

    #[test]
    fn every_reference_column_is_essential() {
        for info in COLUMN_REFERENCE {
            assert!(
                ESSENTIAL_COLUMNS.contains(&info.name),
                "{} missing from ESSENTIAL_COLUMNS",
                info.name
            );
        }
        assert_eq!(ESSENTIAL_COLUMNS.len(), COLUMN_REFERENCE.len() + 1);
    }

    #[test]
    fn short_names_are_unique_case_insensitively() {
        let mut seen = HashSet::new();
        for info in COLUMN_REFERENCE {
            assert!(seen.insert(info.short_name.to_ascii_lowercase()));
        }
    }

    #[test]
    fn unmapped_columns_fall_back() {
        assert_eq!(short_name("Commodity_Name"), "Commodity_Name");
        assert_eq!(description("Commodity_Name"), "No description available");
        assert_eq!(short_name("Open_Interest_All"), "Open Interest");
    }

    #[test]
    fn lookup_accepts_short_and_technical_names() {
        assert_eq!(Metric::lookup("mm long"), Some(Metric::ManagedMoneyLong));
        assert_eq!(
            Metric::lookup("M_Money_Positions_Long_ALL"),
            Some(Metric::ManagedMoneyLong)
        );
        assert_eq!(Metric::lookup(" % OI Swap Short "), Some(Metric::PctOiSwapShort));
        assert_eq!(Metric::lookup("Contract Units"), None);
    }

    #[test]
    fn percentage_family() {
        assert!(Metric::PctOiSwapLong.is_percentage());
        assert!(!Metric::NonReptShort.is_percentage());
        assert_eq!(Metric::ALL.iter().filter(|m| m.is_percentage()).count(), 8);
    }
}
