//! Property tests for the pure domain logic.
//!
//! Uses proptest to verify:
//! 1. Classification is total and ignores case
//! 2. Formula arithmetic matches direct evaluation, with gaps for missing inputs
//! 3. Ticker lookup is stable under case and padding

use proptest::prelude::*;
use cotlab_core::columns::Metric;
use cotlab_core::tickers::{normalize_commodity_name, ticker_for};
use cotlab_core::{classify, CommodityType, CotRecord, Formula, FormulaError};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z ,#/()-]{0,40}",
        Just("GOLD".to_string()),
        Just("crude oil, light sweet".to_string()),
        Just("Henry Hub Natural Gas".to_string()),
        Just("LEAN HOGS".to_string()),
    ]
}

fn arb_position() -> impl Strategy<Value = f64> {
    (0.0..2_000_000.0_f64).prop_map(|p| p.round())
}

fn arb_metric() -> impl Strategy<Value = Metric> {
    (0..Metric::COUNT).prop_map(|i| Metric::ALL[i])
}

// ── 1. Classification ────────────────────────────────────────────────

proptest! {
    #[test]
    fn classification_ignores_case(name in arb_name()) {
        prop_assert_eq!(classify(&name.to_lowercase()), classify(&name.to_uppercase()));
    }

    #[test]
    fn classification_label_is_known(name in arb_name()) {
        let ty = classify(&name);
        prop_assert_eq!(CommodityType::from_label(ty.label()), Some(ty));
    }
}

// ── 2. Formulas ──────────────────────────────────────────────────────

proptest! {
    /// `a + b * c` binds multiplication first, over any three metrics.
    #[test]
    fn formula_precedence_matches_direct_arithmetic(
        a in arb_metric(), b in arb_metric(), c in arb_metric(),
        va in arb_position(), vb in arb_position(), vc in arb_position(),
    ) {
        let mut rec = CotRecord::new("GOLD", "COMEX");
        rec.set_metric(a, Some(va));
        rec.set_metric(b, Some(vb));
        rec.set_metric(c, Some(vc));
        // Later writes win when metrics repeat.
        let (va, vb, vc) = (rec.metric(a).unwrap(), rec.metric(b).unwrap(), rec.metric(c).unwrap());

        let src = format!("{} + {} * {}", a.short_name(), b.short_name(), c.short_name());
        let f = Formula::parse(&src).unwrap();
        prop_assert_eq!(f.evaluate(&rec), Some(va + vb * vc));
    }

    #[test]
    fn technical_and_short_names_agree(m in arb_metric(), v in arb_position()) {
        let rec = CotRecord::new("CORN", "CBOT").with_metric(m, v);
        let short = Formula::parse(m.short_name()).unwrap();
        let technical = Formula::parse(&m.column().to_lowercase()).unwrap();
        prop_assert_eq!(short.evaluate(&rec), Some(v));
        prop_assert_eq!(technical.evaluate(&rec), Some(v));
    }

    #[test]
    fn missing_operand_is_a_gap(m in arb_metric(), k in 1.0..100.0_f64) {
        let rec = CotRecord::new("CORN", "CBOT");
        let f = Formula::parse(&format!("({}) * {k}", m.short_name())).unwrap();
        prop_assert_eq!(f.evaluate(&rec), None);
    }

    #[test]
    fn unknown_words_are_rejected(word in "[Qq][a-z]{2,10}") {
        let err = Formula::parse(&format!("Open Interest + {word}")).unwrap_err();
        prop_assert_eq!(err, FormulaError::UnknownColumn(word));
    }
}

// ── 3. Tickers ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn ticker_lookup_ignores_case_and_padding(name in arb_name(), pad in 0usize..4) {
        let padded = format!("{}{}{}", " ".repeat(pad), name.to_lowercase(), " ".repeat(pad));
        prop_assert_eq!(
            ticker_for(&normalize_commodity_name(&padded), true),
            ticker_for(&normalize_commodity_name(&name), true)
        );
    }
}
