// Property-based tests for normalization, matching and metrics.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use proptest::prelude::*;
use regmerge_recon::config::ThresholdConfig;
use regmerge_recon::matcher::match_datasets;
use regmerge_recon::metrics::compute_metrics;
use regmerge_recon::model::{MatchRecord, UnifiedRecord};
use regmerge_recon::normalize::{normalize_customer_name, normalize_fields, SourceFields};
use regmerge_recon::similarity::token_set_ratio;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

const WORDS: [&str; 8] = ["acme", "northwind", "maple", "leaf", "foods", "traders", "bakery", "widgets"];

/// Normalized-looking company name: 0-3 words from a small vocabulary.
fn arb_name() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS.to_vec()), 0..4).prop_map(|w| w.join(" "))
}

fn arb_block() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["canada|M9W4Y1", "canada|toronto", "|", "canada|K1A0B1"])
        .prop_map(str::to_string)
}

fn arb_record(prefix: &'static str) -> impl Strategy<Value = UnifiedRecord> {
    (0..6u8, arb_name(), arb_block(), any::<bool>()).prop_map(
        move |(id, name, block, has_postal)| UnifiedRecord {
            customer_id: format!("{prefix}{id}"),
            customer_name_norm: name,
            postal_norm: if has_postal { "M9W4Y1".into() } else { String::new() },
            block_key: block,
            ..Default::default()
        },
    )
}

/// Records with a unique address code per row; company ids repeat.
fn arb_dataset(prefix: &'static str) -> impl Strategy<Value = Vec<UnifiedRecord>> {
    prop::collection::vec(arb_record(prefix), 0..12).prop_map(|mut records| {
        for (i, record) in records.iter_mut().enumerate() {
            record.address_code = i.to_string();
        }
        records
    })
}

fn arb_thresholds() -> impl Strategy<Value = ThresholdConfig> {
    (0.0..=100.0f64, 0.0..=100.0f64).prop_map(|(a, b)| ThresholdConfig {
        strong: a.max(b),
        with_postal: a.min(b),
    })
}

fn pair_set(matches: &[MatchRecord]) -> HashSet<(String, String, String, String)> {
    matches
        .iter()
        .map(|m| {
            (
                m.ds1_customer_id.clone(),
                m.ds1_address_code.clone(),
                m.ds2_customer_id.clone(),
                m.ds2_address_code.clone(),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Similarity
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn similarity_in_range_and_symmetric(a in "[a-z ]{0,24}", b in "[a-z ]{0,24}") {
        let ab = token_set_ratio(&a, &b);
        let ba = token_set_ratio(&b, &a);
        prop_assert!((0.0..=100.0).contains(&ab), "score {} out of range", ab);
        prop_assert!((ab - ba).abs() < 1e-9, "asymmetric: {} vs {}", ab, ba);
    }

    #[test]
    fn similarity_identity(name in arb_name()) {
        let expected = if name.is_empty() { 0.0 } else { 100.0 };
        prop_assert_eq!(token_set_ratio(&name, &name), expected);
    }

    #[test]
    fn name_normalization_is_idempotent(raw in "[A-Za-z&,.' -]{0,30}") {
        let once = normalize_customer_name(&raw);
        prop_assert_eq!(normalize_customer_name(&once), once.clone());
    }
}

// ---------------------------------------------------------------------------
// Normalization keys
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn empty_location_parts_give_empty_keys(
        name in "[A-Za-z ]{0,12}",
        blanks in prop::collection::vec("[ \t]{0,3}", 6),
    ) {
        let src = SourceFields {
            customer_name: &name,
            street1: &blanks[0],
            street2: Some(blanks[1].as_str()),
            city: &blanks[2],
            state: &blanks[3],
            postal: &blanks[4],
            country: &blanks[5],
            ..Default::default()
        };
        let record = normalize_fields(&src);
        prop_assert_eq!(record.location_key.as_str(), "");
        prop_assert_eq!(record.location_key_loose.as_str(), "");
        prop_assert_eq!(record.block_key.as_str(), "|");
    }

    #[test]
    fn location_keys_are_never_bare_separators(
        street in "[A-Za-z0-9 ]{0,10}",
        city in "[A-Za-z ]{0,8}",
        postal in "[A-Z0-9 ]{0,7}",
    ) {
        let src = SourceFields {
            street1: &street,
            city: &city,
            postal: &postal,
            ..Default::default()
        };
        let record = normalize_fields(&src);
        for key in [&record.location_key, &record.location_key_loose] {
            prop_assert!(key.is_empty() || !key.chars().all(|c| c == '|'), "bare key {:?}", key);
        }
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn at_most_one_match_per_ds1_record_and_same_block(
        ds1 in arb_dataset("a"),
        ds2 in arb_dataset("b"),
        thresholds in arb_thresholds(),
    ) {
        let matches = match_datasets(&ds1, &ds2, &thresholds).unwrap();
        prop_assert!(matches.len() <= ds1.len());
        for m in &matches {
            prop_assert!((0.0..=100.0).contains(&m.score));
            let a = ds1.iter().find(|r| r.customer_id == m.ds1_customer_id && r.address_code == m.ds1_address_code).unwrap();
            let b = ds2.iter().find(|r| r.customer_id == m.ds2_customer_id && r.address_code == m.ds2_address_code).unwrap();
            prop_assert!(!a.customer_name_norm.is_empty());
            prop_assert!(!b.customer_name_norm.is_empty());
            prop_assert_eq!(&a.block_key, &b.block_key);
        }
    }

    #[test]
    fn raising_thresholds_never_adds_matches(
        ds1 in arb_dataset("a"),
        ds2 in arb_dataset("b"),
        low in arb_thresholds(),
        bump_strong in 0.0..=30.0f64,
        bump_postal in 0.0..=30.0f64,
    ) {
        let with_postal = (low.with_postal + bump_postal).min(100.0);
        let high = ThresholdConfig {
            strong: (low.strong + bump_strong).min(100.0).max(with_postal),
            with_postal,
        };
        let loose = match_datasets(&ds1, &ds2, &low).unwrap();
        let strict = match_datasets(&ds1, &ds2, &high).unwrap();
        prop_assert!(pair_set(&strict).is_subset(&pair_set(&loose)));
        prop_assert!(strict.len() <= loose.len());
    }

    #[test]
    fn postal_never_makes_matching_harder(
        name_a in arb_name(),
        name_b in arb_name(),
        thresholds in arb_thresholds(),
    ) {
        let record = |id: &str, name: &str, postal: &str, block: &str| UnifiedRecord {
            customer_id: id.into(),
            address_code: "1".into(),
            customer_name_norm: name.into(),
            postal_norm: postal.into(),
            block_key: block.into(),
            ..Default::default()
        };
        let ds2_with = vec![record("b", &name_b, "M9W4Y1", "canada|M9W4Y1")];
        let ds2_without = vec![record("b", &name_b, "", "canada|toronto")];

        let with_postal = match_datasets(&[record("a", &name_a, "M9W4Y1", "canada|M9W4Y1")], &ds2_with, &thresholds).unwrap();
        let without_postal = match_datasets(&[record("a", &name_a, "", "canada|toronto")], &ds2_without, &thresholds).unwrap();

        if !without_postal.is_empty() {
            prop_assert!(!with_postal.is_empty());
        }
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn metrics_are_consistent(
        ds1 in arb_dataset("a"),
        ds2 in arb_dataset("b"),
        thresholds in arb_thresholds(),
    ) {
        let matches = match_datasets(&ds1, &ds2, &thresholds).unwrap();
        let m = compute_metrics(&ds1, &ds2, &matches);

        prop_assert!(m.ds1_matched_companies <= m.ds1_companies_total);
        prop_assert!(m.ds2_matched_companies <= m.ds2_companies_total);
        prop_assert!((0.0..=1.0).contains(&m.unmatched_records));
        prop_assert!((0.0..=1.0).contains(&m.match_rate_ds1));
        prop_assert!((0.0..=1.0).contains(&m.one_to_many_rate_ds1));
        prop_assert!(m.ds1_one_to_many_companies <= m.ds1_matched_companies);
        prop_assert_eq!(m.address_level_matches, matches.len());
        if matches.is_empty() && m.ds1_companies_total + m.ds2_companies_total > 0 {
            prop_assert_eq!(m.unmatched_records, 1.0);
        }
    }
}
