use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::aggregate::company_mapping;
use crate::model::{MatchRecord, Metrics, UnifiedRecord};

/// Coverage and ambiguity metrics over company ids. Pure function of its inputs.
pub fn compute_metrics(
    ds1: &[UnifiedRecord],
    ds2: &[UnifiedRecord],
    matches: &[MatchRecord],
) -> Metrics {
    let total_a = distinct_ids(ds1);
    let total_b = distinct_ids(ds2);

    let forward = company_mapping(matches);
    let mut reverse: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (a, bs) in &forward {
        for b in bs {
            reverse.entry(b.as_str()).or_default().insert(a.as_str());
        }
    }

    let matched_a = forward.len();
    let matched_b = reverse.len();
    let one_to_many_a = forward.values().filter(|s| s.len() > 1).count();
    let one_to_many_b = reverse.values().filter(|s| s.len() > 1).count();

    let unmatched = (total_a - matched_a.min(total_a)) + (total_b - matched_b.min(total_b));

    Metrics {
        ds1_companies_total: total_a,
        ds2_companies_total: total_b,
        ds1_matched_companies: matched_a,
        ds2_matched_companies: matched_b,
        match_rate_ds1: rate(matched_a, total_a),
        match_rate_ds2: rate(matched_b, total_b),
        unmatched_records: rate(unmatched, total_a + total_b),
        ds1_one_to_many_companies: one_to_many_a,
        ds2_one_to_many_companies: one_to_many_b,
        one_to_many_rate_ds1: rate(one_to_many_a, matched_a),
        one_to_many_rate_ds2: rate(one_to_many_b, matched_b),
        one_to_many_share_ds1: rate(one_to_many_a, total_a),
        one_to_many_share_ds2: rate(one_to_many_b, total_b),
        address_level_matches: matches.len(),
    }
}

fn distinct_ids(records: &[UnifiedRecord]) -> usize {
    records
        .iter()
        .map(|r| r.customer_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
