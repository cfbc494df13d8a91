use std::collections::{BTreeMap, BTreeSet};

use crate::model::{CompanyRow, MatchRecord, UnifiedRecord};

/// Per-company view of one dataset: representative name plus location sets.
#[derive(Debug, Default)]
pub struct CompanyProfile {
    pub name: String,
    pub locations: BTreeSet<String>,
    pub locations_loose: BTreeSet<String>,
}

/// Group records by `customer_id`. Names follow source row order; location sets drop
/// empty and separator-only keys.
pub fn company_profiles(records: &[UnifiedRecord]) -> BTreeMap<String, CompanyProfile> {
    let mut profiles: BTreeMap<String, CompanyProfile> = BTreeMap::new();

    for record in records {
        let profile = profiles.entry(record.customer_id.clone()).or_default();
        if profile.name.is_empty() {
            profile.name = display_name(&record.customer_name);
        }
        if let Some(key) = clean_key(&record.location_key) {
            profile.locations.insert(key);
        }
        if let Some(key) = clean_key(&record.location_key_loose) {
            profile.locations_loose.insert(key);
        }
    }

    profiles
}

/// DS1 company id -> distinct DS2 company ids, both sorted.
pub fn company_mapping(matches: &[MatchRecord]) -> BTreeMap<String, BTreeSet<String>> {
    let mut mapping: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for m in matches {
        mapping
            .entry(m.ds1_customer_id.clone())
            .or_default()
            .insert(m.ds2_customer_id.clone());
    }
    mapping
}

/// One merged row per DS1 company, ordered by company id.
pub fn aggregate(
    ds1: &[UnifiedRecord],
    ds2: &[UnifiedRecord],
    matches: &[MatchRecord],
) -> Vec<CompanyRow> {
    let profiles_a = company_profiles(ds1);
    let profiles_b = company_profiles(ds2);
    let mapping = company_mapping(matches);

    profiles_a
        .into_iter()
        .map(|(company_id, profile)| {
            let mut names = BTreeSet::new();
            let mut locations_b = BTreeSet::new();
            let mut locations_b_loose = BTreeSet::new();

            let matched = mapping.get(&company_id);
            for ds2_id in matched.into_iter().flatten() {
                let Some(other) = profiles_b.get(ds2_id) else {
                    continue;
                };
                if !other.name.is_empty() {
                    names.insert(other.name.clone());
                }
                locations_b.extend(other.locations.iter().cloned());
                locations_b_loose.extend(other.locations_loose.iter().cloned());
            }

            let overlap = intersect(&profile.locations, &locations_b);
            let overlap_loose = intersect(&profile.locations_loose, &locations_b_loose);

            CompanyRow {
                company_id_ds1: company_id,
                company_name_ds1: profile.name,
                locations_ds1: profile.locations.into_iter().collect(),
                locations_ds1_loose: profile.locations_loose.into_iter().collect(),
                matched_company_ids_ds2: matched
                    .map(|ids| ids.iter().cloned().collect())
                    .unwrap_or_default(),
                matched_company_names_ds2: names.into_iter().collect(),
                locations_ds2: locations_b.into_iter().collect(),
                locations_ds2_loose: locations_b_loose.into_iter().collect(),
                overlapping_locations: overlap,
                overlapping_locations_loose: overlap_loose,
            }
        })
        .collect()
}

fn intersect(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Vec<String> {
    a.intersection(b).cloned().collect()
}

/// Trimmed key, or `None` when nothing but separators and whitespace remain.
fn clean_key(key: &str) -> Option<String> {
    let key = key.trim();
    if key.chars().all(|c| c == '|' || c.is_whitespace()) {
        None
    } else {
        Some(key.to_string())
    }
}

fn display_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}
