//! Token-set name similarity on a 0-100 scale.

use std::collections::BTreeSet;

/// Normalized Indel similarity of two strings, 0-100.
///
/// Indel distance counts insertions and deletions only, so it equals
/// `|a| + |b| - 2 * lcs(a, b)`. Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    let distance = total - 2 * lcs_len(&a, &b);
    normalized(distance, total)
}

fn normalized(distance: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    100.0 - 100.0 * distance as f64 / total as f64
}

/// Longest common subsequence length, single-row DP.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let up = row[j + 1];
            row[j + 1] = if ca == cb { diag + 1 } else { up.max(row[j]) };
            diag = up;
        }
    }
    row[b.len()]
}

/// Token-set ratio: compares the shared tokens against each side's remainder.
///
/// Symmetric and independent of word order and case. Returns 100 when one token set
/// contains the other (and they share at least one token), 0 when either side has no
/// tokens.
pub fn token_set_ratio(s1: &str, s2: &str) -> f64 {
    let tokens_a = token_set(s1);
    let tokens_b = token_set(s2);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).map(String::as_str).collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).map(String::as_str).collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).map(String::as_str).collect();

    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    // BTreeSet iteration is sorted, so the joins are canonical.
    let sect = intersection.join(" ");
    let ab = diff_ab.join(" ");
    let ba = diff_ba.join(" ");

    let combined_ab = join_nonempty(&sect, &ab);
    let combined_ba = join_nonempty(&sect, &ba);

    let mut best = ratio(&combined_ab, &combined_ba);
    if !sect.is_empty() {
        best = best.max(ratio(&sect, &combined_ab)).max(ratio(&sect, &combined_ba));
    }
    best
}

fn token_set(s: &str) -> BTreeSet<String> {
    s.split_whitespace().map(str::to_lowercase).collect()
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (false, true) => head.to_string(),
        (false, false) => format!("{head} {tail}"),
    }
}
