use log::{debug, info, trace};

use crate::block::BlockIndex;
use crate::config::ThresholdConfig;
use crate::error::ReconError;
use crate::model::{MatchRecord, UnifiedRecord};
use crate::similarity::token_set_ratio;

/// Match DS1 addresses to DS2 addresses by blocking + name similarity.
///
/// Only records sharing a `block_key` are compared. Each DS1 address keeps its single
/// best-scoring candidate (first one wins on ties) when that score clears the
/// threshold for its postal situation. DS2 records may be claimed by any number of DS1
/// records; there is no global assignment.
pub fn match_datasets(
    ds1: &[UnifiedRecord],
    ds2: &[UnifiedRecord],
    thresholds: &ThresholdConfig,
) -> Result<Vec<MatchRecord>, ReconError> {
    thresholds.validate().map_err(ReconError::MatchingPrecondition)?;

    let index = BlockIndex::build(ds2);
    let stats = index.stats();
    debug!(
        "block index: {} blocks over {} records, largest block {}",
        stats.blocks, stats.records, stats.largest_block
    );

    let matches: Vec<MatchRecord> = ds1
        .iter()
        .filter_map(|record| match_record(record, &index, thresholds))
        .collect();

    info!("address-level matches: {} of {} DS1 addresses", matches.len(), ds1.len());
    Ok(matches)
}

/// Best acceptable DS2 candidate for one DS1 address, if any.
pub fn match_record(
    record: &UnifiedRecord,
    index: &BlockIndex<'_>,
    thresholds: &ThresholdConfig,
) -> Option<MatchRecord> {
    if record.customer_name_norm.is_empty() {
        trace!("{}/{}: empty name, skipped", record.customer_id, record.address_code);
        return None;
    }

    let candidates = index.candidates(&record.block_key);
    let (best, score) = best_candidate(&record.customer_name_norm, candidates)?;

    let threshold = thresholds.for_postal(&record.postal_norm);
    if score < threshold {
        trace!(
            "{}/{}: best score {score:.1} below {threshold}",
            record.customer_id,
            record.address_code
        );
        return None;
    }

    Some(MatchRecord {
        ds1_customer_id: record.customer_id.clone(),
        ds1_address_code: record.address_code.clone(),
        ds2_customer_id: best.customer_id.clone(),
        ds2_address_code: best.address_code.clone(),
        score,
    })
}

/// Highest-scoring candidate with a non-empty name. Ties keep the earliest candidate.
fn best_candidate<'a>(
    name: &str,
    candidates: &[&'a UnifiedRecord],
) -> Option<(&'a UnifiedRecord, f64)> {
    candidates
        .iter()
        .filter(|c| !c.customer_name_norm.is_empty())
        .map(|c| (*c, token_set_ratio(name, &c.customer_name_norm)))
        .fold(None, |best, (candidate, score)| match best {
            Some((_, best_score)) if score <= best_score => best,
            _ => Some((candidate, score)),
        })
}
