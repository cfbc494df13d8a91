use log::info;

use crate::aggregate::aggregate;
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::matcher::match_datasets;
use crate::metrics::compute_metrics;
use crate::model::{ReconInput, ReconMeta, ReconResult};
use crate::normalize::normalize_dataset;

/// Run the full merge per config: normalize, block + match, aggregate, metrics.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    config.validate()?;

    let ds1 = normalize_dataset("ds1", &input.ds1, &config.datasets.ds1.columns)?;
    let ds2 = normalize_dataset("ds2", &input.ds2, &config.datasets.ds2.columns)?;
    info!("normalized {} DS1 and {} DS2 records", ds1.len(), ds2.len());

    let matches = match_datasets(&ds1, &ds2, &config.thresholds)?;
    let companies = aggregate(&ds1, &ds2, &matches);
    let metrics = compute_metrics(&ds1, &ds2, &matches);
    info!(
        "{} DS1 companies, {} matched ({:.1}%)",
        metrics.ds1_companies_total,
        metrics.ds1_matched_companies,
        metrics.match_rate_ds1 * 100.0
    );

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            threshold_strong: config.thresholds.strong,
            threshold_with_postal: config.thresholds.with_postal,
            ds1_records: ds1.len(),
            ds2_records: ds2.len(),
        },
        metrics,
        matches,
        companies,
    })
}
