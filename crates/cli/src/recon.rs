//! `regmerge run|validate|normalize|match`: config-driven registry merge.

use std::path::{Path, PathBuf};

use log::info;
use regmerge_io::{read_csv, write_matches_csv, write_merged_csv, write_metrics_json, write_normalized_csv};
use regmerge_recon::matcher::match_datasets;
use regmerge_recon::normalize::{normalize_dataset, records_from_normalized_table};
use regmerge_recon::{ReconConfig, ReconInput, ThresholdConfig};

use crate::exit_codes::{EXIT_CONFIG, EXIT_OUTPUT};
use crate::{CliError, Dataset};

/// Path overrides for `regmerge run`. `None` falls back to the config.
pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub ds1: Option<PathBuf>,
    pub ds2: Option<PathBuf>,
    pub merged: Option<PathBuf>,
    pub metrics: Option<PathBuf>,
    pub matches: Option<PathBuf>,
}

/// A parsed config plus the directory its relative paths resolve against.
struct LoadedConfig {
    config: ReconConfig,
    base_dir: PathBuf,
}

impl LoadedConfig {
    fn resolve(&self, file: &str) -> PathBuf {
        self.base_dir.join(file)
    }

    fn dataset_path(&self, dataset: Dataset) -> PathBuf {
        match dataset {
            Dataset::Ds1 => self.resolve(&self.config.datasets.ds1.file),
            Dataset::Ds2 => self.resolve(&self.config.datasets.ds2.file),
        }
    }
}

/// Read and validate the config, or fall back to the built-in defaults (paths
/// relative to the working directory).
fn load_config(path: Option<&Path>) -> Result<LoadedConfig, CliError> {
    let Some(path) = path else {
        return Ok(LoadedConfig {
            config: ReconConfig::default(),
            base_dir: PathBuf::new(),
        });
    };

    let config_str = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_CONFIG, format!("cannot read config {}: {e}", path.display()))
    })?;
    let config = ReconConfig::from_toml(&config_str).map_err(CliError::recon)?;

    // Resolve file paths relative to config file's directory
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(LoadedConfig { config, base_dir })
}

// ============================================================================
// run
// ============================================================================

pub fn cmd_run(args: RunArgs, json_output: bool) -> Result<(), CliError> {
    let loaded = load_config(args.config.as_deref())?;

    let ds1_path = args.ds1.unwrap_or_else(|| loaded.dataset_path(Dataset::Ds1));
    let ds2_path = args.ds2.unwrap_or_else(|| loaded.dataset_path(Dataset::Ds2));
    if ds1_path == ds2_path {
        return Err(CliError::args(format!(
            "ds1 and ds2 both read {}",
            ds1_path.display()
        )));
    }
    let merged_path = args.merged.unwrap_or_else(|| loaded.resolve(&loaded.config.output.merged));
    let metrics_path = args.metrics.unwrap_or_else(|| loaded.resolve(&loaded.config.output.metrics));
    let matches_path = args
        .matches
        .or_else(|| loaded.config.output.matches.as_deref().map(|m| loaded.resolve(m)));

    let input = ReconInput {
        ds1: read_csv(&ds1_path).map_err(CliError::io)?,
        ds2: read_csv(&ds2_path).map_err(CliError::io)?,
    };
    let result = regmerge_recon::run(&loaded.config, &input).map_err(CliError::recon)?;

    write_merged_csv(&merged_path, &result.companies).map_err(CliError::io)?;
    write_metrics_json(&metrics_path, &result.metrics).map_err(CliError::io)?;
    if let Some(ref path) = matches_path {
        write_matches_csv(path, &result.matches).map_err(CliError::io)?;
    }

    if json_output {
        let value = serde_json::json!({
            "meta": result.meta,
            "metrics": result.metrics,
        });
        let json_str = serde_json::to_string_pretty(&value)
            .map_err(|e| CliError::new(EXIT_OUTPUT, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human summary to stderr
    eprintln!("Merged rows (DS1 companies): {}", result.companies.len());
    eprintln!("Address-level matches: {}", result.matches.len());
    eprintln!("Merged CSV written to: {}", merged_path.display());
    eprintln!("Metrics JSON written to: {}", metrics_path.display());
    if let Some(ref path) = matches_path {
        eprintln!("Address matches written to: {}", path.display());
    }

    Ok(())
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let loaded = load_config(config_path.as_deref())?;
    let config = &loaded.config;
    println!(
        "config OK: \"{}\" (ds1: {}, ds2: {}, thresholds: strong {} / with_postal {})",
        config.name,
        loaded.dataset_path(Dataset::Ds1).display(),
        loaded.dataset_path(Dataset::Ds2).display(),
        config.thresholds.strong,
        config.thresholds.with_postal,
    );
    Ok(())
}

// ============================================================================
// normalize
// ============================================================================

pub fn cmd_normalize(
    dataset: Dataset,
    config_path: Option<PathBuf>,
    input: Option<PathBuf>,
    output: PathBuf,
) -> Result<(), CliError> {
    let loaded = load_config(config_path.as_deref())?;
    let columns = match dataset {
        Dataset::Ds1 => &loaded.config.datasets.ds1.columns,
        Dataset::Ds2 => &loaded.config.datasets.ds2.columns,
    };
    let input_path = input.unwrap_or_else(|| loaded.dataset_path(dataset));

    let table = read_csv(&input_path).map_err(CliError::io)?;
    let records = normalize_dataset(dataset.label(), &table, columns).map_err(CliError::recon)?;
    write_normalized_csv(&output, &records).map_err(CliError::io)?;

    eprintln!(
        "Normalized {} {} records to: {}",
        records.len(),
        dataset.label(),
        output.display()
    );
    Ok(())
}

// ============================================================================
// match
// ============================================================================

pub fn cmd_match(
    ds1: PathBuf,
    ds2: PathBuf,
    output: PathBuf,
    strong: f64,
    with_postal: f64,
) -> Result<(), CliError> {
    let thresholds = ThresholdConfig { strong, with_postal };

    let load = |path: &Path| -> Result<_, CliError> {
        let table = read_csv(path).map_err(CliError::io)?;
        records_from_normalized_table(&table).map_err(|e| {
            CliError::recon(e).with_hint(format!(
                "{} must be produced by `regmerge normalize`",
                path.display()
            ))
        })
    };
    let records_a = load(&ds1)?;
    let records_b = load(&ds2)?;
    info!("matching {} DS1 against {} DS2 records", records_a.len(), records_b.len());

    let matches = match_datasets(&records_a, &records_b, &thresholds).map_err(CliError::recon)?;
    write_matches_csv(&output, &matches).map_err(CliError::io)?;

    eprintln!("Address-level matches: {}", matches.len());
    eprintln!("Matches written to: {}", output.display());
    Ok(())
}
