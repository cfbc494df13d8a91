use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub datasets: DatasetsConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_name() -> String {
    "company registry merge".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetsConfig {
    pub ds1: DatasetConfig,
    pub ds2: DatasetConfig,
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub file: String,
    pub columns: ColumnMapping,
}

/// Unified field -> source column name.
///
/// `street2`, `street3` and `country_code` are optional: they may be left out of the
/// mapping, and a mapped-but-absent optional column is tolerated at load time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnMapping {
    pub customer_id: String,
    pub address_code: String,
    pub customer_name: String,
    pub street1: String,
    #[serde(default)]
    pub street2: Option<String>,
    #[serde(default)]
    pub street3: Option<String>,
    pub city: String,
    pub state: String,
    pub postal: String,
    pub country: String,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl ColumnMapping {
    /// Mandatory (unified, source) pairs in schema order.
    pub fn mandatory(&self) -> [(&'static str, &str); 8] {
        [
            ("customer_id", self.customer_id.as_str()),
            ("address_code", self.address_code.as_str()),
            ("customer_name", self.customer_name.as_str()),
            ("street1", self.street1.as_str()),
            ("city", self.city.as_str()),
            ("state", self.state.as_str()),
            ("postal", self.postal.as_str()),
            ("country", self.country.as_str()),
        ]
    }

    /// Optional (unified, source) pairs that are actually mapped.
    pub fn optional(&self) -> Vec<(&'static str, &str)> {
        [
            ("street2", self.street2.as_deref()),
            ("street3", self.street3.as_deref()),
            ("country_code", self.country_code.as_deref()),
        ]
        .into_iter()
        .filter_map(|(unified, src)| src.map(|s| (unified, s)))
        .collect()
    }

    /// Source layout of the first registry export.
    pub fn ds1_default() -> Self {
        Self {
            customer_id: "custnmbr".into(),
            address_code: "addrcode".into(),
            customer_name: "custname".into(),
            street1: "sStreet1".into(),
            street2: Some("sStreet2".into()),
            street3: None,
            city: "sCity".into(),
            state: "sProvState".into(),
            postal: "sPostalZip".into(),
            country: "sCountry".into(),
            country_code: None,
        }
    }

    /// Source layout of the second registry export.
    pub fn ds2_default() -> Self {
        Self {
            customer_id: "custnmbr".into(),
            address_code: "addrcode".into(),
            customer_name: "custname".into(),
            street1: "address1".into(),
            street2: Some("address2".into()),
            street3: Some("address3".into()),
            city: "city".into(),
            state: "state".into(),
            postal: "zip".into(),
            country: "country".into(),
            country_code: Some("ccode".into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Thresholds + Output
// ---------------------------------------------------------------------------

/// Name-similarity acceptance thresholds on the 0-100 scale.
///
/// `with_postal` applies when the DS1 address has a postal code, `strong` otherwise.
/// Invariant: `with_postal <= strong`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_strong")]
    pub strong: f64,
    #[serde(default = "default_with_postal")]
    pub with_postal: f64,
}

fn default_strong() -> f64 {
    95.0
}

fn default_with_postal() -> f64 {
    86.0
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            strong: default_strong(),
            with_postal: default_with_postal(),
        }
    }
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (label, value) in [("strong", self.strong), ("with_postal", self.with_postal)] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(format!("threshold '{label}' must be within 0..=100, got {value}"));
            }
        }
        if self.with_postal > self.strong {
            return Err(format!(
                "threshold 'with_postal' ({}) must not exceed 'strong' ({})",
                self.with_postal, self.strong
            ));
        }
        Ok(())
    }

    /// Threshold for a DS1 address, given its normalized postal code.
    pub fn for_postal(&self, postal_norm: &str) -> f64 {
        if postal_norm.is_empty() {
            self.strong
        } else {
            self.with_postal
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_merged")]
    pub merged: String,
    #[serde(default = "default_metrics")]
    pub metrics: String,
    #[serde(default)]
    pub matches: Option<String>,
}

fn default_merged() -> String {
    "output/merged_companies.csv".into()
}

fn default_metrics() -> String {
    "output/metrics.json".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            merged: default_merged(),
            metrics: default_metrics(),
            matches: None,
        }
    }
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            datasets: DatasetsConfig {
                ds1: DatasetConfig {
                    file: "data/raw/company_dataset_1.csv".into(),
                    columns: ColumnMapping::ds1_default(),
                },
                ds2: DatasetConfig {
                    file: "data/raw/company_dataset_2.csv".into(),
                    columns: ColumnMapping::ds2_default(),
                },
            },
            thresholds: ThresholdConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        self.thresholds.validate().map_err(ReconError::ConfigValidation)?;

        for (label, ds) in [("ds1", &self.datasets.ds1), ("ds2", &self.datasets.ds2)] {
            if ds.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "dataset '{label}': file must not be empty"
                )));
            }
            let columns = &ds.columns;
            let named = columns.mandatory().into_iter().chain(columns.optional());
            for (unified, src) in named {
                if src.trim().is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "dataset '{label}': column for '{unified}' must not be empty"
                    )));
                }
            }
        }

        if self.datasets.ds1.file == self.datasets.ds2.file {
            return Err(ReconError::ConfigValidation(format!(
                "ds1 and ds2 point at the same file '{}'",
                self.datasets.ds1.file
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
