use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad threshold, empty column name, etc.).
    ConfigValidation(String),
    /// Mandatory source columns absent from a dataset.
    Schema {
        dataset: String,
        missing: Vec<String>,
        available: Vec<String>,
    },
    /// Matcher inputs lack required derived columns or carry unusable thresholds.
    MatchingPrecondition(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Schema { dataset, missing, available } => write!(
                f,
                "dataset '{dataset}' is missing required columns. Missing: {}. Available: {}",
                missing.join(", "),
                available.join(", "),
            ),
            Self::MatchingPrecondition(msg) => write!(f, "matching precondition failed: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
