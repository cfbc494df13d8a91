use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A source table as read from disk: ordered headers plus string rows.
///
/// Every cell is a string. Empty cells stay empty, there is no null sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Position of a header, exact match.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at (row, col). Short rows read as empty strings.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Both source tables for one run.
pub struct ReconInput {
    pub ds1: RawTable,
    pub ds2: RawTable,
}

// ---------------------------------------------------------------------------
// Unified records
// ---------------------------------------------------------------------------

/// One source row mapped into the unified schema, with derived match keys.
///
/// Derived fields are computed once by the normalizer and never modified.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnifiedRecord {
    pub customer_id: String,
    pub address_code: String,
    pub customer_name: String,
    pub street1: String,
    pub street2: Option<String>,
    pub street3: Option<String>,
    pub city: String,
    pub state: String,
    pub postal: String,
    pub country: String,
    pub country_code: Option<String>,

    pub street_full: String,
    pub customer_name_norm: String,
    pub city_norm: String,
    pub state_norm: String,
    pub postal_norm: String,
    pub country_norm: String,
    pub street_norm: String,
    pub block_key: String,
    pub location_key: String,
    pub location_key_loose: String,
}

/// Column order used when unified records are exported.
pub const NORMALIZED_HEADER: [&str; 21] = [
    "customer_id",
    "address_code",
    "customer_name",
    "street1",
    "street2",
    "street3",
    "city",
    "state",
    "postal",
    "country",
    "country_code",
    "street_full",
    "customer_name_norm",
    "city_norm",
    "state_norm",
    "postal_norm",
    "country_norm",
    "street_norm",
    "block_key",
    "location_key",
    "location_key_loose",
];

impl UnifiedRecord {
    /// Cells in [`NORMALIZED_HEADER`] order.
    pub fn to_cells(&self) -> Vec<String> {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        vec![
            self.customer_id.clone(),
            self.address_code.clone(),
            self.customer_name.clone(),
            self.street1.clone(),
            opt(&self.street2),
            opt(&self.street3),
            self.city.clone(),
            self.state.clone(),
            self.postal.clone(),
            self.country.clone(),
            opt(&self.country_code),
            self.street_full.clone(),
            self.customer_name_norm.clone(),
            self.city_norm.clone(),
            self.state_norm.clone(),
            self.postal_norm.clone(),
            self.country_norm.clone(),
            self.street_norm.clone(),
            self.block_key.clone(),
            self.location_key.clone(),
            self.location_key_loose.clone(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// An accepted address-level match. At most one per DS1 address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    pub ds1_customer_id: String,
    pub ds1_address_code: String,
    pub ds2_customer_id: String,
    pub ds2_address_code: String,
    pub score: f64,
}

pub const MATCHES_HEADER: [&str; 5] = [
    "ds1_customer_id",
    "ds1_address_code",
    "ds2_customer_id",
    "ds2_address_code",
    "score",
];

impl MatchRecord {
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.ds1_customer_id.clone(),
            self.ds1_address_code.clone(),
            self.ds2_customer_id.clone(),
            self.ds2_address_code.clone(),
            self.score.to_string(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Company-level output
// ---------------------------------------------------------------------------

/// One merged row per DS1 company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompanyRow {
    pub company_id_ds1: String,
    pub company_name_ds1: String,
    pub locations_ds1: Vec<String>,
    pub locations_ds1_loose: Vec<String>,
    pub matched_company_ids_ds2: Vec<String>,
    pub matched_company_names_ds2: Vec<String>,
    pub locations_ds2: Vec<String>,
    pub locations_ds2_loose: Vec<String>,
    pub overlapping_locations: Vec<String>,
    pub overlapping_locations_loose: Vec<String>,
}

pub const MERGED_HEADER: [&str; 10] = [
    "company_id_ds1",
    "company_name_ds1",
    "locations_ds1",
    "locations_ds1_loose",
    "matched_company_ids_ds2",
    "matched_company_names_ds2",
    "locations_ds2",
    "locations_ds2_loose",
    "overlapping_locations",
    "overlapping_locations_loose",
];

impl CompanyRow {
    /// Cells in [`MERGED_HEADER`] order. List fields are JSON arrays; an empty
    /// strict overlap (`overlapping_locations`) is an empty cell rather than `[]`,
    /// while `overlapping_locations_loose` always renders as an array.
    pub fn to_cells(&self) -> Vec<String> {
        let strict_overlap = if self.overlapping_locations.is_empty() {
            String::new()
        } else {
            json_list(&self.overlapping_locations)
        };
        vec![
            self.company_id_ds1.clone(),
            self.company_name_ds1.clone(),
            json_list(&self.locations_ds1),
            json_list(&self.locations_ds1_loose),
            json_list(&self.matched_company_ids_ds2),
            json_list(&self.matched_company_names_ds2),
            json_list(&self.locations_ds2),
            json_list(&self.locations_ds2_loose),
            strict_overlap,
            json_list(&self.overlapping_locations_loose),
        ]
    }
}

/// Encode a list of strings as a JSON array with `", "` between elements.
/// Non-ASCII is kept as-is.
pub fn json_list(values: &[String]) -> String {
    let items: Vec<String> = values
        .iter()
        .map(|v| serde_json::Value::from(v.as_str()).to_string())
        .collect();
    format!("[{}]", items.join(", "))
}

// ---------------------------------------------------------------------------
// Metrics + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub ds1_companies_total: usize,
    pub ds2_companies_total: usize,
    pub ds1_matched_companies: usize,
    pub ds2_matched_companies: usize,
    pub match_rate_ds1: f64,
    pub match_rate_ds2: f64,
    pub unmatched_records: f64,
    pub ds1_one_to_many_companies: usize,
    pub ds2_one_to_many_companies: usize,
    pub one_to_many_rate_ds1: f64,
    pub one_to_many_rate_ds2: f64,
    pub one_to_many_share_ds1: f64,
    pub one_to_many_share_ds2: f64,
    pub address_level_matches: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub threshold_strong: f64,
    pub threshold_with_postal: f64,
    pub ds1_records: usize,
    pub ds2_records: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub metrics: Metrics,
    pub matches: Vec<MatchRecord>,
    pub companies: Vec<CompanyRow>,
}
