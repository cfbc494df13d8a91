//! Schema unification and field normalization.
//!
//! Maps a source table onto [`UnifiedRecord`]s through a [`ColumnMapping`], then derives
//! the normalized text fields and the block/location keys used by matching and overlap.
//! Every field function here is total: empty input yields empty output.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ColumnMapping;
use crate::error::ReconError;
use crate::model::{RawTable, UnifiedRecord};

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").expect("valid regex"));
static SAINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bsaint\b").expect("valid regex"));
static CANADIAN_POSTAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z][0-9][a-z][0-9][a-z][0-9]$").expect("valid regex"));

/// Legal-entity and connector tokens dropped from company names.
pub const NAME_NOISE: [&str; 17] = [
    "inc", "incorporated", "corp", "corporation", "co", "company", "llc", "ltd", "limited",
    "plc", "gmbh", "group", "holdings", "holding", "the", "&", "and",
];

const KEY_SEPARATOR: &str = "|";

// ---------------------------------------------------------------------------
// Field functions
// ---------------------------------------------------------------------------

/// Lowercase, trim, collapse internal whitespace to single spaces.
pub fn normalize_text(value: &str) -> String {
    collapse_whitespace(&value.to_lowercase())
}

/// Uppercase with every whitespace character removed.
pub fn normalize_postal(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Uppercase state/province; Canadian province names become their 2-letter codes.
pub fn normalize_state(value: &str) -> String {
    let state = normalize_text(value).to_uppercase();
    match canadian_province_code(&state) {
        Some(code) => code.to_string(),
        None => state,
    }
}

fn canadian_province_code(state: &str) -> Option<&'static str> {
    let code = match state {
        "ONTARIO" => "ON",
        "BRITISH COLUMBIA" => "BC",
        "ALBERTA" => "AB",
        "SASKATCHEWAN" => "SK",
        "MANITOBA" => "MB",
        "QUEBEC" => "QC",
        "NOVA SCOTIA" => "NS",
        "NEW BRUNSWICK" => "NB",
        "PRINCE EDWARD ISLAND" => "PE",
        "NEWFOUNDLAND AND LABRADOR" => "NL",
        "NORTHWEST TERRITORIES" => "NT",
        "NUNAVUT" => "NU",
        "YUKON" => "YT",
        _ => return None,
    };
    Some(code)
}

/// Company name reduced to its distinguishing tokens.
///
/// Punctuation becomes whitespace, "saint" becomes "st", single-character tokens and
/// [`NAME_NOISE`] tokens are dropped.
pub fn normalize_customer_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let stripped = collapse_whitespace(&NON_ALNUM.replace_all(&lowered, " "));
    let abbreviated = SAINT.replace_all(&stripped, "st");

    abbreviated
        .split_whitespace()
        .filter(|token| token.chars().count() > 1)
        .filter(|token| !NAME_NOISE.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase, punctuation stripped, whitespace collapsed.
pub fn normalize_street(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    collapse_whitespace(&NON_ALNUM.replace_all(&lowered, " "))
}

/// Join the available street lines with single spaces, skipping blank lines.
pub fn build_street_full(street1: &str, street2: Option<&str>, street3: Option<&str>) -> String {
    [Some(street1), street2, street3]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `A1A1A1`-shaped postal code (letters case-insensitive, no separators).
pub fn is_canadian_postal(postal_norm: &str) -> bool {
    CANADIAN_POSTAL.is_match(postal_norm)
}

/// Pipe-joined key; empty when every part is empty.
pub fn make_key(parts: &[&str]) -> String {
    let joined = parts.join(KEY_SEPARATOR);
    if joined.replace(KEY_SEPARATOR, "").trim().is_empty() {
        String::new()
    } else {
        joined
    }
}

/// `country|postal` when a postal code is present, `country|city` otherwise.
pub fn block_key(country_norm: &str, postal_norm: &str, city_norm: &str) -> String {
    if postal_norm.is_empty() {
        format!("{country_norm}{KEY_SEPARATOR}{city_norm}")
    } else {
        format!("{country_norm}{KEY_SEPARATOR}{postal_norm}")
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Raw unified fields of one source row, borrowed from the table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceFields<'a> {
    pub customer_id: &'a str,
    pub address_code: &'a str,
    pub customer_name: &'a str,
    pub street1: &'a str,
    pub street2: Option<&'a str>,
    pub street3: Option<&'a str>,
    pub city: &'a str,
    pub state: &'a str,
    pub postal: &'a str,
    pub country: &'a str,
    pub country_code: Option<&'a str>,
}

/// Build a unified record and all of its derived fields.
pub fn normalize_fields(src: &SourceFields<'_>) -> UnifiedRecord {
    let street_full = build_street_full(src.street1, src.street2, src.street3);
    let customer_name_norm = normalize_customer_name(src.customer_name);
    let city_norm = normalize_text(src.city);
    let state_norm = normalize_state(src.state);
    let postal_norm = normalize_postal(src.postal);
    let country_norm = infer_country(normalize_text(src.country), src.country_code, &postal_norm);
    let street_norm = normalize_street(&street_full);

    let block = block_key(&country_norm, &postal_norm, &city_norm);
    let location_key = make_key(&[
        street_norm.as_str(),
        city_norm.as_str(),
        state_norm.as_str(),
        postal_norm.as_str(),
        country_norm.as_str(),
    ]);
    let location_key_loose = make_key(&[
        city_norm.as_str(),
        state_norm.as_str(),
        postal_norm.as_str(),
        country_norm.as_str(),
    ]);

    UnifiedRecord {
        customer_id: src.customer_id.to_string(),
        address_code: src.address_code.to_string(),
        customer_name: src.customer_name.to_string(),
        street1: src.street1.to_string(),
        street2: src.street2.map(str::to_string),
        street3: src.street3.map(str::to_string),
        city: src.city.to_string(),
        state: src.state.to_string(),
        postal: src.postal.to_string(),
        country: src.country.to_string(),
        country_code: src.country_code.map(str::to_string),
        street_full,
        customer_name_norm,
        city_norm,
        state_norm,
        postal_norm,
        country_norm,
        street_norm,
        block_key: block,
        location_key,
        location_key_loose,
    }
}

/// Fill an empty country with "canada" from a `CA` country code or a Canadian postal
/// code. A non-empty country is returned untouched.
fn infer_country(country_norm: String, country_code: Option<&str>, postal_norm: &str) -> String {
    if !country_norm.is_empty() {
        return country_norm;
    }
    let code_is_ca = country_code
        .map(|code| code.eq_ignore_ascii_case("CA"))
        .unwrap_or(false);
    if code_is_ca || is_canadian_postal(postal_norm) {
        "canada".to_string()
    } else {
        country_norm
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Column positions of the unified fields in one source table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIndex {
    customer_id: usize,
    address_code: usize,
    customer_name: usize,
    street1: usize,
    street2: Option<usize>,
    street3: Option<usize>,
    city: usize,
    state: usize,
    postal: usize,
    country: usize,
    country_code: Option<usize>,
}

/// Resolve the column mapping against the table headers.
///
/// Fails with [`ReconError::Schema`] naming every absent mandatory source column.
/// Optional columns that are mapped but absent are skipped.
pub fn apply_schema(
    dataset: &str,
    table: &RawTable,
    columns: &ColumnMapping,
) -> Result<SchemaIndex, ReconError> {
    let missing: Vec<String> = columns
        .mandatory()
        .iter()
        .filter(|(_, src)| table.column_index(src).is_none())
        .map(|(_, src)| src.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(ReconError::Schema {
            dataset: dataset.to_string(),
            missing,
            available: table.headers.clone(),
        });
    }

    // Mandatory lookups are known to succeed past this point.
    let idx = |src: &str| table.column_index(src).unwrap_or_default();
    let opt = |src: &Option<String>| src.as_deref().and_then(|s| table.column_index(s));

    Ok(SchemaIndex {
        customer_id: idx(columns.customer_id.as_str()),
        address_code: idx(columns.address_code.as_str()),
        customer_name: idx(columns.customer_name.as_str()),
        street1: idx(columns.street1.as_str()),
        street2: opt(&columns.street2),
        street3: opt(&columns.street3),
        city: idx(columns.city.as_str()),
        state: idx(columns.state.as_str()),
        postal: idx(columns.postal.as_str()),
        country: idx(columns.country.as_str()),
        country_code: opt(&columns.country_code),
    })
}

/// Apply the schema and normalize every row of a source table, in row order.
pub fn normalize_dataset(
    dataset: &str,
    table: &RawTable,
    columns: &ColumnMapping,
) -> Result<Vec<UnifiedRecord>, ReconError> {
    let schema = apply_schema(dataset, table, columns)?;

    let records: Vec<UnifiedRecord> = (0..table.len())
        .map(|row| {
            let cell = |col: usize| table.cell(row, col);
            let src = SourceFields {
                customer_id: cell(schema.customer_id),
                address_code: cell(schema.address_code),
                customer_name: cell(schema.customer_name),
                street1: cell(schema.street1),
                street2: schema.street2.map(cell),
                street3: schema.street3.map(cell),
                city: cell(schema.city),
                state: cell(schema.state),
                postal: cell(schema.postal),
                country: cell(schema.country),
                country_code: schema.country_code.map(cell),
            };
            normalize_fields(&src)
        })
        .collect();

    let inferred = records
        .iter()
        .filter(|r| r.country_norm == "canada" && normalize_text(&r.country).is_empty())
        .count();
    debug!(
        "{dataset}: normalized {} rows ({} with inferred country)",
        records.len(),
        inferred
    );

    Ok(records)
}

/// Derived columns a pre-normalized table must carry to be matchable.
pub const MATCH_REQUIRED_COLUMNS: [&str; 5] = [
    "customer_id",
    "address_code",
    "block_key",
    "postal_norm",
    "customer_name_norm",
];

/// Rebuild unified records from a table previously exported with the normalized
/// header. Only [`MATCH_REQUIRED_COLUMNS`] are mandatory; other columns default to empty,
/// and empty optional street/country-code cells read back as `None`.
pub fn records_from_normalized_table(table: &RawTable) -> Result<Vec<UnifiedRecord>, ReconError> {
    let missing: Vec<&str> = MATCH_REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| table.column_index(name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ReconError::MatchingPrecondition(format!(
            "table is missing derived columns: {}. Available: {}",
            missing.join(", "),
            table.headers.join(", "),
        )));
    }

    let records = (0..table.len())
        .map(|row| {
            let get = |name: &str| {
                table
                    .column_index(name)
                    .map(|col| table.cell(row, col).to_string())
                    .unwrap_or_default()
            };
            // Exported optional fields cannot distinguish absent from empty.
            let get_opt = |name: &str| Some(get(name)).filter(|v| !v.is_empty());
            UnifiedRecord {
                customer_id: get("customer_id"),
                address_code: get("address_code"),
                customer_name: get("customer_name"),
                street1: get("street1"),
                street2: get_opt("street2"),
                street3: get_opt("street3"),
                city: get("city"),
                state: get("state"),
                postal: get("postal"),
                country: get("country"),
                country_code: get_opt("country_code"),
                street_full: get("street_full"),
                customer_name_norm: get("customer_name_norm"),
                city_norm: get("city_norm"),
                state_norm: get("state_norm"),
                postal_norm: get("postal_norm"),
                country_norm: get("country_norm"),
                street_norm: get("street_norm"),
                block_key: get("block_key"),
                location_key: get("location_key"),
                location_key_loose: get("location_key_loose"),
            }
        })
        .collect();

    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
