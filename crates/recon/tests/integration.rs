use std::path::PathBuf;

use regmerge_io::read_csv;
use regmerge_recon::config::ReconConfig;
use regmerge_recon::engine::run;
use regmerge_recon::model::{CompanyRow, ReconInput, ReconResult};
use regmerge_recon::ReconError;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_config() -> ReconConfig {
    let toml = std::fs::read_to_string(fixtures_dir().join("regmerge.toml")).unwrap();
    ReconConfig::from_toml(&toml).unwrap()
}

fn load_and_run(config: &ReconConfig) -> Result<ReconResult, ReconError> {
    let dir = fixtures_dir();
    let input = ReconInput {
        ds1: read_csv(&dir.join(&config.datasets.ds1.file)).unwrap(),
        ds2: read_csv(&dir.join(&config.datasets.ds2.file)).unwrap(),
    };
    run(config, &input)
}

fn company<'a>(result: &'a ReconResult, id: &str) -> &'a CompanyRow {
    result
        .companies
        .iter()
        .find(|c| c.company_id_ds1 == id)
        .unwrap_or_else(|| panic!("no merged row for company {id}"))
}

fn matched_pairs(result: &ReconResult) -> Vec<(String, String, String)> {
    result
        .matches
        .iter()
        .map(|m| {
            (
                format!("{}/{}", m.ds1_customer_id, m.ds1_address_code),
                format!("{}/{}", m.ds2_customer_id, m.ds2_address_code),
                format!("{:.2}", m.score),
            )
        })
        .collect()
}

// -------------------------------------------------------------------------
// End-to-end
// -------------------------------------------------------------------------

#[test]
fn fixture_matches_in_ds1_order() {
    let result = load_and_run(&fixture_config()).unwrap();

    let expected: Vec<(String, String, String)> = [
        ("1/A", "X/1", "100.00"),
        ("1/B", "X/2", "100.00"),
        ("1/C", "U/1", "100.00"),
        ("2/A", "Y/1", "100.00"),
        ("5/A", "W/1", "88.89"),
        ("6/A", "X/1", "100.00"),
    ]
    .iter()
    .map(|(a, b, s)| (a.to_string(), b.to_string(), s.to_string()))
    .collect();
    assert_eq!(matched_pairs(&result), expected);
}

#[test]
fn fixture_merged_rows() {
    let result = load_and_run(&fixture_config()).unwrap();

    let ids: Vec<&str> = result.companies.iter().map(|c| c.company_id_ds1.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6"]);

    let acme = company(&result, "1");
    assert_eq!(acme.company_name_ds1, "Acme Inc.");
    assert_eq!(acme.matched_company_ids_ds2, vec!["U", "X"]);
    assert_eq!(acme.matched_company_names_ds2, vec!["ACME", "ACME Ottawa Inc"]);
    assert_eq!(
        acme.overlapping_locations,
        vec![
            "1 main st|toronto|ON|M9W4Y1|canada",
            "10 queen st|ottawa|ON||canada",
            "22 king st w suite 400|vancouver|BC||canada",
        ]
    );
    assert_eq!(acme.locations_ds1_loose.len(), 3);

    let unnamed = company(&result, "4");
    assert_eq!(unnamed.company_name_ds1, "");
    assert!(unnamed.matched_company_ids_ds2.is_empty());
}

#[test]
fn fixture_metrics() {
    let result = load_and_run(&fixture_config()).unwrap();
    let m = &result.metrics;

    assert_eq!(m.ds1_companies_total, 6);
    assert_eq!(m.ds2_companies_total, 6);
    assert_eq!(m.ds1_matched_companies, 4);
    assert_eq!(m.ds2_matched_companies, 4);
    assert!((m.match_rate_ds1 - 4.0 / 6.0).abs() < 1e-12);
    assert!((m.unmatched_records - 4.0 / 12.0).abs() < 1e-12);
    // Company 1 fans out to U and X; X is claimed by companies 1 and 6.
    assert_eq!(m.ds1_one_to_many_companies, 1);
    assert_eq!(m.ds2_one_to_many_companies, 1);
    assert_eq!(m.one_to_many_rate_ds1, 0.25);
    assert_eq!(m.address_level_matches, 6);

    assert_eq!(result.meta.config_name, "fixture registry merge");
    assert_eq!(result.meta.ds1_records, 8);
    assert_eq!(result.meta.ds2_records, 7);
}

// -------------------------------------------------------------------------
// Blocking, thresholds, rendering
// -------------------------------------------------------------------------

#[test]
fn blocking_keeps_different_postal_codes_apart() {
    // "Maple Leaf Foods" exists in both, but DS1 has postal K1A0B1 and DS2 is blocked
    // by city.
    let result = load_and_run(&fixture_config()).unwrap();
    assert!(result.matches.iter().all(|m| m.ds1_customer_id != "3"));
    assert!(company(&result, "3").matched_company_ids_ds2.is_empty());
}

#[test]
fn postal_threshold_admits_near_names() {
    let mut config = fixture_config();
    config.thresholds.with_postal = 90.0;
    let result = load_and_run(&config).unwrap();
    assert!(result.matches.iter().all(|m| m.ds1_customer_id != "5"));
    assert_eq!(result.matches.len(), 5);
}

#[test]
fn overlap_cells_follow_rendering_rules() {
    let result = load_and_run(&fixture_config()).unwrap();

    // Street differs ("500 bay st" vs "500 bay street"); city/state/postal agree.
    let northwind = company(&result, "2").to_cells();
    assert_eq!(northwind[8], "");
    assert_eq!(northwind[9], r#"["toronto|ON|M5H2N2|canada"]"#);

    let maple = company(&result, "3").to_cells();
    assert_eq!(maple[4], "[]");
    assert_eq!(maple[8], "");
    assert_eq!(maple[9], "[]");
}

#[test]
fn country_inferred_from_postal_or_code() {
    let result = load_and_run(&fixture_config()).unwrap();
    // DS1 company 2 has no country; DS2 X/1 has none but ccode CA.
    assert_eq!(
        company(&result, "2").locations_ds1,
        vec!["500 bay st|toronto|ON|M5H2N2|canada"]
    );
    assert!(company(&result, "1")
        .locations_ds2
        .contains(&"1 main st|toronto|ON|M9W4Y1|canada".to_string()));
}

// -------------------------------------------------------------------------
// Errors
// -------------------------------------------------------------------------

#[test]
fn schema_error_names_all_missing_columns() {
    let config = fixture_config();
    let dir = fixtures_dir();
    let input = ReconInput {
        ds1: read_csv(&dir.join("ds1_bad_schema.csv")).unwrap(),
        ds2: read_csv(&dir.join("ds2.csv")).unwrap(),
    };
    let err = run(&config, &input).unwrap_err();
    match err {
        ReconError::Schema { dataset, missing, available } => {
            assert_eq!(dataset, "ds1");
            assert_eq!(missing, vec!["custname", "sCountry"]);
            assert_eq!(available[2], "name");
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn default_config_matches_fixture_config() {
    let config = fixture_config();
    let default = ReconConfig::default();
    assert_eq!(config.datasets.ds1.columns, default.datasets.ds1.columns);
    assert_eq!(config.datasets.ds2.columns, default.datasets.ds2.columns);
    assert_eq!(config.thresholds, default.thresholds);
}
