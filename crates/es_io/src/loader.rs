//! District CSV ingestion (Cook PVI layout).
//!
//! Columns are matched by header name: `State`, `Number`, `Member` (or
//! `Incumbent`), optional `Party`, the lean column (`2025 Cook PVI`, `PVI`
//! or `Lean`), and optional `D%` / `R%`. Other columns are ignored.
//!
//! A row that cannot become a `DistrictVotingRecord` is collected as a
//! `DataError` and the load continues. Rows with an empty `State` are blank
//! separators and are skipped silently. Records come back sorted by district id.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use es_core::determinism::sort_records_by_district;
use es_core::entities::parse_lean;
use es_core::{DataError, DistrictId, DistrictVotingRecord, Party};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{looks_like_url_strict, IoError, IoResult};

/// Full state names to USPS codes.
const STATE_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Alabama", "AL"), ("Alaska", "AK"), ("Arizona", "AZ"), ("Arkansas", "AR"), ("California", "CA"),
    ("Colorado", "CO"), ("Connecticut", "CT"), ("Delaware", "DE"), ("Florida", "FL"), ("Georgia", "GA"),
    ("Hawaii", "HI"), ("Idaho", "ID"), ("Illinois", "IL"), ("Indiana", "IN"), ("Iowa", "IA"),
    ("Kansas", "KS"), ("Kentucky", "KY"), ("Louisiana", "LA"), ("Maine", "ME"), ("Maryland", "MD"),
    ("Massachusetts", "MA"), ("Michigan", "MI"), ("Minnesota", "MN"), ("Mississippi", "MS"), ("Missouri", "MO"),
    ("Montana", "MT"), ("Nebraska", "NE"), ("Nevada", "NV"), ("New Hampshire", "NH"), ("New Jersey", "NJ"),
    ("New Mexico", "NM"), ("New York", "NY"), ("North Carolina", "NC"), ("North Dakota", "ND"), ("Ohio", "OH"),
    ("Oklahoma", "OK"), ("Oregon", "OR"), ("Pennsylvania", "PA"), ("Rhode Island", "RI"), ("South Carolina", "SC"),
    ("South Dakota", "SD"), ("Tennessee", "TN"), ("Texas", "TX"), ("Utah", "UT"), ("Vermont", "VT"),
    ("Virginia", "VA"), ("Washington", "WA"), ("West Virginia", "WV"), ("Wisconsin", "WI"), ("Wyoming", "WY"),
    ("District of Columbia", "DC"),
];

/// Result of reading one district file.
#[derive(Debug, Clone, Default)]
pub struct DistrictLoad {
    pub records: Vec<DistrictVotingRecord>,
    pub rejected: Vec<DataError>,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "State", default)]
    state: String,
    #[serde(rename = "Number", default)]
    number: Option<String>,
    #[serde(rename = "Member", alias = "Incumbent", default)]
    member: String,
    #[serde(rename = "Party", default)]
    party: Option<String>,
    #[serde(rename = "2025 Cook PVI", alias = "PVI", alias = "Lean", default)]
    pvi: Option<String>,
    #[serde(rename = "D%", default)]
    d_pct: Option<String>,
    #[serde(rename = "R%", default)]
    r_pct: Option<String>,
}

/// USPS code for a state name; two-letter codes pass through, anything else
/// falls back to its first two letters upper-cased.
pub fn state_code(name: &str) -> String {
    let name = name.trim();
    if let Some((_, code)) = STATE_ABBREVIATIONS.iter().find(|(full, _)| full.eq_ignore_ascii_case(name)) {
        return (*code).to_string();
    }
    name.chars().filter(|c| c.is_ascii_alphabetic()).take(2).collect::<String>().to_ascii_uppercase()
}

/// `AL` / `At-Large` become `01`; numbers are zero-padded to two digits.
pub fn district_number(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("al") || s.eq_ignore_ascii_case("at-large") || s.eq_ignore_ascii_case("at large") {
        return Some("01".to_string());
    }
    s.parse::<u32>().ok().map(|n| format!("{n:02}"))
}

fn parse_pct(row: usize, field: &'static str, raw: Option<&str>) -> Result<Option<f64>, DataError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .trim_end_matches('%')
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| DataError::Malformed { row, msg: format!("{field} is not a number: {s:?}") }),
    }
}

fn to_record(row: usize, raw: RawRow) -> Result<DistrictVotingRecord, DataError> {
    let number_raw = raw.number.unwrap_or_default();
    if number_raw.trim().is_empty() {
        return Err(DataError::MissingField { row, field: "Number" });
    }
    let number = district_number(&number_raw)
        .ok_or_else(|| DataError::BadDistrictNumber { row, value: number_raw.clone() })?;
    let code = state_code(&raw.state);
    let name = format!("{code}-{number}");
    let district: DistrictId = name
        .parse()
        .map_err(|e| DataError::Malformed { row, msg: format!("district id {name:?}: {e}") })?;

    let pvi = raw.pvi.unwrap_or_default();
    let lean = parse_lean(&pvi).map_err(|_| DataError::BadLean { row, district: name.clone(), value: pvi.clone() })?;

    let party = raw.party.as_deref().map(str::trim).filter(|s| !s.is_empty()).and_then(|s| s.parse::<Party>().ok());

    let mut rec = DistrictVotingRecord::new(district, lean).with_incumbent(raw.member.trim(), party);
    rec.state = code;
    if let Some(d) = parse_pct(row, "D%", raw.d_pct.as_deref())? {
        rec.d_pct = d;
        rec.r_pct = parse_pct(row, "R%", raw.r_pct.as_deref())?.unwrap_or(100.0 - d);
    }
    Ok(rec)
}

/// Parse districts from any CSV source with a header row.
pub fn load_districts_from_reader<R: Read>(reader: R) -> IoResult<DistrictLoad> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut headers = rdr.headers()?.clone();
    // Spreadsheet exports sometimes keep a BOM on the first header.
    if let Some(first) = headers.get(0) {
        if first.starts_with('\u{feff}') {
            let fixed: Vec<String> = headers
                .iter()
                .enumerate()
                .map(|(i, h)| if i == 0 { h.trim_start_matches('\u{feff}').to_string() } else { h.to_string() })
                .collect();
            headers = csv::StringRecord::from(fixed);
        }
    }
    if !headers.iter().any(|h| h == "State") {
        return Err(IoError::Invalid("district file has no State column".into()));
    }

    let mut load = DistrictLoad::default();
    let mut seen: BTreeSet<DistrictId> = BTreeSet::new();
    for (i, result) in rdr.records().enumerate() {
        // header is line 1
        let row = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                load.rejected.push(DataError::Malformed { row, msg: e.to_string() });
                continue;
            }
        };
        let raw: RawRow = match record.deserialize(Some(&headers)) {
            Ok(r) => r,
            Err(e) => {
                load.rejected.push(DataError::Malformed { row, msg: e.to_string() });
                continue;
            }
        };
        if raw.state.trim().is_empty() {
            debug!(row, "skipping row without state");
            continue;
        }
        match to_record(row, raw) {
            Ok(rec) if !seen.insert(rec.district.clone()) => {
                load.rejected.push(DataError::Malformed { row, msg: format!("duplicate district {}", rec.district) });
            }
            Ok(rec) => load.records.push(rec),
            Err(e) => load.rejected.push(e),
        }
    }

    for e in &load.rejected {
        warn!(error = %e, "district row rejected");
    }
    sort_records_by_district(&mut load.records);
    Ok(load)
}

/// Read a district CSV from disk.
pub fn load_districts(path: &Path) -> IoResult<DistrictLoad> {
    if looks_like_url_strict(&path.to_string_lossy()) {
        return Err(IoError::Invalid(format!("data file must be a local path: {}", path.display())));
    }
    let file = File::open(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let load = load_districts_from_reader(file)?;
    info!(
        path = %path.display(),
        districts = load.records.len(),
        rejected = load.rejected.len(),
        "loaded district records"
    );
    Ok(load)
}

/// Count of records per state, in state order.
pub fn districts_per_state(records: &[DistrictVotingRecord]) -> BTreeMap<String, usize> {
    let mut out = BTreeMap::new();
    for r in records {
        *out.entry(r.state.clone()).or_insert(0) += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
State,Number,Member,Party,2025 Cook PVI,Extra
Ohio,9,Marcy Kaptur,D,R+3,x
Alaska,AL,Nick Begich,R,R+6,
,,,,,
Pennsylvania,7,Ryan Mackenzie,R,EVEN,
California,12,Lateefah Simon,D,D+40,
";

    #[test]
    fn parses_ids_leans_and_incumbents() {
        let load = load_districts_from_reader(SAMPLE.as_bytes()).unwrap();
        assert!(load.rejected.is_empty(), "{:?}", load.rejected);
        let ids: Vec<&str> = load.records.iter().map(|r| r.district.as_str()).collect();
        assert_eq!(ids, vec!["AK-01", "CA-12", "OH-09", "PA-07"]);

        let oh = &load.records[2];
        assert_eq!(oh.state, "OH");
        assert_eq!(oh.lean, 3.0);
        assert_eq!(oh.incumbent, "Marcy Kaptur");
        assert_eq!(oh.incumbent_party, Some(Party::Democratic));
        assert_eq!(oh.d_pct, 48.5);

        assert_eq!(load.records[1].lean, -40.0);
        assert_eq!(load.records[3].lean, 0.0);
    }

    #[test]
    fn bad_rows_are_collected_not_fatal() {
        let csv = "\
State,Number,Incumbent,PVI
Texas,3,A,R+11
Texas,x,B,R+2
Texas,4,C,Lean R
Texas,3,D,R+1
Texas,,E,R+1
";
        let load = load_districts_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(load.records.len(), 1);
        assert_eq!(load.records[0].incumbent, "A");
        assert_eq!(load.rejected.len(), 4);
        assert!(matches!(load.rejected[0], DataError::BadDistrictNumber { row: 3, .. }));
        assert_eq!(
            load.rejected[1],
            DataError::BadLean { row: 4, district: "TX-04".into(), value: "Lean R".into() }
        );
        assert!(matches!(load.rejected[2], DataError::Malformed { row: 5, .. }));
        assert_eq!(load.rejected[3], DataError::MissingField { row: 6, field: "Number" });
    }

    #[test]
    fn explicit_vote_shares_win_over_lean() {
        let csv = "State,Number,Lean,D%,R%\nMaine,2,R+4,47.5,52.5\nMaine,1,D+9,54.0,\n";
        let load = load_districts_from_reader(csv.as_bytes()).unwrap();
        let me1 = &load.records[0];
        assert_eq!((me1.d_pct, me1.r_pct), (54.0, 46.0));
        let me2 = &load.records[1];
        assert_eq!((me2.d_pct, me2.r_pct), (47.5, 52.5));
        assert_eq!(districts_per_state(&load.records).get("ME"), Some(&2));
    }

    #[test]
    fn state_and_number_normalisation() {
        assert_eq!(state_code("New Hampshire"), "NH");
        assert_eq!(state_code("tx"), "TX");
        assert_eq!(district_number("AL").as_deref(), Some("01"));
        assert_eq!(district_number("7").as_deref(), Some("07"));
        assert_eq!(district_number("52").as_deref(), Some("52"));
        assert_eq!(district_number("seven"), None);
    }

    #[test]
    fn missing_state_column_is_fatal() {
        assert!(matches!(load_districts_from_reader("A,B\n1,2\n".as_bytes()), Err(IoError::Invalid(_))));
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let csv = "\u{feff}State,Number,PVI\nIowa,1,R+6\n";
        let load = load_districts_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(load.records[0].district.as_str(), "IA-01");
    }
}
