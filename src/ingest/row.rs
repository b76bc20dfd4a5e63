//! Decoding of one source row.
//!
//! Rows have no header. Column 6 holds a JSON object describing the station;
//! columns 0, 2 and 9 hold the bike, e-bike and free-dock counts.

use csv::ByteRecord;
use serde::Deserialize;

use super::error::{RowError, SkipReason};
use crate::de::string_or_number;
use crate::stations::model::{NewStation, DEFAULT_STATUS};

pub const BIKES_COLUMN: usize = 0;
pub const E_BIKES_COLUMN: usize = 2;
pub const PAYLOAD_COLUMN: usize = 6;
pub const FREE_DOCKS_COLUMN: usize = 9;

/// Cell spellings the export uses for "no value".
const NA_VALUES: &[&str] = &["NA", "N/A", "n/a", "#N/A", "NaN", "nan", "null", "NULL", "None"];

#[derive(Debug, Deserialize)]
struct StationPayload {
    #[serde(default, deserialize_with = "string_or_number")]
    code: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    gps: Option<GpsPayload>,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GpsPayload {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Station(NewStation),
    Skipped(SkipReason),
}

pub fn parse_row(record: &ByteRecord) -> Result<RowOutcome, RowError> {
    let raw = record
        .get(PAYLOAD_COLUMN)
        .filter(|raw| !is_missing(raw))
        .ok_or(RowError::MissingPayload)?;
    let payload: StationPayload = serde_json::from_slice(raw)?;

    let nb_bikes = parse_count(record, BIKES_COLUMN)?;
    let nb_e_bikes = parse_count(record, E_BIKES_COLUMN)?;
    let nb_free_docks = parse_count(record, FREE_DOCKS_COLUMN)?;

    let code = payload.code.unwrap_or_default();
    let gps = payload.gps.unwrap_or_default();
    let latitude = gps.latitude.unwrap_or(0.0);
    let longitude = gps.longitude.unwrap_or(0.0);

    // Zero stands for "no position" in the export, even at the equator or Greenwich.
    if code.is_empty() {
        return Ok(RowOutcome::Skipped(SkipReason::MissingCode));
    }
    if latitude == 0.0 {
        return Ok(RowOutcome::Skipped(SkipReason::MissingLatitude));
    }
    if longitude == 0.0 {
        return Ok(RowOutcome::Skipped(SkipReason::MissingLongitude));
    }

    Ok(RowOutcome::Station(NewStation {
        code,
        name: payload.name.unwrap_or_default(),
        latitude,
        longitude,
        nb_bikes,
        nb_e_bikes,
        nb_free_docks,
        status: payload.state.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
    }))
}

fn is_missing(raw: &[u8]) -> bool {
    match std::str::from_utf8(raw) {
        Ok(text) => {
            let text = text.trim();
            text.is_empty() || NA_VALUES.contains(&text)
        }
        Err(_) => false,
    }
}

/// Absent or blank cells count as 0. Decimal text is truncated toward zero.
fn parse_count(record: &ByteRecord, column: usize) -> Result<i32, RowError> {
    let Some(raw) = record.get(column) else {
        return Ok(0);
    };
    if is_missing(raw) {
        return Ok(0);
    }

    let invalid = || RowError::Count {
        column,
        value: String::from_utf8_lossy(raw).into_owned(),
    };
    let text = std::str::from_utf8(raw).map_err(|_| invalid())?.trim();

    let value = match text.parse::<i64>() {
        Ok(n) => n,
        Err(_) => match text.parse::<f64>() {
            Ok(f) if f.is_finite() => f.trunc() as i64,
            _ => return Err(invalid()),
        },
    };
    i32::try_from(value)
        .ok()
        .filter(|n| *n >= 0)
        .ok_or_else(invalid)
}
