use serde::{Deserialize, Serialize};

use super::model::{NewStation, Station, StationPatch, StationWithDistance, DEFAULT_STATUS};
use crate::{de::empty_as_none, error::ApiError};

/// Plain listing never returns more than this many rows.
pub const LISTING_LIMIT: i64 = 100;

/// Blank values count as absent, so `?lat=&lng=` is a plain listing.
#[derive(Debug, Default, Deserialize)]
pub struct StationQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub radius: Option<i64>,
}

/// `GET /api/stations` answers with one of two shapes.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StationsResponse {
    Nearby(Vec<StationWithDistance>),
    Listing(Vec<Station>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStationRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub nb_bikes: Option<i32>,
    pub nb_e_bikes: Option<i32>,
    pub nb_free_docks: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStationRequest {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub nb_bikes: Option<i32>,
    pub nb_e_bikes: Option<i32>,
    pub nb_free_docks: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedStationResponse {
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct UpdatedStationResponse {
    pub message: String,
    pub station: Station,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::validation(format!("missing field: {field}")))
}

pub(crate) fn check_latitude(lat: f64) -> Result<f64, ApiError> {
    if lat.is_finite() && (-90.0..=90.0).contains(&lat) {
        Ok(lat)
    } else {
        Err(ApiError::validation("latitude must be within [-90, 90]"))
    }
}

pub(crate) fn check_longitude(lng: f64) -> Result<f64, ApiError> {
    if lng.is_finite() && (-180.0..=180.0).contains(&lng) {
        Ok(lng)
    } else {
        Err(ApiError::validation("longitude must be within [-180, 180]"))
    }
}

fn check_count(value: i32, field: &str) -> Result<i32, ApiError> {
    if value >= 0 {
        Ok(value)
    } else {
        Err(ApiError::validation(format!("{field} must not be negative")))
    }
}

impl TryFrom<CreateStationRequest> for NewStation {
    type Error = ApiError;

    fn try_from(req: CreateStationRequest) -> Result<Self, Self::Error> {
        let code = required(req.code, "code")?.trim().to_string();
        if code.is_empty() {
            return Err(ApiError::validation("code must not be empty"));
        }
        Ok(NewStation {
            code,
            name: required(req.name, "name")?,
            latitude: check_latitude(required(req.latitude, "latitude")?)?,
            longitude: check_longitude(required(req.longitude, "longitude")?)?,
            nb_bikes: check_count(req.nb_bikes.unwrap_or(0), "nbBikes")?,
            nb_e_bikes: check_count(req.nb_e_bikes.unwrap_or(0), "nbEBikes")?,
            nb_free_docks: check_count(req.nb_free_docks.unwrap_or(0), "nbFreeDocks")?,
            status: req.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        })
    }
}

impl TryFrom<UpdateStationRequest> for StationPatch {
    type Error = ApiError;

    fn try_from(req: UpdateStationRequest) -> Result<Self, Self::Error> {
        Ok(StationPatch {
            name: req.name,
            latitude: req.latitude.map(check_latitude).transpose()?,
            longitude: req.longitude.map(check_longitude).transpose()?,
            nb_bikes: req.nb_bikes.map(|v| check_count(v, "nbBikes")).transpose()?,
            nb_e_bikes: req.nb_e_bikes.map(|v| check_count(v, "nbEBikes")).transpose()?,
            nb_free_docks: req
                .nb_free_docks
                .map(|v| check_count(v, "nbFreeDocks"))
                .transpose()?,
            status: req.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> CreateStationRequest {
        serde_json::from_value(serde_json::json!({
            "code": "16107",
            "name": "Benjamin Godard - Victor Hugo",
            "latitude": 48.865983,
            "longitude": 2.275725,
        }))
        .unwrap()
    }

    #[test]
    fn create_fills_defaults() {
        let s = NewStation::try_from(full_request()).unwrap();
        assert_eq!(s.nb_bikes, 0);
        assert_eq!(s.nb_e_bikes, 0);
        assert_eq!(s.nb_free_docks, 0);
        assert_eq!(s.status, DEFAULT_STATUS);
    }

    #[test]
    fn create_requires_each_mandatory_field() {
        for missing in ["code", "name", "latitude", "longitude"] {
            let mut req = full_request();
            match missing {
                "code" => req.code = None,
                "name" => req.name = None,
                "latitude" => req.latitude = None,
                _ => req.longitude = None,
            }
            let err = NewStation::try_from(req).unwrap_err();
            assert!(err.to_string().contains(missing), "{err}");
        }
    }

    #[test]
    fn create_rejects_blank_code_and_bad_values() {
        let mut req = full_request();
        req.code = Some("   ".into());
        assert!(NewStation::try_from(req).is_err());

        let mut req = full_request();
        req.latitude = Some(91.0);
        assert!(NewStation::try_from(req).is_err());

        let mut req = full_request();
        req.nb_bikes = Some(-1);
        assert!(NewStation::try_from(req).is_err());
    }

    #[test]
    fn update_validates_only_present_fields() {
        let patch = StationPatch::try_from(UpdateStationRequest {
            nb_bikes: Some(4),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.nb_bikes, Some(4));
        assert_eq!(patch.latitude, None);

        let err = StationPatch::try_from(UpdateStationRequest {
            longitude: Some(200.0),
            ..Default::default()
        });
        assert!(err.is_err());
    }

    #[test]
    fn update_ignores_code() {
        let req: UpdateStationRequest =
            serde_json::from_value(serde_json::json!({ "code": "other", "name": "New" })).unwrap();
        let patch = StationPatch::try_from(req).unwrap();
        assert_eq!(patch.name.as_deref(), Some("New"));
    }
}
