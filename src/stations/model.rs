use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::geo::GeoPoint;

pub const DEFAULT_STATUS: &str = "Operative";

/// Station record as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub nb_bikes: i32,
    pub nb_e_bikes: i32,
    pub nb_free_docks: i32,
    pub status: String,
}

impl Station {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// A station before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStation {
    pub code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub nb_bikes: i32,
    pub nb_e_bikes: i32,
    pub nb_free_docks: i32,
    pub status: String,
}

impl NewStation {
    pub fn into_station(self, id: i64) -> Station {
        Station {
            id,
            code: self.code,
            name: self.name,
            latitude: self.latitude,
            longitude: self.longitude,
            nb_bikes: self.nb_bikes,
            nb_e_bikes: self.nb_e_bikes,
            nb_free_docks: self.nb_free_docks,
            status: self.status,
        }
    }
}

/// Partial update: `None` keeps the stored value. `code` is never patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationPatch {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub nb_bikes: Option<i32>,
    pub nb_e_bikes: Option<i32>,
    pub nb_free_docks: Option<i32>,
    pub status: Option<String>,
}

impl StationPatch {
    pub fn apply(self, station: &mut Station) {
        if let Some(v) = self.name {
            station.name = v;
        }
        if let Some(v) = self.latitude {
            station.latitude = v;
        }
        if let Some(v) = self.longitude {
            station.longitude = v;
        }
        if let Some(v) = self.nb_bikes {
            station.nb_bikes = v;
        }
        if let Some(v) = self.nb_e_bikes {
            station.nb_e_bikes = v;
        }
        if let Some(v) = self.nb_free_docks {
            station.nb_free_docks = v;
        }
        if let Some(v) = self.status {
            station.status = v;
        }
    }
}

/// Proximity result: the station plus its distance from the query center, in meters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationWithDistance {
    #[serde(flatten)]
    pub station: Station,
    pub distance: f64,
}
