use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::{
    dto::{
        check_latitude, check_longitude, CreateStationRequest, CreatedStationResponse,
        StationQuery, StationsResponse, UpdateStationRequest, UpdatedStationResponse,
        LISTING_LIMIT,
    },
    model::{NewStation, StationPatch},
    nearby::{query_nearby, DEFAULT_RADIUS_METERS},
};
use crate::{auth::AuthUser, error::ApiError, geo::GeoPoint, state::AppState};

pub fn station_routes() -> Router<AppState> {
    Router::new()
        .route("/stations", get(list_stations).post(create_station))
        .route("/stations/:id", put(update_station).delete(delete_station))
}

fn bad_request(text: String) -> ApiError {
    ApiError::Validation(text)
}

#[instrument(skip(state, user, query), fields(user_id = %user.id, username = %user.username))]
pub async fn list_stations(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<StationQuery>, QueryRejection>,
) -> Result<Json<StationsResponse>, ApiError> {
    let Query(q) = query.map_err(|e| bad_request(e.body_text()))?;

    let (Some(lat), Some(lng)) = (q.lat, q.lng) else {
        let stations = state.stations.list(LISTING_LIMIT).await?;
        return Ok(Json(StationsResponse::Listing(stations)));
    };

    let center = GeoPoint::new(check_latitude(lat)?, check_longitude(lng)?);
    let radius = q.radius.unwrap_or(DEFAULT_RADIUS_METERS);
    let all = state.stations.scan().await?;
    let scanned = all.len();
    let nearby = query_nearby(center, radius, all);
    info!(lat, lng, radius, scanned, matched = nearby.len(), "proximity query");
    Ok(Json(StationsResponse::Nearby(nearby)))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id, username = %user.username))]
pub async fn create_station(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateStationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedStationResponse>), ApiError> {
    let Json(payload) = payload.map_err(|e| bad_request(e.body_text()))?;
    let new_station = NewStation::try_from(payload)?;

    if state.stations.find_by_code(&new_station.code).await?.is_some() {
        return Err(ApiError::validation(format!(
            "a station with code {:?} already exists",
            new_station.code
        )));
    }

    // A concurrent insert of the same code still fails here with DuplicateCode.
    let station = state.stations.insert(new_station).await?;

    info!(id = station.id, code = %station.code, "station created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedStationResponse {
            message: "station created".into(),
            id: station.id,
        }),
    ))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id, username = %user.username))]
pub async fn update_station(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateStationRequest>, JsonRejection>,
) -> Result<Json<UpdatedStationResponse>, ApiError> {
    let Path(id) = id.map_err(|e| bad_request(e.body_text()))?;
    let Json(payload) = payload.map_err(|e| bad_request(e.body_text()))?;
    let patch = StationPatch::try_from(payload)?;

    let station = state.stations.update(id, patch).await?;

    info!(id = station.id, code = %station.code, "station updated");
    Ok(Json(UpdatedStationResponse {
        message: "station updated".into(),
        station,
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id, username = %user.username))]
pub async fn delete_station(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id.map_err(|e| bad_request(e.body_text()))?;

    state.stations.delete(id).await?;

    info!(id, "station deleted");
    Ok(Json(json!({ "message": "station deleted" })))
}
