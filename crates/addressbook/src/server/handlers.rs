//! Address handlers.
//!
//! POST   /addresses               create an address
//! GET    /addresses               list every address
//! GET    /addresses/nearby        proximity search
//! GET    /addresses/:id           fetch one address
//! PUT    /addresses/:id           partial update
//! DELETE /addresses/:id           delete
//! GET    /health                  liveness

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::address::{Address, AddressUpdate, NewAddress};
use crate::error::Error;
use crate::geo::Coordinate;
use crate::proximity::{find_nearby, validate_radius};

use super::error::ApiError;
use super::{lock, AppState};

/// Body of `POST /addresses`. Every field is required.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAddressRequest {
    /// Display name, non-empty.
    pub name: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl TryFrom<CreateAddressRequest> for NewAddress {
    type Error = Error;

    fn try_from(request: CreateAddressRequest) -> Result<Self, Error> {
        let location = Coordinate::new(request.latitude, request.longitude)?;
        NewAddress::new(request.name, Some(location))
    }
}

/// Query string of `GET /addresses/nearby`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NearbyQuery {
    /// Latitude of the search center in degrees.
    pub latitude: f64,
    /// Longitude of the search center in degrees.
    pub longitude: f64,
    /// Search radius in kilometers.
    pub distance_km: f64,
}

pub async fn create_address(
    State(state): State<AppState>,
    body: Result<Json<CreateAddressRequest>, JsonRejection>,
) -> Result<Json<Address>, ApiError> {
    let Json(request) = body?;
    let new = NewAddress::try_from(request)?;

    info!("Creating address");
    let address = state.blocking(move |storage| lock(storage)?.create(&new)).await?;
    Ok(Json(address))
}

pub async fn list_addresses(
    State(state): State<AppState>,
) -> Result<Json<Vec<Address>>, ApiError> {
    let addresses = state.blocking(|storage| lock(storage)?.list()).await?;
    Ok(Json(addresses))
}

pub async fn get_address(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Address>, ApiError> {
    let Path(id) = id?;
    state
        .blocking(move |storage| lock(storage)?.get(id))
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("Address").into())
}

pub async fn update_address(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<AddressUpdate>, JsonRejection>,
) -> Result<Json<Address>, ApiError> {
    let Path(id) = id?;
    let Json(update) = body?;
    update.validate()?;

    info!("Updating address {}", id);
    state
        .blocking(move |storage| lock(storage)?.update(id, &update))
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("Address").into())
}

pub async fn delete_address(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let deleted = state
        .blocking(move |storage| lock(storage)?.delete(id))
        .await?;

    if deleted {
        Ok(Json(json!({ "message": "Address deleted successfully" })))
    } else {
        Err(Error::not_found("Address").into())
    }
}

pub async fn nearby_addresses(
    State(state): State<AppState>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> Result<Json<Vec<Address>>, ApiError> {
    let Query(query) = query?;
    let center = Coordinate::new(query.latitude, query.longitude)?;
    validate_radius(query.distance_km)?;

    let matches = state
        .blocking(move |storage| find_nearby(storage, center, query.distance_km))
        .await?;
    Ok(Json(matches))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
