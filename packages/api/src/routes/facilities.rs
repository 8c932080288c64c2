//! `/v1/facilities` handlers.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::ApiError;
use crate::geocode::GeoQuery;
use crate::models::Place;
use crate::state::AppState;

/// `GET /v1/facilities/search`
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<GeoQuery>,
) -> Result<Json<Vec<Place>>, ApiError> {
    query.params()?;
    let places = state.geocoder.search(&query).await?;
    Ok(Json(places))
}
