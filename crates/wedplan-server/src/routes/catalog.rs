//! Public catalog endpoints.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use wedplan_core::models::package::Package;
use wedplan_core::repository::PackageRepository;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/packages", get(list_packages))
        .route("/booked-dates", get(booked_dates))
}

/// `GET /api/packages`
pub async fn list_packages(State(state): State<AppState>) -> Result<Json<Vec<Package>>, ApiError> {
    Ok(Json(state.packages.list_active().await?))
}

/// `GET /api/booked-dates`
pub async fn booked_dates(State(state): State<AppState>) -> Result<Json<Vec<NaiveDate>>, ApiError> {
    Ok(Json(state.booking.list_booked_dates().await?))
}
