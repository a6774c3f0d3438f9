//! Administrator endpoints. Every route requires an admin token.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router, middleware};
use serde::Deserialize;
use uuid::Uuid;
use wedplan_core::models::order::{AdminOrderView, FinancialSummary, Order};
use wedplan_core::models::task::PreparationTask;

use super::OrderMessage;
use crate::context::{auth_middleware, require_admin};
use crate::error::ApiError;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/orders", get(list_orders))
        .route("/admin/orders/approve/:order_id", put(approve_payment))
        .route("/admin/financial-summary", get(financial_summary))
        .route("/admin/orders/:order_id/tasks", get(order_tasks))
        .route("/admin/tasks/:task_id", put(toggle_task))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

#[derive(Debug, Deserialize)]
pub struct ToggleTaskRequest {
    pub is_done: bool,
}

/// `GET /api/admin/orders`
pub async fn list_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminOrderView>>, ApiError> {
    Ok(Json(state.booking.list_all_orders().await?))
}

/// `PUT /api/admin/orders/approve/:order_id`: approve and provision.
pub async fn approve_payment(
    State(state): State<AppState>,
    order_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<OrderMessage<Order>>, ApiError> {
    let Path(order_id) = order_id?;
    let order = state.booking.approve_payment(order_id).await?;
    Ok(Json(OrderMessage {
        message: "payment approved",
        order,
    }))
}

/// `GET /api/admin/financial-summary`
pub async fn financial_summary(
    State(state): State<AppState>,
) -> Result<Json<FinancialSummary>, ApiError> {
    Ok(Json(state.booking.financial_summary().await?))
}

/// `GET /api/admin/orders/:order_id/tasks`
pub async fn order_tasks(
    State(state): State<AppState>,
    order_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<PreparationTask>>, ApiError> {
    let Path(order_id) = order_id?;
    Ok(Json(state.booking.list_tasks_for_order(order_id).await?))
}

/// `PUT /api/admin/tasks/:task_id`: body `{"is_done": bool}`.
pub async fn toggle_task(
    State(state): State<AppState>,
    task_id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<ToggleTaskRequest>, JsonRejection>,
) -> Result<Json<PreparationTask>, ApiError> {
    let Path(task_id) = task_id?;
    let Json(body) = body.map_err(|_| ApiError::bad_request("is_done (true/false) is required"))?;
    Ok(Json(state.booking.toggle_task(task_id, body.is_done).await?))
}
