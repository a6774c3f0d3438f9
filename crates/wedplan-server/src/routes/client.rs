//! Client booking endpoints. Every route requires a client token.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router, middleware};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wedplan_core::models::order::{CreateOrder, OrderDetails, PaymentProof};
use wedplan_core::models::user::Principal;

use super::OrderMessage;
use crate::context::{auth_middleware, require_client};
use crate::error::ApiError;
use crate::state::AppState;

/// Multipart field names of the payment confirmation form.
const PROOF_FIELD: &str = "buktiBayar";
const ORDER_ID_FIELD: &str = "orderId";
const AMOUNT_FIELD: &str = "jumlahBayar";

/// Room for the multipart framing and text fields around the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/client/my-order", get(my_order))
        .route("/client/orders", post(create_order))
        .route(
            "/client/orders/confirm",
            post(confirm_payment).layer(DefaultBodyLimit::max(
                state.proofs.max_bytes() + MULTIPART_OVERHEAD,
            )),
        )
        .route_layer(middleware::from_fn(require_client))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

#[derive(Debug, Serialize)]
pub struct MyOrderResponse {
    pub order: Option<OrderDetails>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub package_id: Uuid,
    #[serde(alias = "tanggal_pernikahan")]
    pub wedding_date: NaiveDate,
    #[serde(alias = "total_harga")]
    pub total_price: i64,
}

/// `GET /api/client/my-order`: latest order with its checklist.
pub async fn my_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<MyOrderResponse>, ApiError> {
    let order = state
        .booking
        .current_order_for_client(principal.id)
        .await?;
    Ok(Json(MyOrderResponse { order }))
}

/// `POST /api/client/orders`
pub async fn create_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderDetails>), ApiError> {
    let Json(body) = body?;
    let details = state
        .booking
        .create_order(CreateOrder {
            user_id: principal.id,
            package_id: body.package_id,
            wedding_date: body.wedding_date,
            total_price: body.total_price,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(details)))
}

/// `POST /api/client/orders/confirm`: multipart payment proof upload.
pub async fn confirm_payment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<OrderMessage<OrderDetails>>, ApiError> {
    let form = ConfirmationForm::read(multipart?).await?;

    let proof_file = form
        .proof
        .ok_or_else(|| ApiError::bad_request("payment proof file is required"))?;
    let order_id = form
        .order_id
        .ok_or_else(|| ApiError::bad_request("orderId is required"))?;
    let order_id = Uuid::parse_str(order_id.trim())
        .map_err(|_| ApiError::bad_request("orderId is not a valid id"))?;
    let paid_amount = form
        .amount
        .ok_or_else(|| ApiError::bad_request("jumlahBayar is required"))?
        .trim()
        .parse::<i64>()
        .map_err(|_| ApiError::bad_request("jumlahBayar must be a whole number"))?;

    let stored = state
        .proofs
        .store(
            &proof_file.file_name,
            proof_file.content_type.as_deref(),
            &proof_file.bytes,
        )
        .await?;
    let proof = PaymentProof {
        proof_url: stored.public_url.clone(),
        paid_amount,
    };

    match state
        .booking
        .submit_payment_proof(order_id, principal.id, proof)
        .await
    {
        Ok(order) => Ok(Json(OrderMessage {
            message: "payment confirmation uploaded",
            order,
        })),
        Err(e) => {
            state.proofs.discard(&stored).await;
            Err(e.into())
        }
    }
}

struct ProofFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct ConfirmationForm {
    proof: Option<ProofFile>,
    order_id: Option<String>,
    amount: Option<String>,
}

impl ConfirmationForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some(PROOF_FIELD) => {
                    let file_name = field.file_name().unwrap_or_default().to_owned();
                    let content_type = field.content_type().map(str::to_owned);
                    let bytes = field.bytes().await?;
                    form.proof = Some(ProofFile {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                Some(ORDER_ID_FIELD) => form.order_id = Some(field.text().await?),
                Some(AMOUNT_FIELD) => form.amount = Some(field.text().await?),
                _ => {}
            }
        }
        Ok(form)
    }
}
