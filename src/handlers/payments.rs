//! Checkout endpoints: order creation with the advance split, and in-store
//! payment confirmation. Failures use the `{ error }` body.

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    errors::ApiError,
    services::orders::{CreateOrderRequest, OrderResponse},
    AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentResponse {
    pub success: bool,
    pub order: OrderResponse,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub order_id: String,
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: String,
}

/// Create a pending order from a cart
#[utoipa::path(
    post,
    path = "/create-payment",
    summary = "Create order",
    description = "Re-prices the cart against the catalog, stores a pending order and returns the 25% advance / 75% remaining split",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created", body = CreatePaymentResponse,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid cart", body = crate::errors::FailureResponse),
        (status = 500, description = "Order could not be stored", body = crate::errors::FailureResponse),
    ),
    tag = "payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<CreatePaymentResponse>, ApiError> {
    let order = state
        .services
        .orders
        .create_order(payload)
        .await
        .map_err(|e| {
            error!(error = %e, "Order creation failed");
            ApiError::failure(&e, "Failed to create order")
        })?;

    let message = format!(
        "Order {} created. Advance due now: {:.2}; remaining {:.2} payable in store.",
        order.order_number, order.advance_paid, order.remaining
    );

    Ok(Json(CreatePaymentResponse {
        success: true,
        order,
        message,
    }))
}

/// Confirm an order after in-store payment
#[utoipa::path(
    post,
    path = "/verify-payment",
    summary = "Confirm order",
    description = "Marks a pending order as confirmed and stamps an offline payment reference. Confirming twice is harmless.",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Order confirmed", body = VerifyPaymentResponse),
        (status = 400, description = "Malformed order id", body = crate::errors::FailureResponse),
        (status = 404, description = "Order not found", body = crate::errors::FailureResponse),
        (status = 500, description = "Confirmation could not be stored", body = crate::errors::FailureResponse),
    ),
    tag = "payments"
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(payload): Json<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, ApiError> {
    let order_id = Uuid::parse_str(payload.order_id.trim()).map_err(|_| ApiError::Failure {
        status: axum::http::StatusCode::BAD_REQUEST,
        error: format!("Invalid order id: {}", payload.order_id),
    })?;

    let confirmation = state
        .services
        .orders
        .confirm_order(order_id, payload.payment_method)
        .await
        .map_err(|e| {
            error!(error = %e, order_id = %order_id, "Payment verification failed");
            ApiError::failure(&e, "Failed to verify payment")
        })?;

    let message = if confirmation.already_confirmed {
        format!("Order {} was already confirmed", confirmation.order.order_number)
    } else {
        format!(
            "Payment recorded. Order {} confirmed",
            confirmation.order.order_number
        )
    };

    Ok(Json(VerifyPaymentResponse {
        success: true,
        message,
    }))
}
