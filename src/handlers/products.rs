use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::{entities::product, services::pricing::PriceBreakdown, ApiResponse, ApiResult, AppState};

/// Current price derivation for a product
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/price",
    summary = "Quote product price",
    description = "Metal value, making charge, GST and totals using today's making-cost table and GST setting",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Price breakdown", body = ApiResponse<PriceBreakdown>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
    tag = "products"
)]
pub async fn get_product_price(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<PriceBreakdown> {
    let quote = state.services.pricing.quote_product(id).await?;
    Ok(Json(ApiResponse::success(quote)))
}

/// Recompute and store a product's making charge and price
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/reprice",
    summary = "Reprice product",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product repriced", body = ApiResponse<PriceBreakdown>),
        (status = 400, description = "Product has no weight or metal rate", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
    tag = "products"
)]
pub async fn reprice_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<PriceBreakdown> {
    let updated: product::Model = state.services.pricing.reprice_product(id).await?;
    let quote = state.services.pricing.quote_product(updated.id).await?;
    Ok(Json(ApiResponse::success_with_message(
        quote,
        format!("{} repriced", updated.name),
    )))
}
