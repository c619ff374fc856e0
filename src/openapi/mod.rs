use axum::response::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "1.0.0",
        description = r#"
# Jewellery Storefront API

Pricing and order settlement for a jewellery storefront.

## Pricing

A product's price is its metal value (`weight × metal_rate`) plus a making
charge, a percentage of metal value that depends on the metal type. GST is
applied on top at the active percentage (18% when none is configured).
Amounts are unrounded INR; `display_*` fields carry the formatted values.

## Orders

`POST /create-payment` stores a `pending` order and returns the 25% advance /
75% remaining split. Staff confirm in-store payment with
`POST /verify-payment`, which moves the order to `confirmed`. Orders cannot be
cancelled or refunded once the advance is taken.

## Errors

Checkout endpoints answer failures with `{ "error": "..." }`. Other endpoints
use the `ErrorResponse` body. Every response carries `X-Request-Id`.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "payments", description = "Order creation and in-store payment confirmation"),
        (name = "orders", description = "Order lookup"),
        (name = "products", description = "Product price quotes and repricing")
    ),
    paths(
        crate::handlers::payments::create_payment,
        crate::handlers::payments::verify_payment,
        crate::handlers::orders::get_order,
        crate::handlers::orders::get_order_by_number,
        crate::handlers::orders::list_user_orders,
        crate::handlers::products::get_product_price,
        crate::handlers::products::reprice_product,
    ),
    components(
        schemas(
            crate::services::orders::CreateOrderRequest,
            crate::services::orders::CartItem,
            crate::services::orders::CartProduct,
            crate::services::orders::OrderResponse,
            crate::services::orders::OrderLineItem,
            crate::services::orders::ProductSnapshot,
            crate::services::orders::PriceSource,
            crate::entities::order::OrderStatus,
            crate::handlers::payments::CreatePaymentResponse,
            crate::handlers::payments::VerifyPaymentRequest,
            crate::handlers::payments::VerifyPaymentResponse,
            crate::services::pricing::PriceBreakdown,
            crate::services::pricing::InputSource,
            crate::errors::ErrorResponse,
            crate::errors::FailureResponse
        )
    )
)]
pub struct ApiDocV1;

/// Serves the generated document at `/api-docs/openapi.json`
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDocV1::openapi())
}
