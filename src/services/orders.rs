use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        order::{self, OrderStatus},
        product,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    metrics,
    repositories::{CatalogRepository, OrderRepository},
    services::{
        order_number::generate_order_number,
        pricing::{self, Resolution},
    },
};

/// Payment method recorded when the caller does not name one.
pub const DEFAULT_PAYMENT_METHOD: &str = "offline";

/// Product as the customer saw it in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    pub id: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub metal_type: Option<String>,
    #[serde(default)]
    pub metal_rate: Option<f64>,
    #[serde(default)]
    pub making_charge: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product: CartProduct,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<CartItem>,
    #[validate(length(min = 1, message = "User id is required"))]
    pub user_id: String,
    #[serde(default)]
    pub gift_message: Option<String>,
    #[serde(default)]
    pub delivery_type: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub product_size_details: Option<serde_json::Value>,
    #[serde(default)]
    pub aadhar: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub address: Option<serde_json::Value>,
}

impl CreateOrderRequest {
    fn validate_all(&self) -> Result<(), ServiceError> {
        self.validate()?;
        if self.user_id.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "User id is required".to_string(),
            ));
        }
        for item in &self.items {
            item.validate()?;
            item.product.validate()?;
        }
        Ok(())
    }
}

/// Where a line item's price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Catalog,
    Client,
}

/// Product fields frozen into the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductSnapshot {
    pub id: i32,
    pub name: Option<String>,
    pub weight: Option<f64>,
    pub metal_type: Option<String>,
    pub metal_rate: Option<f64>,
    pub making_charge: Option<f64>,
    pub price: f64,
    pub image_url: Option<String>,
}

/// One line of the order's item snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderLineItem {
    pub product: ProductSnapshot,
    pub quantity: u32,
    /// Unit price charged
    pub price: f64,
    pub size: Option<String>,
    pub price_source: PriceSource,
}

impl OrderLineItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }

    /// Charges the catalog's stored price. Stored prices change only through
    /// repricing, never at order time.
    fn from_catalog(item: &CartItem, product: &product::Model) -> Self {
        Self {
            product: ProductSnapshot {
                id: product.id,
                name: Some(product.name.clone()),
                weight: Some(product.weight),
                metal_type: Some(product.metal_type.clone()),
                metal_rate: Some(product.metal_rate),
                making_charge: Some(product.making_charge),
                price: product.price,
                image_url: product.image_url.clone(),
            },
            quantity: item.quantity,
            price: product.price,
            size: item.size.clone(),
            price_source: PriceSource::Catalog,
        }
    }

    fn from_client(item: &CartItem) -> Self {
        let p = &item.product;
        Self {
            product: ProductSnapshot {
                id: p.id,
                name: p.name.clone(),
                weight: p.weight,
                metal_type: p.metal_type.clone(),
                metal_rate: p.metal_rate,
                making_charge: p.making_charge,
                price: p.price,
                image_url: p.image_url.clone(),
            },
            quantity: item.quantity,
            price: p.price,
            size: item.size.clone(),
            price_source: PriceSource::Client,
        }
    }
}

/// `Σ price × quantity`, no GST.
pub fn subtotal(lines: &[OrderLineItem]) -> f64 {
    lines.iter().map(OrderLineItem::line_total).sum()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: String,
    #[schema(value_type = Vec<OrderLineItem>)]
    pub items: serde_json::Value,
    pub subtotal: f64,
    pub advance_paid: f64,
    pub remaining: f64,
    pub status: OrderStatus,
    pub payment_method: Option<String>,
    pub payment_id: Option<String>,
    pub gift_message: Option<String>,
    pub delivery_type: Option<String>,
    pub delivery_address: Option<String>,
    pub special_instructions: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub product_size_details: Option<serde_json::Value>,
    pub aadhar: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub address: Option<serde_json::Value>,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

impl From<order::Model> for OrderResponse {
    fn from(model: order::Model) -> Self {
        Self {
            id: model.id,
            order_number: model.order_number,
            user_id: model.user_id,
            items: model.items,
            subtotal: model.subtotal,
            advance_paid: model.advance_paid,
            remaining: model.remaining,
            status: model.status,
            payment_method: model.payment_method,
            payment_id: model.payment_id,
            gift_message: model.gift_message,
            delivery_type: model.delivery_type,
            delivery_address: model.delivery_address,
            special_instructions: model.special_instructions,
            product_size_details: model.product_size_details,
            aadhar: model.aadhar,
            address: model.address,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Result of a confirmation request.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub order: OrderResponse,
    /// True when the order was already confirmed before this call.
    pub already_confirmed: bool,
}

/// Knobs for order creation.
#[derive(Debug, Clone, Copy)]
pub struct OrderSettings {
    pub order_number_attempts: u32,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            order_number_attempts: crate::config::DEFAULT_ORDER_NUMBER_ATTEMPTS,
        }
    }
}

type OrderNumberGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Builds orders from carts and moves them through confirmation.
#[derive(Clone)]
pub struct OrderService {
    catalog: Arc<dyn CatalogRepository>,
    orders: Arc<dyn OrderRepository>,
    event_sender: Option<EventSender>,
    settings: OrderSettings,
    next_order_number: OrderNumberGenerator,
}

impl OrderService {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        orders: Arc<dyn OrderRepository>,
        event_sender: Option<EventSender>,
        settings: OrderSettings,
    ) -> Self {
        Self {
            catalog,
            orders,
            event_sender,
            settings,
            next_order_number: Arc::new(generate_order_number),
        }
    }

    /// Replaces the order number source.
    pub fn with_order_number_generator(
        mut self,
        generator: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.next_order_number = Arc::new(generator);
        self
    }

    /// Re-fetches the product behind a cart line. A missing product or a failed
    /// lookup keeps the customer's snapshot.
    async fn resolve_line_item(&self, item: &CartItem) -> Resolution<OrderLineItem> {
        let product_id = item.product.id;
        match self.catalog.find_product(product_id).await {
            Ok(Some(product)) => Resolution::Resolved(OrderLineItem::from_catalog(item, &product)),
            Ok(None) => {
                warn!(product_id, "Product not in catalog; keeping cart snapshot");
                metrics::record_pricing_fallback("client_line_item");
                Resolution::Fallback(OrderLineItem::from_client(item))
            }
            Err(e) => {
                warn!(product_id, error = %e, "Product re-fetch failed; keeping cart snapshot");
                metrics::record_pricing_fallback("client_line_item");
                Resolution::Fallback(OrderLineItem::from_client(item))
            }
        }
    }

    fn record_creation_failure(err: &ServiceError) {
        let error_type = match err {
            ServiceError::ValidationError(_) | ServiceError::InvalidOperation(_) => "validation",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::DatabaseError(_) => "database",
            _ => "other",
        };
        metrics::record_order_creation_failure(error_type);
    }

    /// Turns a cart into a persisted `pending` order.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, item_count = request.items.len()))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let result = self.build_and_insert(request).await;
        if let Err(e) = &result {
            Self::record_creation_failure(e);
        }
        result
    }

    async fn build_and_insert(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate_all()?;

        let mut lines = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let resolution = self.resolve_line_item(item).await;
            if let Some(line) = resolution.into_value() {
                lines.push(line);
            }
        }

        let subtotal = subtotal(&lines);
        let split = pricing::split_payment(subtotal);
        let items = serde_json::to_value(&lines)?;
        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let mut model = order::Model {
            id: order_id,
            order_number: String::new(),
            user_id: request.user_id,
            items,
            subtotal,
            advance_paid: split.advance_paid,
            remaining: split.remaining,
            status: OrderStatus::Pending,
            payment_method: None,
            payment_id: None,
            gift_message: request.gift_message,
            delivery_type: request.delivery_type,
            delivery_address: request.delivery_address,
            special_instructions: request.special_instructions,
            product_size_details: request.product_size_details,
            aadhar: request.aadhar,
            address: request.address,
            created_at: now,
            updated_at: now,
        };

        let attempts = self.settings.order_number_attempts.max(1);
        for attempt in 1..=attempts {
            model.order_number = (self.next_order_number)();
            match self.orders.insert(model.clone()).await {
                Ok(saved) => {
                    info!(
                        order_id = %saved.id,
                        order_number = %saved.order_number,
                        user_id = %saved.user_id,
                        subtotal = saved.subtotal,
                        "Order created successfully"
                    );
                    metrics::record_order_created();
                    self.emit(Event::OrderCreated {
                        order_id: saved.id,
                        order_number: saved.order_number.clone(),
                        user_id: saved.user_id.clone(),
                        subtotal: saved.subtotal,
                    })
                    .await;
                    return Ok(saved.into());
                }
                Err(e) => {
                    let err = ServiceError::from(e);
                    if err.is_unique_violation() {
                        warn!(
                            attempt,
                            order_number = %model.order_number,
                            "Order number collision; regenerating"
                        );
                        continue;
                    }
                    error!(error = %err, order_id = %order_id, "Failed to create order in database");
                    return Err(err);
                }
            }
        }

        error!(attempts, "Exhausted order number attempts");
        Err(ServiceError::Conflict(format!(
            "Could not allocate a unique order number after {} attempts",
            attempts
        )))
    }

    /// Marks a pending order as paid in store. Confirming an already confirmed
    /// order changes nothing and returns it as stored.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn confirm_order(
        &self,
        order_id: Uuid,
        payment_method: Option<String>,
    ) -> Result<Confirmation, ServiceError> {
        let method = payment_method
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());
        let now = Utc::now();
        let payment_id = format!("offline_{}", now.timestamp_millis());

        let changed = self
            .orders
            .confirm_if_pending(order_id, &method, &payment_id, now)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to confirm order");
                ServiceError::DatabaseError(e)
            })?;

        let order = self.orders.find_by_id(order_id).await?.ok_or_else(|| {
            warn!(order_id = %order_id, "Order not found for confirmation");
            ServiceError::NotFound(format!("Order {} not found", order_id))
        })?;

        if changed == 0 {
            info!(order_id = %order_id, "Order already confirmed; leaving payment reference as is");
            return Ok(Confirmation {
                order: order.into(),
                already_confirmed: true,
            });
        }

        info!(order_id = %order_id, payment_id = %payment_id, payment_method = %method, "Order confirmed");
        metrics::record_order_confirmed();
        self.emit(Event::OrderConfirmed {
            order_id,
            payment_id,
            confirmed_at: now,
        })
        .await;

        Ok(Confirmation {
            order: order.into(),
            already_confirmed: false,
        })
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        self.orders
            .find_by_id(order_id)
            .await?
            .map(OrderResponse::from)
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }

    #[instrument(skip(self))]
    pub async fn get_order_by_number(
        &self,
        order_number: &str,
    ) -> Result<OrderResponse, ServiceError> {
        self.orders
            .find_by_number(order_number)
            .await?
            .map(OrderResponse::from)
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_number)))
    }

    /// A user's orders, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<OrderResponse>, ServiceError> {
        let orders = self.orders.list_for_user(user_id).await?;
        Ok(orders.into_iter().map(OrderResponse::from).collect())
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send order event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockCatalogRepository, MockOrderRepository};
    use assert_matches::assert_matches;
    use sea_orm::DbErr;

    fn cart_item(id: i32, price: f64, quantity: u32) -> CartItem {
        CartItem {
            product: CartProduct {
                id,
                name: Some("Chain".into()),
                price,
                weight: None,
                metal_type: None,
                metal_rate: None,
                making_charge: None,
                image_url: None,
            },
            quantity,
            size: None,
        }
    }

    fn request(items: Vec<CartItem>) -> CreateOrderRequest {
        CreateOrderRequest {
            items,
            user_id: "user-1".into(),
            gift_message: None,
            delivery_type: Some("pickup".into()),
            delivery_address: None,
            special_instructions: None,
            product_size_details: None,
            aadhar: None,
            address: None,
        }
    }

    fn gold_product(id: i32) -> product::Model {
        product::Model {
            id,
            name: "Bangle".into(),
            description: None,
            category: None,
            weight: 10.0,
            metal_type: "22K Gold".into(),
            metal_rate: 100.0,
            making_charge: 120.0,
            price: 1120.0,
            image_url: None,
            in_stock: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service_with(
        catalog: MockCatalogRepository,
        orders: MockOrderRepository,
        settings: OrderSettings,
    ) -> OrderService {
        OrderService::new(Arc::new(catalog), Arc::new(orders), None, settings)
    }

    #[test]
    fn subtotal_sums_price_times_quantity() {
        let lines = vec![
            OrderLineItem::from_client(&cart_item(1, 1000.0, 2)),
            OrderLineItem::from_client(&cart_item(2, 250.5, 1)),
        ];
        assert!((subtotal(&lines) - 2250.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let svc = service_with(
            MockCatalogRepository::new(),
            MockOrderRepository::new(),
            OrderSettings::default(),
        );
        let err = svc.create_order(request(vec![])).await.unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let svc = service_with(
            MockCatalogRepository::new(),
            MockOrderRepository::new(),
            OrderSettings::default(),
        );
        let err = svc
            .create_order(request(vec![cart_item(1, 10.0, 0)]))
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }

    #[tokio::test]
    async fn catalog_failure_falls_back_to_cart_snapshot() {
        let mut catalog = MockCatalogRepository::new();
        catalog
            .expect_find_product()
            .returning(|_| Err(DbErr::Custom("catalog offline".into())));
        let mut orders = MockOrderRepository::new();
        orders.expect_insert().times(1).returning(|m| Ok(m));
        let svc = service_with(catalog, orders, OrderSettings::default());

        let order = svc
            .create_order(request(vec![cart_item(5, 400.0, 3)]))
            .await
            .unwrap();
        assert!((order.subtotal - 1200.0).abs() < 1e-9);
        assert!((order.advance_paid - 300.0).abs() < 1e-9);
        assert_eq!(order.items[0]["price_source"], "client");
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn catalog_price_overrides_client_price() {
        let mut catalog = MockCatalogRepository::new();
        catalog
            .expect_find_product()
            .returning(|id| Ok(Some(gold_product(id))));
        let mut orders = MockOrderRepository::new();
        orders.expect_insert().returning(|m| Ok(m));
        let svc = service_with(catalog, orders, OrderSettings::default());

        // client claims 1 rupee; the catalog stores 1120
        let order = svc
            .create_order(request(vec![cart_item(1, 1.0, 2)]))
            .await
            .unwrap();
        assert!((order.subtotal - 2240.0).abs() < 1e-9);
        assert_eq!(order.items[0]["price"], 1120.0);
        assert_eq!(order.items[0]["price_source"], "catalog");
        assert_eq!(order.items[0]["product"]["making_charge"], 120.0);
    }

    #[tokio::test]
    async fn stored_price_is_charged_even_when_it_differs_from_weight_times_rate() {
        let mut catalog = MockCatalogRepository::new();
        catalog.expect_find_product().returning(|id| {
            let mut p = gold_product(id);
            // 10 g × 100 would be 1000; the stored price already carries a charge
            p.making_charge = 500.0;
            p.price = 1500.0;
            Ok(Some(p))
        });
        let mut orders = MockOrderRepository::new();
        orders.expect_insert().returning(|m| Ok(m));
        let svc = service_with(catalog, orders, OrderSettings::default());

        let order = svc
            .create_order(request(vec![cart_item(1, 1500.0, 2)]))
            .await
            .unwrap();
        assert!((order.subtotal - 3000.0).abs() < 1e-9);
        assert_eq!(order.items[0]["product"]["making_charge"], 500.0);
    }

    #[tokio::test]
    async fn persistence_failure_is_not_retried() {
        let mut catalog = MockCatalogRepository::new();
        catalog.expect_find_product().returning(|_| Ok(None));
        let mut orders = MockOrderRepository::new();
        orders
            .expect_insert()
            .times(1)
            .returning(|_| Err(DbErr::Custom("disk full".into())));
        let svc = service_with(catalog, orders, OrderSettings::default());

        let err = svc
            .create_order(request(vec![cart_item(1, 10.0, 1)]))
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::DatabaseError(_));
    }

    #[tokio::test]
    async fn confirm_unknown_order_is_not_found() {
        let mut orders = MockOrderRepository::new();
        orders
            .expect_confirm_if_pending()
            .returning(|_, _, _, _| Ok(0));
        orders.expect_find_by_id().returning(|_| Ok(None));
        let svc = service_with(MockCatalogRepository::new(), orders, OrderSettings::default());

        let err = svc.confirm_order(Uuid::new_v4(), None).await.unwrap_err();
        assert_matches!(err, ServiceError::NotFound(_));
    }

    #[tokio::test]
    async fn confirm_stamps_offline_payment_reference() {
        let order_id = Uuid::new_v4();
        let mut orders = MockOrderRepository::new();
        orders
            .expect_confirm_if_pending()
            .withf(|_, method, payment_id, _| method == "cash" && payment_id.starts_with("offline_"))
            .returning(|_, _, _, _| Ok(1));
        orders.expect_find_by_id().returning(move |id| {
            Ok(Some(order::Model {
                id,
                order_number: "ORD-1-AAAAA".into(),
                user_id: "user-1".into(),
                items: serde_json::json!([]),
                subtotal: 0.0,
                advance_paid: 0.0,
                remaining: 0.0,
                status: OrderStatus::Confirmed,
                payment_method: Some("cash".into()),
                payment_id: Some("offline_1".into()),
                gift_message: None,
                delivery_type: None,
                delivery_address: None,
                special_instructions: None,
                product_size_details: None,
                aadhar: None,
                address: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });
        let svc = service_with(MockCatalogRepository::new(), orders, OrderSettings::default());

        let confirmation = svc
            .confirm_order(order_id, Some("cash".into()))
            .await
            .unwrap();
        assert!(!confirmation.already_confirmed);
        assert_eq!(confirmation.order.status, OrderStatus::Confirmed);
    }
}
