//! Store access behind traits so services can be exercised without a live
//! database. The sea-orm implementations live next to each trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, DbErr};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{gst_setting, making_cost, order, product};

pub mod catalog_repository;
pub mod order_repository;
pub mod pricing_repository;

pub use catalog_repository::SeaOrmCatalogRepository;
pub use order_repository::SeaOrmOrderRepository;
pub use pricing_repository::SeaOrmPricingRepository;

/// Read access to the product catalog, plus the reprice write-back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find_product(&self, id: i32) -> Result<Option<product::Model>, DbErr>;

    /// Stores freshly computed pricing. Returns `None` when the product is gone.
    async fn update_pricing(
        &self,
        id: i32,
        making_charge: f64,
        price: f64,
    ) -> Result<Option<product::Model>, DbErr>;
}

/// GST setting and making-cost table lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PricingRepository: Send + Sync {
    async fn active_gst_setting(&self) -> Result<Option<gst_setting::Model>, DbErr>;

    async fn active_making_costs(&self) -> Result<Vec<making_cost::Model>, DbErr>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, order: order::Model) -> Result<order::Model, DbErr>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<order::Model>, DbErr>;

    async fn find_by_number(&self, order_number: &str) -> Result<Option<order::Model>, DbErr>;

    /// Newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<order::Model>, DbErr>;

    /// Moves a pending order to confirmed. Returns the number of rows changed,
    /// which is 0 when the order is missing or already confirmed.
    async fn confirm_if_pending(
        &self,
        id: Uuid,
        payment_method: &str,
        payment_id: &str,
        confirmed_at: DateTime<Utc>,
    ) -> Result<u64, DbErr>;
}

/// The sea-orm backed repositories sharing one connection pool.
#[derive(Clone)]
pub struct Repositories {
    pub catalog: Arc<dyn CatalogRepository>,
    pub pricing: Arc<dyn PricingRepository>,
    pub orders: Arc<dyn OrderRepository>,
}

impl Repositories {
    pub fn sea_orm(db: Arc<DatabaseConnection>) -> Self {
        Self {
            catalog: Arc::new(SeaOrmCatalogRepository::new(db.clone())),
            pricing: Arc::new(SeaOrmPricingRepository::new(db.clone())),
            orders: Arc::new(SeaOrmOrderRepository::new(db)),
        }
    }
}
