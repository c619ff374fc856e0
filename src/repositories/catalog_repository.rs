use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};
use std::sync::Arc;

use super::CatalogRepository;
use crate::db::timed;
use crate::entities::product::{self, Entity as Product};

/// Repository for catalog product reads
#[derive(Debug, Clone)]
pub struct SeaOrmCatalogRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCatalogRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepository for SeaOrmCatalogRepository {
    async fn find_product(&self, id: i32) -> Result<Option<product::Model>, DbErr> {
        timed("products.find_by_id", Product::find_by_id(id).one(&*self.db)).await
    }

    async fn update_pricing(
        &self,
        id: i32,
        making_charge: f64,
        price: f64,
    ) -> Result<Option<product::Model>, DbErr> {
        let db = &*self.db;
        let Some(existing) = timed("products.find_by_id", Product::find_by_id(id).one(db)).await?
        else {
            return Ok(None);
        };

        let mut active: product::ActiveModel = existing.into();
        active.making_charge = Set(making_charge);
        active.price = Set(price);
        active.updated_at = Set(Utc::now());

        timed("products.update_pricing", active.update(db))
            .await
            .map(Some)
    }
}
