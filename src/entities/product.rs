use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Catalog product. Owned by the back-office; orders only ever read it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Product name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,

    pub category: Option<String>,

    /// Weight in grams
    #[validate(range(min = 0.0))]
    pub weight: f64,

    /// Metal category driving the making-charge percentage (e.g. "22K Gold")
    pub metal_type: String,

    /// Metal rate in INR per gram
    #[validate(range(min = 0.0))]
    pub metal_rate: f64,

    /// Making charge as last computed by a reprice
    pub making_charge: f64,

    /// Headline price as last computed by a reprice
    pub price: f64,

    pub image_url: Option<String>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// True when the product carries enough data to be priced from metal value.
    pub fn is_metal_priced(&self) -> bool {
        self.weight > 0.0 && self.metal_rate > 0.0
    }
}
