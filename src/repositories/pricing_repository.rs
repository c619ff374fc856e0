use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;

use super::PricingRepository;
use crate::db::timed;
use crate::entities::{
    gst_setting::{self, Entity as GstSetting},
    making_cost::{self, Entity as MakingCost},
};

#[derive(Debug, Clone)]
pub struct SeaOrmPricingRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmPricingRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PricingRepository for SeaOrmPricingRepository {
    /// Most recently updated active row wins if more than one is flagged.
    async fn active_gst_setting(&self) -> Result<Option<gst_setting::Model>, DbErr> {
        timed(
            "gst_settings.active",
            GstSetting::find()
                .filter(gst_setting::Column::IsActive.eq(true))
                .order_by_desc(gst_setting::Column::UpdatedAt)
                .one(&*self.db),
        )
        .await
    }

    async fn active_making_costs(&self) -> Result<Vec<making_cost::Model>, DbErr> {
        timed(
            "making_costs.active",
            MakingCost::find()
                .filter(making_cost::Column::IsActive.eq(true))
                .order_by_desc(making_cost::Column::UpdatedAt)
                .all(&*self.db),
        )
        .await
    }
}
