use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::OrderRepository;
use crate::db::timed;
use crate::entities::order::{self, Column, Entity as Order, OrderStatus};

/// Repository for order operations
#[derive(Debug, Clone)]
pub struct SeaOrmOrderRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmOrderRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn to_active(model: order::Model) -> order::ActiveModel {
    order::ActiveModel {
        id: Set(model.id),
        order_number: Set(model.order_number),
        user_id: Set(model.user_id),
        items: Set(model.items),
        subtotal: Set(model.subtotal),
        advance_paid: Set(model.advance_paid),
        remaining: Set(model.remaining),
        status: Set(model.status),
        payment_method: Set(model.payment_method),
        payment_id: Set(model.payment_id),
        gift_message: Set(model.gift_message),
        delivery_type: Set(model.delivery_type),
        delivery_address: Set(model.delivery_address),
        special_instructions: Set(model.special_instructions),
        product_size_details: Set(model.product_size_details),
        aadhar: Set(model.aadhar),
        address: Set(model.address),
        created_at: Set(model.created_at),
        updated_at: Set(model.updated_at),
    }
}

#[async_trait]
impl OrderRepository for SeaOrmOrderRepository {
    async fn insert(&self, order: order::Model) -> Result<order::Model, DbErr> {
        timed("orders.insert", to_active(order).insert(&*self.db)).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<order::Model>, DbErr> {
        timed("orders.find_by_id", Order::find_by_id(id).one(&*self.db)).await
    }

    async fn find_by_number(&self, order_number: &str) -> Result<Option<order::Model>, DbErr> {
        timed(
            "orders.find_by_number",
            Order::find()
                .filter(Column::OrderNumber.eq(order_number))
                .one(&*self.db),
        )
        .await
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<order::Model>, DbErr> {
        timed(
            "orders.list_for_user",
            Order::find()
                .filter(Column::UserId.eq(user_id))
                .order_by_desc(Column::CreatedAt)
                .all(&*self.db),
        )
        .await
    }

    async fn confirm_if_pending(
        &self,
        id: Uuid,
        payment_method: &str,
        payment_id: &str,
        confirmed_at: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        let result = timed(
            "orders.confirm",
            Order::update_many()
                .col_expr(Column::Status, Expr::value(OrderStatus::Confirmed.to_value()))
                .col_expr(Column::PaymentMethod, Expr::value(payment_method))
                .col_expr(Column::PaymentId, Expr::value(payment_id))
                .col_expr(Column::UpdatedAt, Expr::value(confirmed_at))
                .filter(Column::Id.eq(id))
                .filter(Column::Status.eq(OrderStatus::Pending.to_value()))
                .exec(&*self.db),
        )
        .await?;

        Ok(result.rows_affected)
    }
}
