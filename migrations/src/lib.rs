pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_products_table;
mod m20250601_000002_create_making_costs_table;
mod m20250601_000003_create_gst_settings_table;
mod m20250601_000004_create_orders_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_products_table::Migration),
            Box::new(m20250601_000002_create_making_costs_table::Migration),
            Box::new(m20250601_000003_create_gst_settings_table::Migration),
            Box::new(m20250601_000004_create_orders_table::Migration),
        ]
    }
}
