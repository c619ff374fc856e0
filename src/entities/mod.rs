pub mod gst_setting;
pub mod making_cost;
pub mod order;
pub mod product;

pub use gst_setting::Entity as GstSetting;
pub use making_cost::Entity as MakingCost;
pub use order::Entity as Order;
pub use product::Entity as Product;
