// Pricing: calculator, rate/cost resolvers, quotes
pub mod pricing;

// Order numbering, building and confirmation
pub mod order_number;
pub mod orders;

pub use orders::{OrderService, OrderSettings};
pub use pricing::{PricingService, Resolution};
