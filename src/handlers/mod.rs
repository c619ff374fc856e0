pub mod health;
pub mod orders;
pub mod payments;
pub mod products;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::events::EventSender;
use crate::repositories::Repositories;
use crate::services::{OrderService, OrderSettings, PricingService};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub pricing: Arc<PricingService>,
    pub orders: Arc<OrderService>,
}

impl AppServices {
    /// Wires services over the given repositories.
    pub fn new(
        repositories: Repositories,
        config: &AppConfig,
        event_sender: Option<EventSender>,
    ) -> Self {
        let pricing = PricingService::new(
            repositories.catalog.clone(),
            repositories.pricing.clone(),
            config.default_gst_percentage,
            event_sender.clone(),
        )
        .reject_unknown_metal_types(config.reject_unknown_metal_types);
        let orders = OrderService::new(
            repositories.catalog,
            repositories.orders,
            event_sender,
            OrderSettings {
                order_number_attempts: config.order_number_attempts,
            },
        );

        Self {
            pricing: Arc::new(pricing),
            orders: Arc::new(orders),
        }
    }
}
