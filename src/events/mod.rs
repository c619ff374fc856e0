use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Creates a bounded channel and the sender wrapper around it.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender::new(tx), rx)
}

// Events emitted by the order and pricing services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    OrderCreated {
        order_id: Uuid,
        order_number: String,
        user_id: String,
        subtotal: f64,
    },
    OrderConfirmed {
        order_id: Uuid,
        payment_id: String,
        confirmed_at: DateTime<Utc>,
    },
    ProductRepriced {
        product_id: i32,
        price: f64,
    },
}

// Drains the channel, logging each event until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::OrderCreated {
                order_id,
                order_number,
                user_id,
                subtotal,
            } => {
                info!(
                    order_id = %order_id,
                    order_number = %order_number,
                    user_id = %user_id,
                    subtotal,
                    "Order created"
                );
            }
            Event::OrderConfirmed {
                order_id,
                payment_id,
                confirmed_at,
            } => {
                info!(
                    order_id = %order_id,
                    payment_id = %payment_id,
                    confirmed_at = %confirmed_at,
                    "Order confirmed"
                );
            }
            Event::ProductRepriced { product_id, price } => {
                info!(product_id, price, "Product repriced");
            }
        }
    }

    warn!("Event channel closed; event processing loop stopped");
}
