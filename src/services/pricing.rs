//! Jewellery pricing: metal value, making charge and GST.
//!
//! The calculator functions are pure and work in unrounded `f64` INR. Rounding
//! happens only in the `format_inr_*` display helpers. [`PricingService`]
//! wraps the store lookups for the GST setting and the making-cost table and
//! reports how each input was obtained through [`Resolution`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::{
    entities::{making_cost, product},
    errors::ServiceError,
    events::{Event, EventSender},
    metrics,
    repositories::{CatalogRepository, PricingRepository},
};

/// Outcome of looking up a pricing input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<T> {
    /// Taken from the authoritative source.
    Resolved(T),
    /// The authoritative source had nothing usable; this is a stand-in.
    Fallback(T),
    /// Nothing found and no stand-in exists.
    Absent,
}

impl<T> Resolution<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Resolved(v) | Self::Fallback(v) => Some(v),
            Self::Absent => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Resolved(v) | Self::Fallback(v) => Some(v),
            Self::Absent => None,
        }
    }

    pub fn value_or(self, default: T) -> T {
        self.into_value().unwrap_or(default)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Self::Resolved(v) => Resolution::Resolved(f(v)),
            Self::Fallback(v) => Resolution::Fallback(f(v)),
            Self::Absent => Resolution::Absent,
        }
    }
}

/// Where a pricing input came from, as reported to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    Stored,
    Default,
    Absent,
}

impl<T> From<&Resolution<T>> for InputSource {
    fn from(resolution: &Resolution<T>) -> Self {
        match resolution {
            Resolution::Resolved(_) => InputSource::Stored,
            Resolution::Fallback(_) => InputSource::Default,
            Resolution::Absent => InputSource::Absent,
        }
    }
}

// ---------- pure calculator ----------

pub fn metal_value(weight: f64, metal_rate: f64) -> f64 {
    weight * metal_rate
}

/// `weight × metal_rate + making_charge`
pub fn unit_price(weight: f64, metal_rate: f64, making_charge: f64) -> f64 {
    metal_value(weight, metal_rate) + making_charge
}

/// Result of pricing the making charge against the making-cost table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MakingChargeQuote {
    /// Percentage applied, `None` when the metal type has no entry.
    pub percentage: Option<f64>,
    pub making_charge: f64,
    /// Metal value plus making charge. Zero when the metal type has no entry.
    pub total: f64,
}

/// Looks up `metal_type` in `table`. An unknown metal type prices both the
/// making charge and the total at zero.
pub fn making_charge(
    weight: f64,
    metal_type: &str,
    metal_rate: f64,
    table: &[making_cost::Model],
) -> MakingChargeQuote {
    match table.iter().find(|entry| entry.metal_type == metal_type) {
        Some(entry) => {
            let base = metal_value(weight, metal_rate);
            let charge = base * (entry.percentage / 100.0);
            MakingChargeQuote {
                percentage: Some(entry.percentage),
                making_charge: charge,
                total: base + charge,
            }
        }
        None => MakingChargeQuote {
            percentage: None,
            making_charge: 0.0,
            total: 0.0,
        },
    }
}

pub fn gst_amount(base: f64, percent: f64) -> f64 {
    base * percent / 100.0
}

pub fn total_with_gst(base: f64, percent: f64) -> f64 {
    base + gst_amount(base, percent)
}

pub const ADVANCE_SHARE: f64 = 0.25;
pub const REMAINING_SHARE: f64 = 0.75;

/// Up-front advance and in-store balance for an order subtotal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentSplit {
    pub advance_paid: f64,
    pub remaining: f64,
}

pub fn split_payment(subtotal: f64) -> PaymentSplit {
    PaymentSplit {
        advance_paid: ADVANCE_SHARE * subtotal,
        remaining: REMAINING_SHARE * subtotal,
    }
}

// ---------- display ----------

/// Groups an unsigned digit string the Indian way: `12,34,567`.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, last_three) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), last_three)
}

fn format_inr(amount: f64, decimals: usize) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.*}", decimals, amount.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    match frac_part {
        Some(frac) => format!("{sign}₹{}.{frac}", group_indian(int_part)),
        None => format!("{sign}₹{}", group_indian(int_part)),
    }
}

/// Headline price, whole rupees: `₹1,23,457`.
pub fn format_inr_headline(amount: f64) -> String {
    format_inr(amount, 0)
}

/// GST-bearing amount, two decimals: `₹22,222.26`.
pub fn format_inr_precise(amount: f64) -> String {
    format_inr(amount, 2)
}

// ---------- service ----------

/// Full price derivation for one catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceBreakdown {
    pub product_id: i32,
    pub metal_type: String,
    pub weight: f64,
    pub metal_rate: f64,
    pub metal_value: f64,
    pub making_charge_percentage: Option<f64>,
    pub making_charge: f64,
    pub making_charge_source: InputSource,
    pub unit_price: f64,
    pub gst_percentage: f64,
    pub gst_source: InputSource,
    pub gst_amount: f64,
    pub total_with_gst: f64,
    /// `unit_price` formatted for display
    pub display_price: String,
    /// `total_with_gst` formatted for display
    pub display_total_with_gst: String,
}

/// Unit price of a catalog product given the making-cost table. Products
/// without weight or rate keep their stored price.
pub fn catalog_unit_price(product: &product::Model, table: &[making_cost::Model]) -> f64 {
    if product.is_metal_priced() {
        let quote = making_charge(product.weight, &product.metal_type, product.metal_rate, table);
        unit_price(product.weight, product.metal_rate, quote.making_charge)
    } else {
        product.price
    }
}

/// Resolves pricing inputs from the store and prices catalog products.
#[derive(Clone)]
pub struct PricingService {
    catalog: Arc<dyn CatalogRepository>,
    pricing: Arc<dyn PricingRepository>,
    default_gst_percentage: f64,
    reject_unknown_metal_types: bool,
    event_sender: Option<EventSender>,
}

impl PricingService {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        pricing: Arc<dyn PricingRepository>,
        default_gst_percentage: f64,
        event_sender: Option<EventSender>,
    ) -> Self {
        Self {
            catalog,
            pricing,
            default_gst_percentage,
            reject_unknown_metal_types: false,
            event_sender,
        }
    }

    /// When set, repricing a product whose metal type has no making cost
    /// fails instead of storing a zero making charge.
    pub fn reject_unknown_metal_types(mut self, reject: bool) -> Self {
        self.reject_unknown_metal_types = reject;
        self
    }

    /// Active GST percentage. A stored zero is honoured; a missing row or a
    /// failed lookup falls back to the configured default.
    #[instrument(skip(self))]
    pub async fn resolve_gst_percentage(&self) -> Resolution<f64> {
        match self.pricing.active_gst_setting().await {
            Ok(Some(setting)) => Resolution::Resolved(setting.percentage),
            Ok(None) => {
                warn!(
                    default = self.default_gst_percentage,
                    "No active GST setting; using default"
                );
                metrics::record_pricing_fallback("gst_default");
                Resolution::Fallback(self.default_gst_percentage)
            }
            Err(e) => {
                warn!(error = %e, default = self.default_gst_percentage, "GST lookup failed; using default");
                metrics::record_pricing_fallback("gst_default");
                Resolution::Fallback(self.default_gst_percentage)
            }
        }
    }

    /// Active making-cost rows. A failed lookup is logged and treated as an
    /// empty table.
    pub async fn making_cost_table(&self) -> Vec<making_cost::Model> {
        match self.pricing.active_making_costs().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "Making-cost lookup failed; treating table as empty");
                Vec::new()
            }
        }
    }

    /// Making-charge percentage for `metal_type`, or `Absent` when the table
    /// has no active entry for it.
    #[instrument(skip(self))]
    pub async fn resolve_making_cost(&self, metal_type: &str) -> Resolution<f64> {
        let table = self.making_cost_table().await;
        match table.iter().find(|entry| entry.metal_type == metal_type) {
            Some(entry) => Resolution::Resolved(entry.percentage),
            None => {
                info!(metal_type, "No making cost defined for metal type");
                metrics::record_pricing_fallback("making_cost_absent");
                Resolution::Absent
            }
        }
    }

    async fn load_product(&self, product_id: i32) -> Result<product::Model, ServiceError> {
        self.catalog
            .find_product(product_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    /// Price breakdown for a catalog product using current rates.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn quote_product(&self, product_id: i32) -> Result<PriceBreakdown, ServiceError> {
        let product = self.load_product(product_id).await?;
        let gst = self.resolve_gst_percentage().await;
        let gst_source = InputSource::from(&gst);
        let gst_percentage = gst.value_or(self.default_gst_percentage);

        let (metal, making, making_source, unit) = if product.is_metal_priced() {
            let making_resolution = self.resolve_making_cost(&product.metal_type).await;
            let source = InputSource::from(&making_resolution);
            let percentage = making_resolution.into_value();
            let metal = metal_value(product.weight, product.metal_rate);
            let making = percentage.map(|p| metal * p / 100.0);
            let charge = making.unwrap_or(0.0);
            (
                metal,
                (percentage, charge),
                source,
                unit_price(product.weight, product.metal_rate, charge),
            )
        } else {
            (
                0.0,
                (None, product.making_charge),
                InputSource::Stored,
                product.price,
            )
        };

        let gst_value = gst_amount(unit, gst_percentage);
        let total = total_with_gst(unit, gst_percentage);

        Ok(PriceBreakdown {
            product_id: product.id,
            metal_type: product.metal_type,
            weight: product.weight,
            metal_rate: product.metal_rate,
            metal_value: metal,
            making_charge_percentage: making.0,
            making_charge: making.1,
            making_charge_source: making_source,
            unit_price: unit,
            gst_percentage,
            gst_source,
            gst_amount: gst_value,
            total_with_gst: total,
            display_price: format_inr_headline(unit),
            display_total_with_gst: format_inr_precise(total),
        })
    }

    /// Recomputes and stores a product's making charge and price from the
    /// current making-cost table.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn reprice_product(&self, product_id: i32) -> Result<product::Model, ServiceError> {
        let product = self.load_product(product_id).await?;
        if !product.is_metal_priced() {
            return Err(ServiceError::InvalidOperation(format!(
                "Product {} has no weight or metal rate to price from",
                product_id
            )));
        }

        let table = self.making_cost_table().await;
        let quote = making_charge(product.weight, &product.metal_type, product.metal_rate, &table);
        if quote.percentage.is_none() {
            if self.reject_unknown_metal_types {
                return Err(ServiceError::ValidationError(format!(
                    "No making cost defined for metal type '{}'",
                    product.metal_type
                )));
            }
            warn!(metal_type = %product.metal_type, "Repricing without a making cost; charge is zero");
            metrics::record_pricing_fallback("making_cost_absent");
        }
        let price = unit_price(product.weight, product.metal_rate, quote.making_charge);

        let updated = self
            .catalog
            .update_pricing(product_id, quote.making_charge, price)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        info!(product_id, price, making_charge = quote.making_charge, "Product repriced");

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::ProductRepriced { product_id, price })
                .await
            {
                warn!(error = %e, product_id, "Failed to send product repriced event");
            }
        }

        Ok(updated)
    }
}
