//! Property-based tests for the pricing calculator and order numbering.
//!
//! These tests use proptest to check the arithmetic identities the checkout
//! relies on across a wide range of weights, rates and percentages.

use chrono::Utc;
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use storefront_api::{
    entities::making_cost,
    services::{
        order_number::{generate_order_number, is_valid_order_number, order_number_at},
        pricing::{
            format_inr_headline, format_inr_precise, gst_amount, making_charge, split_payment,
            total_with_gst, unit_price,
        },
    },
};

fn amount_strategy() -> impl Strategy<Value = f64> {
    0.0f64..10_000_000.0
}

fn weight_strategy() -> impl Strategy<Value = f64> {
    0.0f64..2_000.0
}

fn percent_strategy() -> impl Strategy<Value = f64> {
    0.0f64..100.0
}

fn table_row(metal_type: &str, percentage: f64) -> making_cost::Model {
    let now = Utc::now();
    making_cost::Model {
        id: 1,
        metal_type: metal_type.to_string(),
        percentage,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * b.abs().max(1.0)
}

// Property: unit price is metal value plus making charge
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn unit_price_is_metal_value_plus_making(
        weight in weight_strategy(),
        rate in amount_strategy(),
        making in amount_strategy(),
    ) {
        prop_assert_eq!(unit_price(weight, rate, making), weight * rate + making);
    }

    #[test]
    fn total_with_gst_adds_gst_amount(base in amount_strategy(), percent in percent_strategy()) {
        prop_assert_eq!(total_with_gst(base, percent), base + gst_amount(base, percent));
        prop_assert_eq!(gst_amount(base, percent), base * percent / 100.0);
    }

    #[test]
    fn zero_gst_leaves_base_unchanged(base in amount_strategy()) {
        prop_assert_eq!(total_with_gst(base, 0.0), base);
    }
}

// Property: the advance/remaining split always adds back up to the subtotal
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn split_sums_to_subtotal(subtotal in amount_strategy()) {
        let split = split_payment(subtotal);
        prop_assert!(close(split.advance_paid + split.remaining, subtotal));
        prop_assert!(close(split.advance_paid, 0.25 * subtotal));
        prop_assert!(split.advance_paid <= split.remaining || subtotal == 0.0);
    }
}

// Property: making charge is a percentage of metal value, or nothing at all
proptest! {
    #[test]
    fn making_charge_scales_with_metal_value(
        weight in weight_strategy(),
        rate in amount_strategy(),
        percent in percent_strategy(),
    ) {
        let table = vec![table_row("22K Gold", percent)];
        let quote = making_charge(weight, "22K Gold", rate, &table);
        let metal = weight * rate;
        prop_assert_eq!(quote.percentage, Some(percent));
        prop_assert!(close(quote.making_charge, metal * percent / 100.0));
        prop_assert!(close(quote.total, metal + quote.making_charge));
    }

    #[test]
    fn unknown_metal_type_prices_to_zero(
        weight in weight_strategy(),
        rate in amount_strategy(),
        percent in percent_strategy(),
    ) {
        let table = vec![table_row("Silver", percent)];
        let quote = making_charge(weight, "Platinum", rate, &table);
        prop_assert_eq!(quote.percentage, None);
        prop_assert_eq!(quote.making_charge, 0.0);
        prop_assert_eq!(quote.total, 0.0);
    }
}

// Property: order numbers are well-formed for any timestamp and seed
proptest! {
    #[test]
    fn order_numbers_are_well_formed(millis in 0u64..4_102_444_800_000, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let number = order_number_at(millis, &mut rng);
        prop_assert!(is_valid_order_number(&number), "malformed: {}", number);
        let suffix = number.rsplit('-').next().unwrap_or_default();
        prop_assert_eq!(suffix.len(), 5);
    }
}

// Property: display formatting never loses the integer digits
proptest! {
    #[test]
    fn headline_digits_match_rounded_amount(amount in 0.0f64..1_000_000_000.0) {
        let formatted = format_inr_headline(amount);
        prop_assert!(formatted.starts_with('₹'));
        let digits: String = formatted.chars().filter(|c| c.is_ascii_digit()).collect();
        prop_assert_eq!(digits, format!("{:.0}", amount));
    }

    #[test]
    fn precise_format_has_two_decimals(amount in 0.0f64..1_000_000_000.0) {
        let formatted = format_inr_precise(amount);
        let (_, frac) = formatted.rsplit_once('.').unwrap_or(("", ""));
        prop_assert_eq!(frac.len(), 2);
    }
}

#[test]
fn generated_order_numbers_differ() {
    let a = generate_order_number();
    let b = generate_order_number();
    assert!(is_valid_order_number(&a));
    assert!(is_valid_order_number(&b));
    assert_ne!(a, b);
}

#[test]
fn indian_grouping_examples() {
    assert_eq!(format_inr_headline(123_456.7), "₹1,23,457");
    assert_eq!(format_inr_headline(999.0), "₹999");
    assert_eq!(format_inr_precise(22_222.256), "₹22,222.26");
    assert_eq!(format_inr_precise(10_000_000.0), "₹1,00,00,000.00");
}
