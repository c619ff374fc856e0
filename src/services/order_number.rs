//! Human-facing order labels: `ORD-<base36 millis>-<5 base36 chars>`.
//!
//! The label is only probably unique; the UNIQUE constraint on
//! `orders.order_number` plus the retry in the order builder makes it certain.

use chrono::Utc;
use rand::Rng;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 5;

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Order number for the given timestamp in milliseconds.
pub fn order_number_at(timestamp_millis: u64, rng: &mut impl Rng) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("ORD-{}-{}", to_base36(timestamp_millis), suffix)
}

/// Order number stamped with the current time.
pub fn generate_order_number() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    order_number_at(millis, &mut rand::thread_rng())
}

/// True when `value` has the `ORD-<base36>-<5 base36>` shape.
pub fn is_valid_order_number(value: &str) -> bool {
    let mut parts = value.split('-');
    let upper_base36 = |s: &str| s.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase());
    matches!(
        (parts.next(), parts.next(), parts.next(), parts.next()),
        (Some("ORD"), Some(ts), Some(suffix), None)
            if !ts.is_empty() && upper_base36(ts) && suffix.len() == SUFFIX_LEN && upper_base36(suffix)
    )
}
