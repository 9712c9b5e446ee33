//! Reference ID Generator
//!
//! Human-facing submission ids: `PJ-{year}-{NNNNN}`, a zero-padded random
//! suffix in `0..100000`. Uniqueness is probabilistic; the lifecycle manager
//! checks for collisions before accepting one.

use chrono::{Datelike, Utc};
use rand::Rng;

pub const REFERENCE_PREFIX: &str = "PJ";
const SUFFIX_SPACE: u32 = 100_000;

/// Reference id for the current UTC year
pub fn generate() -> String {
    generate_with(&mut rand::thread_rng(), Utc::now().year())
}

pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, year: i32) -> String {
    let suffix = rng.gen_range(0..SUFFIX_SPACE);
    format!("{REFERENCE_PREFIX}-{year}-{suffix:05}")
}

/// `PJ-` + four digits + `-` + five digits
pub fn is_reference_id(value: &str) -> bool {
    let Some(rest) = value.strip_prefix("PJ-") else {
        return false;
    };
    let bytes = rest.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit)
}
