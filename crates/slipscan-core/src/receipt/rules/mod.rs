//! Shared parsing rules for receipt text.

pub mod amounts;
pub mod dates;
pub mod patterns;

pub use amounts::{format_amount, parse_amount};
pub use dates::parse_receipt_datetime;
