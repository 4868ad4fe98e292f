//! Re-exported types from external crates for convenience.
//!
//! These types are commonly used in this SDK and are re-exported here
//! so users don't need to add these dependencies to their `Cargo.toml`.

/// Date and time types for timestamps in API responses and stream messages.
pub use chrono::{DateTime, Utc};
/// Arbitrary precision decimal type for prices, sizes, and amounts.
pub use rust_decimal::Decimal;
/// Macro for creating [`Decimal`] literals at compile time.
///
/// # Example
/// ```
/// use gdax_client_sdk::types::dec;
/// let price = dec!(6500.01);
/// ```
pub use rust_decimal_macros::dec;
/// Order, account and profile identifiers.
pub use uuid::Uuid;
