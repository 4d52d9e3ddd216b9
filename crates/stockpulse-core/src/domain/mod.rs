//! # Domain Models
//!
//! Identity and payload types shared by every fetch path.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated ticker |
//! | [`Exchange`] | Listing exchange and its market suffix |
//! | [`Listing`] | `(ticker, exchange)` identity used for cache and failure keys |
//! | [`CacheKind`] | Price vs. fundamentals cache namespace |
//! | [`Fundamentals`] | P/E ratio and earnings per share |
//! | [`QuoteResult`] | One entry of a batch response |
//! | [`QuoteMap`] | Batch response keyed by ticker |

mod listing;
mod models;
mod symbol;

pub use listing::{CacheKind, Exchange, Listing};
pub use models::{Fundamentals, QuoteMap, QuoteResult};
pub use symbol::Symbol;
