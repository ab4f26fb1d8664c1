//! kasboek-core: canonical transaction types, error taxonomy, and description extractors

pub mod error;
pub mod extract;
pub mod transaction;

pub use error::{KasboekError, Result};
pub use extract::{merchant_name, transaction_type};
pub use transaction::{Bank, CanonicalTransaction, DedupKey, UNKNOWN_TYPE};
