//! kasboek-ingest: bank statement readers, bank profiles, and the statement normalizer.

pub mod normalize;
pub mod profiles;
pub mod reader;
pub mod types;

pub use normalize::normalize;
pub use profiles::{AmountPolicy, BankProfile, CanonicalField, TypeStrategy, profile_for};
pub use reader::{read_statement, read_table};
pub use types::{FileKind, RawTable};
