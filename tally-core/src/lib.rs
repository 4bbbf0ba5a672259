//! tally-core: canonical transaction types shared by ingest and finance

pub mod transaction;

pub use transaction::{Category, Transaction, TransactionTable};
