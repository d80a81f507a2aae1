pub mod adapter;
pub mod dialect;
pub mod error;
pub mod metadata;
pub mod query;
pub mod transaction;
