pub mod adapter;
pub mod error;
pub mod sql;
