pub mod accumulator;
pub mod coerce;
pub mod error;
pub mod instance;
pub mod metrics;
pub mod schema;
pub mod writer;
