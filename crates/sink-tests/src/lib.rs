pub mod live;
pub mod memory;
