//! CLI command implementations

pub mod price;
pub mod quote;
pub mod work;
