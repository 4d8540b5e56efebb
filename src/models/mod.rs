pub mod common;
pub mod order;

pub use common::*;
pub use order::*;
