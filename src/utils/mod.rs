pub mod cipher;
pub mod sensitive;

pub use cipher::*;
pub use sensitive::*;
