mod bounded_index;
mod wrapping;

pub use bounded_index::*;
pub use wrapping::*;
