pub mod error;
pub mod result;

pub use error::*;
pub use result::*;
