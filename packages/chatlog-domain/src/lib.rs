pub mod partition;
pub mod query;

mod error;

pub use error::{Error, Result};
