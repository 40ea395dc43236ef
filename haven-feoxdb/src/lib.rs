#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

mod error;
mod log;

pub use error::FeOxDbError;
pub use log::{FeOxDbActionLog, FeOxDbActionLogBuilder};
