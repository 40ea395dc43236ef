#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

mod backend;
mod builder;
pub mod metrics;
mod storage;

pub use backend::MokaBackend;
pub use builder::{Capacity, MokaBackendBuilder};
pub use storage::{MokaStorage, MokaStorageBuilder};
