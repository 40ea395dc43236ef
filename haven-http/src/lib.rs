#![doc = include_str!("../README.md")]

pub mod error;
pub mod fallback;
mod handler;
mod network;
pub mod precache;
mod replay;
mod request;
mod response;
pub mod router;
pub mod served_by;
pub mod strategy;

pub use error::FetchError;
pub use handler::FetchHandler;
pub use network::Network;
pub use precache::fetch_shell;
pub use replay::ReplayUpstream;
pub use request::{Destination, FetchRequest};
pub use response::{FetchResponse, SerializableResponse};
pub use router::{RequestClass, Route, Router};
pub use served_by::{SERVED_BY_CACHE, SERVED_BY_HEADER};
