#![warn(missing_docs)]
//! # haven-core
//!
//! Core types shared by every haven crate.
//!
//! The offline worker stores network responses in named cache partitions and
//! decides, per request class, whether the network or the cache is the source
//! of truth. This crate holds the vocabulary those decisions are made in:
//!
//! - [`RequestKey`] - identity of a cached request (method + URL, body ignored)
//! - [`CachedEntry`] - a stored value together with the moment it was written
//! - [`Upstream`] - anything that can answer a request (the network, a replayer)
//! - [`ResponseSource`] - where a response handed back to a page came from
//!
//! Protocol types live in `haven-http`; storage traits live in `haven-backend`.

pub mod key;
pub mod source;
pub mod upstream;
pub mod value;

pub use key::RequestKey;
pub use source::ResponseSource;
pub use upstream::Upstream;
pub use value::CachedEntry;

#[doc(hidden)]
pub use smol_str::SmolStr;

/// Raw byte data stored in cache partitions and action logs.
/// `Bytes` clones by reference count, so entries are cheap to hand around.
pub type Raw = bytes::Bytes;
