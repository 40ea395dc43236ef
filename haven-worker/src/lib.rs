#![doc = include_str!("../README.md")]

pub mod clients;
mod dispatch;
mod error;
pub mod event;
mod handlers;
mod notify;
mod worker;

pub use clients::{CancellationToken, ClientId, ClientInfo, ClientRegistry};
pub use dispatch::{EventHandler, EventRouter, HandlerFuture};
pub use error::DispatchError;
pub use event::{Event, EventKind, EventOutcome};
pub use notify::NotificationCenter;
pub use worker::{Worker, WorkerContext};
