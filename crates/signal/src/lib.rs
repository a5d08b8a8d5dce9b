//! Signal transport for sigrelay.
//!
//! Talks to a local signal-cli REST API daemon: implements `Messenger` for
//! outbound calls and runs a long-polling receive loop that feeds decoded
//! messages to an `InboundHandler`.

pub mod api;
pub mod attachments;
pub mod client;
pub mod config;
pub mod error;
pub mod inbound;
pub mod receiver;

pub use {
    client::SignalMessenger,
    config::SignalAccountConfig,
    error::{Error, Result},
    receiver::{ReceiveHandle, start_receiving},
};
