//! Transport seam.
//!
//! The dispatcher never talks to Signal directly. Outbound calls and
//! lookups go through [`Messenger`]; inbound messages arrive through
//! [`InboundHandler`]. The signal-cli client implements the first and the
//! dispatcher implements the second.

pub mod error;
pub mod groups;
pub mod messenger;

pub use {
    error::{Error, Result},
    groups::{GroupSelector, find_group},
    messenger::{InboundHandler, Messenger},
};
