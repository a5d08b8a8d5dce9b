//! Control-group command dispatcher.
//!
//! Messages that reach the account outside the control group are relayed
//! into it. Inside the group, a message that mentions the bot carries a JSON
//! command (`{"method": "send", "contactid": 0, "message": "hi"}`) which is
//! parsed into a [`Command`] and executed against a
//! [`Messenger`](sigrelay_channels::Messenger). Every rejected command is
//! answered with a 👎 reaction and a reply naming the problem.

pub mod command;
pub mod dispatcher;
pub mod error;
pub mod help;
pub mod mention;
pub mod render;

pub use {
    command::{Command, Method, Request, parse_request},
    dispatcher::{Dispatcher, THUMBS_DOWN, THUMBS_UP},
    error::{CommandError, Error, Result},
    help::HelpTopic,
};
