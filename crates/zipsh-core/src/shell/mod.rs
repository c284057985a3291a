//! The command layer: parsing input lines and running them against a
//! [`session::Session`].

pub mod command;
pub mod session;

pub use command::Command;
pub use session::{CommandResult, Session};
