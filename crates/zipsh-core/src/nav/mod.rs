//! Navigation logic for zipsh.
//!
//! This module contains the [`state::Navigation`] state machine behind `cd`
//! and the [`listing`] used by `ls`.

pub mod listing;
pub mod state;

pub use listing::list_directory;
pub use state::Navigation;
