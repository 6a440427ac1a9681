//! Command-line command handlers.
//!
//! Each one-shot command lives in its own submodule. Commands that can fail
//! at the user level (nothing found, no position) return the process exit
//! code instead of an error so their output is printed either way.

pub mod help;
pub mod locate;
pub mod search;
