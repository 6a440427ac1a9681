//! # Hospital Locator Library
//!
//! Internal library for the hospital-locator binary application.
//!
//! This library exists to enable testing of complex internals and provide clean separation
//! between CLI dispatch (main.rs) and application logic.
//!
//! ## Architecture
//!
//! The library is organized into several layers:
//!
//! - **Entry Point**: `HospitalLocator` runs the interactive session; `Services` builds
//!   the providers for one-shot commands
//! - **Discovery**: `discovery` module with the sans-I/O `Controller` state machine and
//!   its token-ordered request discipline
//! - **Providers**: `geo` (device position, distance), `search` (place search client),
//!   and `auth` (sign-in gate)
//! - **Runtime**: `session` executes controller effects on worker threads and owns the
//!   terminal front end
//! - **Presentation**: `presenter` renders the list, map, header, and login screen
//! - **Configuration**: `config` module for TOML-based settings
//! - **Commands**: `commands` module for CLI subcommands (search, locate, help)
//! - **Infrastructure**: Signal handling, logging, and utilities

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

// Public API modules
pub mod app;
pub mod args;
pub mod auth;
pub mod commands;
pub mod common;
pub mod config;
pub mod discovery;
pub mod geo;
pub mod io;
pub mod presenter;
pub mod search;
pub mod session;

// Re-export for binary
pub use app::HospitalLocator;
