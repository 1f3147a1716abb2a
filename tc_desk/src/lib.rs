//! Tournament desk: operator command line for team chess events.
//!
//! Configuration comes from the environment (and `.env`), commands run one
//! library operation each against a JSON data file or PostgreSQL, and the
//! outcome is printed as text or JSON.

pub mod commands;
pub mod config;
pub mod logging;
pub mod report;

pub use commands::{Command, DeskError, Outcome, Session};
pub use config::{Backend, ConfigError, ConfigOverrides, DeskConfig};
