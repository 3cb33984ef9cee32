//! Command interpreter for the t-learn shell.
//!
//! The terminal is a registry-based dispatch system. Commands implement the
//! `Command` trait and are registered by name. The interpreter tokenizes
//! input lines, resolves the command name, and awaits `execute()` against
//! the session state and the external collaborators.

pub mod admin_commands;
mod commands;
pub mod content_commands;
mod interpreter;
pub mod resolve;
pub mod services;
pub mod session;

#[cfg(test)]
pub(crate) mod test_utils;

/// Register course authoring commands (mkcourse, rmcourse, mklesson, rmlesson).
pub use admin_commands::register_admin_commands;
/// Register all built-in commands (account, learning, admin) into a registry.
pub use commands::register_builtins;
/// Register course/lesson browsing commands (courses, lessons, start, back).
pub use content_commands::register_content_commands;
/// A single executable command trait.
pub use interpreter::Command;
/// Registry of available commands.
pub use interpreter::CommandRegistry;
/// Tagged text returned by a command.
pub use interpreter::CommandResponse;
/// Session state and collaborators lent to every command.
pub use interpreter::Environment;
/// The shell: display history, session state, and dispatch.
pub use interpreter::Interpreter;
/// Result of executing one input line.
pub use interpreter::Outcome;
/// Split an input line into tokens with double-quote grouping.
pub use interpreter::tokenize;
pub use resolve::{resolve, resolve_entity};
pub use services::{ApiService, CredentialStore, MemoryCredentialStore};
pub use session::{SessionState, compute_prompt};
