//! Foundation types for t-learn.
//!
//! This crate contains the types shared by all t-learn crates: display
//! lines produced by the shell, remote API payloads, configuration, and
//! error types.

pub mod config;
pub mod display;
pub mod error;
pub mod model;
