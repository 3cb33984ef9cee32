//! Concrete collaborators for the t-learn shell.
//!
//! [`HttpApiClient`] talks to the t-learn API over HTTP; [`FileCredentialStore`]
//! keeps the login between runs.

pub mod client;
pub mod credentials;

pub use client::HttpApiClient;
pub use credentials::FileCredentialStore;
