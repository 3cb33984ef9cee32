//! Collaborator interfaces consumed by command handlers.
//!
//! The shell never talks to the network or to disk itself. Handlers call
//! an [`ApiService`] for remote operations and a [`CredentialStore`] for the
//! persisted login. Concrete implementations live in `tlearn-net`; tests use
//! [`MemoryCredentialStore`] and scripted fakes.

use std::collections::HashMap;

use async_trait::async_trait;
use tlearn_types::error::Result;
use tlearn_types::model::{ApiKey, Course, Lesson, LoginResponse, RegisteredAccount, Task};

/// Credential key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Credential key holding the logged-in username.
pub const USERNAME_KEY: &str = "username";

/// Remote t-learn API.
///
/// Every operation resolves with its typed payload or fails with an error
/// whose message is suitable for showing to the user. Operations that need
/// an authenticated caller take the bearer token explicitly.
#[async_trait(?Send)]
pub trait ApiService {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse>;

    async fn register(&self, username: &str, email: &str, password: &str)
    -> Result<RegisteredAccount>;

    /// Mint a new API key for the caller.
    async fn issue_api_key(&self, token: Option<&str>) -> Result<ApiKey>;

    async fn list_courses(&self) -> Result<Vec<Course>>;

    async fn list_lessons(&self, token: Option<&str>, course_id: &str) -> Result<Vec<Lesson>>;

    async fn get_task(&self, lesson_id: &str) -> Result<Task>;

    async fn create_course(&self, token: Option<&str>, title: &str, description: &str)
    -> Result<()>;

    async fn delete_course(&self, token: Option<&str>, course_id: &str) -> Result<()>;

    async fn create_lesson(
        &self,
        token: Option<&str>,
        course_id: &str,
        title: &str,
        content: &str,
        position: i32,
    ) -> Result<()>;

    async fn delete_lesson(&self, token: Option<&str>, lesson_id: &str) -> Result<()>;
}

/// Persisted key-value store for the login token and username.
pub trait CredentialStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Non-persistent credential store.
#[derive(Debug, Default, Clone)]
pub struct MemoryCredentialStore {
    values: HashMap<String, String>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}
