//! Payloads exchanged with the t-learn API.
//!
//! Field names follow the JSON the API emits. Optional fields default so a
//! leaner server response still deserializes.

use serde::{Deserialize, Serialize};

/// Anything the shell can look up by id or by (fuzzy) title.
pub trait Entity {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Entity for Course {
    fn id(&self) -> &str {
        &self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub position: i32,
    /// Whether the logged-in user has completed this lesson's task.
    #[serde(default)]
    pub completed: bool,
}

impl Entity for Lesson {
    fn id(&self) -> &str {
        &self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
}

/// One shell command the learner is expected to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStep {
    #[serde(default)]
    pub position: i32,
    pub command: String,
    #[serde(default)]
    pub expected_output: String,
}

/// The practical task attached to a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub lesson_id: String,
    pub lesson_title: String,
    #[serde(default)]
    pub lesson_content: String,
    pub task_id: String,
    #[serde(default)]
    pub task_description: String,
    #[serde(default)]
    pub steps: Vec<TaskStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}

/// Response of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

/// Response of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredAccount {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    pub api_key: String,
}
