//! Session state, prompt computation, and command-history recall.

use tlearn_types::model::{Course, Lesson};

/// Prompt shown when the navigation path is empty.
pub const ROOT_PROMPT: &str = "$";

/// Mutable state for the lifetime of one running shell.
///
/// Owned by the [`Interpreter`](crate::Interpreter) and lent to each handler
/// through its [`Environment`](crate::Environment). Only handlers and the
/// interpreter mutate it.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Logged-in username.
    pub user: Option<String>,
    /// Stack of entered navigation contexts. Empty means root.
    pub path: Vec<String>,
    /// Snapshot of the last course fetch.
    pub cached_courses: Vec<Course>,
    /// Snapshot of the last lesson fetch.
    pub cached_lessons: Vec<Lesson>,
    /// Id of the course `cached_lessons` belongs to.
    pub lessons_course: Option<String>,
    command_history: Vec<String>,
    history_pointer: Option<usize>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every submitted (non-blank) line, oldest first.
    pub fn command_history(&self) -> &[String] {
        &self.command_history
    }

    /// Current recall index, `None` when not recalling.
    pub fn history_pointer(&self) -> Option<usize> {
        self.history_pointer
    }

    /// Append a submitted line and stop recalling.
    pub fn record(&mut self, line: &str) {
        self.command_history.push(line.to_string());
        self.history_pointer = None;
    }

    /// Move the recall pointer one entry older and return that entry.
    ///
    /// Starting from "not recalling" goes to the newest entry; clamps at the
    /// oldest. Returns `None` only when the history is empty.
    pub fn recall_up(&mut self) -> Option<&str> {
        if self.command_history.is_empty() {
            return None;
        }
        let next = match self.history_pointer {
            None => self.command_history.len() - 1,
            Some(i) => i.saturating_sub(1),
        };
        self.history_pointer = Some(next);
        Some(&self.command_history[next])
    }

    /// Move the recall pointer one entry newer.
    ///
    /// Moving past the newest entry stops recalling and returns `None`
    /// (the input line should be emptied).
    pub fn recall_down(&mut self) -> Option<&str> {
        let current = self.history_pointer?;
        if current + 1 >= self.command_history.len() {
            self.history_pointer = None;
            return None;
        }
        self.history_pointer = Some(current + 1);
        Some(&self.command_history[current + 1])
    }

    /// Enter a named navigation context.
    pub fn push_path(&mut self, segment: &str) {
        self.path.push(segment.to_string());
    }

    /// Leave the innermost navigation context.
    pub fn pop_path(&mut self) -> Option<String> {
        self.path.pop()
    }

    /// Forget the logged-in user and return to root.
    pub fn reset_user(&mut self) {
        self.user = None;
        self.path.clear();
    }

    /// Drop the lesson cache.
    pub fn forget_lessons(&mut self) {
        self.cached_lessons.clear();
        self.lessons_course = None;
    }

    pub fn prompt(&self) -> String {
        compute_prompt(&self.path)
    }
}

/// Derive the prompt from a navigation path.
pub fn compute_prompt(path: &[String]) -> String {
    match path.last() {
        None => ROOT_PROMPT.to_string(),
        Some(segment) => format!("{segment} {ROOT_PROMPT}"),
    }
}
