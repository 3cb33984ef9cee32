//! Shared test utilities for command tests.
//!
//! Provides a [`FakeApi`] that serves canned data, records every call, and
//! can be told to fail every operation with a fixed message.

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use tlearn_types::error::{Result, TlearnError};
use tlearn_types::model::{
    ApiKey, Course, Lesson, LoginResponse, RegisteredAccount, Task, TaskStep, UserSummary,
};

use crate::services::ApiService;

pub fn course(id: &str, title: &str) -> Course {
    Course {
        id: id.into(),
        title: title.into(),
        description: String::new(),
    }
}

pub fn lesson(id: &str, title: &str, position: i32, completed: bool) -> Lesson {
    Lesson {
        id: id.into(),
        title: title.into(),
        position,
        completed,
    }
}

pub fn task(lesson_title: &str, steps: &[&str]) -> Task {
    Task {
        lesson_id: "l1".into(),
        lesson_title: lesson_title.into(),
        lesson_content: "Everything is a file.".into(),
        task_id: "t1".into(),
        task_description: "Create and inspect a file.".into(),
        steps: steps
            .iter()
            .enumerate()
            .map(|(i, cmd)| TaskStep {
                position: i as i32 + 1,
                command: (*cmd).into(),
                expected_output: String::new(),
            })
            .collect(),
    }
}

/// In-memory stand-in for the remote API.
#[derive(Default)]
pub struct FakeApi {
    pub courses: RefCell<Vec<Course>>,
    /// Lessons keyed by course id.
    pub lessons: RefCell<HashMap<String, Vec<Lesson>>>,
    pub task: RefCell<Option<Task>>,
    /// When set, every operation fails with this message.
    pub fail_with: RefCell<Option<String>>,
    /// Tokens passed to authenticated operations, in call order.
    pub tokens_seen: RefCell<Vec<Option<String>>>,
    calls: RefCell<Vec<&'static str>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        let api = Self::default();
        *api.fail_with.borrow_mut() = Some(message.to_string());
        api
    }

    /// Operation names in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn enter(&self, op: &'static str) -> Result<()> {
        self.calls.borrow_mut().push(op);
        match self.fail_with.borrow().as_ref() {
            Some(msg) => Err(TlearnError::Api(msg.clone())),
            None => Ok(()),
        }
    }

    fn enter_authed(&self, op: &'static str, token: Option<&str>) -> Result<()> {
        self.tokens_seen.borrow_mut().push(token.map(str::to_string));
        self.enter(op)
    }
}

#[async_trait(?Send)]
impl ApiService for FakeApi {
    async fn login(&self, username: &str, _password: &str) -> Result<LoginResponse> {
        self.enter("login")?;
        Ok(LoginResponse {
            token: format!("jwt-{username}"),
            user: UserSummary {
                id: "u1".into(),
                username: username.into(),
            },
        })
    }

    async fn register(
        &self,
        username: &str,
        email: &str,
        _password: &str,
    ) -> Result<RegisteredAccount> {
        self.enter("register")?;
        Ok(RegisteredAccount {
            id: "u2".into(),
            username: username.into(),
            email: email.into(),
        })
    }

    async fn issue_api_key(&self, token: Option<&str>) -> Result<ApiKey> {
        self.enter_authed("issue_api_key", token)?;
        Ok(ApiKey {
            api_key: "0123abcd".into(),
        })
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        self.enter("list_courses")?;
        Ok(self.courses.borrow().clone())
    }

    async fn list_lessons(&self, token: Option<&str>, course_id: &str) -> Result<Vec<Lesson>> {
        self.enter_authed("list_lessons", token)?;
        Ok(self
            .lessons
            .borrow()
            .get(course_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_task(&self, lesson_id: &str) -> Result<Task> {
        self.enter("get_task")?;
        self.task
            .borrow()
            .clone()
            .ok_or_else(|| TlearnError::Api(format!("no task for lesson {lesson_id}")))
    }

    async fn create_course(&self, token: Option<&str>, title: &str, description: &str) -> Result<()> {
        self.enter_authed("create_course", token)?;
        let id = format!("c{}", self.courses.borrow().len() + 100);
        self.courses.borrow_mut().push(Course {
            id,
            title: title.into(),
            description: description.into(),
        });
        Ok(())
    }

    async fn delete_course(&self, token: Option<&str>, course_id: &str) -> Result<()> {
        self.enter_authed("delete_course", token)?;
        self.courses.borrow_mut().retain(|c| c.id != course_id);
        self.lessons.borrow_mut().remove(course_id);
        Ok(())
    }

    async fn create_lesson(
        &self,
        token: Option<&str>,
        course_id: &str,
        title: &str,
        _content: &str,
        position: i32,
    ) -> Result<()> {
        self.enter_authed("create_lesson", token)?;
        let mut lessons = self.lessons.borrow_mut();
        let list = lessons.entry(course_id.to_string()).or_default();
        let id = format!("l{}", list.len() + 100);
        list.push(lesson(&id, title, position, false));
        Ok(())
    }

    async fn delete_lesson(&self, token: Option<&str>, lesson_id: &str) -> Result<()> {
        self.enter_authed("delete_lesson", token)?;
        for list in self.lessons.borrow_mut().values_mut() {
            list.retain(|l| l.id != lesson_id);
        }
        Ok(())
    }
}
