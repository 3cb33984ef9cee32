//! HTTP client for the t-learn API.
//!
//! Wraps reqwest for the auth, content, and admin routes. All methods
//! return typed payloads; failures carry the server's own error message
//! when it sends one.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tlearn_terminal::ApiService;
use tlearn_types::error::{Result, TlearnError};
use tlearn_types::model::{ApiKey, Course, Lesson, LoginResponse, RegisteredAccount, Task};

/// Client for the t-learn REST API.
pub struct HttpApiClient {
    client: Client,
    base_url: String,
}

fn transport(e: reqwest::Error) -> TlearnError {
    TlearnError::Api(format!("network error: {e}"))
}

fn decode(e: reqwest::Error) -> TlearnError {
    TlearnError::Api(format!("unexpected response: {e}"))
}

/// Message for a failed response: the body's `error` field, else the status.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(serde_json::Value::String(msg)) = map.get("error")
    {
        return msg.clone();
    }
    format!(
        "Error {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

impl HttpApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TlearnError::Config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let mut req = self.client.request(method, format!("{}{path}", self.base_url));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn checked(req: RequestBuilder) -> Result<Response> {
        let resp = req.send().await.map_err(transport)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let msg = error_message(status, &body);
        warn!("API returned {status}: {msg}");
        Err(TlearnError::Api(msg))
    }

    async fn fetch<T: DeserializeOwned>(req: RequestBuilder) -> Result<T> {
        let resp = Self::checked(req).await?;
        resp.json::<T>().await.map_err(decode)
    }

    async fn submit(req: RequestBuilder) -> Result<()> {
        Self::checked(req).await.map(drop)
    }
}

#[async_trait(?Send)]
impl ApiService for HttpApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        debug!("POST /auth/login for {username}");
        let req = self
            .request(Method::POST, "/auth/login", None)
            .json(&json!({ "username": username, "password": password }));
        Self::fetch(req).await
    }

    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisteredAccount> {
        debug!("POST /auth/register for {username}");
        let req = self.request(Method::POST, "/auth/register", None).json(&json!({
            "username": username,
            "email": email,
            "password": password,
        }));
        Self::fetch(req).await
    }

    async fn issue_api_key(&self, token: Option<&str>) -> Result<ApiKey> {
        Self::fetch(self.request(Method::POST, "/auth/token", token)).await
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        Self::fetch(self.request(Method::GET, "/courses", None)).await
    }

    async fn list_lessons(&self, token: Option<&str>, course_id: &str) -> Result<Vec<Lesson>> {
        let path = format!("/courses/{course_id}/lessons");
        Self::fetch(self.request(Method::GET, &path, token)).await
    }

    async fn get_task(&self, lesson_id: &str) -> Result<Task> {
        let path = format!("/lessons/{lesson_id}/task");
        Self::fetch(self.request(Method::GET, &path, None)).await
    }

    async fn create_course(&self, token: Option<&str>, title: &str, description: &str) -> Result<()> {
        let req = self
            .request(Method::POST, "/admin/courses", token)
            .json(&json!({ "title": title, "description": description }));
        Self::submit(req).await
    }

    async fn delete_course(&self, token: Option<&str>, course_id: &str) -> Result<()> {
        let path = format!("/admin/courses/{course_id}");
        Self::submit(self.request(Method::DELETE, &path, token)).await
    }

    async fn create_lesson(
        &self,
        token: Option<&str>,
        course_id: &str,
        title: &str,
        content: &str,
        position: i32,
    ) -> Result<()> {
        let path = format!("/admin/courses/{course_id}/lessons");
        let req = self
            .request(Method::POST, &path, token)
            .json(&json!({ "title": title, "content": content, "position": position }));
        Self::submit(req).await
    }

    async fn delete_lesson(&self, token: Option<&str>, lesson_id: &str) -> Result<()> {
        let path = format!("/admin/lessons/{lesson_id}");
        Self::submit(self.request(Method::DELETE, &path, token)).await
    }
}
