//! Course authoring commands: `mkcourse`, `rmcourse`, `mklesson`, `rmlesson`.
//!
//! Each mutation leaves the session caches consistent with the server:
//! course changes re-fetch the course list, `mklesson` re-fetches the
//! lesson cache when it holds that course, and `rmlesson` drops the lesson
//! from the cache locally. Deleting the course whose lessons are cached
//! empties the lesson cache. A failed re-fetch empties the cache so the
//! next read fetches again.

use async_trait::async_trait;
use log::warn;
use tlearn_types::error::Result;

use crate::commands::api_failure;
use crate::content_commands::{find_course, find_lesson};
use crate::interpreter::{Command, CommandRegistry, CommandResponse, Environment};

/// Register course authoring commands into a registry.
pub fn register_admin_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(MkCourseCmd));
    reg.register(Box::new(RmCourseCmd));
    reg.register(Box::new(MkLessonCmd));
    reg.register(Box::new(RmLessonCmd));
}

async fn refresh_courses(env: &mut Environment<'_>) {
    match env.api.list_courses().await {
        Ok(courses) => env.session.cached_courses = courses,
        Err(e) => {
            warn!("course list refresh failed: {e}");
            env.session.cached_courses.clear();
        },
    }
}

async fn refresh_lessons(env: &mut Environment<'_>, course_id: &str) {
    let token = env.token();
    match env.api.list_lessons(token.as_deref(), course_id).await {
        Ok(lessons) => env.session.cached_lessons = lessons,
        Err(e) => {
            warn!("lesson list refresh failed: {e}");
            env.session.cached_lessons.clear();
        },
    }
}

// ---------------------------------------------------------------------------
// mkcourse
// ---------------------------------------------------------------------------

struct MkCourseCmd;

#[async_trait(?Send)]
impl Command for MkCourseCmd {
    fn name(&self) -> &str {
        "mkcourse"
    }
    fn description(&self) -> &str {
        "Create a course (admin)"
    }
    fn usage(&self) -> &str {
        "mkcourse \"<title>\" \"<description>\""
    }
    fn category(&self) -> &str {
        "admin"
    }
    async fn execute(&self, args: &[String], env: &mut Environment<'_>) -> Result<CommandResponse> {
        let [title, description] = args else {
            return Ok(CommandResponse::usage(self.usage()));
        };
        let token = env.token();
        if let Err(e) = env.api.create_course(token.as_deref(), title, description).await {
            return Ok(api_failure("Could not create course", e));
        }
        refresh_courses(env).await;
        Ok(CommandResponse::success(format!("Course '{title}' created.")))
    }
}

// ---------------------------------------------------------------------------
// rmcourse
// ---------------------------------------------------------------------------

struct RmCourseCmd;

#[async_trait(?Send)]
impl Command for RmCourseCmd {
    fn name(&self) -> &str {
        "rmcourse"
    }
    fn description(&self) -> &str {
        "Delete a course and its lessons (admin)"
    }
    fn usage(&self) -> &str {
        "rmcourse <course name or id>"
    }
    fn category(&self) -> &str {
        "admin"
    }
    async fn execute(&self, args: &[String], env: &mut Environment<'_>) -> Result<CommandResponse> {
        if args.is_empty() {
            return Ok(CommandResponse::usage(self.usage()));
        }
        let course = match find_course(&args.join(" "), env).await {
            Ok(c) => c,
            Err(resp) => return Ok(resp),
        };
        let token = env.token();
        if let Err(e) = env.api.delete_course(token.as_deref(), &course.id).await {
            return Ok(api_failure("Could not delete course", e));
        }
        refresh_courses(env).await;
        let in_context = env.session.path.first() == Some(&course.title);
        if in_context {
            env.session.path.clear();
        }
        if in_context || env.session.lessons_course.as_deref() == Some(course.id.as_str()) {
            env.session.forget_lessons();
        }
        Ok(CommandResponse::success(format!("Course '{}' deleted.", course.title)))
    }
}

// ---------------------------------------------------------------------------
// mklesson
// ---------------------------------------------------------------------------

struct MkLessonCmd;

#[async_trait(?Send)]
impl Command for MkLessonCmd {
    fn name(&self) -> &str {
        "mklesson"
    }
    fn description(&self) -> &str {
        "Add a lesson to a course (admin)"
    }
    fn usage(&self) -> &str {
        "mklesson <course> \"<title>\" \"<content>\" <position>"
    }
    fn category(&self) -> &str {
        "admin"
    }
    async fn execute(&self, args: &[String], env: &mut Environment<'_>) -> Result<CommandResponse> {
        let [course_query, title, content, position] = args else {
            return Ok(CommandResponse::usage(self.usage()));
        };
        let Ok(position) = position.parse::<i32>() else {
            return Ok(CommandResponse::error(format!(
                "Position must be a number, got '{position}'. Usage: {}",
                self.usage()
            )));
        };
        let course = match find_course(course_query, env).await {
            Ok(c) => c,
            Err(resp) => return Ok(resp),
        };
        let token = env.token();
        if let Err(e) = env
            .api
            .create_lesson(token.as_deref(), &course.id, title, content, position)
            .await
        {
            return Ok(api_failure("Could not create lesson", e));
        }
        if env.session.lessons_course.as_deref() == Some(course.id.as_str()) {
            refresh_lessons(env, &course.id).await;
        }
        Ok(CommandResponse::success(format!(
            "Lesson '{title}' added to {} at position {position}.",
            course.title
        )))
    }
}

// ---------------------------------------------------------------------------
// rmlesson
// ---------------------------------------------------------------------------

struct RmLessonCmd;

#[async_trait(?Send)]
impl Command for RmLessonCmd {
    fn name(&self) -> &str {
        "rmlesson"
    }
    fn description(&self) -> &str {
        "Delete a lesson (admin)"
    }
    fn usage(&self) -> &str {
        "rmlesson <lesson name or id>"
    }
    fn category(&self) -> &str {
        "admin"
    }
    async fn execute(&self, args: &[String], env: &mut Environment<'_>) -> Result<CommandResponse> {
        if args.is_empty() {
            return Ok(CommandResponse::usage(self.usage()));
        }
        let lesson = match find_lesson(&args.join(" "), env) {
            Ok(l) => l,
            Err(resp) => return Ok(resp),
        };
        let token = env.token();
        if let Err(e) = env.api.delete_lesson(token.as_deref(), &lesson.id).await {
            return Ok(api_failure("Could not delete lesson", e));
        }
        env.session.cached_lessons.retain(|l| l.id != lesson.id);
        if env.session.path.last() == Some(&lesson.title) && env.session.path.len() > 1 {
            env.session.pop_path();
        }
        Ok(CommandResponse::success(format!("Lesson '{}' deleted.", lesson.title)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryCredentialStore;
    use crate::session::SessionState;
    use crate::test_utils::{FakeApi, course, lesson};
    use tlearn_types::display::LineKind;

    async fn run(
        cmd: &dyn Command,
        line: &str,
        session: &mut SessionState,
        api: &FakeApi,
    ) -> CommandResponse {
        let argv = crate::tokenize(line);
        let mut creds = MemoryCredentialStore::new();
        let mut env = Environment {
            session,
            api,
            credentials: &mut creds,
        };
        cmd.execute(&argv, &mut env).await.unwrap()
    }

    fn seeded() -> (FakeApi, SessionState) {
        let api = FakeApi::new();
        api.courses.borrow_mut().push(course("c1", "Go Mastery"));
        api.lessons.borrow_mut().insert(
            "c1".into(),
            vec![lesson("l1", "Intro", 1, false), lesson("l2", "Pointers", 2, false)],
        );
        let mut session = SessionState::new();
        session.cached_courses = api.courses.borrow().clone();
        session.cached_lessons = api.lessons.borrow()["c1"].clone();
        session.lessons_course = Some("c1".into());
        (api, session)
    }

    #[tokio::test]
    async fn mkcourse_one_arg_is_usage_error() {
        let (api, mut session) = seeded();
        let resp = run(&MkCourseCmd, "OnlyTitle", &mut session, &api).await;
        assert_eq!(resp.kind, LineKind::Error);
        assert!(resp.content.starts_with("Usage: mkcourse"));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn mkcourse_refetches_courses() {
        let (api, mut session) = seeded();
        let resp = run(&MkCourseCmd, r#""Rust 101" "Ownership first""#, &mut session, &api).await;
        assert_eq!(resp.kind, LineKind::Success);
        assert_eq!(api.calls(), vec!["create_course", "list_courses"]);
        assert!(session.cached_courses.iter().any(|c| c.title == "Rust 101"));
    }

    #[tokio::test]
    async fn mkcourse_failure_skips_refresh() {
        let api = FakeApi::failing("forbidden");
        let mut session = SessionState::new();
        let resp = run(&MkCourseCmd, r#""Rust" "desc""#, &mut session, &api).await;
        assert_eq!(resp.kind, LineKind::Error);
        assert!(resp.content.contains("forbidden"));
        assert_eq!(api.calls(), vec!["create_course"]);
    }

    #[tokio::test]
    async fn rmcourse_resolves_deletes_and_refetches() {
        let (api, mut session) = seeded();
        session.push_path("Go Mastery");
        let resp = run(&RmCourseCmd, "go", &mut session, &api).await;
        assert_eq!(resp.kind, LineKind::Success);
        assert_eq!(api.calls(), vec!["delete_course", "list_courses"]);
        assert!(session.cached_courses.is_empty());
        assert!(session.path.is_empty());
        assert!(session.cached_lessons.is_empty());
        assert!(session.lessons_course.is_none());
    }

    #[tokio::test]
    async fn rmcourse_of_cached_lessons_outside_context_forgets_them() {
        let (api, mut session) = seeded();
        let resp = run(&RmCourseCmd, "c1", &mut session, &api).await;
        assert_eq!(resp.kind, LineKind::Success);
        assert!(session.cached_lessons.is_empty());

        let mut creds = MemoryCredentialStore::new();
        let env = Environment {
            session: &mut session,
            api: &api,
            credentials: &mut creds,
        };
        let err = find_lesson("Intro", &env).unwrap_err();
        assert!(err.content.contains("Run 'lessons <course>' first"));
    }

    #[tokio::test]
    async fn rmcourse_of_other_course_keeps_lessons() {
        let (api, mut session) = seeded();
        api.courses.borrow_mut().push(course("c2", "Advanced SQL"));
        session.cached_courses = api.courses.borrow().clone();
        session.push_path("Go Mastery");
        let resp = run(&RmCourseCmd, "sql", &mut session, &api).await;
        assert_eq!(resp.kind, LineKind::Success);
        assert_eq!(session.cached_lessons.len(), 2);
        assert_eq!(session.prompt(), "Go Mastery $");
    }

    #[tokio::test]
    async fn rmcourse_unknown_name() {
        let (api, mut session) = seeded();
        let resp = run(&RmCourseCmd, "cobol", &mut session, &api).await;
        assert_eq!(resp.kind, LineKind::Error);
        assert!(resp.content.contains("not found"));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn mklesson_rejects_non_numeric_position() {
        let (api, mut session) = seeded();
        let resp = run(&MkLessonCmd, r#"c1 "Slices" "All about slices" third"#, &mut session, &api).await;
        assert_eq!(resp.kind, LineKind::Error);
        assert!(resp.content.contains("Position must be a number"));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn mklesson_wrong_arg_count() {
        let (api, mut session) = seeded();
        let resp = run(&MkLessonCmd, "c1 Slices", &mut session, &api).await;
        assert!(resp.content.starts_with("Usage: mklesson"));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn mklesson_refetches_lessons() {
        let (api, mut session) = seeded();
        let resp = run(&MkLessonCmd, r#"Mastery "Slices" "All about slices" 3"#, &mut session, &api).await;
        assert_eq!(resp.kind, LineKind::Success);
        assert_eq!(api.calls(), vec!["create_lesson", "list_lessons"]);
        assert_eq!(session.cached_lessons.len(), 3);
        assert_eq!(session.cached_lessons[2].title, "Slices");
        assert_eq!(session.cached_lessons[2].position, 3);
    }

    #[tokio::test]
    async fn mklesson_outside_context_leaves_cache_alone() {
        let (api, mut session) = seeded();
        api.courses.borrow_mut().push(course("c2", "Advanced SQL"));
        session.cached_courses = api.courses.borrow().clone();
        session.push_path("Go Mastery");
        let resp = run(&MkLessonCmd, r#"c2 "Views" "body" 2"#, &mut session, &api).await;
        assert_eq!(resp.kind, LineKind::Success);
        assert_eq!(api.calls(), vec!["create_lesson"]);
        let titles: Vec<&str> = session.cached_lessons.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Intro", "Pointers"]);
        assert_eq!(session.lessons_course.as_deref(), Some("c1"));
        assert_eq!(session.prompt(), "Go Mastery $");
        assert_eq!(api.lessons.borrow()["c2"].len(), 1);
    }

    #[tokio::test]
    async fn rmlesson_filters_cache_locally() {
        let (api, mut session) = seeded();
        session.push_path("Go Mastery");
        session.push_path("Pointers");
        let resp = run(&RmLessonCmd, "pointers", &mut session, &api).await;
        assert_eq!(resp.kind, LineKind::Success);
        assert_eq!(api.calls(), vec!["delete_lesson"]);
        let ids: Vec<&str> = session.cached_lessons.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["l1"]);
        assert_eq!(session.prompt(), "Go Mastery $");
    }

    #[tokio::test]
    async fn rmlesson_requires_cached_lessons() {
        let api = FakeApi::new();
        let mut session = SessionState::new();
        let resp = run(&RmLessonCmd, "Intro", &mut session, &api).await;
        assert_eq!(resp.kind, LineKind::Error);
        assert!(resp.content.contains("Run 'lessons <course>' first"));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn rmlesson_failure_keeps_cache() {
        let (_, mut session) = seeded();
        let api = FakeApi::failing("Error 404: Not Found");
        let resp = run(&RmLessonCmd, "l1", &mut session, &api).await;
        assert_eq!(resp.kind, LineKind::Error);
        assert_eq!(session.cached_lessons.len(), 2);
    }
}
