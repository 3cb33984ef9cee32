//! Course and lesson browsing: `courses`, `lessons`, `start`, `back`.
//!
//! Fetched lists replace the session caches wholesale. Names typed by the
//! user are resolved against those caches.

use std::fmt::Write as _;

use async_trait::async_trait;
use log::debug;
use tlearn_types::error::Result;
use tlearn_types::model::{Course, Lesson, Task};

use crate::commands::api_failure;
use crate::interpreter::{Command, CommandRegistry, CommandResponse, Environment};
use crate::resolve::resolve_entity;

/// Register course/lesson browsing commands into a registry.
pub fn register_content_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(CoursesCmd));
    reg.register(Box::new(LessonsCmd));
    reg.register(Box::new(StartCmd));
    reg.register(Box::new(BackCmd));
}

/// Fetch the course list if nothing is cached yet.
pub(crate) async fn ensure_courses(env: &mut Environment<'_>) -> std::result::Result<(), CommandResponse> {
    if !env.session.cached_courses.is_empty() {
        return Ok(());
    }
    debug!("course cache empty, fetching");
    let courses = env
        .api
        .list_courses()
        .await
        .map_err(|e| api_failure("Could not fetch courses", e))?;
    env.session.cached_courses = courses;
    Ok(())
}

/// Resolve a course name against the cache, fetching it first if empty.
pub(crate) async fn find_course(
    query: &str,
    env: &mut Environment<'_>,
) -> std::result::Result<Course, CommandResponse> {
    ensure_courses(env).await?;
    resolve_entity(query, &env.session.cached_courses)
        .cloned()
        .ok_or_else(|| {
            CommandResponse::error(format!(
                "Course '{query}' not found. Run 'courses' to see what is available."
            ))
        })
}

/// Resolve a lesson name against the cache. Never fetches.
pub(crate) fn find_lesson(query: &str, env: &Environment<'_>) -> std::result::Result<Lesson, CommandResponse> {
    resolve_entity(query, &env.session.cached_lessons)
        .cloned()
        .ok_or_else(|| {
            CommandResponse::error(format!(
                "Lesson '{query}' not found. Run 'lessons <course>' first."
            ))
        })
}

fn format_courses(courses: &[Course]) -> String {
    let id_width = courses.iter().map(|c| c.id.len()).max().unwrap_or(0).max(2);
    let mut out = format!("{:id_width$} | TITLE\n", "ID");
    out.push_str(&format!("{}-+-{}", "-".repeat(id_width), "-".repeat(22)));
    for c in courses {
        let _ = write!(out, "\n{:id_width$} | {}", c.id, c.title);
    }
    out
}

fn format_lessons(course: &Course, lessons: &[Lesson]) -> String {
    let mut out = format!("Lessons in {}:", course.title);
    for l in lessons {
        let mark = if l.completed { 'x' } else { ' ' };
        let _ = write!(out, "\n  [{mark}] {}. {}", l.position, l.title);
    }
    out
}

/// Render a task as markdown: lesson text, task, steps, and how to verify.
fn format_task(task: &Task) -> String {
    let mut out = format!("# {}\n", task.lesson_title);
    if !task.lesson_content.is_empty() {
        let _ = write!(out, "\n{}\n", task.lesson_content);
    }
    if !task.task_description.is_empty() {
        let _ = write!(out, "\n## Task\n\n{}\n", task.task_description);
    }

    out.push_str("\n## Steps\n\n");
    let mut steps = task.steps.clone();
    steps.sort_by_key(|s| s.position);
    if steps.is_empty() {
        out.push_str("_This task has no steps._\n");
    }
    for (i, step) in steps.iter().enumerate() {
        let _ = writeln!(out, "{}. `{}`", i + 1, step.command);
        if !step.expected_output.is_empty() {
            let _ = writeln!(out, "   expected: `{}`", step.expected_output);
        }
    }

    let _ = write!(
        out,
        "\n## Verify\n\nWhen you are done, run this in your own terminal:\n\n    tlearn verify {}",
        task.task_id
    );
    out
}

// ---------------------------------------------------------------------------
// courses
// ---------------------------------------------------------------------------

struct CoursesCmd;

#[async_trait(?Send)]
impl Command for CoursesCmd {
    fn name(&self) -> &str {
        "courses"
    }
    fn description(&self) -> &str {
        "List available courses"
    }
    fn usage(&self) -> &str {
        "courses"
    }
    fn category(&self) -> &str {
        "learning"
    }
    async fn execute(&self, _args: &[String], env: &mut Environment<'_>) -> Result<CommandResponse> {
        let courses = match env.api.list_courses().await {
            Ok(c) => c,
            Err(e) => return Ok(api_failure("Could not fetch courses", e)),
        };
        env.session.cached_courses = courses;
        let courses = &env.session.cached_courses;
        if courses.is_empty() {
            return Ok(CommandResponse::info("No courses available yet."));
        }
        Ok(CommandResponse::info(format_courses(courses)))
    }
}

// ---------------------------------------------------------------------------
// lessons
// ---------------------------------------------------------------------------

struct LessonsCmd;

#[async_trait(?Send)]
impl Command for LessonsCmd {
    fn name(&self) -> &str {
        "lessons"
    }
    fn description(&self) -> &str {
        "List the lessons of a course"
    }
    fn usage(&self) -> &str {
        "lessons <course name or id>"
    }
    fn category(&self) -> &str {
        "learning"
    }
    async fn execute(&self, args: &[String], env: &mut Environment<'_>) -> Result<CommandResponse> {
        if args.is_empty() {
            return Ok(CommandResponse::usage(self.usage()));
        }
        let query = args.join(" ");
        let course = match find_course(&query, env).await {
            Ok(c) => c,
            Err(resp) => return Ok(resp),
        };

        let token = env.token();
        let lessons = match env.api.list_lessons(token.as_deref(), &course.id).await {
            Ok(l) => l,
            Err(e) => return Ok(api_failure("Could not fetch lessons", e)),
        };
        env.session.cached_lessons = lessons;
        env.session.lessons_course = Some(course.id.clone());
        env.session.path = vec![course.title.clone()];

        if env.session.cached_lessons.is_empty() {
            return Ok(CommandResponse::info(format!("No lessons in {} yet.", course.title)));
        }
        Ok(CommandResponse::info(format_lessons(&course, &env.session.cached_lessons)))
    }
}

// ---------------------------------------------------------------------------
// start
// ---------------------------------------------------------------------------

struct StartCmd;

#[async_trait(?Send)]
impl Command for StartCmd {
    fn name(&self) -> &str {
        "start"
    }
    fn description(&self) -> &str {
        "Open a lesson and show its task"
    }
    fn usage(&self) -> &str {
        "start <lesson name or id>"
    }
    fn category(&self) -> &str {
        "learning"
    }
    async fn execute(&self, args: &[String], env: &mut Environment<'_>) -> Result<CommandResponse> {
        if args.is_empty() {
            return Ok(CommandResponse::usage(self.usage()));
        }
        let query = args.join(" ");
        let lesson = match find_lesson(&query, env) {
            Ok(l) => l,
            Err(resp) => return Ok(resp),
        };

        let task = match env.api.get_task(&lesson.id).await {
            Ok(t) => t,
            Err(e) => return Ok(api_failure("Could not load task", e)),
        };

        // Stay inside the current course, replacing any previous lesson.
        env.session.path.truncate(1);
        env.session.push_path(&lesson.title);
        Ok(CommandResponse::output(format_task(&task)))
    }
}

// ---------------------------------------------------------------------------
// back
// ---------------------------------------------------------------------------

struct BackCmd;

#[async_trait(?Send)]
impl Command for BackCmd {
    fn name(&self) -> &str {
        "back"
    }
    fn description(&self) -> &str {
        "Leave the current course or lesson"
    }
    fn usage(&self) -> &str {
        "back"
    }
    fn category(&self) -> &str {
        "learning"
    }
    async fn execute(&self, _args: &[String], env: &mut Environment<'_>) -> Result<CommandResponse> {
        Ok(match env.session.pop_path() {
            Some(left) => CommandResponse::info(format!("Left {left}.")),
            None => CommandResponse::info("Already at the top level."),
        })
    }
}
