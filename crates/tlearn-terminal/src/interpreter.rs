//! Command trait, registry, and dispatch logic.
//!
//! The [`Interpreter`] owns the display history, the session state, and the
//! registry. Each submitted line is recorded, echoed, tokenized, and handed
//! to the matching [`Command`]; whatever the command returns becomes one
//! display line.

use std::collections::HashMap;

use async_trait::async_trait;
use log::{debug, info, warn};
use tlearn_types::display::{DisplayLine, LineKind};
use tlearn_types::error::Result;

use crate::services::{ApiService, CredentialStore, TOKEN_KEY, USERNAME_KEY};
use crate::session::SessionState;

/// What a command reports back: one tagged block of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub kind: LineKind,
    pub content: String,
}

impl CommandResponse {
    pub fn new(kind: LineKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn output(content: impl Into<String>) -> Self {
        Self::new(LineKind::Output, content)
    }

    pub fn info(content: impl Into<String>) -> Self {
        Self::new(LineKind::Info, content)
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self::new(LineKind::Success, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(LineKind::Error, content)
    }

    /// Error response carrying a `Usage:` hint.
    pub fn usage(usage: &str) -> Self {
        Self::error(format!("Usage: {usage}"))
    }
}

/// Everything a command may touch while it runs.
pub struct Environment<'a> {
    /// Session state owned by the interpreter.
    pub session: &'a mut SessionState,
    /// Remote API.
    pub api: &'a dyn ApiService,
    /// Persisted login.
    pub credentials: &'a mut dyn CredentialStore,
}

impl Environment<'_> {
    /// Bearer token of the persisted login, if any.
    pub fn token(&self) -> Option<String> {
        self.credentials.get(TOKEN_KEY)
    }
}

/// A single executable command.
///
/// Declared failures (bad arguments, unknown names, API errors) are
/// returned as `Ok` error responses. An `Err` means the handler itself
/// broke; the interpreter reports it and carries on.
#[async_trait(?Send)]
pub trait Command {
    /// The command name (what the user types, lower-case).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "login <username> <password>").
    fn usage(&self) -> &str;

    /// Command category for grouping in `help` output.
    fn category(&self) -> &str {
        "general"
    }

    /// Execute the command with the given arguments and environment.
    async fn execute(&self, args: &[String], env: &mut Environment<'_>) -> Result<CommandResponse>;
}

/// Registry of available commands.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Register a command. Replaces any existing command with the same name.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.commands.insert(cmd.name().to_ascii_lowercase(), cmd);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|c| c.as_ref())
    }

    /// Return a sorted list of (name, description) pairs.
    pub fn list_commands(&self) -> Vec<(&str, &str)> {
        let mut cmds: Vec<(&str, &str)> = self
            .commands
            .values()
            .map(|c| (c.name(), c.description()))
            .collect();
        cmds.sort_by_key(|(name, _)| *name);
        cmds
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Commands handled by the interpreter itself: (name, usage, description).
const SHELL_BUILTINS: &[(&str, &str, &str)] = &[
    ("clear", "clear", "Clear the terminal screen"),
    ("help", "help [command]", "List available commands"),
    ("history", "history", "Show previously entered commands"),
];

/// What one call to [`Interpreter::execute`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Blank input; nothing recorded.
    Ignored,
    /// Display history was wiped.
    Cleared,
    /// No command with that name.
    NotFound,
    /// A command ran and produced a line of this kind.
    Completed(LineKind),
}

/// The shell: display history, session state, and dispatch.
///
/// `execute` takes `&mut self`, so one command is in flight at a time and
/// display lines are appended in completion order.
pub struct Interpreter {
    registry: CommandRegistry,
    session: SessionState,
    lines: Vec<DisplayLine>,
    prompt: String,
    next_line_id: u64,
}

impl Interpreter {
    /// Create an interpreter over a registry. A non-empty `welcome` becomes
    /// the first display line.
    pub fn new(registry: CommandRegistry, welcome: &str) -> Self {
        let session = SessionState::new();
        let prompt = session.prompt();
        let mut interp = Self {
            registry,
            session,
            lines: Vec::new(),
            prompt,
            next_line_id: 0,
        };
        if !welcome.is_empty() {
            interp.push_line(LineKind::Info, welcome);
        }
        interp
    }

    /// Create an interpreter with every built-in command registered.
    pub fn with_builtins(welcome: &str) -> Self {
        let mut registry = CommandRegistry::new();
        crate::register_builtins(&mut registry);
        Self::new(registry, welcome)
    }

    /// Pick up a login persisted by an earlier run.
    pub fn restore_session(&mut self, credentials: &dyn CredentialStore) {
        if let (Some(_), Some(user)) = (credentials.get(TOKEN_KEY), credentials.get(USERNAME_KEY)) {
            info!("restored session for {user}");
            self.session.user = Some(user);
        }
    }

    /// Display history, oldest first.
    pub fn lines(&self) -> &[DisplayLine] {
        &self.lines
    }

    /// Current prompt label.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Recall the previous (older) history entry into the input line.
    pub fn recall_up(&mut self) -> Option<&str> {
        self.session.recall_up()
    }

    /// Recall the next (newer) history entry; `None` means empty input.
    pub fn recall_down(&mut self) -> Option<&str> {
        self.session.recall_down()
    }

    /// Wipe the display history.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Parse and execute one input line.
    ///
    /// Never fails: every problem ends up as an `error` display line.
    pub async fn execute(
        &mut self,
        line: &str,
        api: &dyn ApiService,
        credentials: &mut dyn CredentialStore,
    ) -> Outcome {
        let tokens = tokenize(line);
        let Some((first, args)) = tokens.split_first() else {
            return Outcome::Ignored;
        };

        self.session.record(line);
        self.push_line(LineKind::Command, line);
        let name = first.to_lowercase();
        debug!("dispatch '{name}' with {} args", args.len());

        let result = match name.as_str() {
            "clear" => {
                self.clear();
                return Outcome::Cleared;
            },
            "help" => Ok(self.execute_help(args)),
            "history" => Ok(self.execute_history()),
            _ => match self.registry.get(&name) {
                Some(cmd) => {
                    let mut env = Environment {
                        session: &mut self.session,
                        api,
                        credentials,
                    };
                    cmd.execute(args, &mut env).await
                },
                None => {
                    self.push_line(
                        LineKind::Error,
                        format!("Command not found: {name}. Type 'help' for list."),
                    );
                    return Outcome::NotFound;
                },
            },
        };

        let response = result.unwrap_or_else(|e| {
            warn!("command '{name}' faulted: {e}");
            CommandResponse::error(format!("Error executing '{name}': {e}"))
        });
        let kind = response.kind;
        self.push_line(kind, response.content);
        self.prompt = self.session.prompt();
        Outcome::Completed(kind)
    }

    /// Command names (registered and built-in) starting with `partial`.
    pub fn completions(&self, partial: &str) -> Vec<String> {
        let lower = partial.to_ascii_lowercase();
        let mut names: Vec<String> = SHELL_BUILTINS
            .iter()
            .map(|(name, _, _)| *name)
            .chain(self.registry.list_commands().into_iter().map(|(n, _)| n))
            .filter(|name| name.starts_with(&lower))
            .map(str::to_string)
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn push_line(&mut self, kind: LineKind, content: impl Into<String>) {
        let id = self.next_line_id;
        self.next_line_id += 1;
        self.lines.push(DisplayLine::new(id, kind, content));
    }

    // -- Intercepted commands --

    /// Built-in help with access to the registry.
    fn execute_help(&self, args: &[String]) -> CommandResponse {
        if let Some(name) = args.first() {
            let name_lower = name.to_ascii_lowercase();
            if let Some((n, usage, desc)) = SHELL_BUILTINS.iter().find(|(n, _, _)| *n == name_lower)
            {
                return CommandResponse::info(format!("{n} (shell)\n  {desc}\n  Usage: {usage}"));
            }
            return match self.registry.get(&name_lower) {
                Some(cmd) => CommandResponse::info(format!(
                    "{} ({})\n  {}\n  Usage: {}",
                    cmd.name(),
                    cmd.category(),
                    cmd.description(),
                    cmd.usage()
                )),
                None => CommandResponse::error(format!("help: unknown command: {name}")),
            };
        }

        // Group commands by category.
        let mut categories: HashMap<&str, Vec<(&str, &str)>> = HashMap::new();
        for (name, _, desc) in SHELL_BUILTINS {
            categories.entry("shell").or_default().push((name, desc));
        }
        for (name, _) in self.registry.list_commands() {
            if let Some(cmd) = self.registry.get(name) {
                categories
                    .entry(cmd.category())
                    .or_default()
                    .push((cmd.name(), cmd.description()));
            }
        }

        let mut cats: Vec<&str> = categories.keys().copied().collect();
        cats.sort();

        let mut out = String::from("Available commands:\n");
        for cat in cats {
            let mut cmds = categories.remove(cat).unwrap_or_default();
            cmds.sort_by_key(|(name, _)| *name);
            out.push_str(&format!("\n  [{cat}]\n"));
            for (name, desc) in cmds {
                out.push_str(&format!("    {name:10} {desc}\n"));
            }
        }
        out.push_str("\nType 'help <command>' for details.");
        CommandResponse::info(out)
    }

    fn execute_history(&self) -> CommandResponse {
        let lines: Vec<String> = self
            .session
            .command_history()
            .iter()
            .enumerate()
            .map(|(i, cmd)| format!("{:4}  {cmd}", i + 1))
            .collect();
        CommandResponse::output(lines.join("\n"))
    }
}

// ---------------------------------------------------------------------------
// Tokenizer: whitespace splitting with double-quote grouping.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InQuote,
}

/// Split a command line into tokens.
///
/// - Runs of whitespace separate tokens.
/// - A `"` at the start of a token groups everything up to the next `"`
///   into one token, quotes stripped. `""` is an empty token.
/// - A `"` inside an unquoted token is literal.
/// - An unterminated quote makes the rest of the line one token, opening
///   quote included.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut state = ScanState::Normal;

    for ch in input.chars() {
        match state {
            ScanState::Normal => {
                if ch.is_whitespace() {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                } else if ch == '"' && !in_token {
                    state = ScanState::InQuote;
                    in_token = true;
                } else {
                    current.push(ch);
                    in_token = true;
                }
            },
            ScanState::InQuote => {
                if ch == '"' {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                    state = ScanState::Normal;
                } else {
                    current.push(ch);
                }
            },
        }
    }

    match state {
        ScanState::InQuote => tokens.push(format!("\"{current}")),
        ScanState::Normal if in_token => tokens.push(current),
        ScanState::Normal => {},
    }

    tokens
}
