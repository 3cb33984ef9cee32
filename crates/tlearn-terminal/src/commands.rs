//! Built-in commands for the t-learn shell.
//!
//! Account commands live here; course and lesson browsing is in
//! `content_commands`, course authoring in `admin_commands`.

use async_trait::async_trait;
use log::{info, warn};
use tlearn_types::error::{Result, TlearnError};

use crate::interpreter::{Command, CommandRegistry, CommandResponse, Environment};
use crate::services::{TOKEN_KEY, USERNAME_KEY};

/// Register all built-in commands into a registry.
///
/// The shell also has the commands `clear`, `help`, and `history`. The
/// interpreter answers them itself, before any registry lookup, so they are
/// not registered here. `help` and completion still list them with the
/// registered commands.
pub fn register_builtins(reg: &mut CommandRegistry) {
    reg.register(Box::new(RegisterCmd));
    reg.register(Box::new(LoginCmd));
    reg.register(Box::new(LogoutCmd));
    reg.register(Box::new(WhoamiCmd));
    reg.register(Box::new(TokenCmd));
    crate::register_content_commands(reg);
    crate::register_admin_commands(reg);
}

/// Turn a collaborator failure into an error response.
pub(crate) fn api_failure(context: &str, err: TlearnError) -> CommandResponse {
    warn!("{context}: {err}");
    CommandResponse::error(format!("{context}: {err}"))
}

// ---------------------------------------------------------------------------
// register
// ---------------------------------------------------------------------------

struct RegisterCmd;

#[async_trait(?Send)]
impl Command for RegisterCmd {
    fn name(&self) -> &str {
        "register"
    }
    fn description(&self) -> &str {
        "Create a new account"
    }
    fn usage(&self) -> &str {
        "register <username> <email> <password>"
    }
    fn category(&self) -> &str {
        "account"
    }
    async fn execute(&self, args: &[String], env: &mut Environment<'_>) -> Result<CommandResponse> {
        let [user, email, pass] = args else {
            return Ok(CommandResponse::usage(self.usage()));
        };
        match env.api.register(user, email, pass).await {
            Ok(account) => Ok(CommandResponse::success(format!(
                "Account created for {} ({}). You can now 'login'.",
                account.username, account.email
            ))),
            Err(e) => Ok(api_failure("Registration failed", e)),
        }
    }
}

// ---------------------------------------------------------------------------
// login
// ---------------------------------------------------------------------------

struct LoginCmd;

#[async_trait(?Send)]
impl Command for LoginCmd {
    fn name(&self) -> &str {
        "login"
    }
    fn description(&self) -> &str {
        "Log in to the platform"
    }
    fn usage(&self) -> &str {
        "login <username> <password>"
    }
    fn category(&self) -> &str {
        "account"
    }
    async fn execute(&self, args: &[String], env: &mut Environment<'_>) -> Result<CommandResponse> {
        let [user, pass] = args else {
            return Ok(CommandResponse::usage(self.usage()));
        };
        let resp = match env.api.login(user, pass).await {
            Ok(resp) => resp,
            Err(e) => return Ok(api_failure("Login failed", e)),
        };

        let username = resp.user.username;
        let saved = env
            .credentials
            .set(TOKEN_KEY, &resp.token)
            .and_then(|()| env.credentials.set(USERNAME_KEY, &username));
        env.session.user = Some(username.clone());
        info!("logged in as {username}");

        match saved {
            Ok(()) => Ok(CommandResponse::success(format!("Logged in as {username}."))),
            Err(e) => Ok(CommandResponse::error(format!(
                "Logged in as {username}, but the login could not be saved: {e}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// logout
// ---------------------------------------------------------------------------

struct LogoutCmd;

#[async_trait(?Send)]
impl Command for LogoutCmd {
    fn name(&self) -> &str {
        "logout"
    }
    fn description(&self) -> &str {
        "Log out and forget the saved login"
    }
    fn usage(&self) -> &str {
        "logout"
    }
    fn category(&self) -> &str {
        "account"
    }
    async fn execute(&self, _args: &[String], env: &mut Environment<'_>) -> Result<CommandResponse> {
        for key in [TOKEN_KEY, USERNAME_KEY] {
            if let Err(e) = env.credentials.remove(key) {
                warn!("could not remove {key}: {e}");
            }
        }
        if let Some(user) = env.session.user.take() {
            info!("logged out {user}");
        }
        env.session.reset_user();
        Ok(CommandResponse::success("Logged out."))
    }
}

// ---------------------------------------------------------------------------
// whoami
// ---------------------------------------------------------------------------

struct WhoamiCmd;

#[async_trait(?Send)]
impl Command for WhoamiCmd {
    fn name(&self) -> &str {
        "whoami"
    }
    fn description(&self) -> &str {
        "Show current user"
    }
    fn usage(&self) -> &str {
        "whoami"
    }
    fn category(&self) -> &str {
        "account"
    }
    async fn execute(&self, _args: &[String], env: &mut Environment<'_>) -> Result<CommandResponse> {
        Ok(match &env.session.user {
            Some(user) => CommandResponse::info(user.clone()),
            None => CommandResponse::error("Not logged in. Use 'login <username> <password>'."),
        })
    }
}

// ---------------------------------------------------------------------------
// token
// ---------------------------------------------------------------------------

struct TokenCmd;

#[async_trait(?Send)]
impl Command for TokenCmd {
    fn name(&self) -> &str {
        "token"
    }
    fn description(&self) -> &str {
        "Generate an API key for the t-learn CLI"
    }
    fn usage(&self) -> &str {
        "token"
    }
    fn category(&self) -> &str {
        "account"
    }
    async fn execute(&self, _args: &[String], env: &mut Environment<'_>) -> Result<CommandResponse> {
        let token = env.token();
        match env.api.issue_api_key(token.as_deref()).await {
            Ok(key) => Ok(CommandResponse::success(format!(
                "API key generated:\n  {}\nKeep it secret; generating a new key replaces this one.",
                key.api_key
            ))),
            Err(e) => Ok(api_failure("Could not generate API key", e)),
        }
    }
}
