//! t-learn shell entry point.
//!
//! Reads one command per line from stdin and prints the display lines each
//! command produces. `exit`, `quit`, or end of input leave the shell.
//! The config file comes from the first CLI argument, `TLEARN_CONFIG`, or
//! `tlearn.toml` in the working directory.

mod render;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use render::Renderer;
use tlearn_net::{FileCredentialStore, HttpApiClient};
use tlearn_terminal::{Interpreter, Outcome};
use tlearn_types::config::ShellConfig;

const ENV_CONFIG: &str = "TLEARN_CONFIG";
const DEFAULT_CONFIG: &str = "tlearn.toml";

fn config_path(arg: Option<String>, env: Option<String>) -> PathBuf {
    arg.or(env)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
}

fn is_exit(line: &str) -> bool {
    matches!(line.trim(), "exit" | "quit")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let path = config_path(std::env::args().nth(1), std::env::var(ENV_CONFIG).ok());
    let config = ShellConfig::load(&path)
        .with_context(|| format!("loading {}", path.display()))?
        .with_env_overrides();
    log::info!("Starting t-learn shell (api: {})", config.api_base);

    let api = HttpApiClient::new(
        &config.api_base,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let mut credentials = FileCredentialStore::open(&config.credentials_path)
        .with_context(|| format!("opening {}", config.credentials_path.display()))?;

    let mut shell = Interpreter::with_builtins(&config.welcome);
    shell.restore_session(&credentials);

    let mut stdout = std::io::stdout();
    let mut renderer = Renderer::new(std::io::stdin().is_terminal(), stdout.is_terminal());
    renderer.flush_new(shell.lines(), &mut stdout)?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        renderer.prompt(shell.prompt(), &mut stdout)?;
        let Some(line) = input.next_line().await? else {
            break;
        };
        if is_exit(&line) {
            break;
        }
        match shell.execute(&line, &api, &mut credentials).await {
            Outcome::Ignored => continue,
            Outcome::Cleared => renderer.clear_screen(&mut stdout)?,
            Outcome::NotFound | Outcome::Completed(_) => {},
        }
        renderer.flush_new(shell.lines(), &mut stdout)?;
    }

    log::info!("t-learn shell exiting");
    Ok(())
}
