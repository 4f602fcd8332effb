mod commands;
mod input;
mod terminal;

use std::path::{Path, PathBuf};

use anyhow::Context;
use commands::{CommandLine, Commands, info, run};
use revmap_common::config::Settings;
use revmap_common::error;
use terminal::{logging, print, spinner};

#[tokio::main]
async fn main() {
    let commands = CommandLine::parse_args();
    let env_file = load_env(commands.env_file.as_deref());

    let settings = commands
        .settings()
        .with_env(|key| std::env::var(key).ok());

    logging::init_logging(settings.quiet);

    let result = execute(&commands, &settings, env_file).await;

    spinner::get_spinner().finish_and_clear();
    if let Err(e) = result {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn execute(
    commands: &CommandLine,
    settings: &Settings,
    env_file: anyhow::Result<Option<PathBuf>>,
) -> anyhow::Result<()> {
    if let Some(path) = env_file? {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }

    print::banner(settings.no_banner, settings.quiet);

    match commands.command.unwrap_or(Commands::Run) {
        Commands::Run => run::run(settings).await,
        Commands::Info => info::info(settings).await,
    }
}

/// An explicit `--env-file` must exist; the implicit `.env` is optional.
fn load_env(path: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            Ok(Some(path.to_path_buf()))
        }
        None => Ok(dotenvy::dotenv().ok()),
    }
}
