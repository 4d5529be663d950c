//! Command handler modules for the CLI.

mod completions;
mod exec;
mod info;
mod process;
mod screen;
mod terminal;
mod transfer;

use std::path::PathBuf;

use remotectl_core::{Client, SessionConfig};
use secrecy::SecretString;

use crate::cli::Commands;
use crate::error::CliError;

/// Flags shared by every command that talks to the host
#[derive(Debug, Default)]
pub struct GlobalOptions {
    /// Explicit configuration file
    pub config: Option<PathBuf>,
    /// Prompt for the password on the terminal
    pub ask_password: bool,
}

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(options: &GlobalOptions, command: Commands) -> Result<(), CliError> {
    if let Commands::Completions { shell } = command {
        return completions::cmd_completions(shell);
    }

    let config = load_config(options)?;
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Config(format!("Failed to create async runtime: {e}")))?;

    runtime.block_on(async {
        let client = Client::connect(config)
            .await
            .map_err(|e| CliError::Connection(e.to_string()))?;
        let result = run(&client, command).await;
        client.session().close().await;
        result
    })
}

async fn run(client: &Client, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Info { format } => info::cmd_info(client, format).await,
        Commands::Exec { words } => exec::cmd_exec(client, &words).await,
        Commands::Upload { src, dest } => transfer::cmd_upload(client, &src, &dest).await,
        Commands::Download { src, dest } => transfer::cmd_download(client, &src, &dest).await,
        Commands::Ps { format, grep } => process::cmd_ps(client, format, grep.as_deref()).await,
        Commands::Kill { target } => process::cmd_kill(client, &target).await,
        Commands::Reboot => process::cmd_reboot(client).await,
        Commands::Screen(subcmd) => screen::cmd_screen(client, subcmd).await,
        Commands::Attach {
            screen,
            command,
            terminal,
        } => {
            terminal::cmd_attach(
                client,
                screen.as_deref(),
                command.as_deref(),
                terminal.as_deref(),
            )
            .await
        }
        Commands::Browse { program } => terminal::cmd_browse(client, &program),
        Commands::Completions { shell } => completions::cmd_completions(shell),
    }
}

/// Loads the session configuration from `--config` or the default search
/// order, prompting for the password when asked to
fn load_config(options: &GlobalOptions) -> Result<SessionConfig, CliError> {
    let mut config = match &options.config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::load_default()?,
    };

    if options.ask_password {
        let target = match &config.username {
            Some(user) => format!("{user}@{}", config.hostname),
            None => config.hostname.clone(),
        };
        eprint!("Password for {target}: ");
        let password = rpassword::read_password()
            .map_err(|e| CliError::Config(format!("Failed to read password: {e}")))?;
        config.password = Some(SecretString::from(password));
    }
    Ok(config)
}
