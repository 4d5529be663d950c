//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Remote administration of a single host over SSH
#[derive(Parser)]
#[command(name = "remotectl")]
#[command(author, version, about = "Remote host administration over SSH")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a YAML or TOML session configuration
    #[arg(short, long, global = true, env = "REMOTECTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Prompt for the SSH password instead of reading it from the configuration
    #[arg(long, global = true)]
    pub ask_password: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show temperature, CPU, memory, uptime and storage
    #[command(about = "Show a summary of the remote host")]
    Info {
        /// Output format
        #[arg(short, long, default_value = "text", value_enum)]
        format: OutputFormat,
    },

    /// Run a shell command on the host
    #[command(about = "Run a command and exit with its exit code")]
    Exec {
        /// Command line, passed to the remote shell as-is
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },

    /// Copy a local file to the host
    #[command(about = "Upload a file over SFTP")]
    Upload {
        /// Local source file
        src: PathBuf,
        /// Remote destination path
        dest: String,
    },

    /// Copy a remote file to the local machine
    #[command(about = "Download a file over SFTP")]
    Download {
        /// Remote source path
        src: String,
        /// Local destination file
        dest: PathBuf,
    },

    /// List remote processes
    #[command(about = "List processes reported by ps")]
    Ps {
        /// Output format
        #[arg(short, long, default_value = "text", value_enum)]
        format: OutputFormat,

        /// Only show processes whose command contains this text
        #[arg(short = 'g', long)]
        grep: Option<String>,
    },

    /// Kill a remote process
    #[command(about = "Kill a process by pid or name")]
    Kill {
        /// Pid, or process name as understood by pidof
        target: String,
    },

    /// Manage screen sessions
    #[command(subcommand)]
    Screen(ScreenCommands),

    /// Open an interactive terminal, optionally attached to a screen session
    #[command(about = "Open a terminal on the host")]
    Attach {
        /// Screen session to reattach (pid, name or pid.name)
        screen: Option<String>,

        /// Command to run after attaching
        #[arg(short = 'e', long)]
        command: Option<String>,

        /// Terminal program (defaults to ssh)
        #[arg(short, long)]
        terminal: Option<String>,
    },

    /// Open the host in a file browser
    #[command(about = "Open an SFTP URL for the host in a file browser")]
    Browse {
        /// Program receiving the sftp:// URL
        #[arg(short, long, default_value = "xdg-open")]
        program: String,
    },

    /// Reboot the host
    #[command(about = "Reboot the remote host with sudo")]
    Reboot,

    /// Generate shell completions
    #[command(about = "Generate shell completion scripts")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Screen session subcommands
#[derive(Subcommand)]
pub enum ScreenCommands {
    /// List screen sessions
    List {
        /// Output format
        #[arg(short, long, default_value = "text", value_enum)]
        format: OutputFormat,
    },

    /// Start a command in a new detached session
    Create {
        /// Session name
        name: String,

        /// Command run under bash -c
        command: String,
    },

    /// Quit a session
    Kill {
        /// Pid, name or pid.name
        target: String,
    },

    /// Rename a session
    Rename {
        /// Pid, name or pid.name
        target: String,

        /// New session name
        new_name: String,
    },
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON document
    Json,
}
