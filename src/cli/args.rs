//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Modes
//!
//! At most one mode flag may be given: `--list-vibes`, `--spotify`,
//! `--disconnect`, `--status`, `--demo`, `--preview`, `--completions`.
//! Without one, the real commit flow runs.
//!
//! # Global Flags
//!
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--interactive` / `--no-interactive`: Control prompts
//! - `--quiet` / `-q`: Minimal output
//! - `--no-color`: Plain output

use clap::{ArgGroup, Parser};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Commit Vibes - add your mood and your music to git commits
#[derive(Parser, Debug)]
#[command(name = "commit-vibes")]
#[command(author, version, about)]
#[command(
    long_about = "🎵 Commit Vibes - add your mood and your music to git commits\n\n\
        Stages your changes, asks for a message and a vibe, and can append the \
        song you are listening to on Spotify before running git commit.",
    after_help = "\
EXAMPLES:
    # Commit with a message and pick a vibe
    commit-vibes \"fix: handle empty input\"

    # Be asked for everything
    commit-vibes

    # Try the whole flow without touching git or Spotify
    commit-vibes --demo

    # Use real git and Spotify data but do not commit
    commit-vibes --preview

    # Connect your Spotify account, then check it
    commit-vibes --spotify
    commit-vibes --status

CUSTOM VIBES:
    Pass a JSON file with -c/--custom-vibe, or set [vibes] custom in the
    config file. Custom vibes are added after the built-in ones:

    {
      \"vibes\": [
        { \"emoji\": \"🚀\", \"description\": \"Feelin Fast\", \"hint\": \"Ship it.\" }
      ]
    }

SPOTIFY SETUP:
    Create an app at https://developer.spotify.com/dashboard, add
    http://localhost:3000 as a redirect URI, then set SPOTIFY_CLIENT_ID and
    SPOTIFY_CLIENT_SECRET (or let --spotify ask for them)."
)]
#[command(group(
    ArgGroup::new("mode")
        .args(["list_vibes", "spotify", "disconnect", "status", "demo", "preview", "completions"])
        .multiple(false)
))]
pub struct Cli {
    /// Commit message (prompted for when omitted)
    pub message: Option<String>,

    /// List all available vibes
    #[arg(short, long)]
    pub list_vibes: bool,

    /// Load extra vibes from a JSON file
    #[arg(short, long, value_name = "PATH")]
    pub custom_vibe: Option<PathBuf>,

    /// Connect your Spotify account
    #[arg(short, long)]
    pub spotify: bool,

    /// Disconnect your Spotify account
    #[arg(short, long)]
    pub disconnect: bool,

    /// Show Spotify connection status and the current track
    #[arg(long)]
    pub status: bool,

    /// Run the full flow with fabricated data; nothing is changed
    #[arg(long)]
    pub demo: bool,

    /// Use real git and Spotify data but do not stage or commit
    #[arg(long)]
    pub preview: bool,

    /// Print the authorization URL instead of opening a browser
    #[arg(long)]
    pub no_browser: bool,

    /// Print a shell completion script
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,

    /// Run as if commit-vibes was started in this directory
    #[arg(long, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable styled output
    #[arg(long)]
    pub no_color: bool,

    /// Enable interactive prompts
    #[arg(long = "interactive", conflicts_with = "no_interactive")]
    pub interactive_flag: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_interactive: bool,
}

/// What the invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Commit,
    Demo,
    Preview,
    Status,
    Connect,
    Disconnect,
    ListVibes,
    Completions(Shell),
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// The selected mode; the commit flow when no mode flag is set.
    pub fn mode(&self) -> Command {
        if let Some(shell) = self.completions {
            Command::Completions(shell)
        } else if self.list_vibes {
            Command::ListVibes
        } else if self.spotify {
            Command::Connect
        } else if self.disconnect {
            Command::Disconnect
        } else if self.status {
            Command::Status
        } else if self.demo {
            Command::Demo
        } else if self.preview {
            Command::Preview
        } else {
            Command::Commit
        }
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Only `--no-interactive` turns prompts off; `--quiet` reduces output
    /// and nothing else. Piped stdin stays interactive; the prompter
    /// switches to line input.
    pub fn interactive(&self) -> bool {
        self.interactive_flag || !self.no_interactive
    }

    /// Styled output unless `--no-color`, `NO_COLOR`, or a non-terminal
    /// stdout says otherwise. `config_color` is the `ui.color` setting.
    pub fn color(&self, config_color: bool) -> bool {
        if self.no_color || std::env::var_os("NO_COLOR").is_some() {
            return false;
        }
        config_color && std::io::stdout().is_terminal()
    }
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
