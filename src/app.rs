//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::logging;
use crate::ui::View;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process;

/// A terminal voice-journaling client with live level metering
#[derive(Parser)]
#[command(name = "reflectify")]
#[command(version)]
#[command(about = "Record voice journal entries and browse them from the terminal")]
#[command(
    long_about = "Record voice journal entries with a live input-level meter, upload\nthem for transcription and tagging, and browse the resulting timeline\nand event-frequency views.\n\nDEFAULT COMMAND:\n    If no command is specified, 'record' is used by default.\n    The record option (-d) can be used without explicitly saying 'record'.\n\nEXAMPLES:\n    # Record a new entry\n    $ reflectify\n    $ reflectify record\n\n    # Record with a specific input device\n    $ reflectify -d 2\n    $ reflectify record --device \"USB Microphone\"\n\n    # Upload a pre-recorded WAV file\n    $ reflectify upload memo.wav\n\n    # Browse previous entries\n    $ reflectify timeline\n\n    # See which events come up most often\n    $ reflectify events\n\n    # Edit configuration file\n    $ reflectify config"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/reflectify/reflectify.toml\n    Logs:               ~/.local/state/reflectify/reflectify.log.*"
)]
struct Cli {
    /// Audio input device id or name (record default command)
    #[arg(short, long, value_name = "DEVICE", global = true)]
    device: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a voice entry with a live level meter (default)
    ///
    /// Press Enter to save and upload the entry, Escape/q to cancel.
    /// The recording is encoded and sent to the configured backend, which
    /// responds with the transcription.
    #[command(visible_alias = "r")]
    Record {
        /// Audio input device id or name
        #[arg(short, long, value_name = "DEVICE")]
        device: Option<String>,
    },

    /// Upload a pre-recorded WAV file as a journal entry
    ///
    /// Only .wav files are accepted. The transcription is printed to stdout.
    ///
    /// Examples:
    ///   reflectify upload memo.wav
    #[command(visible_alias = "u")]
    Upload {
        /// Path to the WAV file to upload
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Browse previous journal entries in chronological order
    ///
    /// Shows timestamp, sentiment, transcription, and tagged events per
    /// entry. Use arrow keys to navigate, Esc/q to exit.
    #[command(visible_alias = "t")]
    Timeline,

    /// Show the most discussed events across all entries
    ///
    /// Displays the backend's main-event summary along with how often each
    /// event appears. Use arrow keys to navigate, Esc/q to exit.
    #[command(visible_alias = "e")]
    Events,

    /// List available audio input devices
    ///
    /// Shows device ids and names to help configure the correct input
    /// device in reflectify.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Open configuration file in your preferred editor
    ///
    /// Edit audio and backend settings. Uses the $EDITOR environment
    /// variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    ///
    /// Examples:
    ///   reflectify completions bash > reflectify.bash
    ///   reflectify completions zsh > _reflectify
    ///   reflectify completions fish > reflectify.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails (e.g., recording, upload, viewing)
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "reflectify", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    // Route to appropriate command handler
    match cli.command {
        None | Some(Commands::Record { .. }) => {
            // Default command is record
            // An explicit record --device takes precedence over the top-level flag
            let device = match cli.command {
                Some(Commands::Record { device }) => device.or(cli.device),
                None => cli.device,
                _ => unreachable!(),
            };
            open_view(View::Recorder, device).await?;
        }
        Some(Commands::Timeline) => {
            open_view(View::Timeline, None).await?;
        }
        Some(Commands::Events) => {
            open_view(View::Events, None).await?;
        }
        Some(Commands::Upload { file }) => {
            commands::handle_upload(file).await?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}

/// Opens one of the named terminal views. Exactly one view is active per
/// invocation.
async fn open_view(view: View, device: Option<String>) -> Result<(), anyhow::Error> {
    match view {
        View::Recorder => commands::handle_record(device).await,
        View::Timeline => commands::handle_timeline().await,
        View::Events => commands::handle_events().await,
    }
}
