mod commands;
mod config;
mod editor;

use std::{io::Write, path::PathBuf, time::Duration};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use panel_api::{ItemId, PanelClient};
use schedule::WeeklySlot;

use crate::commands::{App, AudioSource, EventArgs, TrimArgs};

#[derive(Debug, Parser)]
#[command(version, about = "Control panel for a scheduled announcement appliance")]
struct Cli {
    /// Config file [default: ~/.config/bellpanel/config.yaml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides `server_url` from the config file
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List songs and the weekly schedule
    Library,
    #[command(subcommand)]
    Song(SongCommand),
    #[command(subcommand)]
    Event(EventCommand),
    /// Send a recorded message for immediate playback
    Panic { file: PathBuf },
    /// Render a waveform with clip markers to PNG
    Waveform {
        #[arg(long, conflicts_with = "song", required_unless_present = "song")]
        file: Option<PathBuf>,
        #[arg(long)]
        song: Option<String>,
        #[command(flatten)]
        trim: Trim,
        #[arg(long)]
        out: PathBuf,
    },
    /// Events due at a slot such as "Monday 08:00" [default: now]
    Due {
        #[arg(long)]
        at: Option<WeeklySlot>,
    },
    /// Report due events once per minute until interrupted
    Watch {
        #[arg(long, default_value_t = 1)]
        poll_secs: u64,
    },
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
enum SongCommand {
    /// Upload a new song; the clip defaults to the whole file
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        file: PathBuf,
        #[command(flatten)]
        trim: Trim,
    },
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        #[command(flatten)]
        trim: Trim,
    },
    Rm {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
enum EventCommand {
    Add {
        #[arg(long)]
        name: String,
        /// HH:MM
        #[arg(long)]
        time: String,
        /// Day name, e.g. "Sunday", "sun" or "ראשון"
        #[arg(long)]
        day: String,
        /// Song id
        #[arg(long)]
        song: String,
    },
    Edit {
        id: String,
        #[command(flatten)]
        fields: EventFields,
    },
    Rm {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write the effective configuration to the config file
    Init,
}

/// Clip boundaries in seconds.
#[derive(Debug, Args)]
struct Trim {
    #[arg(long)]
    start: Option<f64>,
    #[arg(long)]
    end: Option<f64>,
}

impl From<Trim> for TrimArgs {
    fn from(trim: Trim) -> Self {
        Self {
            start: trim.start,
            end: trim.end,
        }
    }
}

#[derive(Debug, Args)]
struct EventFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    time: Option<String>,
    #[arg(long)]
    day: Option<String>,
    #[arg(long)]
    song: Option<String>,
}

impl From<EventFields> for EventArgs {
    fn from(fields: EventFields) -> Self {
        Self {
            name: fields.name,
            time: fields.time,
            day: fields.day,
            song: fields.song,
        }
    }
}

fn main() -> Result<()> {
    // RUST_LOG overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    let mut config = config::load_config(&config_path);
    if let Some(server) = cli.server {
        config.server_url = server;
    }

    let mut stdout = std::io::stdout().lock();

    if let Command::Config(cmd) = &cli.command {
        return match cmd {
            ConfigCommand::Show => {
                let yaml = serde_yaml::to_string(&config).context("failed to render config")?;
                write!(stdout, "{yaml}")?;
                Ok(())
            }
            ConfigCommand::Init => {
                config::save_config(&config, &config_path)?;
                writeln!(stdout, "wrote {}", config_path.display())?;
                Ok(())
            }
        };
    }

    let client = PanelClient::new(&config.server_url, config.request_timeout())
        .with_context(|| format!("invalid server url {}", config.server_url))?;
    let app = App { config, client };

    match cli.command {
        Command::Library => commands::library(&app, &mut stdout),
        Command::Song(SongCommand::Add { name, file, trim }) => {
            commands::song_add(&app, &mut stdout, name, &file, trim.into())
        }
        Command::Song(SongCommand::Edit {
            id,
            name,
            file,
            trim,
        }) => commands::song_edit(
            &app,
            &mut stdout,
            &ItemId::new(id),
            name,
            file.as_deref(),
            trim.into(),
        ),
        Command::Song(SongCommand::Rm { id }) => {
            commands::song_rm(&app, &mut stdout, &ItemId::new(id))
        }
        Command::Event(EventCommand::Add {
            name,
            time,
            day,
            song,
        }) => commands::event_add(
            &app,
            &mut stdout,
            EventArgs {
                name: Some(name),
                time: Some(time),
                day: Some(day),
                song: Some(song),
            },
        ),
        Command::Event(EventCommand::Edit { id, fields }) => {
            commands::event_edit(&app, &mut stdout, &ItemId::new(id), fields.into())
        }
        Command::Event(EventCommand::Rm { id }) => {
            commands::event_rm(&app, &mut stdout, &ItemId::new(id))
        }
        Command::Panic { file } => commands::panic(&app, &mut stdout, &file),
        Command::Waveform {
            file,
            song,
            trim,
            out,
        } => {
            let source = match (file, song) {
                (Some(path), _) => AudioSource::File(path),
                (None, Some(id)) => AudioSource::Song(ItemId::new(id)),
                (None, None) => bail!("pass --file or --song"),
            };
            commands::render_waveform(&app, &mut stdout, source, trim.into(), &out)
        }
        Command::Due { at } => commands::due(&app, &mut stdout, at),
        Command::Watch { poll_secs } => {
            commands::watch(&app, Duration::from_secs(poll_secs.max(1)))
        }
        Command::Config(_) => Ok(()),
    }
}
