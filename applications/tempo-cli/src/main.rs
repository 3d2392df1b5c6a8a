/// Tempo CLI - terminal front end for the playback controller
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempo_cli::session::{run_session, SessionEnd};
use tempo_cli::{CliConfig, LibraryScanner, SimulatedEngine};
use tempo_core::{LocalFileSystem, MemoryLibrary, TrackRef};
use tempo_playback::{ControllerHandle, PlaybackEvent, RepeatMode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tempo-cli")]
#[command(about = "Tempo Player command-line front end", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./tempo.toml if present)
    #[arg(short, long, global = true, env = "TEMPO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play every track found under a directory
    Play {
        /// Music directory
        dir: PathBuf,
        /// Pick tracks in random order
        #[arg(long)]
        shuffle: bool,
        /// Repeat mode
        #[arg(long, value_enum)]
        repeat: Option<RepeatArg>,
        /// Simulated length of each track
        #[arg(long)]
        seconds_per_track: Option<f64>,
    },
    /// List the tracks found under a directory, grouped by album
    List {
        /// Music directory
        dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RepeatArg {
    Off,
    All,
    One,
}

impl From<RepeatArg> for RepeatMode {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::Off => RepeatMode::Off,
            RepeatArg::All => RepeatMode::All,
            RepeatArg::One => RepeatMode::One,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tempo_cli=info,tempo_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Play {
            dir,
            shuffle,
            repeat,
            seconds_per_track,
        } => {
            config.playback.shuffle |= shuffle;
            if let Some(repeat) = repeat {
                config.playback.repeat = repeat.into();
            }
            if let Some(seconds) = seconds_per_track {
                config.simulation.seconds_per_track = seconds;
            }
            config.validate()?;

            play(&config, &dir).await?;
        }
        Commands::List { dir } => {
            let library = scan(&config, &dir)?;
            list(&library);
        }
    }

    Ok(())
}

fn scan(config: &CliConfig, dir: &Path) -> anyhow::Result<MemoryLibrary> {
    let mut scanner = LibraryScanner::new().follow_links(config.scan.follow_links);
    if let Some(depth) = config.scan.max_depth {
        scanner = scanner.max_depth(depth);
    }
    Ok(scanner.scan(dir)?)
}

fn list(library: &MemoryLibrary) {
    let mut albums: BTreeMap<Option<&str>, Vec<&TrackRef>> = BTreeMap::new();
    for track in library.tracks() {
        albums.entry(track.album.as_deref()).or_default().push(track);
    }

    for (album, mut tracks) in albums {
        tracks.sort_by(|a, b| a.album_order().cmp(&b.album_order()));
        let artist = tracks.first().and_then(|t| t.artist.as_deref());

        match (album, artist) {
            (Some(album), Some(artist)) => println!("{album} ({artist})"),
            (Some(album), None) => println!("{album}"),
            (None, _) => println!("(no album)"),
        }
        for track in tracks {
            match track.track_number {
                Some(number) => println!("  {number:>2}. {}", track.title),
                None => println!("      {}", track.title),
            }
        }
    }

    println!("{} tracks", library.len());
}

async fn play(config: &CliConfig, dir: &Path) -> anyhow::Result<()> {
    let library = scan(config, dir)?;
    let tracks = library.tracks().to_vec();
    let Some(first) = tracks.first().cloned() else {
        println!("No audio files found in {}", dir.display());
        return Ok(());
    };

    let handle = ControllerHandle::spawn(
        config.playback.clone(),
        Arc::new(SimulatedEngine::new(config.track_length())),
        Arc::new(LocalFileSystem::new()),
        Arc::new(library),
    )?;

    let titles: BTreeMap<String, String> = tracks
        .iter()
        .map(|t| (t.id.to_string(), t.title.clone()))
        .collect();
    let title = |id: &str| titles.get(id).map_or(id, String::as_str).to_string();

    let mut events = handle.subscribe();
    handle.play(first, Some(tracks)).await?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Ctrl-C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let end = run_session(&handle, &mut events, shutdown, |event| match event {
        PlaybackEvent::TrackChanged {
            track_id: Some(id), ..
        } => println!("▶ {}", title(id)),
        PlaybackEvent::LoadFailed { track_id, reason } => {
            println!("✗ {} ({reason})", title(track_id));
        }
        PlaybackEvent::NothingPlayable => println!("Nothing left to play"),
        _ => {}
    })
    .await?;

    if end == SessionEnd::Interrupted {
        println!("Stopped");
    }

    Ok(())
}
