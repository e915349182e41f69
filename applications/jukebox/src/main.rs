/// Folder Jukebox - shuffle-play a folder from a single button
use clap::Parser;
use jukebox::keys::{self, KeyAction, PlayButton, HELP};
use jukebox::{ConsoleReporter, JukeboxConfig};
use jukebox_playback::{Command, PressClassifier, SessionPhase};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "jukebox")]
#[command(about = "Shuffle-play a music folder from a single button", long_about = None)]
struct Cli {
    /// Folder to shuffle, or a single file to play once
    source: PathBuf,

    /// Directory holding config.txt
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start playing right away
    #[arg(long, conflicts_with = "back")]
    play: bool,

    /// Start by stepping back to the previous track
    #[arg(long)]
    back: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jukebox=info,jukebox_playback=info,jukebox_audio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    install_panic_hook();

    let cli = Cli::parse();

    let config = JukeboxConfig::load(cli.config.as_deref())?;
    config.validate()?;

    tracing::info!("Starting jukebox");
    tracing::info!("Source: {}", cli.source.display());
    tracing::info!("Volume control: {}", config.audiocontrol);

    let controller = jukebox::build_controller(&config, Arc::new(ConsoleReporter::new()));

    let dispatcher = controller.clone();
    let source = cli.source.clone();
    let classifier = PressClassifier::new(config.long_press(), move |_: PlayButton, kind| {
        if let Err(e) = dispatcher.dispatch(Command::new(kind, source.clone())) {
            tracing::warn!(error = %e, "command dropped");
        }
    });

    println!("{}", HELP);
    if cli.play {
        keys::tap(&classifier);
    } else if cli.back {
        keys::hold(&classifier).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match KeyAction::parse(&line) {
            Some(KeyAction::Next) => keys::tap(&classifier),
            Some(KeyAction::Back) => keys::hold(&classifier).await,
            Some(KeyAction::Pause) => {
                if !controller.toggle_pause() {
                    println!("* nothing playing");
                }
            }
            Some(KeyAction::Stop) => {
                controller.stop_playback();
            }
            Some(KeyAction::Quit) => break,
            Some(KeyAction::Help) => println!("{}", HELP),
            None => println!("unknown key; {}", HELP),
        }
    }

    controller.stop_playback();
    for _ in 0..100 {
        if controller.phase() == SessionPhase::Idle {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    tracing::info!("Jukebox stopped");
    Ok(())
}

/// Log panics with a backtrace instead of printing them raw
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        tracing::error!(panic = %info, %backtrace, "panic");
    }));
}
