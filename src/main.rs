//! Threat Console - Main Entry Point

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use threat_console::api::{self, Command, CommandContext};
use threat_console::constants::{APP_NAME, APP_VERSION};
use threat_console::logic::console::{Console, ConsoleOptions, RenderSource};
use threat_console::logic::demo_data::RandomDemoData;
use threat_console::logic::remote::{ApiClient, Authenticator, MemoryRemote, ThreatRemote};
use threat_console::logic::scene::{SceneSurface, Terrain};
use threat_console::logic::session::{SessionContext, SessionStorage};
use threat_console::logic::store::ThreatStore;
use threat_console::logic::ConsoleConfig;

/// Recompute marker visuals every tick until told to stop.
/// Returns the number of frames rendered.
async fn render_loop(source: RenderSource, interval_ms: u64, mut shutdown: watch::Receiver<bool>) -> u64 {
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut frames = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let frame = source.frame();
                frames += 1;
                log::trace!(
                    "frame {} t={:.2}s blocks={} markers={}",
                    frames,
                    frame.elapsed,
                    frame.blocks.len(),
                    frame.markers.len()
                );
            }
            _ = shutdown.changed() => break,
        }
    }
    frames
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}...", APP_NAME, APP_VERSION);

    let config = ConsoleConfig::from_env();

    let remote: Arc<dyn ThreatRemote>;
    let auth: Arc<dyn Authenticator>;
    let mut detection: Option<Arc<ApiClient>> = None;
    if config.offline {
        log::info!("Offline mode: using in-memory authority");
        let memory = Arc::new(MemoryRemote::new());
        remote = memory.clone();
        auth = memory;
    } else {
        let client = match ApiClient::new(config.api.clone()) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                log::error!("Failed to build HTTP client: {}", e);
                std::process::exit(1);
            }
        };
        log::info!("Remote authority: {}", client.server_url());
        remote = client.clone();
        auth = client.clone();
        detection = Some(client);
    }

    let mut demo = RandomDemoData::from_seed_option(config.demo_seed);
    let terrain = Terrain::generate(&mut demo);
    let surface = SceneSurface::new(config.viewport, terrain);
    let options = ConsoleOptions {
        exit_placement_after_create: config.exit_placement_after_create,
    };

    let mut console = Console::new(ThreatStore::new(remote), surface, Box::new(demo), options);
    if let Some(client) = detection {
        console = console.with_detection(client);
    }

    let mut session = SessionContext::new(auth, SessionStorage::new(config.session_file.clone()));
    if session.hydrate() || config.offline {
        if let Err(e) = console.load().await {
            log::warn!("Starting with an empty threat map: {}", e);
        }
    } else {
        log::info!("No saved session, log in to load threats");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let render = tokio::spawn(render_loop(
        console.render_source(),
        config.frame_interval_ms,
        shutdown_rx,
    ));

    let mut ctx = CommandContext::new(console, session);
    println!("{}", api::HELP);
    prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("Failed to read command: {}", e);
                break;
            }
        };

        if !line.trim().is_empty() {
            match line.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(command) => match api::execute(&mut ctx, command).await {
                    Ok(output) => println!("{}", output),
                    Err(message) => eprintln!("error: {}", message),
                },
                Err(message) => eprintln!("error: {}", message),
            }
        }
        prompt();
    }

    let _ = shutdown_tx.send(true);
    match render.await {
        Ok(frames) => log::info!("Render loop stopped after {} frames", frames),
        Err(e) => log::warn!("Render loop ended abnormally: {}", e),
    }
    log::info!("{} stopped", APP_NAME);
}
