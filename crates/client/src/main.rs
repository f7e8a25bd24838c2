use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use mirra::Intent;
use mirra_client::game::wait_for_match;
use mirra_client::net::{RouteKind, socket_url};
use mirra_client::replay::run_replay;
use mirra_client::{ClientConfig, NetworkClient, Session, tui};

const DEFAULT_LOG_FILE: &str = "client.log";

#[derive(Parser)]
#[command(name = "mirra")]
#[command(about = "Mirra arena client")]
struct Args {
    #[arg(short, long, help = "TOML config file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Write logs here instead of stderr")]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Default)]
struct Overrides {
    #[arg(long, global = true, help = "Arena host, e.g. localhost:4000")]
    host: Option<String>,

    #[arg(long, global = true, help = "Use wss://")]
    secure: bool,

    #[arg(long, global = true)]
    player_id: Option<u64>,

    #[arg(long, global = true)]
    game_id: Option<String>,

    #[arg(long, global = true)]
    character: Option<String>,

    #[arg(long, global = true)]
    name: Option<String>,

    #[arg(long, global = true)]
    mode: Option<String>,

    #[arg(long, global = true, help = "Gateway token forwarded to the arena")]
    jwt: Option<String>,

    #[arg(long, global = true, help = "Start with the debug overlay on")]
    debug_overlay: bool,
}

impl Overrides {
    fn apply(self, config: &mut ClientConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if self.secure {
            config.server.secure = true;
        }
        if self.debug_overlay {
            config.scene.debug_overlay = true;
        }

        let mount = &mut config.mount;
        mount.player_id = self.player_id.or(mount.player_id);
        mount.game_id = self.game_id.or(mount.game_id.take());
        mount.character = self.character.or(mount.character.take());
        mount.player_name = self.name.or(mount.player_name.take());
        mount.game_mode = self.mode.or(mount.game_mode.take());
        mount.gateway_jwt = self.jwt.or(mount.gateway_jwt.take());
    }
}

#[derive(Subcommand)]
enum Command {
    /// Connect to a game socket and run the board
    Play,
    /// Wait on the join socket for a match, then play it
    Queue,
    /// Feed newline-delimited JSON host events through a headless session
    Replay {
        file: PathBuf,
        #[arg(long, default_value_t = 1)]
        frames_per_event: u32,
    },
}

impl Command {
    fn is_interactive(&self) -> bool {
        !matches!(self, Self::Replay { .. })
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_file = args.log_file.clone().or_else(|| {
        args.command
            .is_interactive()
            .then(|| PathBuf::from(DEFAULT_LOG_FILE))
    });
    init_logging(log_file.as_deref())?;

    let mut config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    args.overrides.apply(&mut config);

    match args.command {
        Command::Play => play(config),
        Command::Queue => queue(config),
        Command::Replay {
            file,
            frames_per_event,
        } => replay(config, &file, frames_per_event),
    }
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn play(config: ClientConfig) -> anyhow::Result<()> {
    let mut session = Session::mount(&config)?;
    let url = socket_url(&config.server, &config.mount, config.server.route)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let mut client = runtime.block_on(NetworkClient::connect(
        &url,
        config.server.inbound,
        config.server.outbound,
    ))?;

    tui::run_board(&mut session, Some(&mut client), config.frame_rate)?;

    log::info!(
        "Leaving game: {} frames out, {} in",
        client.frames_sent(),
        client.frames_received()
    );
    client.disconnect();
    session.unmount();
    Ok(())
}

fn queue(mut config: ClientConfig) -> anyhow::Result<()> {
    config.mount.validate()?;
    let player_id = config.mount.player_id()?;

    let lobby_route = match config.server.route {
        RouteKind::Mode => RouteKind::Mode,
        _ => RouteKind::Join,
    };
    let url = socket_url(&config.server, &config.mount, lobby_route)?;

    let runtime = tokio::runtime::Runtime::new()?;
    println!("Waiting for a match as player {}...", player_id);
    let game_id = runtime
        .block_on(wait_for_match(
            &url,
            player_id,
            config.server.inbound,
            config.server.outbound,
        ))?
        .context("join socket closed before a game was assigned")?;
    drop(runtime);

    let intent = Intent::JoinGame {
        game_id: game_id.clone(),
        player_id,
    };
    println!("{}", intent.to_json()?);

    config.mount.game_id = Some(game_id);
    config.server.route = RouteKind::Play;
    play(config)
}

fn replay(config: ClientConfig, file: &Path, frames_per_event: u32) -> anyhow::Result<()> {
    let mut session = Session::mount(&config)?;
    let input = File::open(file).with_context(|| format!("failed to open {}", file.display()))?;

    let summary = run_replay(
        &mut session,
        BufReader::new(input),
        frames_per_event,
        io::stdout().lock(),
    )?;

    log::info!(
        "Registry: {} snapshots applied, {} proxies created, {} removed",
        summary.stats.snapshots_applied,
        summary.stats.proxies_created,
        summary.stats.proxies_removed
    );
    session.unmount();
    Ok(())
}
