use clap::{Parser, ValueEnum};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::net::TcpListener;

use versus::{
    init_logging, ArenaView, BoardError, BotController, CliController, CombatSession, Controller,
    Coord, Direction, Game, NodeConfig, NodeEvent, NodeReport, Outcome, PeerNode, Role,
    TargetBoard, TcpTransport, DEFAULT_PORT,
};

#[derive(Parser)]
#[command(author, version, about = "1v1 LAN games with lobby selection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PlayerType {
    Human,
    Bot,
}

#[derive(Parser)]
enum Commands {
    /// Host a game session and wait for one opponent.
    Host {
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Game to propose in the lobby instead of asking.
        #[arg(long)]
        game: Option<Game>,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Join a hosted session.
    Join {
        #[arg(long)]
        address: String,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long)]
        game: Option<Game>,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    if let Some(s) = seed {
        println!("Using fixed seed: {} (game will be reproducible)", s);
        SmallRng::seed_from_u64(s)
    } else {
        let mut seed_rng = rand::rng();
        SmallRng::from_rng(&mut seed_rng)
    }
}

/// A terminal player with a fixed lobby choice.
struct Preferring<C> {
    game: Game,
    inner: C,
}

impl<C: Controller> Controller for Preferring<C> {
    fn choose_game(&mut self, offered: &[Game], rng: &mut SmallRng) -> Game {
        if offered.contains(&self.game) {
            self.game
        } else {
            self.inner.choose_game(offered, rng)
        }
    }

    fn place_fleet(
        &mut self,
        session: &mut CombatSession,
        rng: &mut SmallRng,
    ) -> Result<(), BoardError> {
        self.inner.place_fleet(session, rng)
    }

    fn select_target(&mut self, known: &TargetBoard, rng: &mut SmallRng) -> Option<Coord> {
        self.inner.select_target(known, rng)
    }

    fn steer(&mut self, view: &ArenaView, me: Role) -> Option<Direction> {
        self.inner.steer(view, me)
    }

    fn notify(&mut self, event: &NodeEvent) {
        self.inner.notify(event)
    }
}

async fn play(
    transport: TcpTransport,
    host: bool,
    player: PlayerType,
    game: Option<Game>,
    mut rng: SmallRng,
) -> anyhow::Result<NodeReport> {
    let config = NodeConfig::default();
    match (player, game) {
        (PlayerType::Bot, game) => {
            let bot = game.map(BotController::preferring).unwrap_or_default();
            run_node(transport, host, bot, config, &mut rng).await
        }
        (PlayerType::Human, None) => {
            run_node(transport, host, CliController::stdio(), config, &mut rng).await
        }
        (PlayerType::Human, Some(game)) => {
            let inner = CliController::stdio();
            run_node(transport, host, Preferring { game, inner }, config, &mut rng).await
        }
    }
}

async fn run_node<C: Controller>(
    transport: TcpTransport,
    host: bool,
    controller: C,
    config: NodeConfig,
    rng: &mut SmallRng,
) -> anyhow::Result<NodeReport> {
    let node = if host {
        PeerNode::host(transport, controller, config)
    } else {
        PeerNode::join(transport, controller, config)
    };
    node.run(rng).await
}

fn summarize(result: anyhow::Result<NodeReport>) {
    match result {
        Ok(report) => {
            let game = report.game.map(|g| g.to_string()).unwrap_or_else(|| "-".into());
            let verdict = match report.outcome {
                Outcome::Won => "won",
                Outcome::Lost => "lost",
                Outcome::Draw => "drew",
                Outcome::OpponentQuit => "won by forfeit",
                Outcome::Quit => "forfeited",
            };
            println!("Game {}: you {}.", game, verdict);
        }
        Err(e) => eprintln!("Game ended with an error: {}", e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Host {
            bind,
            port,
            game,
            player,
            seed,
        } => {
            let rng = make_rng(seed);
            let listener = TcpListener::bind((bind.as_str(), port)).await?;
            println!("Waiting for a player to connect on {}:{}...", bind, port);
            let transport = TcpTransport::accept(&listener).await?;
            println!("Player connected.");
            summarize(play(transport, true, player, game, rng).await);
        }
        Commands::Join {
            address,
            port,
            game,
            player,
            seed,
        } => {
            let rng = make_rng(seed);
            println!("Connecting to {}:{}...", address, port);
            let transport = TcpTransport::connect((address.as_str(), port)).await?;
            println!("Connected successfully!");
            summarize(play(transport, false, player, game, rng).await);
        }
    }
    Ok(())
}
