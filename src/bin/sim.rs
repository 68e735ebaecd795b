use std::time::Duration;

use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;
use versus::{BotController, Game, InMemoryTransport, NodeConfig, NodeReport, PeerNode};

fn describe(report: &NodeReport) -> serde_json::Value {
    json!({
        "outcome": format!("{:?}", report.outcome),
        "shots": report.shots,
        "score": report.scores.map(|s| s.get(report.role)),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 && args.len() != 4 {
        eprintln!("Usage: {} <seed1> <seed2> [battleship|snake]", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;
    let game: Game = match args.get(3) {
        Some(name) => name
            .parse()
            .map_err(|name| anyhow::anyhow!("unknown game {:?}", name))?,
        None => Game::Battleship,
    };

    let mut rng1 = SmallRng::seed_from_u64(seed1);
    let mut rng2 = SmallRng::seed_from_u64(seed2);

    let mut config = NodeConfig {
        frame_interval: Duration::from_millis(1),
        ..NodeConfig::default()
    };
    config.arena.base_interval = Duration::from_millis(4);
    config.arena.min_interval = Duration::from_millis(2);
    config.arena.max_ticks = Some(2_000);

    let (t1, t2) = InMemoryTransport::pair();
    let host = PeerNode::host(t1, BotController::preferring(game), config.clone());
    let client = PeerNode::join(t2, BotController::preferring(game), config);

    let (res1, res2) = tokio::try_join!(host.run(&mut rng1), client.run(&mut rng2))?;

    let result = json!({
        "game": res1.game.map(|g| g.to_string()),
        "host": describe(&res1),
        "client": describe(&res2),
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
