//! Headless random player.
//!
//! Connects to a running server and plays one full game with random columns.
//! The first connection chooses the mode; with `--pvp` it waits for a second
//! player (another bot or a human client).

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info};

use connect4::core::{ColumnPicker, RandomComputer};
use connect4::server::GameClient;
use connect4::types::{GameMode, GameStatus, Mover};

/// Play one game against a Connect Four server.
#[derive(Parser)]
#[command(name = "connect4-bot", about = "Play one random game against a server")]
struct Cli {
    /// Server address
    #[arg(long, default_value = "127.0.0.1:8004")]
    addr: String,

    /// Ask for a player-vs-player game when connecting first
    #[arg(long)]
    pvp: bool,

    /// Seed for reproducible column choices
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    colog::init();
    let cli = Cli::parse();

    let mut client = GameClient::connect(&cli.addr)
        .await
        .with_context(|| format!("failed to connect to {}", cli.addr))?;
    let mut picker = match cli.seed {
        Some(seed) => RandomComputer::seeded(seed),
        None => RandomComputer::new(),
    };

    let me = client.read_identity().await?;
    info!("Playing as mover {} ({})", me.as_str(), me.symbol());

    match me {
        Mover::A => {
            let mode = GameMode::from_flag(cli.pvp);
            client.send_setup(false, mode).await?;
            if mode == GameMode::PlayerVsPlayer {
                info!("Waiting for an opponent");
                client.wait_for_opponent().await?;
            }
        }
        Mover::B => {
            let _ui_flag = client.read_ui_flag().await?;
        }
    }

    let mut turn = 1u32;
    let status = loop {
        if Mover::for_turn(turn) == me {
            let mut attempts = 0u32;
            loop {
                let column = picker.choose_column();
                attempts += 1;
                if client.send_column(column).await? {
                    debug!("Turn {}: column {} accepted", turn, column);
                    break;
                }
                if attempts > 1000 {
                    bail!("server rejected {} columns in a row", attempts);
                }
            }
        }

        let (notice, status) = client.read_update().await?;
        info!(
            "Turn {}: {} piece at row {}, column {}",
            turn,
            if notice.mine { "my" } else { "opponent's" },
            notice.row,
            notice.column + 1
        );
        if status.is_terminal() {
            break status;
        }
        turn += 1;
    };

    match status {
        GameStatus::Win(winner) if winner == me => info!("I won"),
        GameStatus::Win(_) => info!("I lost"),
        _ => info!("Tie game"),
    }
    Ok(())
}
