use anyhow::{Context, Result};
use clap::Parser;
use pieboard::game::{Game, GameStatus};
use pieboard::session::color_name;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "pieboard-replay", about = "Replay coded moves and report SAN, final FEN and game status")]
struct Args {
    /// Moves in coded form, e.g. e2e4 e7e5 g1f3
    moves: Vec<String>,

    /// Starting FEN (defaults to the standard start position)
    #[arg(long)]
    fen: Option<String>,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct ReplayEntry {
    ply: usize,
    coded: String,
    san: String,
    fen: String,
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    start_fen: String,
    moves: Vec<ReplayEntry>,
    final_fen: String,
    status: GameStatus,
    winner: Option<&'static str>,
    in_check: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut game = match &args.fen {
        Some(fen) => Game::from_fen(fen).context("Invalid FEN string")?,
        None => Game::new(),
    };

    for (i, mv) in args.moves.iter().enumerate() {
        if !game.apply_coded_move(mv) {
            anyhow::bail!("move {} '{}' rejected in {}", i + 1, mv, game.fen());
        }
    }

    let report = ReplayReport {
        start_fen: game.initial_fen(),
        moves: game
            .history()
            .iter()
            .enumerate()
            .map(|(i, m)| ReplayEntry { ply: i + 1, coded: m.coded().to_string(), san: m.san.clone(), fen: m.fen.clone() })
            .collect(),
        final_fen: game.fen().to_string(),
        status: game.status(),
        winner: game.winner().map(color_name),
        in_check: game.is_check(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    for row in game.move_rows() {
        let w = row.white.map_or("...", |(_, m)| m.san.as_str());
        let b = row.black.map_or("", |(_, m)| m.san.as_str());
        println!("{:>3}. {:<8} {}", row.number, w, b);
    }
    println!("fen: {}", report.final_fen);
    println!("status: {}", report.status.describe());
    if let Some(w) = report.winner { println!("winner: {w}"); }
    Ok(())
}
