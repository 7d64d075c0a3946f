use anyhow::{Context, Result};
use clap::Parser;
use cozy_chess::{Color, File, Piece, Rank, Square};
use indicatif::ProgressBar;
use pieboard::clock::{format_time, is_critical_time, is_low_time, TimeControl, PRESETS};
use pieboard::engine::{BridgeConfig, Difficulty, EngineBridge};
use pieboard::game::{Orientation, SelectOutcome};
use pieboard::session::{color_name, EngineTurn, GameConfig, GameMode, Session};
use pieboard::settings::{AnimationSpeed, Settings, DEFAULT_SETTINGS_FILE};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about = "Play chess in the terminal, against a friend or a UCI engine", long_about = None)]
struct Args {
    /// Path to a UCI engine binary (e.g. stockfish)
    #[arg(long, default_value = "stockfish")]
    engine: PathBuf,

    /// Play mode: 'ai' against the engine, 'pvp' for two players
    #[arg(long, default_value = "ai")]
    mode: String,

    /// Your color: 'w' for white, 'b' for black
    #[arg(long, default_value = "w")]
    color: String,

    /// Engine strength, 1 (beginner) to 6 (maximum)
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=6))]
    level: u8,

    /// Time control preset (bullet1, blitz3_2, rapid10, unlimited, ...)
    #[arg(long, default_value = "unlimited")]
    time: String,

    /// Starting FEN position
    #[arg(long)]
    fen: Option<String>,

    /// Settings file
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,

    /// Seconds before an engine search is told to stop
    #[arg(long, default_value_t = 10)]
    search_timeout: u64,
}

fn parse_color(color_str: &str) -> Result<Color> {
    match color_str.to_lowercase().as_str() {
        "w" | "white" => Ok(Color::White),
        "b" | "black" => Ok(Color::Black),
        _ => anyhow::bail!("Invalid color: use 'w' or 'b'"),
    }
}

fn parse_mode(mode: &str) -> Result<GameMode> {
    match mode.to_lowercase().as_str() {
        "ai" | "engine" => Ok(GameMode::VsEngine),
        "pvp" | "human" => Ok(GameMode::TwoPlayer),
        _ => anyhow::bail!("Invalid mode: use 'ai' or 'pvp'"),
    }
}

fn parse_time(name: &str) -> Result<TimeControl> {
    TimeControl::preset(name).with_context(|| {
        let names: Vec<&str> = PRESETS.iter().map(|(n, _)| *n).collect();
        format!("Unknown time control '{name}'; choose one of: {}", names.join(", "))
    })
}

fn piece_glyph(color: Color, piece: Piece) -> char {
    let c = match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    };
    if color == Color::White { c.to_ascii_uppercase() } else { c }
}

fn print_board(session: &Session, settings: &Settings) {
    let game = session.game();
    let pos = game.position();
    let flipped = game.orientation() == Orientation::Black;
    let mut ranks: Vec<Rank> = Rank::ALL.iter().rev().copied().collect();
    let mut files: Vec<File> = File::ALL.to_vec();
    if flipped { ranks.reverse(); files.reverse(); }
    let targets: &[Square] = if settings.highlight_moves { game.legal_targets() } else { &[] };
    let last = game.last_move().filter(|_| settings.highlight_moves);

    println!();
    for &rank in &ranks {
        let mut line = String::new();
        if settings.show_coordinates { line.push_str(&format!("{} ", rank as usize + 1)); }
        for &file in &files {
            let sq = Square::new(file, rank);
            let glyph = match pos.piece_at(sq) {
                Some((c, p)) => piece_glyph(c, p),
                None if targets.contains(&sq) => '*',
                None => '.',
            };
            let marked = last.is_some_and(|m| m.from == sq || m.to == sq) || game.selected_square() == Some(sq);
            line.push(if marked { '[' } else { ' ' });
            line.push(glyph);
            line.push(if marked { ']' } else { ' ' });
        }
        println!("{line}");
    }
    if settings.show_coordinates {
        let letters: String = files.iter().map(|f| format!(" {} ", (b'a' + *f as u8) as char)).collect();
        println!("  {letters}");
    }

    let clock = session.clock();
    if !clock.is_unlimited() {
        for c in [Color::White, Color::Black] {
            let t = clock.remaining(c);
            let flag = if clock.is_timeout(c) { " (flagged)" } else if is_critical_time(t) { " !!" } else if is_low_time(t) { " !" } else { "" };
            let run = if clock.is_running(c) { " <" } else { "" };
            println!("{:>5}: {}{}{}", color_name(c), format_time(t), flag, run);
        }
    }
    println!("{}", session.status_message());
}

fn print_history(session: &Session) {
    let game = session.game();
    let cur = game.current_move_index();
    let cell = |entry: Option<(usize, &pieboard::HistoryMove)>| match entry {
        Some((i, m)) if Some(i) == cur => format!("[{}]", m.san),
        Some((_, m)) => m.san.clone(),
        None => "...".to_string(),
    };
    for row in game.move_rows() {
        println!("{:>3}. {:<10} {}", row.number, cell(row.white), cell(row.black));
    }
}

fn print_help() {
    println!("Commands:");
    println!("  e2e4 / e7e8q   play a move (coded form)");
    println!("  sel <square>   select a square (a second selection on a target plays it)");
    println!("  undo | redo    step back / forward through the game");
    println!("  goto <n>       show the position after move n (0 = start)");
    println!("  flip           flip the board");
    println!("  history        print the move list");
    println!("  fen            print the current FEN");
    println!("  new            start over with the same options");
    println!("  set <key> <on|off>  coords, highlight, confirm, sound");
    println!("  set anim <slow|normal|fast>");
    println!("  quit");
}

fn confirm(stdin: &mut impl BufRead, question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    stdin.read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn update_setting(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    if key == "anim" {
        settings.animation_speed = value.parse::<AnimationSpeed>().map_err(anyhow::Error::msg)?;
        return Ok(());
    }
    let on = match value {
        "on" | "true" | "1" => true,
        "off" | "false" | "0" => false,
        _ => anyhow::bail!("Use 'on' or 'off'"),
    };
    match key {
        "coords" => settings.show_coordinates = on,
        "highlight" => settings.highlight_moves = on,
        "confirm" => settings.confirm_moves = on,
        "sound" => settings.sound_enabled = on,
        _ => anyhow::bail!("Unknown setting '{key}'"),
    }
    Ok(())
}

fn load_engine(args: &Args) -> Option<EngineBridge> {
    let config = BridgeConfig { search_timeout: Duration::from_secs(args.search_timeout), ..BridgeConfig::default() };
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("Loading engine {}", args.engine.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let loaded = EngineBridge::spawn(&args.engine, config).and_then(|mut bridge| bridge.load().map(|_| bridge));
    spinner.finish_and_clear();
    match loaded {
        Ok(bridge) => {
            println!("Engine: {}", bridge.name().unwrap_or("unnamed"));
            Some(bridge)
        }
        Err(e) => {
            log::warn!("engine unavailable: {e}");
            println!("Could not start the engine ({e}); playing two-player.");
            None
        }
    }
}

// Runs engine turns to completion, with a spinner while it thinks.
fn drive_engine(session: &mut Session, last_tick: &mut Instant) {
    let mut spinner: Option<ProgressBar> = None;
    loop {
        session.tick(last_tick.elapsed());
        *last_tick = Instant::now();
        match session.update() {
            EngineTurn::Idle => break,
            EngineTurn::Started | EngineTurn::Thinking => {
                let sp = spinner.get_or_insert_with(|| {
                    let sp = ProgressBar::new_spinner();
                    sp.set_message("Engine is thinking...");
                    sp.enable_steady_tick(Duration::from_millis(100));
                    sp
                });
                sp.tick();
                std::thread::sleep(Duration::from_millis(20));
            }
            EngineTurn::Played(mv) => {
                if let Some(sp) = spinner.take() { sp.finish_and_clear(); }
                if let Some(last) = session.game().history().last() {
                    println!("Engine plays: {} ({mv})", last.san);
                }
                break;
            }
            EngineTurn::Discarded | EngineTurn::NoMove => break,
        }
    }
    if let Some(sp) = spinner { sp.finish_and_clear(); }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = Settings::load(&args.settings)?;
    let config = GameConfig {
        mode: parse_mode(&args.mode)?,
        player_color: parse_color(&args.color)?,
        difficulty: Difficulty::new(args.level).context("level out of range")?,
        time_control: parse_time(&args.time)?,
        start_fen: args.fen.clone(),
    };

    let engine = if config.mode == GameMode::VsEngine { load_engine(&args) } else { None };
    let mut session = Session::new(engine);
    let vs_engine = session.new_game(&config).context("Invalid FEN string")?;
    if vs_engine {
        let d = config.difficulty.settings();
        println!("You play {} against the engine ({}, {})", color_name(config.player_color), d.name, d.elo);
    }
    if config.player_color == Color::Black { session.flip_orientation(); }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut last_tick = Instant::now();
    loop {
        drive_engine(&mut session, &mut last_tick);
        print_board(&session, &settings);

        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 { break; }
        session.tick(last_tick.elapsed());
        last_tick = Instant::now();

        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => break,
            ["help"] => print_help(),
            ["undo"] => { if !session.undo() { println!("Nothing to undo."); } }
            ["redo"] => { if !session.redo() { println!("Nothing to redo."); } }
            ["flip"] => session.flip_orientation(),
            ["fen"] => println!("{}", session.game().fen()),
            ["history"] => print_history(&session),
            ["new"] => {
                session.new_game(&config).context("Invalid FEN string")?;
            }
            ["goto", n] => match n.parse::<usize>() {
                Ok(n) => { if !session.go_to_move(n.checked_sub(1)) { println!("No such move."); } }
                Err(_) => println!("goto expects a move number"),
            },
            ["sel", sq] => match sq.parse::<Square>() {
                Ok(sq) => {
                    if session.select(sq) == SelectOutcome::Cleared && !session.human_can_move() {
                        println!("Not your turn.");
                    }
                }
                Err(_) => println!("Invalid square '{sq}'"),
            },
            ["set", key, value] => match update_setting(&mut settings, key, value) {
                Ok(()) => settings.save(&args.settings)?,
                Err(e) => println!("{e}"),
            },
            [mv] => {
                if !session.game().at_end() {
                    println!("You are viewing an earlier position; use 'goto' or 'redo' to return to the end.");
                    continue;
                }
                if settings.confirm_moves && !confirm(&mut input, &format!("Play {mv}?"))? { continue; }
                if !session.play_coded(mv) {
                    println!("Illegal move! Use format like 'e2e4' (type 'help' for commands)");
                }
            }
            _ => println!("Unknown command (type 'help')"),
        }
    }
    Ok(())
}
