//! A game in progress: the store, the clocks and an optional engine
//! opponent, wired together.
//!
//! Engine answers are checked against the state they were requested for.
//! A move is applied only if nothing was played or browsed in between and
//! it is still the engine's turn.

use crate::board::PositionError;
use crate::clock::{Clock, TimeControl};
use crate::engine::{Difficulty, EngineBridge, SearchPoll};
use crate::game::{Game, GameStatus, SelectOutcome};
use crate::notation::CodedMove;
use cozy_chess::{Color, Piece, Square};
use log::{debug, error, info, warn};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    TwoPlayer,
    VsEngine,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub mode: GameMode,
    pub player_color: Color,
    pub difficulty: Difficulty,
    pub time_control: TimeControl,
    pub start_fen: Option<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::VsEngine,
            player_color: Color::White,
            difficulty: Difficulty::default(),
            time_control: TimeControl::unlimited(),
            start_fen: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opponent {
    pub color: Color,
    pub difficulty: Difficulty,
}

/// Outcome of one [`Session::update`] round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineTurn {
    Idle,
    Started,
    Thinking,
    Played(CodedMove),
    /// The answer arrived for a position that is no longer on the board.
    Discarded,
    NoMove,
}

// The state a search was requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SearchTicket {
    ply: usize,
    side: Color,
}

pub fn color_name(c: Color) -> &'static str {
    match c {
        Color::White => "White",
        Color::Black => "Black",
    }
}

pub struct Session {
    game: Game,
    clock: Clock,
    engine: Option<EngineBridge>,
    opponent: Option<Opponent>,
    ticket: Option<SearchTicket>,
    clock_started: bool,
}

impl Session {
    /// `engine` should already be loaded; an engine that is not ready is
    /// treated as absent when a game starts.
    pub fn new(engine: Option<EngineBridge>) -> Self {
        Self {
            game: Game::new(),
            clock: Clock::new(TimeControl::unlimited()),
            engine,
            opponent: None,
            ticket: None,
            clock_started: false,
        }
    }

    pub fn game(&self) -> &Game { &self.game }
    pub fn clock(&self) -> &Clock { &self.clock }
    pub fn opponent(&self) -> Option<Opponent> { self.opponent }
    pub fn engine(&self) -> Option<&EngineBridge> { self.engine.as_ref() }
    pub fn is_thinking(&self) -> bool { self.ticket.is_some() }

    /// Starts a new game. Returns whether the engine plays; asking for an
    /// engine game without a ready engine falls back to two players.
    pub fn new_game(&mut self, config: &GameConfig) -> Result<bool, PositionError> {
        let mut game = match &config.start_fen {
            Some(fen) => Game::from_fen(fen)?,
            None => Game::new(),
        };
        self.cancel_search();
        if game.orientation() != self.game.orientation() { game.flip_orientation(); }
        self.game = game;
        self.clock.set_control(config.time_control);
        self.clock_started = false;

        self.opponent = None;
        if config.mode == GameMode::VsEngine {
            match self.engine.as_mut().filter(|e| e.is_ready()) {
                Some(engine) => match engine.new_game() {
                    Ok(()) => {
                        self.opponent = Some(Opponent { color: !config.player_color, difficulty: config.difficulty });
                    }
                    Err(e) => {
                        error!("engine rejected new game: {e}");
                        self.disable_engine();
                    }
                },
                None => warn!("no engine available; playing two-player instead"),
            }
        }
        info!(
            "new game: {} vs {}, clock {}",
            color_name(config.player_color),
            if self.opponent.is_some() { "engine" } else { "human" },
            if config.time_control.is_unlimited() { "off".to_string() } else { format!("{:?}+{:?}", config.time_control.initial, config.time_control.increment) }
        );
        Ok(self.opponent.is_some())
    }

    fn disable_engine(&mut self) {
        warn!("engine disabled; continuing without a computer opponent");
        self.ticket = None;
        self.opponent = None;
        self.engine = None;
    }

    /// Game over on the board or on the clock.
    pub fn is_over(&self) -> bool { self.game.status().is_over() || self.clock.flagged().is_some() }

    pub fn engine_to_move(&self) -> bool {
        let Some(opp) = self.opponent else { return false };
        opp.color == self.game.turn()
            && !self.is_over()
            && self.game.at_end()
            && self.engine.as_ref().is_some_and(|e| e.is_ready())
    }

    pub fn human_can_move(&self) -> bool {
        !self.is_over() && !self.is_thinking() && self.opponent.map_or(true, |o| o.color != self.game.turn())
    }

    pub fn play(&mut self, from: Square, to: Square, promotion: Option<Piece>) -> bool {
        if !self.human_can_move() {
            debug!("input refused: not the player's turn");
            return false;
        }
        let ok = self.game.make_move(from, to, promotion);
        if ok { self.on_move_accepted(); }
        ok
    }

    pub fn play_coded(&mut self, coded: &str) -> bool {
        match coded.parse::<CodedMove>() {
            Ok(mv) => self.play(mv.from, mv.to, mv.promotion),
            Err(e) => { debug!("rejected input: {e}"); false }
        }
    }

    pub fn select(&mut self, square: Square) -> SelectOutcome {
        if !self.human_can_move() { return SelectOutcome::Cleared; }
        let outcome = self.game.select_square(square);
        if outcome == SelectOutcome::Moved { self.on_move_accepted(); }
        outcome
    }

    pub fn undo(&mut self) -> bool {
        self.cancel_search();
        self.game.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_search();
        self.game.redo()
    }

    pub fn go_to_move(&mut self, index: Option<usize>) -> bool {
        self.cancel_search();
        self.game.go_to_move(index)
    }

    pub fn flip_orientation(&mut self) { self.game.flip_orientation(); }

    pub fn tick(&mut self, elapsed: Duration) {
        if self.game.status().is_over() { return; }
        self.clock.tick(elapsed);
    }

    fn on_move_accepted(&mut self) {
        if self.game.status().is_over() {
            self.clock.pause();
            return;
        }
        let turn = self.game.turn();
        if !self.clock_started {
            self.clock.start(turn);
            self.clock_started = true;
        } else {
            self.clock.switch_player();
            if self.clock.active() != Some(turn) { self.clock.start(turn); }
        }
    }

    fn resume_clock(&mut self) {
        if self.clock_started && !self.is_over() { self.clock.resume(); }
    }

    fn cancel_search(&mut self) {
        if self.ticket.take().is_none() { return; }
        if let Some(engine) = self.engine.as_mut() { engine.stop(); }
        self.resume_clock();
    }

    /// Drives the engine opponent without blocking: starts a search when it
    /// is the engine's turn, otherwise checks on the running one.
    pub fn update(&mut self) -> EngineTurn {
        if self.ticket.is_none() {
            if !self.engine_to_move() { return EngineTurn::Idle; }
            let (Some(engine), Some(opp)) = (self.engine.as_mut(), self.opponent) else { return EngineTurn::Idle };
            return match engine.request_best_move(self.game.fen(), opp.difficulty) {
                Ok(()) => {
                    self.ticket = Some(SearchTicket { ply: self.game.history().len(), side: self.game.turn() });
                    self.clock.pause();
                    EngineTurn::Started
                }
                Err(e) => {
                    error!("best-move request failed: {e}");
                    self.disable_engine();
                    EngineTurn::Idle
                }
            };
        }

        let (poll, alive) = match self.engine.as_mut() {
            Some(engine) => (engine.poll(), engine.is_ready()),
            None => (SearchPoll::Idle, false),
        };
        let turn = match poll {
            SearchPoll::Pending => return EngineTurn::Thinking,
            SearchPoll::Idle => {
                self.ticket = None;
                self.resume_clock();
                EngineTurn::Idle
            }
            SearchPoll::Done(result) => {
                let ticket = self.ticket.take();
                self.resume_clock();
                match (ticket, result) {
                    (Some(t), Some(mv)) => self.apply_engine_move(t, mv),
                    (None, Some(_)) => EngineTurn::Discarded,
                    (_, None) => {
                        warn!("engine produced no move");
                        EngineTurn::NoMove
                    }
                }
            }
        };
        if !alive { self.disable_engine(); }
        turn
    }

    fn is_stale(&self, t: SearchTicket) -> bool {
        !self.game.at_end()
            || self.game.history().len() != t.ply
            || self.game.turn() != t.side
            || self.is_over()
            || self.opponent.map(|o| o.color) != Some(t.side)
    }

    fn apply_engine_move(&mut self, t: SearchTicket, mv: CodedMove) -> EngineTurn {
        if self.is_stale(t) {
            warn!("discarding engine move {mv}: position changed since the request");
            return EngineTurn::Discarded;
        }
        if self.game.apply(mv) {
            self.on_move_accepted();
            EngineTurn::Played(mv)
        } else {
            warn!("engine move {mv} is illegal in {}", self.game.fen());
            EngineTurn::NoMove
        }
    }

    pub fn status_message(&self) -> String {
        if self.is_thinking() { return "Engine is thinking...".to_string(); }
        if let Some(c) = self.clock.flagged() {
            return format!("{} ran out of time. {} wins.", color_name(c), color_name(!c));
        }
        match self.game.status() {
            GameStatus::Checkmate => {
                let winner = self.game.winner().map_or("Nobody", color_name);
                match self.opponent {
                    Some(o) if Some(o.color) == self.game.winner() => "Checkmate! The engine wins.".to_string(),
                    Some(_) => "Checkmate! You win.".to_string(),
                    None => format!("Checkmate! {winner} wins."),
                }
            }
            GameStatus::Playing => {
                let side = color_name(self.game.turn());
                match self.opponent {
                    Some(o) if o.color == self.game.turn() => format!("Engine to move ({side})"),
                    Some(_) => format!("Your move ({side})"),
                    None => format!("{side} to move"),
                }
            }
            draw => format!("Draw: {}.", draw.describe()),
        }
    }
}
