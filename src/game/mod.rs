//! Game store: the authoritative move list, a cursor into it, and a cached
//! copy of the displayed position.
//!
//! The cozy-chess board inside is always the position at the cursor. Moving
//! the cursor (undo, redo, go to move) rebuilds that board from the initial
//! position by replaying `history[..=cursor]`; history itself only grows at
//! its end, and only while the cursor sits there.

pub mod history;
pub mod status;

pub use history::{HistoryMove, LastMove, MoveRow};
pub use status::GameStatus;

use crate::board::{san, Position, PositionError};
use crate::notation::CodedMove;
use cozy_chess::{Color, Piece, Square};
use log::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    White,
    Black,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::White => Orientation::Black,
            Orientation::Black => Orientation::White,
        }
    }
}

/// What a click on a square did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Moved,
    Selected,
    Cleared,
}

#[derive(Debug, Clone)]
pub struct Game {
    initial: Position,
    position: Position,
    // Repetition keys from the initial position through the cursor
    keys: Vec<String>,
    fen: String,
    selected: Option<Square>,
    legal_targets: Vec<Square>,
    last_move: Option<LastMove>,
    in_check: bool,
    status: GameStatus,
    winner: Option<Color>,
    history: Vec<HistoryMove>,
    cursor: Option<usize>,
    orientation: Orientation,
}

impl Default for Game {
    fn default() -> Self { Self::new() }
}

impl Game {
    pub fn new() -> Self { Self::with_position(Position::startpos()) }

    /// Starts from an arbitrary position; replays begin there.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        Ok(Self::with_position(Position::from_fen(fen)?))
    }

    fn with_position(initial: Position) -> Self {
        let mut g = Self {
            position: initial.clone(),
            keys: vec![initial.repetition_key()],
            initial,
            fen: String::new(),
            selected: None,
            legal_targets: Vec::new(),
            last_move: None,
            in_check: false,
            status: GameStatus::Playing,
            winner: None,
            history: Vec::new(),
            cursor: None,
            orientation: Orientation::White,
        };
        g.refresh();
        g
    }

    pub fn fen(&self) -> &str { &self.fen }
    pub fn initial_fen(&self) -> String { self.initial.fen() }
    pub fn position(&self) -> &Position { &self.position }
    pub fn turn(&self) -> Color { self.position.side_to_move() }
    pub fn selected_square(&self) -> Option<Square> { self.selected }
    pub fn legal_targets(&self) -> &[Square] { &self.legal_targets }
    pub fn last_move(&self) -> Option<LastMove> { self.last_move }
    pub fn is_check(&self) -> bool { self.in_check }
    pub fn status(&self) -> GameStatus { self.status }
    pub fn winner(&self) -> Option<Color> { self.winner }
    pub fn history(&self) -> &[HistoryMove] { &self.history }
    pub fn orientation(&self) -> Orientation { self.orientation }

    /// Index of the displayed move; `None` is the initial position.
    pub fn current_move_index(&self) -> Option<usize> { self.cursor }

    /// Number of history moves applied to reach the displayed position.
    pub fn ply(&self) -> usize { self.cursor.map_or(0, |c| c + 1) }

    pub fn at_end(&self) -> bool { self.ply() == self.history.len() }
    pub fn can_undo(&self) -> bool { self.cursor.is_some() }
    pub fn can_redo(&self) -> bool { !self.at_end() }

    pub fn move_rows(&self) -> Vec<MoveRow<'_>> {
        history::rows(&self.history, self.initial.fullmove_number(), self.initial.side_to_move() == Color::Black)
    }

    pub fn select_square(&mut self, square: Square) -> SelectOutcome {
        if let Some(from) = self.selected {
            if self.legal_targets.contains(&square) {
                return if self.make_move(from, square, None) { SelectOutcome::Moved } else { SelectOutcome::Cleared };
            }
        }
        if let Some((color, _)) = self.position.piece_at(square) {
            if color == self.turn() {
                self.selected = Some(square);
                self.legal_targets = self.position.legal_destinations(square);
                return SelectOutcome::Selected;
            }
        }
        self.clear_selection();
        SelectOutcome::Cleared
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.legal_targets.clear();
    }

    /// Plays a move at the end of history. Returns `false` and leaves the
    /// store untouched while browsing earlier positions; an illegal move only
    /// clears the selection.
    pub fn make_move(&mut self, from: Square, to: Square, promotion: Option<Piece>) -> bool {
        if !self.at_end() {
            debug!("move {from}{to} refused: browsing ply {} of {}", self.ply(), self.history.len());
            return false;
        }
        let promotion = if self.position.is_promotion(from, to) { Some(promotion.unwrap_or(Piece::Queen)) } else { None };
        let Some(mv) = self.position.find_move(from, to, promotion) else {
            debug!("illegal move {} in {}", CodedMove::new(from, to, promotion), self.fen);
            self.clear_selection();
            return false;
        };

        let san = san::san(&self.position, mv);
        let to = self.position.destination(mv);
        self.position.play(mv);
        self.keys.push(self.position.repetition_key());
        self.history.push(HistoryMove { san, from, to, promotion, fen: self.position.fen() });
        self.cursor = Some(self.history.len() - 1);
        self.last_move = Some(LastMove { from, to, promotion });
        self.refresh();
        debug!("played {} ({} plies)", self.history[self.history.len() - 1].san, self.history.len());
        if self.status.is_over() {
            info!("game over: {}", self.status.describe());
        }
        true
    }

    pub fn apply(&mut self, mv: CodedMove) -> bool { self.make_move(mv.from, mv.to, mv.promotion) }

    /// Decodes `e2e4` / `e7e8q` text and plays it.
    pub fn apply_coded_move(&mut self, coded: &str) -> bool {
        match coded.parse::<CodedMove>() {
            Ok(mv) => self.apply(mv),
            Err(e) => {
                debug!("rejected coded move: {e}");
                false
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        match self.cursor {
            Some(c) => { self.seek(c); true }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.at_end() { return false; }
        self.seek(self.ply() + 1);
        true
    }

    /// Moves the cursor to `index` (`None` = initial position). Out-of-range
    /// and current indices are refused.
    pub fn go_to_move(&mut self, index: Option<usize>) -> bool {
        if index == self.cursor { return false; }
        let ply = index.map_or(0, |i| i + 1);
        if ply > self.history.len() { return false; }
        self.seek(ply);
        true
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.seek(0);
    }

    pub fn flip_orientation(&mut self) { self.orientation = self.orientation.flipped(); }

    // Rebuilds the board by replaying the first `ply` history moves.
    fn seek(&mut self, ply: usize) {
        let mut pos = self.initial.clone();
        let mut keys = vec![pos.repetition_key()];
        for (i, hm) in self.history[..ply].iter().enumerate() {
            match pos.find_move(hm.from, hm.to, hm.promotion) {
                Some(mv) => {
                    pos.play(mv);
                    keys.push(pos.repetition_key());
                }
                None => {
                    error!("history move {} ({}) no longer legal during replay", i, hm.san);
                    break;
                }
            }
        }
        self.position = pos;
        self.keys = keys;
        self.cursor = ply.checked_sub(1);
        self.last_move = self.cursor.map(|c| LastMove::from(&self.history[c]));
        self.refresh();
        debug!("cursor at ply {} of {}", ply, self.history.len());
    }

    fn refresh(&mut self) {
        self.fen = self.position.fen();
        self.in_check = self.position.in_check();
        self.status = status::detect(&self.position, &self.keys);
        self.winner = if self.status == GameStatus::Checkmate { Some(!self.turn()) } else { None };
        self.clear_selection();
    }
}
