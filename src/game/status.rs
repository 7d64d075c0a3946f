use crate::board::Position;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Playing,
    Checkmate,
    Stalemate,
    ThreefoldRepetition,
    InsufficientMaterial,
    FiftyMoveRule,
}

impl GameStatus {
    pub fn is_over(self) -> bool { self != GameStatus::Playing }

    pub fn is_draw(self) -> bool { self.is_over() && self != GameStatus::Checkmate }

    pub fn describe(self) -> &'static str {
        match self {
            GameStatus::Playing => "in progress",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::ThreefoldRepetition => "draw by threefold repetition",
            GameStatus::InsufficientMaterial => "draw by insufficient material",
            GameStatus::FiftyMoveRule => "draw by the fifty-move rule",
        }
    }
}

/// Terminal status of `pos`, given the repetition keys of every position
/// reached so far (the current one included).
pub fn detect(pos: &Position, keys: &[String]) -> GameStatus {
    if !pos.has_legal_move() {
        return if pos.in_check() { GameStatus::Checkmate } else { GameStatus::Stalemate };
    }
    if let Some(current) = keys.last() {
        if keys.iter().filter(|k| *k == current).count() >= 3 {
            return GameStatus::ThreefoldRepetition;
        }
    }
    if pos.insufficient_material() { return GameStatus::InsufficientMaterial; }
    if pos.halfmove_clock() >= 100 { return GameStatus::FiftyMoveRule; }
    GameStatus::Playing
}
