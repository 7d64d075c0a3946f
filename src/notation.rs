//! Coded moves: origin square, destination square and an optional
//! promotion letter, e.g. `e2e4` or `e7e8q`. This is the form engines speak
//! and the form the terminal front end accepts.

use cozy_chess::{Piece, Square};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodedMoveError {
    #[error("coded move must be 4 or 5 characters, got `{0}`")]
    Length(String),
    #[error("invalid square `{0}`")]
    Square(String),
    #[error("invalid promotion piece `{0}`")]
    Promotion(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodedMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl CodedMove {
    pub fn new(from: Square, to: Square, promotion: Option<Piece>) -> Self {
        Self { from, to, promotion }
    }
}

/// Lowercase piece letter as used in coded moves.
pub fn piece_char(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    }
}

/// Pieces a pawn may promote to.
pub fn promotion_piece(c: char) -> Option<Piece> {
    match c.to_ascii_lowercase() {
        'n' => Some(Piece::Knight),
        'b' => Some(Piece::Bishop),
        'r' => Some(Piece::Rook),
        'q' => Some(Piece::Queen),
        _ => None,
    }
}

fn parse_square(s: &str) -> Result<Square, CodedMoveError> {
    s.parse::<Square>().map_err(|_| CodedMoveError::Square(s.to_string()))
}

impl FromStr for CodedMove {
    type Err = CodedMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(CodedMoveError::Length(s.to_string()));
        }
        let from = parse_square(&s[0..2])?;
        let to = parse_square(&s[2..4])?;
        let promotion = match s[4..].chars().next() {
            Some(c) => Some(promotion_piece(c).ok_or(CodedMoveError::Promotion(c))?),
            None => None,
        };
        Ok(Self { from, to, promotion })
    }
}

impl fmt::Display for CodedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion { write!(f, "{}", piece_char(p))?; }
        Ok(())
    }
}
