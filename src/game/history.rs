use crate::notation::CodedMove;
use cozy_chess::{Piece, Square};

/// One accepted move. `to` is the king's square for castling, and
/// `promotion` is kept so replays reproduce under-promotions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMove {
    pub san: String,
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
    /// Position after this move.
    pub fen: String,
}

impl HistoryMove {
    pub fn coded(&self) -> CodedMove { CodedMove::new(self.from, self.to, self.promotion) }
}

/// Source and destination of the move that produced the displayed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl From<&HistoryMove> for LastMove {
    fn from(m: &HistoryMove) -> Self { Self { from: m.from, to: m.to, promotion: m.promotion } }
}

/// A numbered line of the move list: white's and black's moves, each with its
/// index into the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRow<'a> {
    pub number: u16,
    pub white: Option<(usize, &'a HistoryMove)>,
    pub black: Option<(usize, &'a HistoryMove)>,
}

/// Groups `history` by move number. `black_first` is set when the game
/// started with black to move.
pub fn rows(history: &[HistoryMove], first_number: u16, black_first: bool) -> Vec<MoveRow<'_>> {
    let mut out: Vec<MoveRow<'_>> = Vec::new();
    let mut number = first_number;
    let mut iter = history.iter().enumerate();
    if black_first {
        if let Some(entry) = iter.next() {
            out.push(MoveRow { number, white: None, black: Some(entry) });
            number += 1;
        }
    }
    while let Some(white) = iter.next() {
        let black = iter.next();
        out.push(MoveRow { number, white: Some(white), black });
        number += 1;
    }
    out
}
