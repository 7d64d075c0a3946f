use cozy_chess::{Board as CozyBoard, Color, File, Move, Piece, Rank, Square};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error("invalid FEN `{fen}`: {reason}")]
    InvalidFen { fen: String, reason: String },
}

/// Rules-engine instance: a cozy-chess board plus the few queries the
/// game store needs (legality lookup, check, draw material).
#[derive(Clone, Debug)]
pub struct Position {
    board: CozyBoard,
}

impl Default for Position {
    fn default() -> Self { Self::startpos() }
}

impl Position {
    pub fn startpos() -> Self {
        Self { board: CozyBoard::default() }
    }

    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        CozyBoard::from_fen(fen.trim(), false)
            .map(|b| Self { board: b })
            .map_err(|e| PositionError::InvalidFen { fen: fen.to_string(), reason: format!("{e:?}") })
    }

    pub fn board(&self) -> &CozyBoard { &self.board }

    pub fn fen(&self) -> String { format!("{}", self.board) }

    /// Placement, side to move, castling and en passant: the FEN fields that
    /// decide whether two positions repeat. The en passant square counts only
    /// while a pawn can actually capture there.
    pub fn repetition_key(&self) -> String {
        let fen = self.fen();
        let mut fields: Vec<&str> = fen.split_whitespace().take(4).collect();
        if let Some(ep) = fields.get(3).copied().filter(|f| *f != "-") {
            let capturable = ep.parse::<Square>().is_ok_and(|target| {
                self.legal_moves()
                    .iter()
                    .any(|m| m.to == target && self.board.piece_on(m.from) == Some(Piece::Pawn))
            });
            if !capturable { fields[3] = "-"; }
        }
        fields.join(" ")
    }

    pub fn side_to_move(&self) -> Color { self.board.side_to_move() }

    pub fn in_check(&self) -> bool { !self.board.checkers().is_empty() }

    pub fn halfmove_clock(&self) -> u8 { self.board.halfmove_clock() }

    pub fn fullmove_number(&self) -> u16 { self.board.fullmove_number() }

    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        match (self.board.color_on(sq), self.board.piece_on(sq)) {
            (Some(c), Some(p)) => Some((c, p)),
            _ => None,
        }
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut v = Vec::new();
        self.board.generate_moves(|ml| { for m in ml { v.push(m); } false });
        v
    }

    pub fn has_legal_move(&self) -> bool {
        let mut any = false;
        self.board.generate_moves(|ml| { if !ml.is_empty() { any = true; } any });
        any
    }

    /// cozy-chess encodes castling as king-takes-own-rook.
    pub fn is_castle(&self, mv: Move) -> bool {
        self.board.piece_on(mv.from) == Some(Piece::King)
            && self.board.color_on(mv.to) == Some(self.board.side_to_move())
    }

    /// Where the moving piece lands; castling reports the king's square
    /// (g/c file) rather than the rook's.
    pub fn destination(&self, mv: Move) -> Square {
        if self.is_castle(mv) {
            let file = if mv.to.file() as usize > mv.from.file() as usize { File::G } else { File::C };
            Square::new(file, mv.from.rank())
        } else {
            mv.to
        }
    }

    /// True when `from` holds a pawn that would land on its last rank at `to`.
    pub fn is_promotion(&self, from: Square, to: Square) -> bool {
        match self.piece_at(from) {
            Some((color, Piece::Pawn)) => {
                let last = if color == Color::White { Rank::Eighth } else { Rank::First };
                to.rank() == last
            }
            _ => false,
        }
    }

    /// Matches a legal move by squares; castling may be given either as the
    /// king's two-square step or as king-takes-rook.
    pub fn find_move(&self, from: Square, to: Square, promotion: Option<Piece>) -> Option<Move> {
        let mut found = None;
        self.board.generate_moves(|ml| {
            for m in ml {
                if m.from == from && m.promotion == promotion && (m.to == to || self.destination(m) == to) {
                    found = Some(m);
                    break;
                }
            }
            found.is_some()
        });
        found
    }

    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let mut out: Vec<Square> = Vec::new();
        for m in self.legal_moves() {
            if m.from != from { continue; }
            let to = self.destination(m);
            if !out.contains(&to) { out.push(to); }
        }
        out
    }

    pub fn play(&mut self, mv: Move) { self.board.play(mv); }

    /// Neither side can mate: bare kings, a single minor piece, or bishops
    /// all standing on one square colour.
    pub fn insufficient_material(&self) -> bool {
        let b = &self.board;
        let heavy = b.pieces(Piece::Pawn) | b.pieces(Piece::Rook) | b.pieces(Piece::Queen);
        if !heavy.is_empty() { return false; }
        let knights = b.pieces(Piece::Knight);
        let bishops = b.pieces(Piece::Bishop);
        if knights.len() + bishops.len() <= 1 { return true; }
        if !knights.is_empty() { return false; }
        let (mut light, mut dark) = (false, false);
        for sq in bishops {
            if (sq.file() as usize + sq.rank() as usize) % 2 == 1 { light = true; } else { dark = true; }
        }
        !(light && dark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square { s.parse().unwrap() }

    #[test]
    fn castling_accepts_both_encodings() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let a = pos.find_move(sq("e1"), sq("g1"), None).expect("e1g1");
        let b = pos.find_move(sq("e1"), sq("h1"), None).expect("e1h1");
        assert_eq!(a, b);
        assert_eq!(pos.destination(a), sq("g1"));
        let long = pos.find_move(sq("e1"), sq("c1"), None).expect("e1c1");
        assert_eq!(pos.destination(long), sq("c1"));
    }

    #[test]
    fn destinations_report_king_square_for_castling() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let targets = pos.legal_destinations(sq("e1"));
        assert!(targets.contains(&sq("g1")));
        assert!(!targets.contains(&sq("h1")));
    }

    #[test]
    fn insufficient_material_cases() {
        let cases = [
            ("4k3/8/8/8/8/8/8/4K3 w - - 0 1", true),
            ("4k3/8/8/8/8/8/8/4KN2 w - - 0 1", true),
            ("4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1", false),
            ("4kb2/8/8/8/8/8/8/4KB2 w - - 0 1", false),
            ("4k1b1/8/8/8/8/8/8/4KB2 w - - 0 1", true),
            ("4kn2/8/8/8/8/8/8/4KN2 w - - 0 1", false),
            ("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1", false),
        ];
        for (fen, expect) in cases {
            let pos = Position::from_fen(fen).unwrap();
            assert_eq!(pos.insufficient_material(), expect, "{fen}");
        }
    }

    #[test]
    fn repetition_key_drops_uncapturable_en_passant() {
        let quiet = Position::from_fen("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").unwrap();
        assert_eq!(quiet.repetition_key(), "4k3/8/8/8/4P3/8/8/4K3 b - -");
        let live = Position::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").unwrap();
        assert_eq!(live.repetition_key(), "4k3/8/8/8/3pP3/8/8/4K3 b - e3");
    }

    #[test]
    fn promotion_detection_is_colour_aware() {
        let pos = Position::from_fen("4k3/P7/8/8/8/8/p7/4K3 w - - 0 1").unwrap();
        assert!(pos.is_promotion(sq("a7"), sq("a8")));
        assert!(pos.is_promotion(sq("a2"), sq("a1")));
        assert!(!pos.is_promotion(sq("e1"), sq("e2")));
    }
}
