use crate::board::Position;
use cozy_chess::{Move, Piece};

fn piece_letter(piece: Piece) -> Option<char> {
    match piece {
        Piece::Knight => Some('N'),
        Piece::Bishop => Some('B'),
        Piece::Rook => Some('R'),
        Piece::Queen => Some('Q'),
        Piece::King => Some('K'),
        Piece::Pawn => None,
    }
}

fn is_capture(pos: &Position, mv: Move) -> bool {
    let board = pos.board();
    let stm = board.side_to_move();
    if let Some(col) = board.color_on(mv.to) { return col != stm; }
    // En passant: a legal diagonal pawn step onto an empty square
    board.piece_on(mv.from) == Some(Piece::Pawn) && mv.from.file() != mv.to.file()
}

/// Standard algebraic notation for a legal `mv` played from `pos`.
pub fn san(pos: &Position, mv: Move) -> String {
    let board = pos.board();
    let mut s = String::new();

    if pos.is_castle(mv) {
        let kingside = mv.to.file() as usize > mv.from.file() as usize;
        s.push_str(if kingside { "O-O" } else { "O-O-O" });
    } else {
        let moving = board.piece_on(mv.from).unwrap_or(Piece::Pawn);
        let capture = is_capture(pos, mv);
        let from = mv.from.to_string();
        match piece_letter(moving) {
            Some(letter) => {
                s.push(letter);
                // Minimal disambiguation among same-type pieces reaching the same square
                let others: Vec<String> = pos
                    .legal_moves()
                    .into_iter()
                    .filter(|m| *m != mv && m.to == mv.to && m.from != mv.from && board.piece_on(m.from) == Some(moving))
                    .map(|m| m.from.to_string())
                    .collect();
                if !others.is_empty() {
                    let same_file = others.iter().any(|o| o[..1] == from[..1]);
                    let same_rank = others.iter().any(|o| o[1..] == from[1..]);
                    if !same_file { s.push_str(&from[..1]); }
                    else if !same_rank { s.push_str(&from[1..]); }
                    else { s.push_str(&from); }
                }
            }
            None => {
                if capture { s.push_str(&from[..1]); }
            }
        }
        if capture { s.push('x'); }
        s.push_str(&mv.to.to_string());
        if let Some(letter) = mv.promotion.and_then(piece_letter) {
            s.push('=');
            s.push(letter);
        }
    }

    let mut next = pos.clone();
    next.play(mv);
    if next.in_check() {
        s.push(if next.has_legal_move() { '+' } else { '#' });
    }
    s
}
