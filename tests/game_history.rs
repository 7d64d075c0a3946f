use cozy_chess::{Color, Piece, Square};
use pieboard::game::{Game, GameStatus, SelectOutcome};
use pretty_assertions::assert_eq;

fn sq(s: &str) -> Square { s.parse().unwrap() }

fn play_all(game: &mut Game, moves: &[&str]) {
    for m in moves {
        assert!(game.apply_coded_move(m), "move {m} rejected in {}", game.fen());
    }
}

// Castling on both sides, en passant and ordinary captures.
const LINE: [&str; 14] = [
    "e2e4", "d7d5", "e4d5", "c7c5", "d5c6", "b7c6", "g1f3", "g8f6", "f1e2", "e7e6", "e1g1", "f8e7", "d2d4", "e8g8",
];

#[test]
fn three_plies_leave_black_to_move() {
    let mut g = Game::new();
    play_all(&mut g, &["e2e4", "e7e5", "g1f3"]);
    assert_eq!(g.current_move_index(), Some(2));
    assert_eq!(g.history().len(), 3);
    assert_eq!(g.turn(), Color::Black);
    assert!(!g.is_check());
    assert_eq!(g.status(), GameStatus::Playing);
    let sans: Vec<&str> = g.history().iter().map(|m| m.san.as_str()).collect();
    assert_eq!(sans, vec!["e4", "e5", "Nf3"]);
}

#[test]
fn every_cursor_matches_a_fresh_replay() {
    let mut g = Game::new();
    play_all(&mut g, &LINE);
    assert_eq!(g.history()[4].san, "dxc6");
    assert_eq!(g.history()[10].san, "O-O");
    assert_eq!(g.history()[10].to, sq("g1"));

    for c in 0..LINE.len() {
        assert!(g.go_to_move(Some(c)) || g.current_move_index() == Some(c));
        let mut fresh = Game::new();
        play_all(&mut fresh, &LINE[..=c]);
        assert_eq!(g.fen(), fresh.fen(), "cursor {c}");
        assert_eq!(g.fen(), g.history()[c].fen);
        assert_eq!(g.history().len(), LINE.len());
    }
    assert!(g.go_to_move(None));
    assert_eq!(g.fen(), Game::new().fen());
    assert_eq!(g.last_move(), None);
}

#[test]
fn moves_are_refused_while_browsing() {
    let mut g = Game::new();
    play_all(&mut g, &["e2e4", "e7e5", "g1f3"]);
    assert!(g.go_to_move(Some(0)));
    let fen = g.fen().to_string();
    // Legal in the displayed position, but history is not at its end.
    assert!(!g.make_move(sq("e7"), sq("e5"), None));
    assert_eq!(g.fen(), fen);
    assert_eq!(g.history().len(), 3);
    assert_eq!(g.current_move_index(), Some(0));
    assert!(g.can_redo());
}

#[test]
fn undo_then_redo_restores_the_position() {
    let mut g = Game::new();
    play_all(&mut g, &["e2e4", "d7d5", "f1b5"]);
    assert!(g.is_check());
    let (fen, cursor, last) = (g.fen().to_string(), g.current_move_index(), g.last_move());

    assert!(g.undo());
    assert!(!g.is_check());
    assert_eq!(g.turn(), Color::White);
    assert!(g.redo());
    assert_eq!(g.fen(), fen);
    assert_eq!(g.current_move_index(), cursor);
    assert_eq!(g.last_move(), last);
    assert!(g.is_check());
    assert!(!g.redo());
}

#[test]
fn undo_at_start_does_nothing() {
    let mut g = Game::new();
    assert!(!g.undo());
    assert!(!g.redo());
    assert!(!g.go_to_move(Some(0)));
}

#[test]
fn pawn_reaching_last_rank_becomes_a_queen() {
    let mut g = Game::from_fen("8/P6k/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert!(g.apply_coded_move("a7a8"));
    let m = &g.history()[0];
    assert_eq!(m.promotion, Some(Piece::Queen));
    assert_eq!(m.san, "a8=Q");
    assert!(g.fen().starts_with("Q7/"));
}

#[test]
fn under_promotion_survives_replay() {
    let mut g = Game::from_fen("8/P6k/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    play_all(&mut g, &["a7a8n", "h7g7"]);
    assert_eq!(g.history()[0].san, "a8=N");
    let fen = g.fen().to_string();
    assert!(g.go_to_move(None));
    assert!(g.go_to_move(Some(1)));
    assert_eq!(g.fen(), fen);
    assert!(g.fen().starts_with("N7/"));
}

#[test]
fn illegal_move_clears_selection() {
    let mut g = Game::new();
    assert_eq!(g.select_square(sq("g1")), SelectOutcome::Selected);
    assert!(!g.make_move(sq("g1"), sq("g3"), None));
    assert_eq!(g.selected_square(), None);
    assert!(g.legal_targets().is_empty());
    assert!(g.history().is_empty());
    assert!(!g.apply_coded_move("e2e4x"));
    assert!(!g.apply_coded_move("zz"));
}

#[test]
fn selecting_squares_plays_moves() {
    let mut g = Game::new();
    assert_eq!(g.select_square(sq("e2")), SelectOutcome::Selected);
    let mut targets = g.legal_targets().to_vec();
    targets.sort_by_key(|s| *s as usize);
    assert_eq!(targets, vec![sq("e3"), sq("e4")]);

    assert_eq!(g.select_square(sq("e4")), SelectOutcome::Moved);
    assert_eq!(g.history().len(), 1);
    assert_eq!(g.selected_square(), None);
    // White's pawn cannot be picked up on Black's turn.
    assert_eq!(g.select_square(sq("e4")), SelectOutcome::Cleared);
    assert_eq!(g.select_square(sq("e7")), SelectOutcome::Selected);
    assert_eq!(g.select_square(sq("e3")), SelectOutcome::Cleared);
    assert_eq!(g.selected_square(), None);
}

#[test]
fn fools_mate_is_checkmate_for_black() {
    let mut g = Game::new();
    play_all(&mut g, &["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert_eq!(g.status(), GameStatus::Checkmate);
    assert_eq!(g.winner(), Some(Color::Black));
    assert_eq!(g.history()[3].san, "Qh4#");
    assert!(!g.apply_coded_move("a2a3"));

    // Stepping back reopens the game; the end is still mate.
    assert!(g.undo());
    assert_eq!(g.status(), GameStatus::Playing);
    assert_eq!(g.winner(), None);
    assert!(g.redo());
    assert_eq!(g.status(), GameStatus::Checkmate);
}

#[test]
fn knight_shuffle_draws_by_threefold_repetition() {
    let mut g = Game::new();
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
    play_all(&mut g, &shuffle);
    assert_eq!(g.status(), GameStatus::Playing);
    play_all(&mut g, &shuffle);
    assert_eq!(g.status(), GameStatus::ThreefoldRepetition);
    assert!(g.status().is_draw());
    assert_eq!(g.winner(), None);
}

#[test]
fn repetition_counts_the_position_right_after_a_double_push() {
    let mut g = Game::new();
    play_all(&mut g, &["e2e4", "g8f6", "g1f3", "f6g8", "f3g1", "g8f6", "g1f3", "f6g8"]);
    assert_eq!(g.status(), GameStatus::Playing);
    // Third time with Black to move after 1.e4; no pawn could ever take on e3.
    play_all(&mut g, &["f3g1"]);
    assert_eq!(g.status(), GameStatus::ThreefoldRepetition);
    assert_eq!(g.winner(), None);
}

#[test]
fn promotion_letter_on_an_ordinary_move_is_ignored() {
    let mut g = Game::new();
    assert!(g.apply_coded_move("e2e4q"));
    assert_eq!(g.history()[0].promotion, None);
    assert_eq!(g.history()[0].san, "e4");
    assert_eq!(g.last_move().and_then(|m| m.promotion), None);
}

#[test]
fn king_takes_last_piece_for_a_draw() {
    let mut g = Game::from_fen("8/8/4k3/8/8/3q4/3K4/8 w - - 0 1").unwrap();
    assert!(g.is_check());
    assert_eq!(g.status(), GameStatus::Playing);
    play_all(&mut g, &["d2d3"]);
    assert_eq!(g.history()[0].san, "Kxd3");
    assert_eq!(g.status(), GameStatus::InsufficientMaterial);
}

#[test]
fn move_rows_pair_moves_by_number() {
    let mut g = Game::new();
    play_all(&mut g, &["e2e4", "e7e5", "g1f3"]);
    let rows: Vec<(u16, Option<&str>, Option<&str>)> = g
        .move_rows()
        .iter()
        .map(|r| (r.number, r.white.map(|(_, m)| m.san.as_str()), r.black.map(|(_, m)| m.san.as_str())))
        .collect();
    assert_eq!(rows, vec![(1, Some("e4"), Some("e5")), (2, Some("Nf3"), None)]);

    let mut g = Game::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
    play_all(&mut g, &["e7e5", "g1f3"]);
    let rows = g.move_rows();
    assert_eq!(rows[0].number, 1);
    assert!(rows[0].white.is_none());
    assert_eq!(rows[1].number, 2);
    assert_eq!(rows[1].white.map(|(i, _)| i), Some(1));
}
