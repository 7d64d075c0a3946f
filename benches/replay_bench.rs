use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pieboard::game::Game;

// Knights out and back; Game keeps recording past a repetition draw.
const CYCLE: [&str; 8] = ["g1f3", "b8c6", "b1c3", "g8f6", "f3g1", "c6b8", "c3b1", "f6g8"];

fn game_with_plies(n: usize) -> Game {
    let mut g = Game::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
    let moves = ["e2e4", "e7e5", "d2d3", "d7d6"];
    for m in moves.iter().chain(CYCLE.iter().cycle()).take(n) {
        if !g.apply_coded_move(m) { break; }
    }
    g
}

fn bench_go_to_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("go_to_move");
    for &plies in &[10usize, 40, 100] {
        let mut g = game_with_plies(plies);
        let last = g.history().len().saturating_sub(1);
        group.bench_with_input(BenchmarkId::from_parameter(plies), &plies, |ben, _| {
            ben.iter(|| {
                g.go_to_move(None);
                g.go_to_move(Some(black_box(last)));
                black_box(g.fen().len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_go_to_move);
criterion_main!(benches);
