use criterion::{black_box, criterion_group, criterion_main, Criterion};
use blockfall::core::{Board, Game, GameSnapshot};
use blockfall::term::{FrameBuffer, GameView, Viewport};
use blockfall::types::{Color, BOARD_WIDTH};

fn bench_update(c: &mut Criterion) {
    let mut game = Game::new(12345);
    game.start(0);
    let mut now = 0u64;

    c.bench_function("game_update_16ms", |b| {
        b.iter(|| {
            now += 16;
            game.update(black_box(now));
            game.drain_events().for_each(drop);
            if !game.is_playing() {
                game.start(now);
            }
        })
    });
}

fn bench_line_clear(c: &mut Criterion) {
    let gray = Some(Color::from_hex(0x808080));
    c.bench_function("clear_4_lines", |b| {
        b.iter(|| {
            let mut board = Board::new();
            // Fill bottom 4 rows
            for y in 16..20 {
                for x in 0..BOARD_WIDTH as i8 {
                    board.set(x, y, gray);
                }
            }
            black_box(board.clear_lines());
        })
    });
}

fn bench_hard_drop(c: &mut Criterion) {
    let mut game = Game::new(12345);
    game.start(0);

    c.bench_function("hard_drop_and_spawn", |b| {
        b.iter(|| {
            game.hard_drop();
            game.drain_events().for_each(drop);
            if !game.is_playing() {
                game.start(0);
            }
        })
    });
}

fn bench_move(c: &mut Criterion) {
    let mut game = Game::new(12345);
    game.start(0);

    c.bench_function("move_left_right", |b| {
        b.iter(|| {
            black_box(game.move_left());
            black_box(game.move_right());
            game.drain_events().for_each(drop);
        })
    });
}

fn bench_rotate(c: &mut Criterion) {
    let mut game = Game::new(12345);
    game.start(0);
    game.soft_drop();
    game.soft_drop();

    c.bench_function("rotate_clockwise", |b| {
        b.iter(|| {
            black_box(game.rotate_clockwise());
            game.drain_events().for_each(drop);
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let mut game = Game::new(12345);
    game.start(0);
    let view = GameView::default();
    let mut snap = GameSnapshot::default();
    let mut fb = FrameBuffer::new(80, 24);

    c.bench_function("snapshot_and_render", |b| {
        b.iter(|| {
            game.snapshot_into(&mut snap);
            view.render_into(&snap, Viewport::new(80, 24), &mut fb);
            black_box(fb.cells().len());
        })
    });
}

criterion_group!(
    benches,
    bench_update,
    bench_line_clear,
    bench_hard_drop,
    bench_move,
    bench_rotate,
    bench_render
);
criterion_main!(benches);
