use criterion::{black_box, criterion_group, criterion_main, Criterion};
use train_matcher::app::App;
use train_matcher::config::GameConfig;
use train_matcher::core::{MatchGameSession, SessionConfig, SessionSnapshot};
use train_matcher::term::{FrameBuffer, Viewport};
use train_matcher::types::{GameMode, PlayerAction};

fn bench_update(c: &mut Criterion) {
    let mut session = MatchGameSession::new(SessionConfig::default());
    session.start_session(GameMode::Endless);

    c.bench_function("session_update_16ms", |b| {
        b.iter(|| {
            session.update(black_box(16));
            session.take_events();
        })
    });
}

fn bench_clear_level(c: &mut Criterion) {
    let mut session = MatchGameSession::new(SessionConfig::default());

    c.bench_function("clear_level_and_advance", |b| {
        b.iter(|| {
            session.start_session(GameMode::Endless);
            while let Some(color) = session.target() {
                let _ = session.attempt_match(color);
            }
            let _ = session.advance_level();
            session.take_events();
        })
    });
}

fn bench_snapshot_into(c: &mut Criterion) {
    let mut session = MatchGameSession::new(SessionConfig::default());
    session.start_session(GameMode::Campaign);
    let mut snap = SessionSnapshot::default();

    c.bench_function("snapshot_into", |b| {
        b.iter(|| {
            session.snapshot_into(black_box(&mut snap));
        })
    });
}

fn bench_render_frame(c: &mut Criterion) {
    let mut app = App::new(GameConfig::default(), 12345);
    app.handle_action(PlayerAction::Confirm);
    let viewport = Viewport::new(120, 32);
    let mut fb = FrameBuffer::new(120, 32);

    c.bench_function("render_frame_120x32", |b| {
        b.iter(|| {
            app.render_into(black_box(viewport), &mut fb);
        })
    });
}

criterion_group!(
    benches,
    bench_update,
    bench_clear_level,
    bench_snapshot_into,
    bench_render_frame
);
criterion_main!(benches);
