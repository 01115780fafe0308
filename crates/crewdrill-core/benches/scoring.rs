use criterion::{black_box, criterion_group, criterion_main, Criterion};

use crewdrill_core::gating::{phase_board, phase_status};
use crewdrill_core::model::{
    Difficulty, PhaseKey, Question, RecoveryAnswers, Role, User, UserStats,
};
use crewdrill_core::scoring::compute_result;
use crewdrill_core::statistics::leaderboard;
use uuid::Uuid;

fn make_questions(level: Role, phase: u8, count: usize) -> Vec<Question> {
    (0..count)
        .map(|i| Question {
            id: Uuid::nil(),
            knowledge_id: None,
            text: format!("question {i}"),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_option_index: i % 4,
            difficulty: Difficulty::Medium,
            level,
            phase,
        })
        .collect()
}

fn make_user(score: u64) -> User {
    let mut user = User::registered(
        Uuid::nil(),
        "Bench",
        "bench@example.com",
        RecoveryAnswers::default(),
    );
    user.stats = UserStats {
        score,
        total_time_secs: score / 2,
        questions_answered: 100,
        correct_answers: 80,
        completed_phases: vec![PhaseKey::new(Role::Trainee, 1)],
    };
    user
}

fn bench_compute_result(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_result");
    let user_id = Uuid::nil();
    let key = PhaseKey::new(Role::Trainee, 1);

    group.bench_function("15_questions", |b| {
        let questions = make_questions(Role::Trainee, 1, 15);
        let answers: Vec<usize> = (0..15).map(|i| i % 4).collect();
        b.iter(|| {
            compute_result(
                black_box(user_id),
                black_box(key),
                black_box(&answers),
                black_box(&questions),
                black_box(90),
            )
        })
    });

    group.bench_function("60_questions", |b| {
        let questions = make_questions(Role::Trainee, 1, 60);
        let answers: Vec<usize> = vec![0; 60];
        b.iter(|| {
            compute_result(
                black_box(user_id),
                black_box(key),
                black_box(&answers),
                black_box(&questions),
                black_box(600),
            )
        })
    });

    group.finish();
}

fn bench_gating(c: &mut Criterion) {
    let mut group = c.benchmark_group("gating");
    let user = make_user(500);
    let global: Vec<PhaseKey> = (1..=4).map(|p| PhaseKey::new(Role::Trainee, p)).collect();

    let mut questions = Vec::new();
    for phase in 1..=4 {
        questions.extend(make_questions(Role::Trainee, phase, 20));
        questions.extend(make_questions(Role::Trainer, phase, 20));
    }

    group.bench_function("phase_status", |b| {
        b.iter(|| {
            phase_status(
                black_box(&user),
                black_box(&global),
                black_box(&questions),
                black_box(Role::Trainee),
                black_box(2),
            )
        })
    });

    group.bench_function("phase_board", |b| {
        b.iter(|| {
            phase_board(
                black_box(&user),
                black_box(&global),
                black_box(&questions),
                black_box(Role::Trainee),
            )
        })
    });

    group.finish();
}

fn bench_leaderboard(c: &mut Criterion) {
    let mut group = c.benchmark_group("leaderboard");

    for size in [100usize, 1000] {
        let users: Vec<User> = (0..size).map(|i| make_user(i as u64 * 7 % 997)).collect();
        group.bench_function(format!("{size}_users"), |b| {
            b.iter(|| leaderboard(black_box(&users), black_box(Role::Trainee), black_box(10)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compute_result, bench_gating, bench_leaderboard);
criterion_main!(benches);
