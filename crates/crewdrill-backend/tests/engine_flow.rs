//! End-to-end training flows over the in-memory backend.
//!
//! These tests drive the engine the way the CLI does: register → unlock →
//! quiz → ranking, plus the recovery and admin paths.

use std::sync::Arc;

use crewdrill_backend::MemoryBackend;
use crewdrill_core::engine::{EngineError, TrainingEngine};
use crewdrill_core::capability::Screen;
use crewdrill_core::model::{Difficulty, PhaseKey, Question, RecoveryAnswers, Role};
use crewdrill_core::session::Router;
use crewdrill_core::traits::{Backend, Registration};
use uuid::Uuid;

fn make_questions(level: Role, phase: u8, count: usize) -> Vec<Question> {
    (0..count)
        .map(|i| Question {
            id: Uuid::new_v4(),
            knowledge_id: None,
            text: format!("{level} phase {phase} question {i}"),
            options: vec![
                "option a".into(),
                "option b".into(),
                "option c".into(),
                "option d".into(),
            ],
            correct_option_index: i % 4,
            difficulty: Difficulty::Medium,
            level,
            phase,
        })
        .collect()
}

fn registration(email: &str) -> Registration {
    Registration {
        name: "Ana Lima".into(),
        email: email.into(),
        password: "secret1".into(),
        recovery: RecoveryAnswers {
            mother_name: "Maria".into(),
            favorite_color: "red".into(),
        },
    }
}

fn engine_with_phase() -> (TrainingEngine, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::seeded());
    backend.seed_questions(make_questions(Role::Trainee, 1, 15));
    backend.seed_global_phases(vec![PhaseKey::new(Role::Trainee, 1)]);
    (TrainingEngine::new(backend.clone()), backend)
}

#[tokio::test]
async fn register_quiz_and_rank_flow() {
    let (engine, backend) = engine_with_phase();

    let user = engine
        .sign_up(&registration("ana@example.com"))
        .await
        .unwrap();
    assert_eq!(user.role, Role::Trainee);

    // Landing screen via the router, as the CLI wires it.
    let mut router = Router::new();
    assert_eq!(router.login(user.clone()), Screen::TraineeBoard);

    let board = engine.phase_overview(&user, Role::Trainee).await.unwrap();
    assert!(board[0].status.available);
    assert!(!board[1].status.unlocked);

    let key = PhaseKey::new(Role::Trainee, 1);
    let questions = engine.start_quiz(&user, Role::Trainee, 1).await.unwrap();
    assert_eq!(questions.len(), 15);

    // Answer everything correctly in 50 seconds: 15 * 100 - 10.
    let answers: Vec<usize> = questions.iter().map(|q| q.correct_option_index).collect();
    let (updated, result) = engine
        .complete_quiz(&user, key, &questions, &answers, 50)
        .await
        .unwrap();
    assert_eq!(result.score, 1490);
    assert_eq!(updated.stats.completed_phases, vec![key]);
    router.refresh_user(updated.clone());

    // The profile mutation and the result record both hit the backend.
    let stored = backend.users().await.unwrap();
    let stored_ana = stored
        .iter()
        .find(|u| u.email == "ana@example.com")
        .unwrap();
    assert_eq!(stored_ana.stats.score, 1490);
    assert_eq!(backend.results().await.unwrap().len(), 1);

    let ranking = engine.leaderboard(Role::Trainee, 10).await.unwrap();
    assert_eq!(ranking[0].email, "ana@example.com");
    assert_eq!(ranking[0].score, 1490);
}

#[tokio::test]
async fn repeat_completion_accumulates_stats_once_per_attempt() {
    let (engine, _backend) = engine_with_phase();
    let user = engine
        .sign_up(&registration("ana@example.com"))
        .await
        .unwrap();

    let key = PhaseKey::new(Role::Trainee, 1);
    let questions = engine.start_quiz(&user, Role::Trainee, 1).await.unwrap();
    let answers: Vec<usize> = questions.iter().map(|q| q.correct_option_index).collect();

    let (after_first, _) = engine
        .complete_quiz(&user, key, &questions, &answers, 100)
        .await
        .unwrap();
    let (after_second, _) = engine
        .complete_quiz(&after_first, key, &questions, &answers, 100)
        .await
        .unwrap();

    // Stats double, the completed list does not.
    assert_eq!(after_second.stats.score, after_first.stats.score * 2);
    assert_eq!(after_second.stats.completed_phases, vec![key]);
}

#[tokio::test]
async fn locked_and_underfilled_phases_refuse_to_start() {
    let backend = Arc::new(MemoryBackend::seeded());
    backend.seed_questions(make_questions(Role::Trainee, 1, 15));
    backend.seed_questions(make_questions(Role::Trainee, 2, 5));
    backend.seed_global_phases(vec![PhaseKey::new(Role::Trainee, 2)]);
    let engine = TrainingEngine::new(backend);

    let user = engine
        .sign_up(&registration("ana@example.com"))
        .await
        .unwrap();

    // Phase 1 has questions but no global activation.
    let err = engine.start_quiz(&user, Role::Trainee, 1).await.unwrap_err();
    assert!(matches!(err, EngineError::PhaseLocked { .. }));

    // Phase 2 is active but five questions short of the floor.
    let err = engine.start_quiz(&user, Role::Trainee, 2).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::NotEnoughQuestions { have: 5, .. }
    ));
}

#[tokio::test]
async fn master_bypasses_global_activation() {
    let backend = Arc::new(MemoryBackend::seeded());
    backend.seed_questions(make_questions(Role::Coordinator, 1, 15));
    let engine = TrainingEngine::new(backend);

    let master = engine
        .sign_in("master@example.com", "master@123")
        .await
        .unwrap();
    let questions = engine
        .start_quiz(&master, Role::Coordinator, 1)
        .await
        .unwrap();
    assert_eq!(questions.len(), 15);
}

#[tokio::test]
async fn trainee_cannot_start_a_higher_track() {
    let (engine, backend) = engine_with_phase();
    backend.seed_questions(make_questions(Role::Coordinator, 1, 15));
    backend.seed_global_phases(vec![PhaseKey::new(Role::Coordinator, 1)]);

    let user = engine
        .sign_up(&registration("ana@example.com"))
        .await
        .unwrap();
    let err = engine
        .start_quiz(&user, Role::Coordinator, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::TrackForbidden { .. }));
}

#[tokio::test]
async fn recovery_challenge_resets_the_password() {
    let (engine, _backend) = engine_with_phase();
    engine
        .sign_up(&registration("ana@example.com"))
        .await
        .unwrap();

    let wrong = RecoveryAnswers {
        mother_name: "Maria".into(),
        favorite_color: "blue".into(),
    };
    let err = engine
        .recover_access("ana@example.com", &wrong, "newpass1")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::RecoveryMismatch));

    let right = RecoveryAnswers {
        mother_name: "maria".into(),
        favorite_color: "RED".into(),
    };
    engine
        .recover_access("ana@example.com", &right, "newpass1")
        .await
        .unwrap();

    let user = engine.sign_in("ana@example.com", "newpass1").await.unwrap();
    assert_eq!(user.email, "ana@example.com");
}

#[tokio::test]
async fn admin_mutations_round_trip() {
    let (engine, _backend) = engine_with_phase();
    engine
        .sign_up(&registration("ana@example.com"))
        .await
        .unwrap();

    let promoted = engine
        .set_role("ana@example.com", Role::Trainer)
        .await
        .unwrap();
    assert_eq!(promoted.role, Role::Trainer);

    let key = PhaseKey::new(Role::Trainer, 1);
    let unlocked = engine.unlock_phase("ana@example.com", key).await.unwrap();
    assert!(unlocked.unlocked_phases.contains(&key));
    // Unlocking twice never duplicates the key.
    let unlocked = engine.unlock_phase("ana@example.com", key).await.unwrap();
    assert_eq!(
        unlocked.unlocked_phases.iter().filter(|k| **k == key).count(),
        1
    );
    let revoked = engine.revoke_phase("ana@example.com", key).await.unwrap();
    assert!(!revoked.unlocked_phases.contains(&key));

    let deactivated = engine.set_active("ana@example.com", false).await.unwrap();
    assert!(!deactivated.is_active);
    let err = engine
        .sign_in("ana@example.com", "secret1")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Backend(crewdrill_core::error::BackendError::AccountInactive)
    ));

    engine.remove_user("ana@example.com").await.unwrap();
    let err = engine.find_user("ana@example.com").await.unwrap_err();
    assert!(matches!(err, EngineError::UnknownEmail(_)));
}

#[tokio::test]
async fn deactivated_user_mid_session_flow() {
    // Deactivation only blocks the next sign-in; there is no forced-logout
    // push channel.
    let (engine, _backend) = engine_with_phase();
    let user = engine
        .sign_up(&registration("ana@example.com"))
        .await
        .unwrap();
    engine.set_active("ana@example.com", false).await.unwrap();

    // An already-held user value still reads its board.
    let board = engine.phase_overview(&user, Role::Trainee).await.unwrap();
    assert_eq!(board.len(), 4);
}

#[tokio::test]
async fn training_summary_aggregates_results() {
    let (engine, _backend) = engine_with_phase();
    let user = engine
        .sign_up(&registration("ana@example.com"))
        .await
        .unwrap();

    let key = PhaseKey::new(Role::Trainee, 1);
    let questions = engine.start_quiz(&user, Role::Trainee, 1).await.unwrap();
    let answers: Vec<usize> = questions.iter().map(|q| q.correct_option_index).collect();
    engine
        .complete_quiz(&user, key, &questions, &answers, 50)
        .await
        .unwrap();

    let summary = engine.training_summary().await.unwrap();
    // The seeded master is excluded from aggregates.
    assert_eq!(summary.total_users, 1);
    assert_eq!(summary.quizzes_taken, 1);
    assert_eq!(summary.attempts_per_phase[&key], 1);
    assert!((summary.overall_accuracy - 1.0).abs() < 1e-9);
}
