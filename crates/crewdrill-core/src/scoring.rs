//! Quiz scoring rules.
//!
//! Pure functions: result computation from a finished attempt, and the stat
//! accumulation applied to a user when an attempt is recorded.

use uuid::Uuid;

use crate::model::{PhaseKey, PhaseResult, Question, User};

/// Points awarded per correct answer.
pub const POINTS_PER_CORRECT: u32 = 100;

/// One penalty point is deducted per this many elapsed seconds.
pub const TIME_PENALTY_DIVISOR: u64 = 5;

/// Compute the result of one quiz attempt.
///
/// `answers` are positional option indexes; an answer is correct when it
/// equals the question's `correct_option_index`. Answers beyond the question
/// list are ignored, unanswered questions count as wrong.
///
/// Score is `correct * 100 - floor(elapsed_secs / 5)`, floored at 0.
pub fn compute_result(
    user_id: Uuid,
    phase_key: PhaseKey,
    answers: &[usize],
    questions: &[Question],
    elapsed_secs: u64,
) -> PhaseResult {
    let correct_count = answers
        .iter()
        .zip(questions)
        .filter(|(answer, question)| **answer == question.correct_option_index)
        .count() as u32;

    let raw = i64::from(correct_count) * i64::from(POINTS_PER_CORRECT)
        - (elapsed_secs / TIME_PENALTY_DIVISOR) as i64;

    PhaseResult {
        user_id,
        phase_key,
        score: raw.max(0) as u32,
        time_taken_secs: elapsed_secs,
        correct_count,
        total_count: questions.len() as u32,
    }
}

/// Fold a quiz result into a user's cumulative stats.
///
/// The phase-key is appended to the completed list only if absent, so
/// repeat completion never duplicates it. The numeric stats, however,
/// accumulate on every call, so re-completing a phase re-earns score. That
/// asymmetry matches the shipped behavior and is relied on by the ranking
/// screen; see DESIGN.md before changing it.
pub fn apply_result(user: &mut User, result: &PhaseResult) {
    user.stats.score += u64::from(result.score);
    user.stats.correct_answers += result.correct_count;
    user.stats.questions_answered += result.total_count;
    user.stats.total_time_secs += result.time_taken_secs;

    if !user.stats.completed_phases.contains(&result.phase_key) {
        user.stats.completed_phases.push(result.phase_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, RecoveryAnswers, Role};

    fn question(correct: usize) -> Question {
        Question {
            id: Uuid::new_v4(),
            knowledge_id: None,
            text: "q".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_option_index: correct,
            difficulty: Difficulty::Easy,
            level: Role::Trainee,
            phase: 1,
        }
    }

    fn key() -> PhaseKey {
        PhaseKey::new(Role::Trainee, 1)
    }

    #[test]
    fn eight_of_ten_in_fifty_seconds_scores_790() {
        let questions: Vec<Question> = (0..10).map(|_| question(2)).collect();
        let mut answers = vec![2usize; 8];
        answers.extend([0, 0]);

        let result = compute_result(Uuid::new_v4(), key(), &answers, &questions, 50);
        assert_eq!(result.correct_count, 8);
        assert_eq!(result.total_count, 10);
        assert_eq!(result.score, 790);
    }

    #[test]
    fn score_never_negative() {
        let questions = vec![question(1)];
        let result = compute_result(Uuid::new_v4(), key(), &[0], &questions, 3600);
        assert_eq!(result.correct_count, 0);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn score_monotone_in_correct_count_and_elapsed() {
        let questions: Vec<Question> = (0..10).map(|_| question(0)).collect();
        let user = Uuid::new_v4();

        let mut prev = 0;
        for correct in 0..=10usize {
            let mut answers = vec![0usize; correct];
            answers.resize(10, 1);
            let score = compute_result(user, key(), &answers, &questions, 30).score;
            assert!(score >= prev, "score dropped as correct count rose");
            prev = score;
        }

        let answers = vec![0usize; 10];
        let fast = compute_result(user, key(), &answers, &questions, 10).score;
        let slow = compute_result(user, key(), &answers, &questions, 500).score;
        assert!(slow <= fast);
    }

    #[test]
    fn short_answer_list_counts_rest_as_wrong() {
        let questions: Vec<Question> = (0..4).map(|_| question(3)).collect();
        let result = compute_result(Uuid::new_v4(), key(), &[3, 3], &questions, 0);
        assert_eq!(result.correct_count, 2);
        assert_eq!(result.total_count, 4);
    }

    #[test]
    fn apply_result_accumulates_but_never_duplicates_completion() {
        let mut user = User::registered(
            Uuid::new_v4(),
            "T",
            "t@example.com",
            RecoveryAnswers::default(),
        );
        let result = PhaseResult {
            user_id: user.id,
            phase_key: key(),
            score: 300,
            time_taken_secs: 40,
            correct_count: 3,
            total_count: 5,
        };

        apply_result(&mut user, &result);
        apply_result(&mut user, &result);

        assert_eq!(user.stats.score, 600);
        assert_eq!(user.stats.correct_answers, 6);
        assert_eq!(user.stats.questions_answered, 10);
        assert_eq!(user.stats.total_time_secs, 80);
        assert_eq!(user.stats.completed_phases, vec![key()]);
    }
}
