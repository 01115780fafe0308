//! Phase visibility and unlock rules.
//!
//! A phase is playable when it is globally activated (or the user holds the
//! top tier) and enough questions exist to fill a quiz.

use crate::model::{PhaseKey, Question, Role, User, PHASES_PER_TRACK};

/// Minimum question count for a (track, phase) pair to be playable.
pub const MIN_QUESTIONS_PER_PHASE: usize = 15;

/// Visibility state of one phase for one user. No mutation anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseStatus {
    /// Globally activated, or the user holds the top tier.
    pub unlocked: bool,
    /// Present in the user's completed list.
    pub completed: bool,
    /// Unlocked AND enough questions exist to start.
    pub available: bool,
}

/// Count questions belonging to a (track, phase) pair.
pub fn question_count(questions: &[Question], level: Role, phase: u8) -> usize {
    questions
        .iter()
        .filter(|q| q.level == level && q.phase == phase)
        .count()
}

/// The questions making up one phase's quiz.
pub fn questions_for_phase(questions: &[Question], level: Role, phase: u8) -> Vec<Question> {
    questions
        .iter()
        .filter(|q| q.level == level && q.phase == phase)
        .cloned()
        .collect()
}

/// Compute the status of one phase for one user.
pub fn phase_status(
    user: &User,
    global_keys: &[PhaseKey],
    questions: &[Question],
    level: Role,
    phase: u8,
) -> PhaseStatus {
    let key = PhaseKey::new(level, phase);
    let unlocked = user.role.is_top_tier() || global_keys.contains(&key);
    let has_questions = question_count(questions, level, phase) >= MIN_QUESTIONS_PER_PHASE;

    PhaseStatus {
        unlocked,
        completed: user.stats.completed_phases.contains(&key),
        available: unlocked && has_questions,
    }
}

/// One row of a track dashboard.
#[derive(Debug, Clone, Copy)]
pub struct PhaseRow {
    pub phase: u8,
    pub question_count: usize,
    pub status: PhaseStatus,
}

/// Status of every phase of a track, in phase order.
pub fn phase_board(
    user: &User,
    global_keys: &[PhaseKey],
    questions: &[Question],
    level: Role,
) -> Vec<PhaseRow> {
    (1..=PHASES_PER_TRACK)
        .map(|phase| PhaseRow {
            phase,
            question_count: question_count(questions, level, phase),
            status: phase_status(user, global_keys, questions, level, phase),
        })
        .collect()
}
