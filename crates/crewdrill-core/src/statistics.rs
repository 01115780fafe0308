//! Ranking and aggregate statistics.
//!
//! Pure computations over fetched users/results; rendering lives in
//! `crewdrill-report`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{PhaseKey, PhaseResult, Role, User};

/// One row of the ranking screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub email: String,
    pub score: u64,
    pub total_time_secs: u64,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub completed_phases: usize,
}

impl LeaderboardEntry {
    /// Correct/answered ratio, 0.0 when nothing answered.
    pub fn accuracy(&self) -> f64 {
        if self.questions_answered == 0 {
            0.0
        } else {
            f64::from(self.correct_answers) / f64::from(self.questions_answered)
        }
    }
}

/// Rank one role track: score descending, total time ascending as the
/// tiebreak, truncated to `limit` entries (0 = unlimited).
pub fn leaderboard(users: &[User], role: Role, limit: usize) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = users
        .iter()
        .filter(|u| u.role == role)
        .map(|u| LeaderboardEntry {
            name: u.name.clone(),
            email: u.email.clone(),
            score: u.stats.score,
            total_time_secs: u.stats.total_time_secs,
            questions_answered: u.stats.questions_answered,
            correct_answers: u.stats.correct_answers,
            completed_phases: u.stats.completed_phases.len(),
        })
        .collect();

    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.total_time_secs.cmp(&b.total_time_secs))
    });

    if limit > 0 {
        entries.truncate(limit);
    }
    entries
}

/// Aggregate statistics for the admin stats screen.
///
/// Master accounts are excluded from every aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub total_users: usize,
    pub active_users: usize,
    pub quizzes_taken: usize,
    pub average_score: f64,
    /// Correct/answered across all counted users, 0.0 when nothing answered.
    pub overall_accuracy: f64,
    /// Users per tier, in rank order, Master omitted.
    pub role_distribution: Vec<(Role, usize)>,
    /// Quiz attempts per phase-key.
    pub attempts_per_phase: HashMap<PhaseKey, usize>,
}

/// Compute the admin summary from full user and result listings.
pub fn compute_summary(users: &[User], results: &[PhaseResult]) -> TrainingSummary {
    let counted: Vec<&User> = users.iter().filter(|u| !u.role.is_top_tier()).collect();

    let total_users = counted.len();
    let active_users = counted.iter().filter(|u| u.is_active).count();

    let average_score = if total_users == 0 {
        0.0
    } else {
        counted.iter().map(|u| u.stats.score as f64).sum::<f64>() / total_users as f64
    };

    let answered: u64 = counted
        .iter()
        .map(|u| u64::from(u.stats.questions_answered))
        .sum();
    let correct: u64 = counted
        .iter()
        .map(|u| u64::from(u.stats.correct_answers))
        .sum();
    let overall_accuracy = if answered == 0 {
        0.0
    } else {
        correct as f64 / answered as f64
    };

    let role_distribution = Role::ALL
        .iter()
        .filter(|r| !r.is_top_tier())
        .map(|&role| (role, counted.iter().filter(|u| u.role == role).count()))
        .collect();

    let mut attempts_per_phase: HashMap<PhaseKey, usize> = HashMap::new();
    for result in results {
        *attempts_per_phase.entry(result.phase_key).or_default() += 1;
    }

    TrainingSummary {
        total_users,
        active_users,
        quizzes_taken: results.len(),
        average_score,
        overall_accuracy,
        role_distribution,
        attempts_per_phase,
    }
}
