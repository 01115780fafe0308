//! Core data model types for crewdrill.
//!
//! These are the fundamental types the entire crewdrill system uses to
//! represent accounts, questions, and quiz attempts.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of quiz phases in every role track.
pub const PHASES_PER_TRACK: u8 = 4;

/// Number of answer options every question carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// The five ranked permission tiers, lowest to highest.
///
/// `Trainee`, `Trainer`, and `Coordinator` are *tracks*: they carry quiz
/// phases a user can play. `Admin` and `Master` are administrative tiers;
/// `Master` is the top tier and bypasses phase unlocking entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Trainee,
    Trainer,
    Coordinator,
    Admin,
    Master,
}

impl Role {
    /// All tiers, in rank order.
    pub const ALL: [Role; 5] = [
        Role::Trainee,
        Role::Trainer,
        Role::Coordinator,
        Role::Admin,
        Role::Master,
    ];

    /// The tracks that carry quiz phases.
    pub const TRACKS: [Role; 3] = [Role::Trainee, Role::Trainer, Role::Coordinator];

    /// Numeric rank, 0 = lowest tier.
    pub fn rank(self) -> u8 {
        match self {
            Role::Trainee => 0,
            Role::Trainer => 1,
            Role::Coordinator => 2,
            Role::Admin => 3,
            Role::Master => 4,
        }
    }

    /// Whether this is the top tier.
    pub fn is_top_tier(self) -> bool {
        self == Role::Master
    }

    /// Whether this tier administers the academy (user/question/phase
    /// management, aggregate stats).
    pub fn is_administrative(self) -> bool {
        matches!(self, Role::Admin | Role::Master)
    }

    /// Whether this tier is a quiz-carrying track.
    pub fn is_track(self) -> bool {
        matches!(self, Role::Trainee | Role::Trainer | Role::Coordinator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Trainee => write!(f, "TRAINEE"),
            Role::Trainer => write!(f, "TRAINER"),
            Role::Coordinator => write!(f, "COORDINATOR"),
            Role::Admin => write!(f, "ADMIN"),
            Role::Master => write!(f, "MASTER"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TRAINEE" => Ok(Role::Trainee),
            "TRAINER" => Ok(Role::Trainer),
            "COORDINATOR" => Ok(Role::Coordinator),
            "ADMIN" => Ok(Role::Admin),
            "MASTER" => Ok(Role::Master),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Composite identifier for one phase of one track: `"TRAINEE-1"`.
///
/// Serializes as its string form; the backend stores arrays of these strings
/// for unlock and completion tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhaseKey {
    pub role: Role,
    pub phase: u8,
}

impl PhaseKey {
    pub fn new(role: Role, phase: u8) -> Self {
        Self { role, phase }
    }
}

impl fmt::Display for PhaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.role, self.phase)
    }
}

impl FromStr for PhaseKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (role, phase) = s
            .rsplit_once('-')
            .ok_or_else(|| format!("malformed phase key: {s}"))?;
        let role = role.parse::<Role>()?;
        let phase = phase
            .parse::<u8>()
            .map_err(|_| format!("malformed phase number in key: {s}"))?;
        Ok(PhaseKey { role, phase })
    }
}

impl Serialize for PhaseKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PhaseKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The two challenge answers used for password recovery.
///
/// Stored as entered; comparison is case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryAnswers {
    pub mother_name: String,
    pub favorite_color: String,
}

impl RecoveryAnswers {
    /// Case-insensitive comparison against a challenge attempt.
    pub fn matches(&self, attempt: &RecoveryAnswers) -> bool {
        self.mother_name.trim().eq_ignore_ascii_case(attempt.mother_name.trim())
            && self
                .favorite_color
                .trim()
                .eq_ignore_ascii_case(attempt.favorite_color.trim())
    }
}

/// Cumulative training statistics for one user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    /// Total score accumulated across all quiz attempts.
    #[serde(default)]
    pub score: u64,
    /// Total time spent in quizzes, in seconds.
    #[serde(default)]
    pub total_time_secs: u64,
    /// Questions answered across all attempts.
    #[serde(default)]
    pub questions_answered: u32,
    /// Correct answers across all attempts.
    #[serde(default)]
    pub correct_answers: u32,
    /// Phase-keys this user has completed at least once.
    #[serde(default)]
    pub completed_phases: Vec<PhaseKey>,
}

/// A registered academy account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Backend auth identifier.
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Password-recovery challenge answers.
    #[serde(default)]
    pub recovery: RecoveryAnswers,
    /// Deactivated accounts cannot sign in.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Phase-keys explicitly unlocked for this user by administrators.
    #[serde(default)]
    pub unlocked_phases: Vec<PhaseKey>,
    #[serde(default)]
    pub stats: UserStats,
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl User {
    /// A freshly registered account: lowest tier, first trainee phase
    /// pre-unlocked, zeroed stats.
    pub fn registered(id: Uuid, name: &str, email: &str, recovery: RecoveryAnswers) -> Self {
        Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role: Role::Trainee,
            recovery,
            is_active: true,
            unlocked_phases: vec![PhaseKey::new(Role::Trainee, 1)],
            stats: UserStats::default(),
            created_at: Utc::now(),
        }
    }
}

/// Question difficulty tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A single multiple-choice question.
///
/// Belongs to exactly one (track, phase) pair and carries exactly four
/// options; `correct_option_index` is positional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    /// Knowledge article this question drills, if any.
    #[serde(default)]
    pub knowledge_id: Option<Uuid>,
    pub text: String,
    pub options: Vec<String>,
    pub correct_option_index: usize,
    pub difficulty: Difficulty,
    /// The role track this question belongs to.
    pub level: Role,
    /// Phase number within the track, 1-based.
    pub phase: u8,
}

impl Question {
    /// The phase-key this question counts toward.
    pub fn phase_key(&self) -> PhaseKey {
        PhaseKey::new(self.level, self.phase)
    }
}

/// An immutable record of one quiz attempt. Append-only; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseResult {
    pub user_id: Uuid,
    pub phase_key: PhaseKey,
    pub score: u32,
    pub time_taken_secs: u64,
    pub correct_count: u32,
    pub total_count: u32,
}

/// A study article administrators maintain; questions may reference one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeArticle {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// The role track this article targets.
    pub role: Role,
}
