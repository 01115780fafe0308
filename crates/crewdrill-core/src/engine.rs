//! Session and quiz orchestration over a backend.
//!
//! `TrainingEngine` sequences the multi-step flows (sign-in, quiz
//! completion, password recovery, admin mutations) on top of the
//! independent round trips the `Backend` trait exposes. Validation failures
//! are caught here, before anything reaches the network. No retries, no
//! cancellation: an operation either completes or surfaces one error.

use std::sync::Arc;

use futures::future::try_join;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::capability::{can_view, Screen};
use crate::error::BackendError;
use crate::gating::{
    phase_board, phase_status, question_count, questions_for_phase, PhaseRow,
    MIN_QUESTIONS_PER_PHASE,
};
use crate::model::{
    KnowledgeArticle, PhaseKey, PhaseResult, Question, RecoveryAnswers, Role, User,
    PHASES_PER_TRACK,
};
use crate::scoring::{apply_result, compute_result};
use crate::statistics::{compute_summary, leaderboard, LeaderboardEntry, TrainingSummary};
use crate::traits::{Backend, Registration};

/// Failures surfaced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A field check failed; nothing was submitted.
    #[error("{0}")]
    Validation(String),

    /// The phase is not globally active for this user.
    #[error("phase {key} is locked")]
    PhaseLocked { key: PhaseKey },

    /// The phase is unlocked but does not hold enough questions to play.
    #[error("phase {key} has {have} questions, {min} required")]
    NotEnoughQuestions {
        key: PhaseKey,
        have: usize,
        min: usize,
    },

    /// The role cannot play this track.
    #[error("{role} accounts cannot play the {level} track")]
    TrackForbidden { role: Role, level: Role },

    #[error("no account found for {0}")]
    UnknownEmail(String),

    /// The recovery challenge answers did not match.
    #[error("recovery answers do not match our records")]
    RecoveryMismatch,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl EngineError {
    /// Whether the failure should be rendered verbatim to the user. Backend
    /// errors other than auth failures collapse into a generic message.
    pub fn user_facing(&self) -> bool {
        match self {
            EngineError::Backend(e) => e.is_auth_failure(),
            _ => true,
        }
    }
}

/// Check a registration before submission.
pub fn validate_registration(registration: &Registration) -> Result<(), EngineError> {
    require(!registration.name.trim().is_empty(), "name is required")?;
    validate_email(&registration.email)?;
    validate_password(&registration.password)?;
    require(
        !registration.recovery.mother_name.trim().is_empty()
            && !registration.recovery.favorite_color.trim().is_empty(),
        "both recovery answers are required",
    )
}

/// Minimal email shape check; the backend does the real validation.
pub fn validate_email(email: &str) -> Result<(), EngineError> {
    let ok = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    require(ok, "a valid email address is required")
}

pub fn validate_password(password: &str) -> Result<(), EngineError> {
    require(password.len() >= 6, "password must be at least 6 characters")
}

fn require(condition: bool, message: &str) -> Result<(), EngineError> {
    if condition {
        Ok(())
    } else {
        Err(EngineError::Validation(message.to_string()))
    }
}

/// Orchestrates training flows over a shared backend handle.
pub struct TrainingEngine {
    backend: Arc<dyn Backend>,
}

impl TrainingEngine {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Direct access for simple pass-through reads.
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    // --- auth flows ---

    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, EngineError> {
        validate_email(email)?;
        require(!password.is_empty(), "password is required")?;

        let user = self.backend.login(email, password).await?;
        info!(user = %user.email, role = %user.role, "signed in");
        Ok(user)
    }

    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn sign_up(&self, registration: &Registration) -> Result<User, EngineError> {
        validate_registration(registration)?;
        let user = self.backend.register(registration).await?;
        info!(user = %user.email, "registered");
        Ok(user)
    }

    pub async fn restore_session(&self) -> Result<Option<User>, EngineError> {
        Ok(self.backend.current_session().await?)
    }

    pub async fn sign_out(&self) -> Result<(), EngineError> {
        self.backend.logout().await?;
        Ok(())
    }

    /// Password recovery: find the account, verify both challenge answers,
    /// then overwrite the password.
    #[instrument(skip(self, attempt, new_password))]
    pub async fn recover_access(
        &self,
        email: &str,
        attempt: &RecoveryAnswers,
        new_password: &str,
    ) -> Result<(), EngineError> {
        validate_password(new_password)?;

        let user = self.find_user(email).await?;
        if !user.recovery.matches(attempt) {
            warn!(user = %email, "recovery challenge failed");
            return Err(EngineError::RecoveryMismatch);
        }

        self.backend.reset_password(&user.email, new_password).await?;
        info!(user = %email, "password reset via recovery challenge");
        Ok(())
    }

    // --- quiz flows ---

    /// The phase board for one track: questions and global activations are
    /// independent round trips, fetched concurrently.
    pub async fn phase_overview(
        &self,
        user: &User,
        level: Role,
    ) -> Result<Vec<PhaseRow>, EngineError> {
        self.check_track_access(user, level)?;
        let (questions, global_keys) =
            try_join(self.backend.questions(), self.backend.global_phases()).await?;
        Ok(phase_board(user, &global_keys, &questions, level))
    }

    /// Re-check availability and hand back the phase's question list.
    #[instrument(skip(self, user), fields(user = %user.email))]
    pub async fn start_quiz(
        &self,
        user: &User,
        level: Role,
        phase: u8,
    ) -> Result<Vec<Question>, EngineError> {
        self.check_track_access(user, level)?;
        require(
            (1..=PHASES_PER_TRACK).contains(&phase),
            "phase number out of range",
        )?;

        let (questions, global_keys) =
            try_join(self.backend.questions(), self.backend.global_phases()).await?;

        let key = PhaseKey::new(level, phase);
        let status = phase_status(user, &global_keys, &questions, level, phase);
        if !status.unlocked {
            return Err(EngineError::PhaseLocked { key });
        }
        if !status.available {
            return Err(EngineError::NotEnoughQuestions {
                key,
                have: question_count(&questions, level, phase),
                min: MIN_QUESTIONS_PER_PHASE,
            });
        }

        Ok(questions_for_phase(&questions, level, phase))
    }

    /// Score a finished attempt and persist it: the updated profile first,
    /// then the immutable result record.
    #[instrument(skip_all, fields(user = %user.email, key = %key))]
    pub async fn complete_quiz(
        &self,
        user: &User,
        key: PhaseKey,
        questions: &[Question],
        answers: &[usize],
        elapsed_secs: u64,
    ) -> Result<(User, PhaseResult), EngineError> {
        let result = compute_result(user.id, key, answers, questions, elapsed_secs);

        let mut updated = user.clone();
        apply_result(&mut updated, &result);

        self.backend.save_user(&updated).await?;
        self.backend.save_result(&result).await?;

        info!(
            score = result.score,
            correct = result.correct_count,
            total = result.total_count,
            "quiz completed"
        );
        Ok((updated, result))
    }

    fn check_track_access(&self, user: &User, level: Role) -> Result<(), EngineError> {
        require(level.is_track(), "not a quiz-carrying track")?;
        let allowed = Screen::board_for(level)
            .is_some_and(|board| can_view(user.role, board));
        if allowed {
            Ok(())
        } else {
            Err(EngineError::TrackForbidden {
                role: user.role,
                level,
            })
        }
    }

    // --- rankings & stats ---

    pub async fn leaderboard(
        &self,
        role: Role,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, EngineError> {
        let users = self.backend.users().await?;
        Ok(leaderboard(&users, role, limit))
    }

    pub async fn training_summary(&self) -> Result<TrainingSummary, EngineError> {
        let (users, results) = try_join(self.backend.users(), self.backend.results()).await?;
        Ok(compute_summary(&users, &results))
    }

    // --- admin operations ---

    pub async fn find_user(&self, email: &str) -> Result<User, EngineError> {
        let users = self.backend.users().await?;
        users
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .ok_or_else(|| EngineError::UnknownEmail(email.to_string()))
    }

    pub async fn set_role(&self, email: &str, role: Role) -> Result<User, EngineError> {
        self.mutate_user(email, |user| user.role = role).await
    }

    pub async fn set_active(&self, email: &str, active: bool) -> Result<User, EngineError> {
        self.mutate_user(email, |user| user.is_active = active).await
    }

    pub async fn unlock_phase(&self, email: &str, key: PhaseKey) -> Result<User, EngineError> {
        self.mutate_user(email, |user| {
            if !user.unlocked_phases.contains(&key) {
                user.unlocked_phases.push(key);
            }
        })
        .await
    }

    pub async fn revoke_phase(&self, email: &str, key: PhaseKey) -> Result<User, EngineError> {
        self.mutate_user(email, |user| user.unlocked_phases.retain(|k| *k != key))
            .await
    }

    pub async fn remove_user(&self, email: &str) -> Result<Uuid, EngineError> {
        let user = self.find_user(email).await?;
        self.backend.delete_user(user.id).await?;
        info!(user = %email, "account deleted");
        Ok(user.id)
    }

    async fn mutate_user(
        &self,
        email: &str,
        mutate: impl FnOnce(&mut User),
    ) -> Result<User, EngineError> {
        let mut user = self.find_user(email).await?;
        mutate(&mut user);
        self.backend.save_user(&user).await?;
        Ok(user)
    }

    /// Flip a phase-key in the global activation set.
    pub async fn toggle_global_phase(&self, key: PhaseKey) -> Result<Vec<PhaseKey>, EngineError> {
        require(key.role.is_track(), "only track phases can be activated")?;
        require(
            (1..=PHASES_PER_TRACK).contains(&key.phase),
            "phase number out of range",
        )?;
        Ok(self.backend.toggle_global_phase(key).await?)
    }

    /// Persist a batch of imported questions, one upsert per question.
    pub async fn import_questions(&self, questions: &[Question]) -> Result<usize, EngineError> {
        for question in questions {
            self.backend.save_question(question).await?;
        }
        info!(count = questions.len(), "question bank imported");
        Ok(questions.len())
    }

    pub async fn add_article(
        &self,
        title: &str,
        content: &str,
        role: Role,
    ) -> Result<KnowledgeArticle, EngineError> {
        require(!title.trim().is_empty(), "title is required")?;
        require(!content.trim().is_empty(), "content is required")?;
        require(role.is_track(), "articles target a quiz track")?;

        let article = KnowledgeArticle {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            role,
        };
        self.backend.save_knowledge(&article).await?;
        Ok(article)
    }
}
