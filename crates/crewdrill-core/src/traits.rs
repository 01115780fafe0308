//! The backend trait.
//!
//! The hosted object-store/auth service is reached exclusively through this
//! trait, implemented by the `crewdrill-backend` crate. Every operation is
//! an independent round trip; no cross-entity transaction or ordering
//! guarantee exists beyond what the backend itself supplies.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BackendError;
use crate::model::{KnowledgeArticle, PhaseKey, PhaseResult, Question, RecoveryAnswers, User};

/// A signup request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub recovery: RecoveryAnswers,
}

/// Remote persistence and authentication surface.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Human-readable backend name (e.g. "hosted").
    fn name(&self) -> &str;

    // --- auth ---

    /// Sign in. Fails with `InvalidCredentials` or `AccountInactive`.
    async fn login(&self, email: &str, password: &str) -> Result<User, BackendError>;

    /// Create an auth record plus profile row. A profile insert that fails
    /// after the auth record exists is logged by the implementation, not
    /// rolled back.
    async fn register(&self, registration: &Registration) -> Result<User, BackendError>;

    /// The user behind the persisted session, if one is still valid.
    async fn current_session(&self) -> Result<Option<User>, BackendError>;

    async fn logout(&self) -> Result<(), BackendError>;

    /// Overwrite an account's password. Hosted implementations require a
    /// configured service key.
    async fn reset_password(&self, email: &str, new_password: &str) -> Result<(), BackendError>;

    // --- profiles ---

    async fn users(&self) -> Result<Vec<User>, BackendError>;
    async fn save_user(&self, user: &User) -> Result<(), BackendError>;
    async fn delete_user(&self, id: Uuid) -> Result<(), BackendError>;

    // --- questions ---

    async fn questions(&self) -> Result<Vec<Question>, BackendError>;
    /// Insert or update (upsert by id).
    async fn save_question(&self, question: &Question) -> Result<(), BackendError>;
    async fn delete_question(&self, id: Uuid) -> Result<(), BackendError>;

    // --- results (append-only) ---

    async fn results(&self) -> Result<Vec<PhaseResult>, BackendError>;
    async fn save_result(&self, result: &PhaseResult) -> Result<(), BackendError>;

    // --- global phase activation ---

    /// The globally activated phase-keys. Absence of the setting row is not
    /// an error: implementations fail open and return an empty set.
    async fn global_phases(&self) -> Result<Vec<PhaseKey>, BackendError>;

    /// Flip one key's membership in the global set; returns the updated set.
    async fn toggle_global_phase(&self, key: PhaseKey) -> Result<Vec<PhaseKey>, BackendError>;

    // --- knowledge base ---

    async fn knowledge(&self) -> Result<Vec<KnowledgeArticle>, BackendError>;
    async fn save_knowledge(&self, article: &KnowledgeArticle) -> Result<(), BackendError>;
    async fn delete_knowledge(&self, id: Uuid) -> Result<(), BackendError>;
}
