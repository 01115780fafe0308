//! In-memory backend for tests and the offline demo mode.
//!
//! Nothing persists across processes. State lives behind one mutex; every
//! trait method takes the lock, mutates, and returns, which matches the
//! single-threaded CLI well enough.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crewdrill_core::error::BackendError;
use crewdrill_core::model::{
    KnowledgeArticle, PhaseKey, PhaseResult, Question, RecoveryAnswers, Role, User,
};
use crewdrill_core::traits::{Backend, Registration};

/// Credentials of the seeded bootstrap administrator.
pub const MASTER_EMAIL: &str = "master@example.com";
pub const MASTER_PASSWORD: &str = "master@123";

#[derive(Default)]
struct State {
    users: Vec<User>,
    /// Keyed by lowercase email.
    passwords: HashMap<String, String>,
    questions: Vec<Question>,
    results: Vec<PhaseResult>,
    knowledge: Vec<KnowledgeArticle>,
    global_phases: Vec<PhaseKey>,
    session_user: Option<Uuid>,
}

/// A `Backend` that keeps everything in memory.
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    /// Completely empty store.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// Store with the bootstrap master account, so there is always an
    /// administrator to manage the academy with.
    pub fn seeded() -> Self {
        let backend = Self::new();
        let mut master = User::registered(
            Uuid::new_v4(),
            "Academy Master",
            MASTER_EMAIL,
            RecoveryAnswers {
                mother_name: "ADMIN".into(),
                favorite_color: "BLACK".into(),
            },
        );
        master.role = Role::Master;
        master.unlocked_phases.clear();
        backend.seed_user(master, MASTER_PASSWORD);
        backend
    }

    /// Insert a user with a known password (test/demo setup).
    pub fn seed_user(&self, user: User, password: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .passwords
            .insert(user.email.to_lowercase(), password.to_string());
        state.users.push(user);
    }

    /// Insert questions directly (test/demo setup).
    pub fn seed_questions(&self, questions: Vec<Question>) {
        self.state.lock().unwrap().questions.extend(questions);
    }

    /// Activate phase-keys directly (test/demo setup).
    pub fn seed_global_phases(&self, keys: Vec<PhaseKey>) {
        self.state.lock().unwrap().global_phases.extend(keys);
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, BackendError> {
        let mut state = self.state.lock().unwrap();

        let stored = state.passwords.get(&email.to_lowercase());
        if stored.map(String::as_str) != Some(password) {
            return Err(BackendError::InvalidCredentials);
        }

        let user = state
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
            .ok_or(BackendError::NotFound { entity: "profile" })?;

        if !user.is_active {
            return Err(BackendError::AccountInactive);
        }

        state.session_user = Some(user.id);
        Ok(user)
    }

    async fn register(&self, registration: &Registration) -> Result<User, BackendError> {
        let mut state = self.state.lock().unwrap();

        if state
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&registration.email))
        {
            return Err(BackendError::AlreadyRegistered(registration.email.clone()));
        }

        let user = User::registered(
            Uuid::new_v4(),
            &registration.name,
            &registration.email,
            registration.recovery.clone(),
        );
        state
            .passwords
            .insert(registration.email.to_lowercase(), registration.password.clone());
        state.users.push(user.clone());
        info!(user = %registration.email, "registered (memory backend)");
        Ok(user)
    }

    async fn current_session(&self) -> Result<Option<User>, BackendError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .session_user
            .and_then(|id| state.users.iter().find(|u| u.id == id).cloned()))
    }

    async fn logout(&self) -> Result<(), BackendError> {
        self.state.lock().unwrap().session_user = None;
        Ok(())
    }

    async fn reset_password(&self, email: &str, new_password: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        if !state
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(email))
        {
            return Err(BackendError::NotFound { entity: "profile" });
        }
        state
            .passwords
            .insert(email.to_lowercase(), new_password.to_string());
        Ok(())
    }

    async fn users(&self) -> Result<Vec<User>, BackendError> {
        Ok(self.state.lock().unwrap().users.clone())
    }

    async fn save_user(&self, user: &User) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(BackendError::NotFound { entity: "profile" })?;
        *slot = user.clone();
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        if let Some(user) = state.users.iter().find(|u| u.id == id) {
            let email = user.email.to_lowercase();
            state.passwords.remove(&email);
        }
        state.users.retain(|u| u.id != id);
        if state.session_user == Some(id) {
            state.session_user = None;
        }
        Ok(())
    }

    async fn questions(&self) -> Result<Vec<Question>, BackendError> {
        Ok(self.state.lock().unwrap().questions.clone())
    }

    async fn save_question(&self, question: &Question) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        match state.questions.iter_mut().find(|q| q.id == question.id) {
            Some(slot) => *slot = question.clone(),
            None => state.questions.push(question.clone()),
        }
        Ok(())
    }

    async fn delete_question(&self, id: Uuid) -> Result<(), BackendError> {
        self.state.lock().unwrap().questions.retain(|q| q.id != id);
        Ok(())
    }

    async fn results(&self) -> Result<Vec<PhaseResult>, BackendError> {
        Ok(self.state.lock().unwrap().results.clone())
    }

    async fn save_result(&self, result: &PhaseResult) -> Result<(), BackendError> {
        self.state.lock().unwrap().results.push(result.clone());
        Ok(())
    }

    async fn global_phases(&self) -> Result<Vec<PhaseKey>, BackendError> {
        Ok(self.state.lock().unwrap().global_phases.clone())
    }

    async fn toggle_global_phase(&self, key: PhaseKey) -> Result<Vec<PhaseKey>, BackendError> {
        let mut state = self.state.lock().unwrap();
        if state.global_phases.contains(&key) {
            state.global_phases.retain(|k| *k != key);
        } else {
            state.global_phases.push(key);
        }
        Ok(state.global_phases.clone())
    }

    async fn knowledge(&self) -> Result<Vec<KnowledgeArticle>, BackendError> {
        Ok(self.state.lock().unwrap().knowledge.clone())
    }

    async fn save_knowledge(&self, article: &KnowledgeArticle) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        match state.knowledge.iter_mut().find(|a| a.id == article.id) {
            Some(slot) => *slot = article.clone(),
            None => state.knowledge.push(article.clone()),
        }
        Ok(())
    }

    async fn delete_knowledge(&self, id: Uuid) -> Result<(), BackendError> {
        self.state.lock().unwrap().knowledge.retain(|a| a.id != id);
        Ok(())
    }
}
