//! Hosted backend client.
//!
//! Talks to the hosted object-store/auth service: GoTrue-style auth under
//! `/auth/v1`, PostgREST-style tables under `/rest/v1`. Each trait method is
//! one independent round trip; failures map onto `BackendError` by status
//! code so callers never string-match.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument, warn};
use uuid::Uuid;

use crewdrill_core::error::BackendError;
use crewdrill_core::model::{
    KnowledgeArticle, PhaseKey, PhaseResult, Question, RecoveryAnswers, Role, User, UserStats,
};
use crewdrill_core::traits::{Backend, Registration};

use crate::session::{SessionStore, StoredSession};

const GLOBAL_PHASES_KEY: &str = "global_phases";

/// Client for the hosted backend.
pub struct HostedBackend {
    base_url: String,
    anon_key: String,
    service_key: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
    store: SessionStore,
}

impl HostedBackend {
    pub fn new(
        base_url: &str,
        anon_key: &str,
        service_key: Option<String>,
        timeout_secs: u64,
        store: SessionStore,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            service_key,
            timeout_secs,
            client,
            store,
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    /// The bearer token for table requests: the signed-in user's token when
    /// one exists, the anon key otherwise.
    fn bearer(&self) -> String {
        self.store
            .current()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn send_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout(self.timeout_secs)
        } else {
            BackendError::Network(e.to_string())
        }
    }

    /// Map a non-success table/auth response into a `BackendError`.
    async fn fail_status(response: reqwest::Response) -> BackendError {
        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return BackendError::RateLimited {
                retry_after_ms: retry_after,
            };
        }
        let message = response.text().await.unwrap_or_default();
        BackendError::ApiError { status, message }
    }

    async fn fetch_profile(&self, id: Uuid) -> Result<Option<User>, BackendError> {
        let response = self
            .client
            .get(self.rest_url("profiles"))
            .query(&[("id", format!("eq.{id}")), ("select", "*".into())])
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::fail_status(response).await);
        }

        let rows: Vec<ProfileRow> = response
            .json()
            .await
            .map_err(|e| BackendError::Network(format!("failed to parse profiles: {e}")))?;
        Ok(rows.into_iter().next().map(ProfileRow::into_user))
    }

    async fn table_get<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
    ) -> Result<Vec<T>, BackendError> {
        let response = self
            .client
            .get(self.rest_url(table))
            .query(&[("select", "*")])
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::fail_status(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| BackendError::Network(format!("failed to parse {table}: {e}")))
    }

    /// POST a row; `upsert` adds the merge-duplicates preference.
    async fn table_insert<T: Serialize>(
        &self,
        table: &str,
        row: &T,
        upsert: bool,
    ) -> Result<(), BackendError> {
        let prefer = if upsert {
            "resolution=merge-duplicates,return=minimal"
        } else {
            "return=minimal"
        };
        let response = self
            .client
            .post(self.rest_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .header("prefer", prefer)
            .json(row)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        if !response.status().is_success() {
            return Err(Self::fail_status(response).await);
        }
        Ok(())
    }

    async fn table_delete(&self, table: &str, id: Uuid) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.rest_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        if !response.status().is_success() {
            return Err(Self::fail_status(response).await);
        }
        Ok(())
    }
}

// --- wire rows -------------------------------------------------------------

/// Profile row as the backend stores it.
#[derive(Serialize, Deserialize)]
struct ProfileRow {
    id: Uuid,
    name: String,
    email: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    recovery_data: Option<RecoveryAnswers>,
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(default)]
    unlocked_phases: Option<Vec<String>>,
    #[serde(default)]
    stats: Option<UserStats>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl ProfileRow {
    /// Lenient row→model mapping: missing columns fall back to defaults,
    /// malformed phase keys are dropped with a warning.
    fn into_user(self) -> User {
        let role = match self.role.as_deref() {
            Some(r) => r.parse().unwrap_or_else(|e| {
                warn!(profile = %self.id, "unreadable role ({e}), defaulting to TRAINEE");
                Role::Trainee
            }),
            None => Role::Trainee,
        };
        let unlocked_phases = self
            .unlocked_phases
            .unwrap_or_default()
            .into_iter()
            .filter_map(|s| match s.parse::<PhaseKey>() {
                Ok(key) => Some(key),
                Err(e) => {
                    warn!(profile = %self.id, "dropping malformed phase key: {e}");
                    None
                }
            })
            .collect();

        User {
            id: self.id,
            name: self.name,
            email: self.email,
            role,
            recovery: self.recovery_data.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
            unlocked_phases,
            stats: self.stats.unwrap_or_default(),
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }

    fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: Some(user.role.to_string()),
            recovery_data: Some(user.recovery.clone()),
            is_active: Some(user.is_active),
            unlocked_phases: Some(
                user.unlocked_phases.iter().map(|k| k.to_string()).collect(),
            ),
            stats: Some(user.stats.clone()),
            created_at: Some(user.created_at),
        }
    }
}

/// The mutable subset of a profile row; email and created_at never change
/// through the client.
#[derive(Serialize)]
struct ProfileUpdate {
    name: String,
    role: String,
    recovery_data: RecoveryAnswers,
    is_active: bool,
    unlocked_phases: Vec<String>,
    stats: UserStats,
}

#[derive(Deserialize)]
struct AuthUser {
    id: Uuid,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Deserialize)]
struct SignupResponse {
    user: AuthUser,
}

#[derive(Serialize, Deserialize)]
struct SettingsRow {
    key: String,
    value: Vec<String>,
}

// ---------------------------------------------------------------------------

#[async_trait]
impl Backend for HostedBackend {
    fn name(&self) -> &str {
        "hosted"
    }

    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Result<User, BackendError> {
        let response = self
            .client
            .post(format!(
                "{}?grant_type=password",
                self.auth_url("token")
            ))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let status = response.status().as_u16();
        if status == 400 || status == 401 {
            return Err(BackendError::InvalidCredentials);
        }
        if !response.status().is_success() {
            return Err(Self::fail_status(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Network(format!("failed to parse token response: {e}")))?;

        // Keep the token out of the store until the account checks out.
        let session = StoredSession {
            access_token: token.access_token,
            user_id: token.user.id,
        };

        let user = self
            .fetch_profile(token.user.id)
            .await?
            .ok_or(BackendError::NotFound { entity: "profile" })?;

        if !user.is_active {
            return Err(BackendError::AccountInactive);
        }

        self.store.save(session);
        Ok(user)
    }

    #[instrument(skip(self, registration), fields(email = %registration.email))]
    async fn register(&self, registration: &Registration) -> Result<User, BackendError> {
        let response = self
            .client
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": registration.email,
                "password": registration.password,
                "data": { "full_name": registration.name },
            }))
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let status = response.status().as_u16();
        if status == 422 || status == 409 {
            return Err(BackendError::AlreadyRegistered(registration.email.clone()));
        }
        if !response.status().is_success() {
            return Err(Self::fail_status(response).await);
        }

        let signup: SignupResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Network(format!("failed to parse signup response: {e}")))?;

        let user = User::registered(
            signup.user.id,
            &registration.name,
            &registration.email,
            registration.recovery.clone(),
        );

        // The auth record exists at this point. A failed profile insert is
        // logged, not rolled back; the account can be repaired by an admin.
        if let Err(e) = self
            .table_insert("profiles", &ProfileRow::from_user(&user), false)
            .await
        {
            error!(user = %registration.email, "profile insert failed after signup: {e}");
        }

        Ok(user)
    }

    async fn current_session(&self) -> Result<Option<User>, BackendError> {
        let Some(session) = self.store.current() else {
            return Ok(None);
        };

        let response = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        if response.status().as_u16() == 401 {
            // Token expired; drop it and report no session.
            self.store.clear();
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::fail_status(response).await);
        }

        let auth_user: AuthUser = response
            .json()
            .await
            .map_err(|e| BackendError::Network(format!("failed to parse user response: {e}")))?;

        self.fetch_profile(auth_user.id).await
    }

    async fn logout(&self) -> Result<(), BackendError> {
        if let Some(session) = self.store.current() {
            let result = self
                .client
                .post(self.auth_url("logout"))
                .header("apikey", &self.anon_key)
                .bearer_auth(&session.access_token)
                .send()
                .await;
            if let Err(e) = result {
                warn!("server-side logout failed: {e}");
            }
        }
        self.store.clear();
        Ok(())
    }

    #[instrument(skip(self, new_password))]
    async fn reset_password(&self, email: &str, new_password: &str) -> Result<(), BackendError> {
        let Some(service_key) = &self.service_key else {
            return Err(BackendError::ServiceKeyRequired);
        };

        let response = self
            .client
            .get(self.rest_url("profiles"))
            .query(&[("email", format!("eq.{email}")), ("select", "id".into())])
            .header("apikey", &self.anon_key)
            .bearer_auth(service_key)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        if !response.status().is_success() {
            return Err(Self::fail_status(response).await);
        }
        let rows: Vec<AuthUser> = response
            .json()
            .await
            .map_err(|e| BackendError::Network(format!("failed to parse profiles: {e}")))?;
        let id = rows
            .first()
            .map(|r| r.id)
            .ok_or(BackendError::NotFound { entity: "profile" })?;

        let response = self
            .client
            .put(self.auth_url(&format!("admin/users/{id}")))
            .header("apikey", &self.anon_key)
            .bearer_auth(service_key)
            .json(&serde_json::json!({ "password": new_password }))
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        if !response.status().is_success() {
            return Err(Self::fail_status(response).await);
        }
        Ok(())
    }

    async fn users(&self) -> Result<Vec<User>, BackendError> {
        let rows: Vec<ProfileRow> = self.table_get("profiles").await?;
        Ok(rows.into_iter().map(ProfileRow::into_user).collect())
    }

    async fn save_user(&self, user: &User) -> Result<(), BackendError> {
        let update = ProfileUpdate {
            name: user.name.clone(),
            role: user.role.to_string(),
            recovery_data: user.recovery.clone(),
            is_active: user.is_active,
            unlocked_phases: user.unlocked_phases.iter().map(|k| k.to_string()).collect(),
            stats: user.stats.clone(),
        };
        let response = self
            .client
            .patch(self.rest_url("profiles"))
            .query(&[("id", format!("eq.{}", user.id))])
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .header("prefer", "return=minimal")
            .json(&update)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        if !response.status().is_success() {
            return Err(Self::fail_status(response).await);
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), BackendError> {
        self.table_delete("profiles", id).await
    }

    async fn questions(&self) -> Result<Vec<Question>, BackendError> {
        self.table_get("questions").await
    }

    async fn save_question(&self, question: &Question) -> Result<(), BackendError> {
        self.table_insert("questions", question, true).await
    }

    async fn delete_question(&self, id: Uuid) -> Result<(), BackendError> {
        self.table_delete("questions", id).await
    }

    async fn results(&self) -> Result<Vec<PhaseResult>, BackendError> {
        self.table_get("results").await
    }

    async fn save_result(&self, result: &PhaseResult) -> Result<(), BackendError> {
        self.table_insert("results", result, false).await
    }

    async fn global_phases(&self) -> Result<Vec<PhaseKey>, BackendError> {
        // Fail open: a missing row or an errored read means no phases are
        // globally active, which only hides content, never exposes it.
        let result: Result<Vec<SettingsRow>, BackendError> = async {
            let response = self
                .client
                .get(self.rest_url("app_settings"))
                .query(&[
                    ("key", format!("eq.{GLOBAL_PHASES_KEY}")),
                    ("select", "*".into()),
                ])
                .header("apikey", &self.anon_key)
                .bearer_auth(self.bearer())
                .send()
                .await
                .map_err(|e| self.send_error(e))?;
            if !response.status().is_success() {
                return Err(Self::fail_status(response).await);
            }
            response
                .json()
                .await
                .map_err(|e| BackendError::Network(format!("failed to parse app_settings: {e}")))
        }
        .await;

        match result {
            Ok(rows) => Ok(rows
                .into_iter()
                .next()
                .map(|row| {
                    row.value
                        .into_iter()
                        .filter_map(|s| s.parse::<PhaseKey>().ok())
                        .collect()
                })
                .unwrap_or_default()),
            Err(e) => {
                warn!("global phase read failed, treating as none active: {e}");
                Ok(Vec::new())
            }
        }
    }

    async fn toggle_global_phase(&self, key: PhaseKey) -> Result<Vec<PhaseKey>, BackendError> {
        let current = self.global_phases().await?;
        let updated: Vec<PhaseKey> = if current.contains(&key) {
            current.into_iter().filter(|k| *k != key).collect()
        } else {
            let mut updated = current;
            updated.push(key);
            updated
        };

        let row = SettingsRow {
            key: GLOBAL_PHASES_KEY.to_string(),
            value: updated.iter().map(|k| k.to_string()).collect(),
        };
        self.table_insert("app_settings", &row, true).await?;
        Ok(updated)
    }

    async fn knowledge(&self) -> Result<Vec<KnowledgeArticle>, BackendError> {
        self.table_get("knowledge").await
    }

    async fn save_knowledge(&self, article: &KnowledgeArticle) -> Result<(), BackendError> {
        self.table_insert("knowledge", article, true).await
    }

    async fn delete_knowledge(&self, id: Uuid) -> Result<(), BackendError> {
        self.table_delete("knowledge", id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer, dir: &tempfile::TempDir) -> HostedBackend {
        let store = SessionStore::new(dir.path().join("session.json"));
        HostedBackend::new(&server.uri(), "anon-key", None, 5, store)
    }

    fn profile_json(id: Uuid, active: bool) -> serde_json::Value {
        serde_json::json!([{
            "id": id,
            "name": "Ana",
            "email": "ana@example.com",
            "role": "TRAINEE",
            "recovery_data": { "mother_name": "Maria", "favorite_color": "red" },
            "is_active": active,
            "unlocked_phases": ["TRAINEE-1"],
            "stats": {
                "score": 250,
                "total_time_secs": 120,
                "questions_answered": 15,
                "correct_answers": 11,
                "completed_phases": ["TRAINEE-1"]
            },
            "created_at": "2026-02-01T10:00:00Z"
        }])
    }

    #[tokio::test]
    async fn successful_login_maps_profile_and_persists_session() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(header("apikey", "anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "jwt-token",
                "user": { "id": id }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("id", format!("eq.{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json(id, true)))
            .mount(&server)
            .await;

        let backend = backend(&server, &dir);
        let user = backend.login("ana@example.com", "secret1").await.unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Trainee);
        assert_eq!(user.stats.score, 250);
        assert_eq!(user.unlocked_phases, vec![PhaseKey::new(Role::Trainee, 1)]);

        // Session was persisted for current_session.
        assert!(dir.path().join("session.json").exists());
    }

    #[tokio::test]
    async fn bad_credentials_map_to_invalid_credentials() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid grant"))
            .mount(&server)
            .await;

        let backend = backend(&server, &dir);
        let err = backend.login("ana@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidCredentials));
    }

    #[tokio::test]
    async fn inactive_account_is_rejected_without_storing_a_session() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "jwt-token",
                "user": { "id": id }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json(id, false)))
            .mount(&server)
            .await;

        let backend = backend(&server, &dir);
        let err = backend.login("ana@example.com", "secret1").await.unwrap_err();
        assert!(matches!(err, BackendError::AccountInactive));
        assert!(!dir.path().join("session.json").exists());
    }

    #[tokio::test]
    async fn rate_limited_signup_carries_retry_after() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let backend = backend(&server, &dir);
        let registration = Registration {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password: "secret1".into(),
            recovery: RecoveryAnswers::default(),
        };
        let err = backend.register(&registration).await.unwrap_err();
        assert_eq!(err.retry_after_ms(), Some(7000));
    }

    #[tokio::test]
    async fn registration_survives_failed_profile_insert() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "user": { "id": id }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let backend = backend(&server, &dir);
        let registration = Registration {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password: "secret1".into(),
            recovery: RecoveryAnswers::default(),
        };
        // The auth record exists; the orphaned profile is logged, not fatal.
        let user = backend.register(&registration).await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Trainee);
    }

    #[tokio::test]
    async fn global_phase_read_fails_open() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("GET"))
            .and(path("/rest/v1/app_settings"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let backend = backend(&server, &dir);
        assert_eq!(backend.global_phases().await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn toggle_adds_a_missing_key() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("GET"))
            .and(path("/rest/v1/app_settings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/app_settings"))
            .and(body_json(
                serde_json::json!({ "key": "global_phases", "value": ["TRAINEE-1"] }),
            ))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend(&server, &dir);
        let key = PhaseKey::new(Role::Trainee, 1);
        let updated = backend.toggle_global_phase(key).await.unwrap();
        assert_eq!(updated, vec![key]);
    }

    #[tokio::test]
    async fn toggle_removes_a_present_key() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("GET"))
            .and(path("/rest/v1/app_settings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "key": "global_phases", "value": ["TRAINEE-1", "TRAINER-2"] }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/app_settings"))
            .and(body_json(
                serde_json::json!({ "key": "global_phases", "value": ["TRAINER-2"] }),
            ))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend(&server, &dir);
        let updated = backend
            .toggle_global_phase(PhaseKey::new(Role::Trainee, 1))
            .await
            .unwrap();
        assert_eq!(updated, vec![PhaseKey::new(Role::Trainer, 2)]);
    }

    #[tokio::test]
    async fn reset_password_requires_a_service_key() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        let backend = backend(&server, &dir);
        let err = backend
            .reset_password("ana@example.com", "newpass1")
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::ServiceKeyRequired));
    }

    #[tokio::test]
    async fn expired_token_clears_the_stored_session() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(StoredSession {
            access_token: "stale".into(),
            user_id: Uuid::new_v4(),
        });

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let backend = HostedBackend::new(&server.uri(), "anon-key", None, 5, store);
        assert!(backend.current_session().await.unwrap().is_none());
        assert!(!dir.path().join("session.json").exists());
    }
}
