//! Command implementations and shared wiring.

pub mod auth;
pub mod init;
pub mod knowledge;
pub mod phases;
pub mod questions;
pub mod quiz;
pub mod ranking;
pub mod stats;
pub mod users;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Result};

use crewdrill_backend::{create_backend, load_config_from, CrewdrillConfig};
use crewdrill_core::capability::Screen;
use crewdrill_core::engine::{EngineError, TrainingEngine};
use crewdrill_core::model::{Role, User};
use crewdrill_core::session::Router;

/// Config + engine for one invocation.
pub(crate) struct AppContext {
    pub config: CrewdrillConfig,
    pub engine: TrainingEngine,
}

pub(crate) fn app_context(config_path: Option<PathBuf>) -> Result<AppContext> {
    let config = load_config_from(config_path.as_deref())?;
    let backend = create_backend(&config)?;
    Ok(AppContext {
        config,
        engine: TrainingEngine::new(backend),
    })
}

/// Restore the persisted session or fail with a sign-in hint.
pub(crate) async fn require_session(engine: &TrainingEngine) -> Result<User> {
    match engine.restore_session().await.map_err(present_error)? {
        Some(user) => Ok(user),
        None => bail!("not signed in. Run `crewdrill login` first"),
    }
}

/// Route a user through the capability check for `screen`. Returns the
/// router already positioned on that screen.
pub(crate) fn gate(user: &User, screen: Screen) -> Result<Router> {
    let mut router = Router::new();
    router.login(user.clone());
    router.navigate(screen)?;
    Ok(router)
}

/// Restore the persisted session and gate it on `screen`.
pub(crate) async fn open_screen(
    engine: &TrainingEngine,
    screen: Screen,
) -> Result<(Router, User)> {
    let user = require_session(engine).await?;
    let router = gate(&user, screen)?;
    Ok((router, user))
}

/// Collapse an engine error for display, per the error-handling rules:
/// authentication/validation failures keep their message, everything else
/// becomes a generic line with the detail kept at debug level.
pub(crate) fn present_error(e: EngineError) -> anyhow::Error {
    if e.user_facing() {
        anyhow::Error::new(e)
    } else {
        tracing::debug!("backend failure: {e:#}");
        anyhow::anyhow!("an error occurred, please try again")
    }
}

/// As `present_error`, for raw backend pass-throughs.
pub(crate) fn present_backend_error(e: crewdrill_core::error::BackendError) -> anyhow::Error {
    present_error(EngineError::Backend(e))
}

/// Read one line from stdin with a visible prompt.
pub(crate) fn prompt(label: &str) -> Result<String> {
    print!("{label}: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// A value given as a flag, or prompted for.
pub(crate) fn flag_or_prompt(value: Option<String>, label: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => prompt(label),
    }
}

/// Parse a `--level` flag, falling back to the user's own track. Admin
/// tiers have no track of their own, so the flag is mandatory for them.
pub(crate) fn resolve_track(user: &User, level: Option<String>) -> Result<Role> {
    match level {
        Some(l) => l.parse::<Role>().map_err(|e| anyhow::anyhow!(e)),
        None if user.role.is_track() => Ok(user.role),
        None => bail!("--level is required for {} accounts", user.role),
    }
}
