//! The `crewdrill users` command group (administrators).

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use crewdrill_core::capability::Screen;
use crewdrill_core::model::{PhaseKey, Role};

use super::{app_context, open_screen, present_backend_error, present_error};
use crate::UserAction;

pub async fn execute(config: Option<PathBuf>, action: UserAction) -> Result<()> {
    let ctx = app_context(config)?;
    let _ = open_screen(&ctx.engine, Screen::Users).await?;
    let engine = &ctx.engine;

    match action {
        UserAction::List => {
            let users = engine.backend().users().await.map_err(present_backend_error)?;

            let mut table = Table::new();
            table.set_header(vec!["Name", "Email", "Role", "Active", "Score", "Unlocked"]);
            for user in &users {
                table.add_row(vec![
                    Cell::new(&user.name),
                    Cell::new(&user.email),
                    Cell::new(user.role),
                    Cell::new(if user.is_active { "yes" } else { "no" }),
                    Cell::new(user.stats.score),
                    Cell::new(
                        user.unlocked_phases
                            .iter()
                            .map(|k| k.to_string())
                            .collect::<Vec<_>>()
                            .join(", "),
                    ),
                ]);
            }
            println!("{table}");
        }
        UserAction::SetRole { email, role } => {
            let role: Role = role.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let user = engine.set_role(&email, role).await.map_err(present_error)?;
            println!("{} is now {}.", user.email, user.role);
        }
        UserAction::Activate { email } => {
            let user = engine
                .set_active(&email, true)
                .await
                .map_err(present_error)?;
            println!("{} reactivated.", user.email);
        }
        UserAction::Deactivate { email } => {
            let user = engine
                .set_active(&email, false)
                .await
                .map_err(present_error)?;
            println!("{} deactivated; they can no longer sign in.", user.email);
        }
        UserAction::Unlock { email, key } => {
            let key: PhaseKey = key.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let user = engine.unlock_phase(&email, key).await.map_err(present_error)?;
            println!("Unlocked {key} for {}.", user.email);
        }
        UserAction::Revoke { email, key } => {
            let key: PhaseKey = key.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let user = engine.revoke_phase(&email, key).await.map_err(present_error)?;
            println!("Revoked {key} for {}.", user.email);
        }
        UserAction::Delete { email } => {
            engine.remove_user(&email).await.map_err(present_error)?;
            println!("Deleted {email}.");
        }
    }
    Ok(())
}
