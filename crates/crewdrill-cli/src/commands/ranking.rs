//! The `crewdrill ranking` command.

use std::path::PathBuf;

use anyhow::Result;

use crewdrill_core::capability::Screen;
use crewdrill_core::model::Role;
use crewdrill_report::{render_leaderboard, write_leaderboard_json};

use super::{app_context, open_screen, present_error};

pub async fn execute(
    config: Option<PathBuf>,
    role: String,
    limit: Option<usize>,
    json: Option<PathBuf>,
) -> Result<()> {
    let ctx = app_context(config)?;
    let role: Role = role.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    anyhow::ensure!(role.is_track(), "rankings cover quiz tracks, not {role}");

    let _ = open_screen(&ctx.engine, Screen::Ranking).await?;

    let limit = limit.unwrap_or(ctx.config.ranking_limit);
    let entries = ctx
        .engine
        .leaderboard(role, limit)
        .await
        .map_err(present_error)?;

    if entries.is_empty() {
        println!("No {role} accounts on the board yet.");
        return Ok(());
    }

    println!("{role} hall of fame");
    println!("{}", render_leaderboard(&entries));

    if let Some(path) = json {
        write_leaderboard_json(&entries, &path)?;
        println!("Leaderboard saved to: {}", path.display());
    }
    Ok(())
}
