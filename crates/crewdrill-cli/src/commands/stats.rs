//! The `crewdrill stats` command (administrators).

use std::path::PathBuf;

use anyhow::Result;

use crewdrill_core::capability::Screen;
use crewdrill_report::{render_summary, write_summary_json};

use super::{app_context, open_screen, present_error};

pub async fn execute(config: Option<PathBuf>, json: Option<PathBuf>) -> Result<()> {
    let ctx = app_context(config)?;
    let _ = open_screen(&ctx.engine, Screen::Stats).await?;

    let summary = ctx
        .engine
        .training_summary()
        .await
        .map_err(present_error)?;

    println!("{}", render_summary(&summary));

    if let Some(path) = json {
        write_summary_json(&summary, &path)?;
        println!("Summary saved to: {}", path.display());
    }
    Ok(())
}
