//! The `crewdrill phases` command group (administrators).

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use crewdrill_core::capability::Screen;
use crewdrill_core::gating::{question_count, MIN_QUESTIONS_PER_PHASE};
use crewdrill_core::model::{PhaseKey, Role, PHASES_PER_TRACK};

use super::{app_context, open_screen, present_backend_error, present_error};
use crate::PhaseAction;

pub async fn execute(config: Option<PathBuf>, action: PhaseAction) -> Result<()> {
    let ctx = app_context(config)?;
    let _ = open_screen(&ctx.engine, Screen::GlobalPhases).await?;
    let engine = &ctx.engine;

    match action {
        PhaseAction::List => {
            let questions = engine
                .backend()
                .questions()
                .await
                .map_err(present_backend_error)?;
            let global = engine
                .backend()
                .global_phases()
                .await
                .map_err(present_backend_error)?;

            let mut table = Table::new();
            table.set_header(vec!["Phase", "Active", "Questions"]);
            for track in Role::TRACKS {
                for phase in 1..=PHASES_PER_TRACK {
                    let key = PhaseKey::new(track, phase);
                    let count = question_count(&questions, track, phase);
                    let filled = if count >= MIN_QUESTIONS_PER_PHASE {
                        format!("{count}")
                    } else {
                        format!("{count} (below {MIN_QUESTIONS_PER_PHASE})")
                    };
                    table.add_row(vec![
                        Cell::new(key),
                        Cell::new(if global.contains(&key) { "yes" } else { "no" }),
                        Cell::new(filled),
                    ]);
                }
            }
            println!("{table}");
        }
        PhaseAction::Toggle { key } => {
            let key: PhaseKey = key.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let updated = engine
                .toggle_global_phase(key)
                .await
                .map_err(present_error)?;

            if updated.contains(&key) {
                println!("{key} is now globally active.");
            } else {
                println!("{key} is no longer globally active.");
            }
        }
    }
    Ok(())
}
