//! The `crewdrill questions` command group and `validate-bank`.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use crewdrill_core::bank::{load_bank_directory, parse_bank, validate_bank, QuestionBank};
use crewdrill_core::capability::Screen;
use crewdrill_core::model::Role;

use super::{app_context, open_screen, present_backend_error, present_error};
use crate::QuestionAction;

pub async fn execute(config: Option<PathBuf>, action: QuestionAction) -> Result<()> {
    let ctx = app_context(config)?;
    let _ = open_screen(&ctx.engine, Screen::Questions).await?;
    let engine = &ctx.engine;

    match action {
        QuestionAction::List { level, phase } => {
            let level = level
                .map(|l| l.parse::<Role>().map_err(|e| anyhow::anyhow!(e)))
                .transpose()?;

            let mut questions = engine
                .backend()
                .questions()
                .await
                .map_err(present_backend_error)?;
            questions.retain(|q| level.is_none_or(|l| q.level == l));
            questions.retain(|q| phase.is_none_or(|p| q.phase == p));
            questions.sort_by_key(|q| (q.level.rank(), q.phase));

            let mut table = Table::new();
            table.set_header(vec!["Id", "Phase", "Difficulty", "Question"]);
            for q in &questions {
                table.add_row(vec![
                    Cell::new(q.id),
                    Cell::new(q.phase_key()),
                    Cell::new(q.difficulty),
                    Cell::new(&q.text),
                ]);
            }
            println!("{table}");
            println!("{} question(s).", questions.len());
        }
        QuestionAction::Import { bank } => {
            let banks = load_banks(&bank)?;
            for bank in &banks {
                let warnings = validate_bank(bank);
                for w in &warnings {
                    println!("  WARNING [{}]: {}", bank.name, w.message);
                }
                let imported = engine
                    .import_questions(&bank.questions)
                    .await
                    .map_err(present_error)?;
                println!("Imported {imported} question(s) from \"{}\".", bank.name);
            }
        }
        QuestionAction::Delete { id } => {
            engine
                .backend()
                .delete_question(id)
                .await
                .map_err(present_backend_error)?;
            println!("Deleted question {id}.");
        }
    }
    Ok(())
}

/// The `crewdrill validate-bank` command. Works without a session: banks
/// are local files.
pub fn validate(bank_path: PathBuf) -> Result<()> {
    let banks = load_banks(&bank_path)?;

    let mut total_warnings = 0;
    for bank in &banks {
        println!(
            "Bank: {} ({} questions)",
            bank.name,
            bank.questions.len()
        );

        let warnings = validate_bank(bank);
        for w in &warnings {
            let prefix = w
                .question
                .as_ref()
                .map(|q| format!("  [{q}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All banks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }
    Ok(())
}

fn load_banks(path: &PathBuf) -> Result<Vec<QuestionBank>> {
    if path.is_dir() {
        load_bank_directory(path)
    } else {
        Ok(vec![parse_bank(path)?])
    }
}
