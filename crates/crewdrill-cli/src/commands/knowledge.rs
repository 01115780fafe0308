//! The `crewdrill knowledge` command group (administrators).

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use crewdrill_core::capability::Screen;
use crewdrill_core::model::Role;

use super::{app_context, open_screen, present_backend_error, present_error};
use crate::KnowledgeAction;

pub async fn execute(config: Option<PathBuf>, action: KnowledgeAction) -> Result<()> {
    let ctx = app_context(config)?;
    let engine = &ctx.engine;

    match action {
        KnowledgeAction::List { level } => {
            // Reading the knowledge base is open to every signed-in user.
            let _ = open_screen(engine, Screen::Knowledge).await?;
            let level = level
                .map(|l| l.parse::<Role>().map_err(|e| anyhow::anyhow!(e)))
                .transpose()?;

            let mut articles = engine
                .backend()
                .knowledge()
                .await
                .map_err(present_backend_error)?;
            articles.retain(|a| level.is_none_or(|l| a.role == l));
            articles.sort_by_key(|a| a.role.rank());

            let mut table = Table::new();
            table.set_header(vec!["Id", "Track", "Title"]);
            for article in &articles {
                table.add_row(vec![
                    Cell::new(article.id),
                    Cell::new(article.role),
                    Cell::new(&article.title),
                ]);
            }
            println!("{table}");
        }
        KnowledgeAction::Add {
            title,
            content,
            level,
        } => {
            let _ = open_screen(engine, Screen::Questions).await?;
            let level: Role = level.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let article = engine
                .add_article(&title, &content, level)
                .await
                .map_err(present_error)?;
            println!("Added \"{}\" ({}).", article.title, article.id);
        }
        KnowledgeAction::Delete { id } => {
            let _ = open_screen(engine, Screen::Questions).await?;
            engine
                .backend()
                .delete_knowledge(id)
                .await
                .map_err(present_backend_error)?;
            println!("Deleted article {id}.");
        }
    }
    Ok(())
}
