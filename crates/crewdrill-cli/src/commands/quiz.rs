//! The phase board and the interactive quiz.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use comfy_table::{Cell, Table};

use crewdrill_core::capability::Screen;
use crewdrill_core::gating::MIN_QUESTIONS_PER_PHASE;
use crewdrill_core::model::{PhaseKey, Question};

use super::{app_context, open_screen, present_error, prompt, resolve_track};

pub async fn board(config: Option<PathBuf>, level: Option<String>) -> Result<()> {
    let ctx = app_context(config)?;

    // Resolve the track first so the capability check targets the right board.
    let user = super::require_session(&ctx.engine).await?;
    let level = resolve_track(&user, level)?;
    let board_screen = Screen::board_for(level)
        .ok_or_else(|| anyhow::anyhow!("{level} does not carry a phase board"))?;
    let _router = super::gate(&user, board_screen)?;

    let rows = ctx
        .engine
        .phase_overview(&user, level)
        .await
        .map_err(present_error)?;

    let mut table = Table::new();
    table.set_header(vec!["Phase", "Questions", "Status"]);
    for row in &rows {
        let status = if row.status.completed {
            "completed"
        } else if row.status.available {
            "ready"
        } else if row.status.unlocked {
            "waiting for questions"
        } else {
            "locked"
        };
        table.add_row(vec![
            Cell::new(PhaseKey::new(level, row.phase)),
            Cell::new(format!("{}/{MIN_QUESTIONS_PER_PHASE}", row.question_count)),
            Cell::new(status),
        ]);
    }

    println!("{} track", level);
    println!("{table}");
    Ok(())
}

pub async fn take(config: Option<PathBuf>, level: Option<String>, phase: u8) -> Result<()> {
    let ctx = app_context(config)?;

    let (_, user) = open_screen(&ctx.engine, Screen::Quiz).await?;
    let level = resolve_track(&user, level)?;

    let questions = ctx
        .engine
        .start_quiz(&user, level, phase)
        .await
        .map_err(present_error)?;
    let key = PhaseKey::new(level, phase);

    println!("Phase {key} — {} questions. Answer with A-D.\n", questions.len());
    let started = Instant::now();

    let mut answers = Vec::with_capacity(questions.len());
    for (i, question) in questions.iter().enumerate() {
        answers.push(ask_question(i + 1, questions.len(), question)?);
    }

    let elapsed_secs = started.elapsed().as_secs();
    let (updated, result) = ctx
        .engine
        .complete_quiz(&user, key, &questions, &answers, elapsed_secs)
        .await
        .map_err(present_error)?;

    let accuracy = if result.total_count == 0 {
        0.0
    } else {
        f64::from(result.correct_count) / f64::from(result.total_count) * 100.0
    };
    println!("\nPhase complete!");
    println!(
        "  {} / {} correct ({accuracy:.0}%) in {}m {:02}s",
        result.correct_count,
        result.total_count,
        elapsed_secs / 60,
        elapsed_secs % 60,
    );
    println!("  Score this run: {}", result.score);
    println!("  Total score: {}", updated.stats.score);
    Ok(())
}

fn ask_question(number: usize, total: usize, question: &Question) -> Result<usize> {
    println!(
        "[{number}/{total}] ({}) {}",
        question.difficulty, question.text
    );
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}) {option}", option_letter(i));
    }

    let choice = loop {
        let line = prompt("Your answer")?;
        match parse_answer(&line, question.options.len()) {
            Some(idx) => break idx,
            None => println!("Please answer with one of A-{}.", option_letter(question.options.len() - 1)),
        }
    };

    if choice == question.correct_option_index {
        println!("Correct!\n");
    } else {
        println!(
            "Wrong. The answer was {}) {}\n",
            option_letter(question.correct_option_index),
            question.options[question.correct_option_index]
        );
    }
    Ok(choice)
}

fn option_letter(index: usize) -> char {
    (b'A' + index as u8) as char
}

/// Accept "A".."D" (any case) or "1".."4".
fn parse_answer(input: &str, option_count: usize) -> Option<usize> {
    let trimmed = input.trim();
    if trimmed.len() != 1 {
        return None;
    }
    let c = trimmed.chars().next()?;
    let index = match c {
        'a'..='z' => (c as u8 - b'a') as usize,
        'A'..='Z' => (c as u8 - b'A') as usize,
        '1'..='9' => (c as u8 - b'1') as usize,
        _ => return None,
    };
    (index < option_count).then_some(index)
}
