//! TOML question-bank parser.
//!
//! Administrators author questions in TOML banks, validate them, and import
//! them into the backend through the CLI.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::gating::MIN_QUESTIONS_PER_PHASE;
use crate::model::{
    Difficulty, PhaseKey, Question, Role, OPTIONS_PER_QUESTION, PHASES_PER_TRACK,
};

/// Intermediate TOML structure for parsing bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    name: String,
    /// Default track for questions that don't specify one.
    level: String,
    /// Default phase for questions that don't specify one.
    #[serde(default = "default_phase")]
    phase: u8,
}

fn default_phase() -> u8 {
    1
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    text: String,
    options: Vec<String>,
    correct_option_index: usize,
    #[serde(default = "default_difficulty")]
    difficulty: String,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    phase: Option<u8>,
    #[serde(default)]
    knowledge_id: Option<Uuid>,
}

fn default_difficulty() -> String {
    "medium".to_string()
}

/// A parsed bank: a display name plus ready-to-import questions.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    pub name: String,
    pub questions: Vec<Question>,
}

/// Parse a single TOML bank file.
pub fn parse_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;
    parse_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionBank` (useful for testing).
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let default_level: Role = parsed
        .bank
        .level
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{e}"))?;
    let default_phase = parsed.bank.phase;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let level = q
                .level
                .map(|l| l.parse().map_err(|e: String| anyhow::anyhow!("{e}")))
                .transpose()?
                .unwrap_or(default_level);
            let difficulty: Difficulty = q
                .difficulty
                .parse()
                .map_err(|e: String| anyhow::anyhow!("{e}"))?;

            Ok(Question {
                id: Uuid::new_v4(),
                knowledge_id: q.knowledge_id,
                text: q.text,
                options: q.options,
                correct_option_index: q.correct_option_index,
                difficulty,
                level,
                phase: q.phase.unwrap_or(default_phase),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QuestionBank {
        name: parsed.bank.name,
        questions,
    })
}

/// Recursively load all `.toml` bank files from a directory. Files that fail
/// to parse are skipped with a warning.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuestionBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct BankWarning {
    /// The offending question's text (if applicable).
    pub question: Option<String>,
    pub message: String,
}

/// Validate a bank for common issues: wrong option count, out-of-range
/// correct index or phase, duplicate question text, and phases still below
/// the playability threshold.
pub fn validate_bank(bank: &QuestionBank) -> Vec<BankWarning> {
    let mut warnings = Vec::new();

    let mut seen_text = std::collections::HashSet::new();
    for q in &bank.questions {
        if q.options.len() != OPTIONS_PER_QUESTION {
            warnings.push(BankWarning {
                question: Some(q.text.clone()),
                message: format!(
                    "{} options, exactly {OPTIONS_PER_QUESTION} required",
                    q.options.len()
                ),
            });
        }
        if q.correct_option_index >= q.options.len() {
            warnings.push(BankWarning {
                question: Some(q.text.clone()),
                message: format!(
                    "correct_option_index {} out of range for {} options",
                    q.correct_option_index,
                    q.options.len()
                ),
            });
        }
        if !(1..=PHASES_PER_TRACK).contains(&q.phase) {
            warnings.push(BankWarning {
                question: Some(q.text.clone()),
                message: format!("phase {} outside 1..={PHASES_PER_TRACK}", q.phase),
            });
        }
        if !q.level.is_track() {
            warnings.push(BankWarning {
                question: Some(q.text.clone()),
                message: format!("{} is not a quiz-carrying track", q.level),
            });
        }
        if !seen_text.insert(q.text.trim().to_lowercase()) {
            warnings.push(BankWarning {
                question: Some(q.text.clone()),
                message: "duplicate question text".into(),
            });
        }
        if q.text.trim().is_empty() {
            warnings.push(BankWarning {
                question: None,
                message: "question text is empty".into(),
            });
        }
    }

    // Phases this bank contributes to but leaves below the playable floor.
    let mut per_phase: HashMap<PhaseKey, usize> = HashMap::new();
    for q in &bank.questions {
        *per_phase.entry(q.phase_key()).or_default() += 1;
    }
    let mut underfilled: Vec<(PhaseKey, usize)> = per_phase
        .into_iter()
        .filter(|(_, count)| *count < MIN_QUESTIONS_PER_PHASE)
        .collect();
    underfilled.sort_by_key(|(key, _)| (key.role.rank(), key.phase));
    for (key, count) in underfilled {
        warnings.push(BankWarning {
            question: None,
            message: format!(
                "phase {key} has {count} questions in this bank; {MIN_QUESTIONS_PER_PHASE} \
                 needed before it is playable"
            ),
        });
    }

    warnings
}
