//! Admin stats dashboard rendering.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use crewdrill_core::statistics::TrainingSummary;

/// Render the training summary as text: headline numbers, then the tier
/// distribution, then per-phase attempt counts.
pub fn render_summary(summary: &TrainingSummary) -> String {
    let mut out = String::new();

    let mut headline = Table::new();
    headline.set_header(vec![
        "Users",
        "Active",
        "Quizzes taken",
        "Avg score",
        "Accuracy",
    ]);
    headline.add_row(vec![
        Cell::new(summary.total_users),
        Cell::new(summary.active_users),
        Cell::new(summary.quizzes_taken),
        Cell::new(format!("{:.0}", summary.average_score)),
        Cell::new(format!("{:.0}%", summary.overall_accuracy * 100.0)),
    ]);
    out.push_str(&headline.to_string());
    out.push('\n');

    let mut roles = Table::new();
    roles.set_header(vec!["Tier", "Users"]);
    for (role, count) in &summary.role_distribution {
        roles.add_row(vec![Cell::new(role), Cell::new(count)]);
    }
    out.push('\n');
    out.push_str(&roles.to_string());
    out.push('\n');

    if !summary.attempts_per_phase.is_empty() {
        let mut phases = Table::new();
        phases.set_header(vec!["Phase", "Attempts"]);
        let mut rows: Vec<_> = summary.attempts_per_phase.iter().collect();
        rows.sort_by_key(|(key, _)| (key.role.rank(), key.phase));
        for (key, attempts) in rows {
            phases.add_row(vec![Cell::new(key), Cell::new(attempts)]);
        }
        out.push('\n');
        out.push_str(&phases.to_string());
        out.push('\n');
    }

    out
}

/// Save a summary as pretty JSON.
pub fn write_summary_json(summary: &TrainingSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("failed to serialize summary")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write summary to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewdrill_core::model::{PhaseKey, PhaseResult, Role, User};
    use crewdrill_core::statistics::compute_summary;
    use uuid::Uuid;

    fn sample_summary() -> TrainingSummary {
        let users: Vec<User> = Vec::new();
        let result = PhaseResult {
            user_id: Uuid::new_v4(),
            phase_key: PhaseKey::new(Role::Trainee, 1),
            score: 100,
            time_taken_secs: 30,
            correct_count: 1,
            total_count: 1,
        };
        compute_summary(&users, &[result])
    }

    #[test]
    fn renders_headline_and_phase_tables() {
        let rendered = render_summary(&sample_summary());
        assert!(rendered.contains("Quizzes taken"));
        assert!(rendered.contains("TRAINEE-1"));
        assert!(rendered.contains("TRAINEE"));
    }

    #[test]
    fn json_export_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");

        write_summary_json(&sample_summary(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: TrainingSummary = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.quizzes_taken, 1);
    }
}
