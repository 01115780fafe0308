//! Leaderboard rendering.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use crewdrill_core::statistics::LeaderboardEntry;

/// Render a leaderboard as a text table, podium first.
pub fn render_leaderboard(entries: &[LeaderboardEntry]) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        "#",
        "Name",
        "Score",
        "Accuracy",
        "Time",
        "Phases done",
    ]);

    for (i, entry) in entries.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&entry.name),
            Cell::new(entry.score),
            Cell::new(format!("{:.0}%", entry.accuracy() * 100.0)),
            Cell::new(format_duration(entry.total_time_secs)),
            Cell::new(entry.completed_phases),
        ]);
    }

    table.to_string()
}

/// Save a leaderboard as pretty JSON.
pub fn write_leaderboard_json(entries: &[LeaderboardEntry], path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(entries).context("failed to serialize leaderboard")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write leaderboard to {}", path.display()))?;
    Ok(())
}

fn format_duration(secs: u64) -> String {
    format!("{}m {:02}s", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            score,
            total_time_secs: 125,
            questions_answered: 20,
            correct_answers: 15,
            completed_phases: 2,
        }
    }

    #[test]
    fn renders_ranks_and_formatted_fields() {
        let rendered = render_leaderboard(&[entry("Bia", 900), entry("Ana", 500)]);
        assert!(rendered.contains("Bia"));
        assert!(rendered.contains("900"));
        assert!(rendered.contains("75%"));
        assert!(rendered.contains("2m 05s"));

        // Bia is ranked above Ana.
        let bia = rendered.find("Bia").unwrap();
        let ana = rendered.find("Ana").unwrap();
        assert!(bia < ana);
    }

    #[test]
    fn json_export_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/leaderboard.json");

        write_leaderboard_json(&[entry("Ana", 500)], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<LeaderboardEntry> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].score, 500);
    }
}
