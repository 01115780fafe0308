//! The `crewdrill init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create crewdrill.toml
    if std::path::Path::new("crewdrill.toml").exists() {
        println!("crewdrill.toml already exists, skipping.");
    } else {
        std::fs::write("crewdrill.toml", SAMPLE_CONFIG)?;
        println!("Created crewdrill.toml");
    }

    // Create example question bank
    std::fs::create_dir_all("question-banks")?;
    let example_path = std::path::Path::new("question-banks/example.toml");
    if example_path.exists() {
        println!("question-banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created question-banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit crewdrill.toml with your backend URL and keys");
    println!("  2. Run: crewdrill validate-bank --bank question-banks/example.toml");
    println!("  3. Run: crewdrill login --email master@example.com");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# crewdrill configuration

# The in-memory backend needs no credentials and resets on every run.
# Switch type to "hosted" and fill in the keys to talk to a real backend:
#
# [backend]
# type = "hosted"
# url = "https://your-project.example.com"
# anon_key = "${CREWDRILL_ANON_KEY}"
# service_key = "${CREWDRILL_SERVICE_KEY}"   # only needed for password resets

[backend]
type = "memory"

timeout_secs = 30
ranking_limit = 10
"#;

const EXAMPLE_BANK: &str = r#"[bank]
name = "Trainee basics"
level = "TRAINEE"
phase = 1

[[questions]]
text = "A customer reports a wrong order. What comes first?"
options = [
    "Apologize and fix the order",
    "Explain the register layout",
    "Call the coordinator",
    "Offer a discount voucher",
]
correct_option_index = 0
difficulty = "easy"

[[questions]]
text = "Fries have been in the holding station past their hold time. What do you do?"
options = [
    "Serve them within the next five minutes",
    "Discard them and log the waste",
    "Re-fry them briefly",
    "Move them under the heat lamp",
]
correct_option_index = 1
difficulty = "medium"

[[questions]]
text = "Which item is checked during the opening routine?"
options = [
    "Monthly sales report",
    "Holding cabinet temperature",
    "Supplier invoices",
    "Staff vacation plan",
]
correct_option_index = 1
difficulty = "easy"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crewdrill_core::bank::{parse_bank_str, validate_bank};
    use std::path::PathBuf;

    #[test]
    fn sample_config_parses() {
        let config: crewdrill_backend::CrewdrillConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
        assert!(matches!(
            config.backend,
            crewdrill_backend::BackendConfig::Memory
        ));
    }

    #[test]
    fn example_bank_parses_but_warns_below_the_floor() {
        let bank = parse_bank_str(EXAMPLE_BANK, &PathBuf::from("example.toml")).unwrap();
        assert_eq!(bank.questions.len(), 3);

        let warnings = validate_bank(&bank);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("needed before it is playable")));
    }
}
