//! `ward init` - create the ~/.ward tree with starter files

use ward_core::config::WardConfig;
use ward_core::infrastructure::dirs;

use crate::cli::exit_codes;

const EXAMPLE_RULES: &str = r#"# Example Ward rules. Set `enabled: true` on a rule to activate it.
rules:
  - id: CUSTOM-001
    title: Unescaped Blade output
    description: "{!! ... !!} bypasses Blade's automatic HTML escaping."
    severity: high
    category: XSS
    enabled: false
    patterns:
      - type: contains
        target: blade-files
        pattern: "{!!"
    remediation: "Prefer {{ ... }}; only use {!! !!} for trusted, pre-sanitized HTML."
"#;

pub fn run() -> anyhow::Result<i32> {
    dirs::ensure_tree()?;

    let config_path = dirs::config_file()?;
    if config_path.exists() {
        println!("[info] {} already exists, leaving it alone", config_path.display());
    } else {
        WardConfig::default().save_to(&config_path)?;
        println!("[info] wrote {}", config_path.display());
    }

    let example_path = dirs::rules_dir()?.join("example.yaml");
    if !example_path.exists() {
        std::fs::write(&example_path, EXAMPLE_RULES)?;
        println!("[info] wrote {}", example_path.display());
    }

    Ok(exit_codes::SUCCESS)
}
