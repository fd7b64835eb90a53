//! `ward rules` - list loaded custom rules

use std::path::Path;

use ward_core::config::rules::load_all_rules;

use crate::cli::exit_codes;

pub fn run(config_path: Option<&Path>) -> anyhow::Result<i32> {
    let config = crate::cli::load_config(config_path)?;
    let rules = load_all_rules(&config.rules)?;

    if rules.is_empty() {
        println!("[info] no custom rules loaded");
        return Ok(exit_codes::SUCCESS);
    }

    for rule in &rules {
        let state = if rule.enabled { "enabled" } else { "disabled" };
        println!(
            "{:<12} {:<8} {:<8} {}",
            rule.id, rule.severity, state, rule.title
        );
    }
    println!("[info] {} rule(s)", rules.len());
    Ok(exit_codes::SUCCESS)
}
