//! Rules command implementation
//!
//! Lists every registered rule, including custom rules from configuration.

use super::load_settings;
use crate::anonymization::AnonymizationEngine;
use clap::Args;
use serde::Serialize;

/// Arguments for the rules command
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Print the rule table as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct RuleRow {
    id: String,
    category: String,
    priority: u8,
    strategy: String,
    matcher: &'static str,
    enabled: bool,
}

impl RulesArgs {
    /// Execute the rules command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let config = match load_settings(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let engine = match AnonymizationEngine::from_config(&config.engine) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("❌ Failed to build engine: {e}");
                return Ok(2);
            }
        };

        let mut rows: Vec<RuleRow> = engine
            .rules()
            .into_iter()
            .map(|(rule, enabled)| RuleRow {
                id: rule.id().to_string(),
                category: rule.category().to_string(),
                priority: rule.priority(),
                strategy: rule.strategy().to_string(),
                matcher: rule.matcher().kind(),
                enabled,
            })
            .collect();
        rows.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(0);
        }

        println!(
            "{:<20} {:<16} {:>8}  {:<20} {:<10} {}",
            "ID", "CATEGORY", "PRIORITY", "STRATEGY", "MATCHER", "ENABLED"
        );
        for row in &rows {
            println!(
                "{:<20} {:<16} {:>8}  {:<20} {:<10} {}",
                row.id,
                row.category,
                row.priority,
                row.strategy,
                row.matcher,
                if row.enabled { "yes" } else { "no" }
            );
        }
        Ok(0)
    }
}
