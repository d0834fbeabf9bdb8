// docguard/src/commands/analyze.rs
//! The `analyze` command: detect sensitive entities and report them without
//! redacting.

use anyhow::Result;
use comfy_table::Table;
use owo_colors::OwoColorize;

use docguard_core::{redact_sensitive, AnalysisFilters, AnalyzerEngine};

use crate::cli::AnalyzeCommand;
use crate::commands::read_input;

pub fn run(engine: &AnalyzerEngine, cmd: &AnalyzeCommand) -> Result<()> {
    let text = read_input(cmd.input_file.as_deref())?;

    let filters = AnalysisFilters {
        entity_types: if cmd.entities.is_empty() {
            None
        } else {
            Some(cmd.entities.clone())
        },
        score_threshold: cmd.threshold,
        allow_list: cmd.allow_list.clone(),
    };

    let results = engine.analyze(&text, &cmd.language, &filters)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("{}", "No sensitive entities detected.".green());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Entity", "Text", "Span", "Score"]);
    for entity in &results {
        let shown = if cmd.show_text {
            entity.text.clone()
        } else {
            redact_sensitive(&entity.text)
        };
        table.add_row(vec![
            entity.entity_type.clone(),
            shown,
            format!("[{}, {})", entity.start, entity.end),
            format!("{:.2}", entity.score),
        ]);
    }

    println!("{table}");
    println!(
        "{} {}",
        results.len().to_string().bold(),
        "sensitive entit(y/ies) detected.".yellow()
    );
    Ok(())
}
