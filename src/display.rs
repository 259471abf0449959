//! Terminal tables for the CLI.

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::calculate::percentage;
use crate::models::{
    format_number, DrawSummary, MunicipalityPrize, NumberFrequency, RepeatedCombination,
    StateBreakdown, StatePrize,
};
use crate::normalize::NormalizeReport;
use crate::suggest::{CategoryOutcome, SuggestionSet};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn summary_table(summary: &DrawSummary, report: &NormalizeReport) -> Table {
    let mut table = new_table(vec!["Metric", "Value"]);
    let date = |d: Option<chrono::NaiveDate>| or_dash(d.map(|d| d.format("%d/%m/%Y")));

    let rows: Vec<(&str, String)> = vec![
        ("Draws", summary.total_draws.to_string()),
        ("Complete draws", summary.complete_draws.to_string()),
        ("First draw", date(summary.first_date)),
        ("Last draw", date(summary.last_date)),
        (
            "Draws without a jackpot winner",
            summary.draws_without_jackpot_winner.to_string(),
        ),
        (
            "Draws without a quina winner",
            summary.draws_without_quina_winner.to_string(),
        ),
        (
            "Draws without a quadra winner",
            summary.draws_without_quadra_winner.to_string(),
        ),
        (
            "Largest accumulated prize",
            or_dash(summary.max_accumulated.map(|v| format!("R$ {:.2}", v))),
        ),
        (
            "Even / odd numbers",
            format!(
                "{} / {} ({:.1}% even)",
                summary.even_count,
                summary.odd_count,
                percentage(summary.even_count, summary.even_count + summary.odd_count)
            ),
        ),
        ("Records skipped", report.skipped.to_string()),
        ("Duplicate contests", report.duplicates.to_string()),
        ("Incomplete number lists", report.incomplete_numbers.to_string()),
    ];

    for (metric, value) in rows {
        table.add_row(vec![metric.to_string(), value]);
    }
    table
}

/// Frequency rows with their share of all drawn numbers.
pub fn frequency_table(rows: &[NumberFrequency], total: u64) -> Table {
    let mut table = new_table(vec!["Number", "Occurrences", "Share"]);
    for row in rows {
        table.add_row(vec![
            format_number(row.number),
            row.occurrences.to_string(),
            format!("{:.2}%", percentage(row.occurrences as u64, total)),
        ]);
    }
    table
}

pub fn municipality_table(rows: &[&MunicipalityPrize]) -> Table {
    let mut table = new_table(vec!["#", "Municipality", "Winners", "State total"]);
    for (i, row) in rows.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            row.label(),
            row.winners.to_string(),
            row.state_total.to_string(),
        ]);
    }
    table
}

pub fn state_table(rows: &[&StatePrize], total_winners: u32) -> Table {
    let mut table = new_table(vec!["State", "Winners", "Municipalities", "Share"]);
    for row in rows {
        table.add_row(vec![
            row.state.clone(),
            row.winners.to_string(),
            row.municipalities.to_string(),
            format!(
                "{:.1}%",
                percentage(row.winners as u64, total_winners as u64)
            ),
        ]);
    }
    table
}

pub fn breakdown_table(breakdown: &StateBreakdown) -> Table {
    let mut table = new_table(vec!["Municipality", "Winners", "Share"]);
    let total = breakdown.total as u64;
    for entry in &breakdown.entries {
        table.add_row(vec![
            entry.municipality.clone(),
            entry.winners.to_string(),
            format!("{:.1}%", percentage(entry.winners as u64, total)),
        ]);
    }
    if let Some(others) = &breakdown.others {
        table.add_row(vec![
            format!("Others ({} municipalities)", others.municipalities),
            others.winners.to_string(),
            format!("{:.1}%", percentage(others.winners as u64, total)),
        ]);
    }
    table
}

pub fn repeats_table(repeats: &[RepeatedCombination]) -> Table {
    let mut table = new_table(vec!["Combination", "Times drawn", "Contests"]);
    for repeat in repeats {
        table.add_row(vec![
            repeat.combination.display_key(),
            repeat.contests.len().to_string(),
            repeat
                .contests
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        ]);
    }
    table
}

pub fn suggestions_table(set: &SuggestionSet) -> Table {
    let mut table = new_table(vec!["Category", "Numbers", "History"]);
    for group in &set.categories {
        match &group.outcome {
            CategoryOutcome::InsufficientData { available } => {
                table.add_row(vec![
                    Cell::new(group.category.label()),
                    Cell::new(format!("Not enough data ({} numbers drawn)", available)),
                    Cell::new("-"),
                ]);
            }
            CategoryOutcome::Generated { suggestions } => {
                for suggestion in suggestions {
                    let numbers = suggestion
                        .numbers
                        .iter()
                        .map(|n| format_number(*n))
                        .collect::<Vec<_>>()
                        .join(" - ");
                    let history = if suggestion.has_occurred() {
                        let contests = suggestion
                            .historical_matches
                            .iter()
                            .map(|c| c.to_string())
                            .collect::<Vec<_>>()
                            .join(", ");
                        Cell::new(format!("Drawn in {}", contests)).fg(Color::Red)
                    } else {
                        Cell::new("Never drawn").fg(Color::Green)
                    };
                    table.add_row(vec![
                        Cell::new(group.category.label()),
                        Cell::new(numbers),
                        history,
                    ]);
                }
            }
        }
    }
    table
}
